use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,
    ValidationInvalidTag,

    CorpusNotFound,
    DocumentNotFound,

    FrontmatterInvalid,
    FrontmatterWriteFailed,

    InternalIoError,
    InternalJsonError,
    InternalYamlError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidTag => "validation.invalid_tag",

            ErrorCode::CorpusNotFound => "corpus.not_found",
            ErrorCode::DocumentNotFound => "document.not_found",

            ErrorCode::FrontmatterInvalid => "frontmatter.invalid",
            ErrorCode::FrontmatterWriteFailed => "frontmatter.write_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalYamlError => "internal.yaml_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundDetails {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidTagDetails {
    pub field: String,
    pub tag: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontmatterDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_tag(
        field: impl Into<String>,
        tag: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let tag = tag.into();
        let details = to_details(InvalidTagDetails {
            field: field.into(),
            tag: tag.clone(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ValidationInvalidTag,
            format!("Invalid tag '{}'", tag),
            details,
        )
        .with_hint("Tags are '/'-separated paths without whitespace or commas, e.g. projects/client")
    }

    pub fn corpus_not_found(root: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::CorpusNotFound,
            "Corpus directory not found",
            to_details(NotFoundDetails { id: root.into() }),
        )
        .with_hint("Pass --path pointing at the directory that holds your notes")
    }

    pub fn document_not_found(path: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DocumentNotFound,
            "Document not found",
            to_details(NotFoundDetails { id: path.into() }),
        )
    }

    pub fn frontmatter_invalid(path: impl Into<String>, error: impl Into<String>) -> Self {
        let details = to_details(FrontmatterDetails {
            path: path.into(),
            error: error.into(),
        });

        Self::new(
            ErrorCode::FrontmatterInvalid,
            "Front-matter is not a valid YAML mapping",
            details,
        )
        .with_hint("Fix the YAML between the leading '---' lines and re-run the rename")
    }

    pub fn frontmatter_write_failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        let details = to_details(FrontmatterDetails {
            path: path.into(),
            error: error.into(),
        });

        Self::new(
            ErrorCode::FrontmatterWriteFailed,
            "Failed to update front-matter",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_yaml(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalYamlError, "YAML error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
