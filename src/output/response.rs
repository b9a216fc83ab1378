//! What a command leaves on stdout: one JSON document, plus the exit code.
//!
//! Success prints `{"success": true, "data": ...}`; failure prints
//! `{"success": false, "error": {code, message, details, hints?, retryable?}}`.

use std::io::{self, Write};

use retag::error::Hint;
use retag::{Error, ErrorCode, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct Envelope<'r> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'r Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody<'r>>,
}

#[derive(Serialize)]
struct ErrorBody<'r> {
    code: &'static str,
    message: &'r str,
    details: &'r Value,
    #[serde(skip_serializing_if = "no_hints")]
    hints: &'r [Hint],
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

fn no_hints(hints: &&[Hint]) -> bool {
    hints.is_empty()
}

impl<'r> Envelope<'r> {
    fn of(result: &'r Result<Value>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                success: false,
                data: None,
                error: Some(ErrorBody {
                    code: err.code.as_str(),
                    message: &err.message,
                    details: &err.details,
                    hints: &err.hints,
                    retryable: err.retryable,
                }),
            },
        }
    }

    fn render(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::internal_json(e.to_string(), Some("serialize response".to_string())))
    }
}

/// Serialize a command's output and pick its exit code. Errors carry their
/// own exit code; a successful command keeps the one it chose.
pub fn map_cmd_result_to_json<T: Serialize>(result: Result<(T, i32)>) -> (Result<Value>, i32) {
    let serialized = result.and_then(|(data, exit_code)| {
        serde_json::to_value(data)
            .map(|value| (value, exit_code))
            .map_err(|e| Error::internal_json(e.to_string(), Some("serialize response".to_string())))
    });

    match serialized {
        Ok((value, exit_code)) => (Ok(value), exit_code),
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

/// 2 for bad input or settings, 4 when the corpus or a document is missing,
/// 1 otherwise.
fn exit_code_for_error(code: ErrorCode) -> i32 {
    let code = code.as_str();
    if code.ends_with(".not_found") {
        4
    } else if code.starts_with("validation.") || code.starts_with("config.") {
        2
    } else {
        1
    }
}

pub fn print_json_result(result: Result<Value>) -> Result<()> {
    write_json_result(&mut io::stdout().lock(), &result)
}

fn write_json_result(out: &mut impl Write, result: &Result<Value>) -> Result<()> {
    let payload = Envelope::of(result).render()?;
    match writeln!(out, "{}", payload) {
        Ok(()) => Ok(()),
        // Reader went away (`retag tags | head`)
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(Error::internal_io(e.to_string(), Some("write stdout".to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retag::error::codes::all_codes;

    fn printed(result: Result<Value>) -> Value {
        let mut out = Vec::new();
        write_json_result(&mut out, &result).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn exit_codes_follow_the_error_category() {
        let (result, code) =
            map_cmd_result_to_json::<()>(Err(Error::validation_invalid_tag("to", "a b", "space")));
        assert!(result.is_err());
        assert_eq!(code, 2);

        let (_, code) = map_cmd_result_to_json::<()>(Err(Error::corpus_not_found("/nope")));
        assert_eq!(code, 4);

        assert_eq!(exit_code_for_error(ErrorCode::ConfigInvalidJson), 2);
        assert_eq!(exit_code_for_error(ErrorCode::DocumentNotFound), 4);
        assert_eq!(exit_code_for_error(ErrorCode::FrontmatterWriteFailed), 1);
    }

    #[test]
    fn successful_commands_keep_their_exit_code() {
        let (result, code) = map_cmd_result_to_json(Ok((serde_json::json!({"aborted": true}), 1)));
        assert_eq!(result.unwrap()["aborted"], true);
        assert_eq!(code, 1);
    }

    #[test]
    fn no_error_code_exits_zero() {
        for code in all_codes() {
            assert!(exit_code_for_error(*code) > 0, "{}", code.as_str());
        }
    }

    #[test]
    fn success_prints_data_without_error() {
        let value = printed(Ok(serde_json::json!({"changed": 2})));
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["changed"], 2);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_prints_code_details_and_hints() {
        let value = printed(Err(Error::validation_invalid_tag("from", "", "empty")));

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "validation.invalid_tag");
        assert_eq!(value["error"]["details"]["field"], "from");
        assert!(value["error"]["hints"].is_array());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn hints_are_omitted_when_there_are_none() {
        let value = printed(Err(Error::document_not_found("a.md")));
        assert_eq!(value["error"]["code"], "document.not_found");
        assert!(value["error"].get("hints").is_none());
    }
}
