use regex::Regex;
use serde_yml::Mapping;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::frontmatter;
use super::{Corpus, Document, DocumentKind, DocumentMetadata, InlineTag};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::tags;
use crate::utils::io;

/// A corpus of markdown files under a root directory.
///
/// Metadata is derived from the file on every call, so it always reflects
/// what is on disk at that moment.
#[derive(Debug, Clone)]
pub struct DiskCorpus {
    root: PathBuf,
    settings: Settings,
}

impl DiskCorpus {
    pub fn open(root: &Path, settings: Settings) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::corpus_not_found(root.display().to_string()));
        }

        Ok(Self {
            root: root.to_path_buf(),
            settings,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn kind_of(&self, path: &str) -> DocumentKind {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if self.settings.is_document_extension(ext) {
            DocumentKind::Markdown
        } else {
            DocumentKind::Other
        }
    }

    fn walk(&self, dir: &Path, files: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if path.is_dir() {
                if self.settings.is_skipped_dir(&name) {
                    continue;
                }
                self.walk(&path, files);
            } else if path.is_file() {
                let Some(relative) = relative_path(&self.root, &path) else {
                    continue;
                };
                if name.ends_with(".retag-tmp") || self.settings.is_excluded(&relative) {
                    continue;
                }
                files.push(relative);
            }
        }
    }
}

/// Root-relative path with `/` separators.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

// ============================================================================
// Inline tag extraction
// ============================================================================

/// `#` at line start or after whitespace / `(`, then tag characters.
fn inline_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?:^|[\s(])(#{}+)", tags::TAG_CHAR_CLASS))
            .expect("inline tag pattern compiles")
    })
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Inline tags in `body`, with offsets relative to the whole document.
fn inline_tags(body: &str, body_offset: usize) -> Vec<InlineTag> {
    let mut tags = Vec::new();
    let mut offset = body_offset;
    let mut in_fence = false;

    for line in body.split_inclusive('\n') {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence {
            for caps in inline_tag_pattern().captures_iter(line) {
                let Some(m) = caps.get(1) else {
                    continue;
                };
                let tag = m.as_str().trim_end_matches('/');
                let name = &tag[1..];
                if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
                    continue;
                }
                let start = offset + m.start();
                tags.push(InlineTag {
                    tag: tag.to_string(),
                    start,
                    end: start + tag.len(),
                });
            }
        }
        offset += line.len();
    }

    tags
}

/// Parse a document's cached metadata from its text.
pub(crate) fn parse_metadata(content: &str) -> DocumentMetadata {
    let sections = frontmatter::split(content);
    let frontmatter = sections
        .yaml
        .and_then(|yaml| frontmatter::parse(yaml).ok());

    DocumentMetadata {
        tags: inline_tags(sections.body, sections.body_offset),
        frontmatter,
    }
}

// ============================================================================
// Corpus implementation
// ============================================================================

impl Corpus for DiskCorpus {
    fn documents(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        self.walk(&self.root, &mut files);
        files.sort();
        Ok(files)
    }

    fn resolve(&self, path: &str) -> Option<Document> {
        if !self.full_path(path).is_file() {
            return None;
        }
        Some(Document {
            path: path.to_string(),
            kind: self.kind_of(path),
        })
    }

    fn read_text(&self, doc: &Document) -> Result<String> {
        match io::read_optional(&self.full_path(&doc.path), &format!("read {}", doc.path))? {
            Some(content) => Ok(content),
            None => Err(Error::document_not_found(doc.path.clone())),
        }
    }

    fn write_text(&self, doc: &Document, text: &str) -> Result<()> {
        io::write_file_atomic(&self.full_path(&doc.path), text, &format!("write {}", doc.path))
    }

    fn metadata(&self, path: &str) -> Option<DocumentMetadata> {
        let content = io::read_optional(&self.full_path(path), "read metadata").ok()??;
        Some(parse_metadata(&content))
    }

    fn process_frontmatter(
        &self,
        doc: &Document,
        mutator: &mut dyn FnMut(&mut Mapping),
    ) -> Result<()> {
        let content = self.read_text(doc)?;
        let sections = frontmatter::split(&content);

        let original = match sections.yaml {
            Some(yaml) => frontmatter::parse(yaml)
                .map_err(|e| Error::frontmatter_invalid(doc.path.clone(), e))?,
            None => Mapping::new(),
        };

        let mut updated = original.clone();
        mutator(&mut updated);
        if updated == original {
            return Ok(());
        }

        let rendered = frontmatter::render(&updated, sections.body)?;
        self.write_text(doc, &rendered)
            .map_err(|e| Error::frontmatter_write_failed(doc.path.clone(), e.to_string()))?;

        log_status!("corpus", "Updated front-matter of {}", doc.path);
        Ok(())
    }
}
