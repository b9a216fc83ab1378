use serde::Serialize;

use super::{canonical_name, to_tag, MARKER, SEPARATOR};

/// One tag name in display and canonical form.
///
/// Built fresh for every rename request and every tag seen while scanning;
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TagDescriptor {
    /// Display form with a single marker, e.g. `#Projects/Archive`.
    tag: String,
    /// Marker-less lowercase path, e.g. `projects/archive`.
    canonical_name: String,
    /// Marker plus canonical name, e.g. `#projects/archive`.
    canonical: String,
    #[serde(skip)]
    canonical_prefix: String,
}

impl TagDescriptor {
    pub fn new(raw: &str) -> Self {
        let tag = to_tag(raw);
        let canonical_name = canonical_name(&tag);
        let canonical = format!("{}{}", MARKER, canonical_name);
        let canonical_prefix = format!("{}{}", canonical, SEPARATOR);

        Self {
            tag,
            canonical_name,
            canonical,
            canonical_prefix,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Display form without the marker.
    pub fn name(&self) -> &str {
        &self.tag[MARKER.len_utf8()..]
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// `canonical` followed by the separator; descendants start with this.
    pub fn canonical_prefix(&self) -> &str {
        &self.canonical_prefix
    }

    pub fn is_empty(&self) -> bool {
        self.canonical_name.is_empty()
    }

    /// Whether `text` names this tag or one of its descendants, ignoring case
    /// and an optional leading marker.
    pub fn matches(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let candidate = canonical_name(text);
        match candidate.strip_prefix(self.canonical_name.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }

    /// Same canonical identity, regardless of display case.
    pub fn same_tag(&self, other: &TagDescriptor) -> bool {
        self.canonical == other.canonical
    }
}

impl std::fmt::Display for TagDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_all_forms() {
        let d = TagDescriptor::new("Projects/Archive/");
        assert_eq!(d.tag(), "#Projects/Archive");
        assert_eq!(d.name(), "Projects/Archive");
        assert_eq!(d.canonical_name(), "projects/archive");
        assert_eq!(d.canonical(), "#projects/archive");
        assert_eq!(d.canonical_prefix(), "#projects/archive/");
    }

    #[test]
    fn repeated_markers_collapse() {
        let d = TagDescriptor::new("###Inbox");
        assert_eq!(d.tag(), "#Inbox");
        assert!(!d.canonical_name().contains('#'));
    }

    #[test]
    fn canonical_form_is_idempotent() {
        for raw in ["Projects", "#Projects/Client", "##a/B/c/", "  spaced  ", "", "#"] {
            let once = TagDescriptor::new(raw);
            let twice = TagDescriptor::new(once.canonical());
            assert_eq!(once.canonical(), twice.canonical(), "raw input {:?}", raw);
        }
    }

    #[test]
    fn matches_self_and_descendants_only() {
        let d = TagDescriptor::new("Projects");
        assert!(d.matches("projects"));
        assert!(d.matches("Projects/Archive"));
        assert!(d.matches("#projects/archive"));
        assert!(!d.matches("ProjectsArchive"));
        assert!(!d.matches("#areas/projects"));
    }

    #[test]
    fn blank_text_never_matches() {
        let d = TagDescriptor::new("Projects");
        assert!(!d.matches(""));
        assert!(!d.matches("   "));
    }

    #[test]
    fn empty_input_yields_bare_marker() {
        let d = TagDescriptor::new("   ");
        assert_eq!(d.tag(), "#");
        assert!(d.is_empty());
    }

    #[test]
    fn same_tag_ignores_case() {
        assert!(TagDescriptor::new("Projects").same_tag(&TagDescriptor::new("#projects")));
        assert!(!TagDescriptor::new("Projects").same_tag(&TagDescriptor::new("#projects/x")));
    }
}
