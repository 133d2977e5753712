//! Conversion configuration surface.

use crate::schema::DraftVersion;

/// Knobs the conversion core consumes. Everything else (front-end choice,
/// output formatting) lives with the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Which draft the emitted document targets; decides `$id` vs `id`
    /// and `$defs` vs `definitions` placement.
    pub schema_version: DraftVersion,

    /// Ordered list of tag namespaces tried for property naming. The
    /// first namespace present on a field wins; its first comma-split
    /// segment is the property name.
    pub field_name_tag: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: DraftVersion::default(),
            field_name_tag: vec!["json".to_string()],
        }
    }
}

impl Config {
    pub fn with_draft(mut self, draft: DraftVersion) -> Self {
        self.schema_version = draft;
        self
    }
}
