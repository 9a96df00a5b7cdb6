use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// Options shared by every scan and back-patch.
///
/// Deserialized from camelCase JSON; omitted fields fall back to the defaults
/// below, so `{}` is a valid options object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanConfig {
    /// Directory that every relative path in a scan or location string is resolved against.
    pub repository_root: PathBuf,
    /// Documentation tag linking a declaration to a canvas artifact (`@canvas <permalink>`).
    pub cross_reference_tag: String,
    /// Marker words for pending-work tags, compared case-insensitively.
    pub pending_work_tags: Vec<String>,
    /// Printed base-class expressions that make a class a component.
    pub component_base_classes: Vec<String>,
    /// Printed callees that wrap a dynamic import into a deferred component.
    pub lazy_load_callees: Vec<String>,
    /// Spawn git for revision and remote metadata. Placeholders are used when off.
    pub resolve_repository: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            repository_root: PathBuf::from("."),
            cross_reference_tag: "canvas".to_string(),
            pending_work_tags: vec!["todo".to_string(), "fixme".to_string()],
            component_base_classes: vec![
                "React.Component".to_string(),
                "Component".to_string(),
                "React.PureComponent".to_string(),
                "PureComponent".to_string(),
            ],
            lazy_load_callees: vec!["React.lazy".to_string(), "lazy".to_string()],
            resolve_repository: true,
        }
    }
}

impl ScanConfig {
    pub fn from_json(json: &str) -> Result<Self, ScanError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            repository_root: root.into(),
            ..Self::default()
        }
    }

    pub fn resolve_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.repository_root.join(relative)
    }

    pub fn is_pending_work_tag(&self, tag: &str) -> bool {
        self.pending_work_tags
            .iter()
            .any(|marker| marker.eq_ignore_ascii_case(tag))
    }

    pub fn is_cross_reference_tag(&self, tag: &str) -> bool {
        self.cross_reference_tag == tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_use_defaults() {
        let config = ScanConfig::from_json("{}").unwrap();
        assert_eq!(config.cross_reference_tag, "canvas");
        assert!(config.resolve_repository);
        assert!(config.lazy_load_callees.contains(&"React.lazy".to_string()));
    }

    #[test]
    fn test_partial_options_override() {
        let config = ScanConfig::from_json(
            r#"{ "repositoryRoot": "/repo", "pendingWorkTags": ["hack"], "resolveRepository": false }"#,
        )
        .unwrap();
        assert_eq!(config.repository_root, PathBuf::from("/repo"));
        assert!(config.is_pending_work_tag("HACK"));
        assert!(!config.is_pending_work_tag("todo"));
        assert!(!config.resolve_repository);
        assert_eq!(config.resolve_path("src/App.tsx"), PathBuf::from("/repo/src/App.tsx"));
    }

    #[test]
    fn test_invalid_options_are_config_errors() {
        let err = ScanConfig::from_json(r#"{ "pendingWorkTags": "todo" }"#).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_CONFIG);
    }
}
