use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::location::SourceLocation;
use crate::repo::RepoMetadata;

/// Stable key for a declaration: `<path>:<symbolName>`, or a synthesized
/// `<classIdentity>.<member>()` for render helpers.
pub type NodeIdentity = String;

/// Definition location recorded when a referenced tag's symbol cannot be resolved.
pub const UNRESOLVED_LOCATION: &str = "?";

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT GRAPH
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDescriptor {
    pub path: String,
    pub source_location: SourceLocation,
    pub name: String,
    pub documentation: String,
    pub type_signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinedComponent {
    pub name: String,
    pub source_location: SourceLocation,
    pub exported_as: Option<String>,
    pub referenced_components: Vec<NodeIdentity>,
    pub meta: SymbolDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedComponent {
    pub name: String,
    /// A location string, a module specifier for deferred imports, or `?`.
    pub definition_location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComponentRecord {
    Defined(DefinedComponent),
    Referenced(ReferencedComponent),
}

impl ComponentRecord {
    pub fn name(&self) -> &str {
        match self {
            ComponentRecord::Defined(c) => &c.name,
            ComponentRecord::Referenced(c) => &c.name,
        }
    }

    pub fn as_defined(&self) -> Option<&DefinedComponent> {
        match self {
            ComponentRecord::Defined(c) => Some(c),
            ComponentRecord::Referenced(_) => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOTATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReference {
    pub text: String,
    pub source_location: SourceLocation,
    pub parent_node_identity: NodeIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub source_location: SourceLocation,
    pub text: String,
    pub parent_node_identity: NodeIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_key: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_reference: Option<CrossReference>,
}

impl AnnotationRecord {
    pub fn is_pending_work(&self) -> bool {
        self.cross_reference.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCAN REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything one scan learned about one file.
///
/// Created empty at scan start, mutated in place by the detectors during the
/// single traversal pass, and returned by value once the post-passes ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub path: String,
    pub exports: Vec<NodeIdentity>,
    pub components: BTreeMap<NodeIdentity, ComponentRecord>,
    pub annotations: Vec<AnnotationRecord>,
    pub debug_log: Vec<String>,
    #[serde(flatten)]
    pub repo: RepoMetadata,
}

/// One `(filename, item name, location)` row for the markdown index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub filename: String,
    pub item_name: String,
    pub source_location: SourceLocation,
}

impl ScanReport {
    pub fn new(path: impl Into<String>, repo: RepoMetadata) -> Self {
        Self {
            path: path.into(),
            repo,
            ..Self::default()
        }
    }

    /// Records a full definition. Replaces a referenced-only record for the
    /// same identity; an earlier definition wins over a later one.
    pub fn define(&mut self, identity: NodeIdentity, component: DefinedComponent) -> bool {
        match self.components.get(&identity) {
            Some(ComponentRecord::Defined(_)) => false,
            _ => {
                self.components
                    .insert(identity, ComponentRecord::Defined(component));
                true
            }
        }
    }

    /// Records a referenced-only component unless the identity is already known.
    pub fn reference(&mut self, identity: NodeIdentity, component: ReferencedComponent) -> bool {
        if self.components.contains_key(&identity) {
            return false;
        }
        self.components
            .insert(identity, ComponentRecord::Referenced(component));
        true
    }

    pub fn mark_exported(&mut self, identity: &str) {
        if !self.exports.iter().any(|existing| existing == identity) {
            self.exports.push(identity.to_string());
        }
    }

    pub fn defined(&self, identity: &str) -> Option<&DefinedComponent> {
        self.components.get(identity).and_then(ComponentRecord::as_defined)
    }

    pub fn defined_mut(&mut self, identity: &str) -> Option<&mut DefinedComponent> {
        match self.components.get_mut(identity) {
            Some(ComponentRecord::Defined(c)) => Some(c),
            _ => None,
        }
    }

    pub fn index_entries(&self) -> Vec<IndexEntry> {
        let filename = self.path.rsplit('/').next().unwrap_or(&self.path).to_string();

        let components = self.components.values().filter_map(|record| {
            record.as_defined().map(|c| IndexEntry {
                filename: filename.clone(),
                item_name: c.name.clone(),
                source_location: c.source_location.clone(),
            })
        });

        let annotations = self.annotations.iter().map(|annotation| IndexEntry {
            filename: filename.clone(),
            item_name: annotation.text.lines().next().unwrap_or_default().to_string(),
            source_location: annotation.source_location.clone(),
        });

        components.chain(annotations).collect()
    }
}
