//! # Code Canvas Scanner
//!
//! Static analysis of one TypeScript/JavaScript source file into a `ScanReport`:
//! the UI components it defines, which of them it exports, the components each
//! one renders, and the annotations developers left in documentation comments.
//!
//! ## Scan Invariants
//!
//! 1. **Single Pass**: a scan walks the program exactly once. Every detector is
//!    invoked at every node and writes into the same report through
//!    `ScanContext`. Post-passes (export aliases, sequence keys) run after the walk.
//!
//! 2. **Stable Identities**: every record is keyed by `<path>:<symbolName>`.
//!    Byte-identical input yields byte-identical identities. A node the resolver
//!    cannot name is a fatal error (CC-ERR-IDENTITY-001), never a guess.
//!
//! 3. **Definitions Win**: a defined component replaces a referenced-only record
//!    for the same identity; a reference never replaces a definition.
//!
//! 4. **Best Effort Detection**: a node no detector recognizes produces nothing.
//!    Only identity resolution and structural shape checks fail a scan.
//!
//! 5. **Line-Safe Back-Patching**: `write_cross_reference` rewrites one line and
//!    preserves every other byte of the file.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod annotation;
pub mod cache;
pub mod component;
pub mod config;
pub mod detector;
pub mod error;
pub mod identity;
pub mod jsdoc;
pub mod location;
pub mod matcher;
pub mod patch;
pub mod repo;
pub mod report;
pub mod scan;
pub mod session;
pub mod template;
pub mod visitor;

#[cfg(test)]
mod component_tests;

pub use annotation::{assign_sequence_keys, AnnotationDetector};
pub use cache::ScanCache;
pub use component::{
    ClassComponentDetector, ExportAliasDetector, FunctionComponentDetector, LazyComponentDetector,
};
pub use config::ScanConfig;
pub use detector::{default_detectors, Detector, ScanContext};
pub use error::ScanError;
pub use location::{LineIndex, SourceLocation};
pub use matcher::{PatternMatcher, PrintedNameMatcher};
pub use patch::{write_cross_reference, CrossReferenceUpdate, PatchOutcome};
pub use repo::RepoMetadata;
pub use report::{
    AnnotationRecord, ComponentRecord, CrossReference, DefinedComponent, IndexEntry, NodeIdentity,
    ReferencedComponent, ScanReport, SymbolDescriptor,
};
pub use scan::{scan_file, scan_file_cached, scan_files, scan_source};
pub use session::CompilationSession;
pub use template::find_jsx;
pub use visitor::{walk, DebugSink, NodeVisit};

#[cfg(feature = "napi")]
pub use patch::write_cross_reference_native;
#[cfg(feature = "napi")]
pub use scan::{scan_file_native, scan_source_native};

#[cfg(feature = "napi")]
#[napi]
pub fn scanner_bridge() -> String {
    format!("codecanvas-native {}", env!("CARGO_PKG_VERSION"))
}
