//! Detector Framework
//!
//! Every detector sees every node of one shared pre-order walk over the
//! program and writes into the same `ScanReport`. Detectors never start their
//! own top-level traversal; nested walks over a subtree (a function body, a
//! class member) go through `visitor::walk` as well.

use std::collections::HashSet;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::matcher::PrintedNameMatcher;
use crate::report::{NodeIdentity, ScanReport};
use crate::session::CompilationSession;
use crate::visitor::{DebugSink, NodeVisit};

use crate::annotation::AnnotationDetector;
use crate::component::{
    ClassComponentDetector, ExportAliasDetector, FunctionComponentDetector, LazyComponentDetector,
};

/// Shared state of one scan, handed to each detector at each node.
pub struct ScanContext<'s, 'a> {
    pub session: &'s CompilationSession<'a>,
    pub config: &'s ScanConfig,
    pub report: &'s mut ScanReport,
    /// Attachment offsets whose doc comments already produced annotations.
    pub(crate) claimed_docs: HashSet<u32>,
    /// `(local identity, exported name)` pairs from `export { A as B }` and
    /// `export default A`, applied once the walk is over.
    pub(crate) export_aliases: Vec<(NodeIdentity, String)>,
}

impl<'s, 'a> ScanContext<'s, 'a> {
    pub fn new(
        session: &'s CompilationSession<'a>,
        config: &'s ScanConfig,
        report: &'s mut ScanReport,
    ) -> Self {
        Self {
            session,
            config,
            report,
            claimed_docs: HashSet::new(),
            export_aliases: Vec::new(),
        }
    }

    /// Applies the export aliases collected during the walk.
    ///
    /// A definition that was already exported under its declared name keeps
    /// that name; only the `exports` list grows.
    pub fn finish(self, sink: &mut DebugSink<'_>) {
        for (identity, exported_as) in self.export_aliases {
            let Some(component) = self.report.defined_mut(&identity) else {
                sink.log(format!("export alias {} -> {}: not a component", identity, exported_as));
                continue;
            };
            if component.exported_as.is_none() {
                component.exported_as = Some(exported_as.clone());
            }
            self.report.mark_exported(&identity);
            sink.log(format!("export alias {} -> {}", identity, exported_as));
        }
    }
}

pub trait Detector {
    fn name(&self) -> &'static str;

    /// Called once per node of the shared walk, in document order.
    fn visit<'a>(
        &self,
        cx: &mut ScanContext<'_, 'a>,
        visit: &NodeVisit<'a, '_>,
        sink: &mut DebugSink<'_>,
    ) -> Result<(), ScanError>;
}

/// The standard detector set, in the order they run at each node.
pub fn default_detectors(config: &ScanConfig) -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(FunctionComponentDetector),
        Box::new(ClassComponentDetector::new(Box::new(PrintedNameMatcher::new(
            config.component_base_classes.iter().cloned(),
        )))),
        Box::new(LazyComponentDetector::new(Box::new(PrintedNameMatcher::new(
            config.lazy_load_callees.iter().cloned(),
        )))),
        Box::new(ExportAliasDetector),
        Box::new(AnnotationDetector),
    ]
}
