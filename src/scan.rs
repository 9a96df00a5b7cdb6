//! Scan entry points.
//!
//! One scan is one compilation session, one walk over its program with every
//! detector invoked at each node, and the post-passes over the report. The walk
//! is single-threaded; separate files share nothing and may be scanned in
//! parallel (`scan_files`).

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use rayon::prelude::*;
use std::fs;

use crate::annotation::assign_sequence_keys;
use crate::cache::ScanCache;
use crate::config::ScanConfig;
use crate::detector::{default_detectors, ScanContext};
use crate::error::ScanError;
use crate::repo::RepoMetadata;
use crate::report::ScanReport;
use crate::session::CompilationSession;
use crate::visitor::{walk, DebugSink};

/// Scans in-memory `source` as the file at `path` (relative to the repository root).
pub fn scan_source(
    config: &ScanConfig,
    path: &str,
    source: &str,
    repo: RepoMetadata,
) -> Result<ScanReport, ScanError> {
    let _span = tracing::debug_span!("scan", path).entered();

    let allocator = Allocator::default();
    let session = CompilationSession::new(&allocator, path, source)?;
    let detectors = default_detectors(config);

    let mut report = ScanReport::new(path, repo);
    let mut debug_log = Vec::new();
    {
        let mut sink = DebugSink::new(&mut debug_log);
        let mut cx = ScanContext::new(&session, config, &mut report);

        walk(session.program(), &mut sink, |visit, sink| {
            for detector in &detectors {
                detector.visit(&mut cx, visit, sink).map_err(|error| {
                    tracing::debug!(detector = detector.name(), %error, "detector failed");
                    error
                })?;
            }
            Ok(None::<()>)
        })?;

        cx.finish(&mut sink);
    }

    assign_sequence_keys(&mut report.annotations);
    report.debug_log = debug_log;

    tracing::debug!(
        components = report.components.len(),
        exports = report.exports.len(),
        annotations = report.annotations.len(),
        "scan complete"
    );
    Ok(report)
}

/// Repository metadata for reports, or placeholders when resolution is off.
pub fn repo_metadata(config: &ScanConfig) -> RepoMetadata {
    if config.resolve_repository {
        RepoMetadata::resolve(&config.repository_root)
    } else {
        RepoMetadata::placeholder()
    }
}

/// Report path for a relative file path: forward slashes, no leading `./`.
fn report_path(relative: &str) -> String {
    let normalized = relative.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .map(str::to_string)
        .unwrap_or(normalized)
}

fn read_source(config: &ScanConfig, relative: &str) -> Result<String, ScanError> {
    let absolute = config.resolve_path(relative);
    fs::read_to_string(&absolute).map_err(|e| ScanError::io(&absolute, e))
}

/// Reads and scans the file at `relative` under the repository root.
pub fn scan_file(config: &ScanConfig, relative: &str) -> Result<ScanReport, ScanError> {
    let source = read_source(config, relative)?;
    scan_source(config, &report_path(relative), &source, repo_metadata(config))
}

/// Like `scan_file`, answering from `cache` when neither the source nor the
/// detection options changed. Repository metadata is always current.
pub fn scan_file_cached(
    config: &ScanConfig,
    cache: &ScanCache,
    relative: &str,
) -> Result<ScanReport, ScanError> {
    let path = report_path(relative);
    let source = read_source(config, relative)?;
    let repo = repo_metadata(config);
    if let Some(mut report) = cache.get(&path, config, &source) {
        tracing::debug!(path, "cache hit");
        report.repo = repo;
        return Ok(report);
    }
    let report = scan_source(config, &path, &source, repo)?;
    cache.set(&path, config, &source, &report);
    Ok(report)
}

/// Scans several files in parallel. Results keep the order of `paths`;
/// one file failing does not affect the others.
pub fn scan_files(config: &ScanConfig, paths: &[String]) -> Vec<Result<ScanReport, ScanError>> {
    let repo = repo_metadata(config);
    paths
        .par_iter()
        .map(|relative| {
            let source = read_source(config, relative)?;
            scan_source(config, &report_path(relative), &source, repo.clone())
        })
        .collect()
}

#[cfg(feature = "napi")]
fn options_from(options: Option<serde_json::Value>) -> Result<ScanConfig, ScanError> {
    match options {
        Some(options) => Ok(serde_json::from_value(options)?),
        None => Ok(ScanConfig::default()),
    }
}

#[cfg(feature = "napi")]
#[napi]
pub fn scan_file_native(
    options: Option<serde_json::Value>,
    path: String,
) -> napi::Result<serde_json::Value> {
    let config = options_from(options)?;
    let report = scan_file(&config, &path)?;
    serde_json::to_value(report).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn scan_source_native(
    options: Option<serde_json::Value>,
    path: String,
    source: String,
) -> napi::Result<serde_json::Value> {
    let config = options_from(options)?;
    let report = scan_source(&config, &report_path(&path), &source, repo_metadata(&config))?;
    serde_json::to_value(report).map_err(|e| napi::Error::from_reason(e.to_string()))
}
