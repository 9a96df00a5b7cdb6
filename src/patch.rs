//! Source Back-Patcher
//!
//! Embeds a confirmed permalink into the cross-reference tag of an annotation
//! by rewriting exactly one line of the original file. This is a line-oriented
//! text substitution, not a tree rewrite: every byte outside the patched line,
//! including each line's own `\n` or `\r\n` ending, is written back unchanged.

#[cfg(feature = "napi")]
use napi_derive::napi;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::location::SourceLocation;

/// A `{sourceLocation, permalink}` pair returned by the canvas collaborator
/// once it has created or relocated the artifact for an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReferenceUpdate {
    /// `<path>#L<start>[-<end>]`; only the start line is rewritten.
    pub source_location: String,
    pub permalink: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchOutcome {
    /// The line was rewritten and the file saved.
    Patched,
    /// The line already carries this permalink; the file was not touched.
    Unchanged,
    /// The line has no cross-reference tag; the file was not touched.
    TagNotFound,
}

fn tag_pattern(tag: &str) -> Result<Regex, ScanError> {
    // The optional argument never starts with `*`, so a closing `*/` on the
    // same line is left alone.
    Regex::new(&format!(r"@{}\b(?:[ \t]+[^\s*]\S*)?", regex::escape(tag))).map_err(|_| {
        ScanError::UnexpectedShape {
            kind: "cross-reference tag".to_string(),
            text: tag.to_string(),
            expected: "a tag name usable in a pattern",
        }
    })
}

/// Rewrites the first cross-reference tag on `line` to carry `permalink`.
///
/// `line` excludes its line ending. Returns `None` when the tag is absent.
pub fn patch_line(line: &str, tag: &str, permalink: &str) -> Result<Option<String>, ScanError> {
    let pattern = tag_pattern(tag)?;
    if !pattern.is_match(line) {
        return Ok(None);
    }
    let replacement = format!("@{} {}", tag, permalink);
    Ok(Some(pattern.replacen(line, 1, NoExpand(&replacement)).into_owned()))
}

/// Splits a newline-terminated segment into its text and its ending.
fn split_ending(segment: &str) -> (&str, &str) {
    let text = segment.strip_suffix('\n').unwrap_or(segment);
    let text = text.strip_suffix('\r').unwrap_or(text);
    segment.split_at(text.len())
}

pub fn write_cross_reference(
    config: &ScanConfig,
    update: &CrossReferenceUpdate,
) -> Result<PatchOutcome, ScanError> {
    let location: SourceLocation = update.source_location.parse()?;
    let path = config.resolve_path(&location.path);

    let metadata = fs::metadata(&path).map_err(|e| ScanError::io(&path, e))?;
    if !metadata.is_file() {
        return Err(ScanError::NotAFile(path));
    }
    let content = fs::read_to_string(&path).map_err(|e| ScanError::io(&path, e))?;

    let segments: Vec<&str> = content.split_inclusive('\n').collect();
    let index = location.start_line as usize - 1;
    let Some(segment) = segments.get(index) else {
        return Err(ScanError::LineOutOfRange {
            path,
            line: location.start_line,
            line_count: segments.len() as u32,
        });
    };

    let (text, ending) = split_ending(segment);
    let Some(patched) = patch_line(text, &config.cross_reference_tag, &update.permalink)? else {
        tracing::debug!(location = %location, "no cross-reference tag on line");
        return Ok(PatchOutcome::TagNotFound);
    };
    if patched == text {
        return Ok(PatchOutcome::Unchanged);
    }

    let mut output = String::with_capacity(content.len() + update.permalink.len());
    for before in &segments[..index] {
        output.push_str(before);
    }
    output.push_str(&patched);
    output.push_str(ending);
    for after in &segments[index + 1..] {
        output.push_str(after);
    }

    fs::write(&path, output).map_err(|e| ScanError::io(&path, e))?;
    tracing::info!(location = %location, permalink = %update.permalink, "cross-reference written");
    Ok(PatchOutcome::Patched)
}

#[cfg(feature = "napi")]
#[napi]
pub fn write_cross_reference_native(
    options: Option<serde_json::Value>,
    update: serde_json::Value,
) -> napi::Result<serde_json::Value> {
    let config: ScanConfig = match options {
        Some(options) => serde_json::from_value(options).map_err(ScanError::from)?,
        None => ScanConfig::default(),
    };
    let update: CrossReferenceUpdate = serde_json::from_value(update).map_err(ScanError::from)?;
    let outcome = write_cross_reference(&config, &update)?;
    serde_json::to_value(outcome).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn fixture(content: &str) -> (TempDir, ScanConfig) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/App.tsx"), content).unwrap();
        let config = ScanConfig::with_root(dir.path());
        (dir, config)
    }

    fn update(location: &str, permalink: &str) -> CrossReferenceUpdate {
        CrossReferenceUpdate {
            source_location: location.to_string(),
            permalink: permalink.to_string(),
        }
    }

    fn read(dir: &Path) -> String {
        fs::read_to_string(dir.join("src/App.tsx")).unwrap()
    }

    #[test]
    fn test_patch_line_variants() {
        let url = "https://canvas.example/n/7";
        assert_eq!(
            patch_line(" * @canvas", "canvas", url).unwrap().as_deref(),
            Some(" * @canvas https://canvas.example/n/7")
        );
        assert_eq!(
            patch_line(" * @canvas https://old.example/1", "canvas", url)
                .unwrap()
                .as_deref(),
            Some(" * @canvas https://canvas.example/n/7")
        );
        assert_eq!(
            patch_line("/** Note @canvas */", "canvas", url).unwrap().as_deref(),
            Some("/** Note @canvas https://canvas.example/n/7 */")
        );
        assert_eq!(patch_line(" * @canvasser", "canvas", url).unwrap(), None);
        assert_eq!(patch_line(" * nothing", "canvas", url).unwrap(), None);
    }

    #[test]
    fn test_permalink_with_dollar_is_literal() {
        let patched = patch_line(" * @canvas", "canvas", "https://x.example/$1").unwrap();
        assert_eq!(patched.as_deref(), Some(" * @canvas https://x.example/$1"));
    }

    #[test]
    fn test_only_target_line_changes() {
        let original = "/**\n * Header\n * @canvas\n */\nexport function App() {}\n";
        let (dir, config) = fixture(original);

        let outcome =
            write_cross_reference(&config, &update("src/App.tsx#L3-4", "https://c.example/1"))
                .unwrap();
        assert_eq!(outcome, PatchOutcome::Patched);
        assert_eq!(
            read(dir.path()),
            "/**\n * Header\n * @canvas https://c.example/1\n */\nexport function App() {}\n"
        );
    }

    #[test]
    fn test_idempotent_second_write() {
        let (dir, config) = fixture("/** Note\n * @canvas\n */\nconst a = 1;\n");
        let request = update("src/App.tsx#L2", "https://c.example/2");

        assert_eq!(write_cross_reference(&config, &request).unwrap(), PatchOutcome::Patched);
        let once = read(dir.path());
        assert_eq!(write_cross_reference(&config, &request).unwrap(), PatchOutcome::Unchanged);
        assert_eq!(read(dir.path()), once);
    }

    #[test]
    fn test_crlf_endings_preserved() {
        let (dir, config) = fixture("/** Note\r\n * @canvas\r\n */\r\nconst a = 1;");
        write_cross_reference(&config, &update("src/App.tsx#L2", "https://c.example/3")).unwrap();
        assert_eq!(
            read(dir.path()),
            "/** Note\r\n * @canvas https://c.example/3\r\n */\r\nconst a = 1;"
        );
    }

    #[test]
    fn test_missing_tag_leaves_file_alone() {
        let original = "const a = 1;\n";
        let (dir, config) = fixture(original);
        let outcome =
            write_cross_reference(&config, &update("src/App.tsx#L1", "https://c.example/4")).unwrap();
        assert_eq!(outcome, PatchOutcome::TagNotFound);
        assert_eq!(read(dir.path()), original);
    }

    #[test]
    fn test_fatal_errors() {
        let (dir, config) = fixture("const a = 1;\n");

        let err = write_cross_reference(&config, &update("src/App.tsx", "u")).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_MALFORMED_LOCATION);

        let err = write_cross_reference(&config, &update("src/App.tsx#Lx", "u")).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_INVALID_LINE);

        let err = write_cross_reference(&config, &update("src#L1", "u")).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_NOT_A_FILE);

        let err = write_cross_reference(&config, &update("src/App.tsx#L9", "u")).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_LINE_OUT_OF_RANGE);

        assert_eq!(read(dir.path()), "const a = 1;\n");
    }
}
