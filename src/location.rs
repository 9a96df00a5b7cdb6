//! Source location strings: `<relativePath>#L<start>` or `<relativePath>#L<start>-<end>`.
//!
//! Every collaborator that correlates a canvas element with code parses this
//! grammar, so both the printer and the parser here must stay in lockstep.
//! Lines are 1-indexed and the range is inclusive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScanError;
use oxc_span::Span;

const LINE_MARKER: &str = "#L";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SourceLocation {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl SourceLocation {
    pub fn new(path: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            path: path.into(),
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    pub fn line(path: impl Into<String>, line: u32) -> Self {
        Self::new(path, line, line)
    }

    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(f, "{}{}{}", self.path, LINE_MARKER, self.start_line)
        } else {
            write!(
                f,
                "{}{}{}-{}",
                self.path, LINE_MARKER, self.start_line, self.end_line
            )
        }
    }
}

impl FromStr for SourceLocation {
    type Err = ScanError;

    fn from_str(location: &str) -> Result<Self, Self::Err> {
        let (path, lines) = location
            .rsplit_once(LINE_MARKER)
            .filter(|(path, lines)| !path.is_empty() && !lines.is_empty())
            .ok_or_else(|| ScanError::MalformedLocation(location.to_string()))?;

        let parse_line = |raw: &str| -> Result<u32, ScanError> {
            match raw.parse::<u32>() {
                Ok(line) if line > 0 => Ok(line),
                _ => Err(ScanError::InvalidLine {
                    location: location.to_string(),
                    line: raw.to_string(),
                }),
            }
        };

        let (start, end) = match lines.split_once('-') {
            Some((start, end)) => (parse_line(start)?, parse_line(end)?),
            None => {
                let start = parse_line(lines)?;
                (start, start)
            }
        };

        Ok(SourceLocation::new(path, start, end))
    }
}

impl From<SourceLocation> for String {
    fn from(location: SourceLocation) -> Self {
        location.to_string()
    }
}

impl TryFrom<String> for SourceLocation {
    type Error = ScanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Byte offset to line number lookup for one source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(offset, _)| offset as u32 + 1),
        );
        Self { line_starts }
    }

    /// 1-indexed line containing `offset`.
    pub fn line_of(&self, offset: u32) -> u32 {
        self.line_starts.partition_point(|start| *start <= offset) as u32
    }

    /// Inclusive line range covered by `span`.
    pub fn lines_of(&self, span: Span) -> (u32, u32) {
        let last = span.end.saturating_sub(1).max(span.start);
        (self.line_of(span.start), self.line_of(last))
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }
}
