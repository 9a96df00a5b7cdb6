//! Documentation comment parsing.
//!
//! Splits a `/** ... */` block into its free-text description and its block
//! tags. Every tag keeps the byte span of its own lines so annotations can be
//! anchored to the exact line a marker sits on.

use oxc_span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Tag name without the `@`, as written.
    pub name: String,
    /// Text following the tag name, continuation lines joined with `\n`.
    pub text: String,
    /// From the `@` to the end of the tag's last line.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    /// Whole comment including the `/**` and `*/` delimiters.
    pub span: Span,
    pub description: String,
    pub tags: Vec<DocTag>,
}

/// Normalizes a comment span to cover `/** ... */`, or `None` for anything
/// that is not a documentation comment.
pub fn doc_comment_span(source: &str, span: Span) -> Option<Span> {
    let (start, end) = (span.start as usize, span.end as usize);
    let text = source.get(start..end)?;

    if text.starts_with("/**") && text.ends_with("*/") && text.len() >= 5 && !text.starts_with("/**/") {
        return Some(span);
    }

    // Content-only spans exclude the delimiters.
    let opens = start >= 2 && source.get(start - 2..start) == Some("/*");
    let closes = source.get(end..end + 2) == Some("*/");
    if opens && closes && text.starts_with('*') && !text.starts_with("*/") {
        return Some(Span::new(span.start - 2, span.end + 2));
    }

    None
}

/// Parses the documentation comment occupying `span` (delimiters included).
pub fn parse_doc_comment(source: &str, span: Span) -> DocComment {
    let inner_start = span.start as usize + 3;
    let inner_end = (span.end as usize).saturating_sub(2).max(inner_start);
    let inner = &source[inner_start..inner_end];

    let mut description = String::new();
    let mut tags: Vec<DocTag> = Vec::new();
    let mut offset = inner_start;

    for raw_line in inner.split_inclusive('\n') {
        let line_start = offset;
        offset += raw_line.len();

        let line = raw_line.trim_end_matches(['\n', '\r']);
        let (content, content_offset) = strip_margin(line);
        let content_start = line_start + content_offset;
        let content_end = content_start + content.trim_end().len();

        if let Some((name, rest)) = split_tag(content) {
            tags.push(DocTag {
                name: name.to_string(),
                text: rest.trim().to_string(),
                span: Span::new(content_start as u32, content_end as u32),
            });
            continue;
        }

        match tags.last_mut() {
            Some(tag) => {
                if !content.trim().is_empty() {
                    push_line(&mut tag.text, content.trim());
                    tag.span = Span::new(tag.span.start, content_end as u32);
                }
            }
            None => push_line(&mut description, content.trim()),
        }
    }

    DocComment {
        span,
        description: description.trim().to_string(),
        tags,
    }
}

/// Drops leading whitespace, one `*` gutter and a single following space.
fn strip_margin(line: &str) -> (&str, usize) {
    let trimmed = line.trim_start();
    let mut consumed = line.len() - trimmed.len();
    let mut content = trimmed;

    if let Some(rest) = content.strip_prefix('*') {
        consumed += 1;
        content = rest;
        if let Some(rest) = content.strip_prefix(' ') {
            consumed += 1;
            content = rest;
        }
    }

    // Tags may be indented past the gutter.
    let leading = content.len() - content.trim_start().len();
    if content.trim_start().starts_with('@') {
        consumed += leading;
        content = content.trim_start();
    }

    (content, consumed)
}

fn split_tag(content: &str) -> Option<(&str, &str)> {
    let body = content.strip_prefix('@')?;
    let name_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    Some((&body[..name_len], &body[name_len..]))
}

fn push_line(buffer: &mut String, line: &str) {
    if !buffer.is_empty() {
        buffer.push('\n');
    }
    buffer.push_str(line);
}
