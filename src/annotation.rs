//! Annotation extraction.
//!
//! Documentation comments attached to a declaration are scanned for two tag
//! kinds: the cross-reference tag (`@canvas [permalink]`), which turns the
//! comment body into a structural note linked to an external artifact, and the
//! pending-work markers (`@todo`, `@fixme`, case-insensitive).

use lazy_static::lazy_static;
use oxc_ast::ast::{BindingPattern, Declaration, ExportDefaultDeclarationKind};
use oxc_ast::AstKind;
use oxc_span::{GetSpan, Span};
use regex::Regex;
use std::collections::HashMap;

use crate::component::member_name;
use crate::detector::{Detector, ScanContext};
use crate::error::ScanError;
use crate::identity::{is_class_declaration, is_function_declaration};
use crate::jsdoc::DocComment;
use crate::report::{AnnotationRecord, CrossReference, NodeIdentity};
use crate::visitor::{DebugSink, NodeVisit};

lazy_static! {
    static ref PERMALINK: Regex = Regex::new(r"^https?://\S+$").unwrap();
}

/// URL carried as the first word of a cross-reference tag's text, if any.
pub fn parse_permalink(tag_text: &str) -> Option<String> {
    let first = tag_text.split_whitespace().next()?;
    PERMALINK.is_match(first).then(|| first.to_string())
}

/// What a documentation comment is attached to.
enum Target<'a> {
    /// A declaration the identity resolver handles directly.
    Declaration(AstKind<'a>),
    /// A class member, identified as `<classIdentity>.<member>()`.
    Member(String),
}

fn target_of(node: AstKind<'_>) -> Option<Target<'_>> {
    let declaration = match node {
        AstKind::Function(func) if is_function_declaration(func) => node,
        AstKind::Class(class) if is_class_declaration(class) => node,
        AstKind::VariableDeclaration(_)
        | AstKind::TSInterfaceDeclaration(_)
        | AstKind::TSTypeAliasDeclaration(_)
        | AstKind::TSEnumDeclaration(_) => node,
        // Comments above `export ...` attach to the `export` keyword.
        AstKind::ExportNamedDeclaration(export) => match export.declaration.as_ref()? {
            Declaration::FunctionDeclaration(func) => AstKind::Function(&**func),
            Declaration::ClassDeclaration(class) => AstKind::Class(&**class),
            Declaration::VariableDeclaration(decl) => AstKind::VariableDeclaration(&**decl),
            Declaration::TSInterfaceDeclaration(decl) => AstKind::TSInterfaceDeclaration(&**decl),
            Declaration::TSTypeAliasDeclaration(decl) => AstKind::TSTypeAliasDeclaration(&**decl),
            Declaration::TSEnumDeclaration(decl) => AstKind::TSEnumDeclaration(&**decl),
            _ => return None,
        },
        AstKind::ExportDefaultDeclaration(export) => match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) if func.id.is_some() => {
                AstKind::Function(&**func)
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) if class.id.is_some() => {
                AstKind::Class(&**class)
            }
            _ => return None,
        },
        AstKind::MethodDefinition(method) => return member_name(&method.key).map(Target::Member),
        AstKind::PropertyDefinition(prop) => return member_name(&prop.key).map(Target::Member),
        _ => return None,
    };
    Some(Target::Declaration(declaration))
}

/// Emits annotations for the documentation comments attached to each
/// declaration. Each comment is claimed once, by the outermost node starting
/// at its attachment offset.
pub struct AnnotationDetector;

impl AnnotationDetector {
    fn parent_identity<'a>(
        cx: &ScanContext<'_, 'a>,
        visit: &NodeVisit<'a, '_>,
        target: Target<'a>,
        sink: &mut DebugSink<'_>,
    ) -> Result<Option<NodeIdentity>, ScanError> {
        match target {
            Target::Declaration(node) => cx.session.identify(node).map(Some),
            Target::Member(member) => {
                let Some(owner) = Self::class_owner(visit.ancestors) else {
                    sink.log(format!("docs on member {} of an anonymous class", member));
                    return Ok(None);
                };
                let class_identity = cx.session.identify(owner)?;
                Ok(Some(format!("{}.{}()", class_identity, member)))
            }
        }
    }

    /// The node naming the class that encloses a member: the class itself
    /// when declared, or the `const X = class ...` binding of a class
    /// expression. Any other class expression has no stable name.
    fn class_owner<'a>(ancestors: &[AstKind<'a>]) -> Option<AstKind<'a>> {
        let index = ancestors
            .iter()
            .rposition(|ancestor| matches!(ancestor, AstKind::Class(_)))?;
        let AstKind::Class(class) = ancestors[index] else {
            return None;
        };
        if is_class_declaration(class) {
            return class.id.is_some().then_some(ancestors[index]);
        }
        match index.checked_sub(1).map(|parent| ancestors[parent]) {
            Some(declarator @ AstKind::VariableDeclarator(decl))
                if matches!(decl.id, BindingPattern::BindingIdentifier(_)) =>
            {
                Some(declarator)
            }
            _ => None,
        }
    }

    fn extract(
        cx: &mut ScanContext<'_, '_>,
        doc: &DocComment,
        parent: &NodeIdentity,
        sink: &mut DebugSink<'_>,
    ) {
        for tag in &doc.tags {
            if cx.config.is_cross_reference_tag(&tag.name) {
                if doc.description.is_empty() {
                    sink.log(format!("@{} without a comment body", tag.name));
                    continue;
                }
                // Starts at the tag so the location's first line is the one
                // a returned permalink is patched into.
                cx.report.annotations.push(AnnotationRecord {
                    source_location: cx.session.location(Span::new(tag.span.start, doc.span.end)),
                    text: doc.description.clone(),
                    parent_node_identity: parent.clone(),
                    sequence_key: None,
                    cross_reference: Some(CrossReference {
                        text: doc.description.clone(),
                        source_location: cx.session.location(tag.span),
                        parent_node_identity: parent.clone(),
                        permalink: parse_permalink(&tag.text),
                    }),
                });
                sink.log(format!("cross-reference on {}", parent));
            } else if cx.config.is_pending_work_tag(&tag.name) {
                let text = if tag.text.is_empty() {
                    doc.description.clone()
                } else {
                    tag.text.clone()
                };
                cx.report.annotations.push(AnnotationRecord {
                    source_location: cx.session.location(tag.span),
                    text,
                    parent_node_identity: parent.clone(),
                    sequence_key: None,
                    cross_reference: None,
                });
                sink.log(format!("@{} on {}", tag.name, parent));
            }
        }
    }
}

impl Detector for AnnotationDetector {
    fn name(&self) -> &'static str {
        "annotation"
    }

    fn visit<'a>(
        &self,
        cx: &mut ScanContext<'_, 'a>,
        visit: &NodeVisit<'a, '_>,
        sink: &mut DebugSink<'_>,
    ) -> Result<(), ScanError> {
        let session = cx.session;
        let anchor = visit.node.span().start;
        let docs = session.doc_comments_at(anchor);
        if docs.is_empty() || cx.claimed_docs.contains(&anchor) {
            return Ok(());
        }
        let Some(target) = target_of(visit.node) else {
            return Ok(());
        };
        cx.claimed_docs.insert(anchor);

        let Some(parent) = Self::parent_identity(cx, visit, target, sink)? else {
            return Ok(());
        };
        for doc in docs {
            Self::extract(cx, doc, &parent, sink);
        }
        Ok(())
    }
}

#[derive(PartialEq, Eq, Hash)]
struct ContentKey<'r> {
    text: &'r str,
    parent_node_identity: &'r str,
    cross_reference: Option<(&'r str, &'r str, Option<&'r str>)>,
}

impl<'r> ContentKey<'r> {
    /// The record's content with its position left out, so repeated
    /// boilerplate at different lines collides.
    fn of(annotation: &'r AnnotationRecord) -> Self {
        Self {
            text: &annotation.text,
            parent_node_identity: &annotation.parent_node_identity,
            cross_reference: annotation.cross_reference.as_ref().map(|xref| {
                (
                    xref.text.as_str(),
                    xref.parent_node_identity.as_str(),
                    xref.permalink.as_deref(),
                )
            }),
        }
    }
}

/// Numbers duplicate annotations in collection order: the first of a group
/// keeps no key, the n-th later duplicate gets `n`.
pub fn assign_sequence_keys(annotations: &mut [AnnotationRecord]) {
    let mut seen: HashMap<ContentKey<'_>, u32> = HashMap::new();
    let mut keys = Vec::with_capacity(annotations.len());

    for annotation in annotations.iter() {
        let count = seen.entry(ContentKey::of(annotation)).or_insert(0);
        keys.push((*count > 0).then_some(*count));
        *count += 1;
    }
    drop(seen);

    for (annotation, key) in annotations.iter_mut().zip(keys) {
        annotation.sequence_key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceLocation;

    fn pending(line: u32, text: &str) -> AnnotationRecord {
        AnnotationRecord {
            source_location: SourceLocation::line("src/a.tsx", line),
            text: text.to_string(),
            parent_node_identity: "src/a.tsx:A".to_string(),
            sequence_key: None,
            cross_reference: None,
        }
    }

    #[test]
    fn test_duplicates_numbered_in_order() {
        let mut annotations = vec![
            pending(1, "fix this"),
            pending(5, "other"),
            pending(9, "fix this"),
            pending(12, "fix this"),
        ];
        assign_sequence_keys(&mut annotations);
        let keys: Vec<_> = annotations.iter().map(|a| a.sequence_key).collect();
        assert_eq!(keys, vec![None, None, Some(1), Some(2)]);
    }

    #[test]
    fn test_parent_identity_separates_groups() {
        let mut other = pending(3, "fix this");
        other.parent_node_identity = "src/a.tsx:B".to_string();
        let mut annotations = vec![pending(1, "fix this"), other];
        assign_sequence_keys(&mut annotations);
        assert!(annotations.iter().all(|a| a.sequence_key.is_none()));
    }

    #[test]
    fn test_permalink_must_be_a_url() {
        assert_eq!(
            parse_permalink("https://canvas.example/n/42 trailing"),
            Some("https://canvas.example/n/42".to_string())
        );
        assert_eq!(parse_permalink("pending"), None);
        assert_eq!(parse_permalink(""), None);
    }
}
