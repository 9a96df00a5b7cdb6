use oxc_ast::ast::{Class, Expression, FunctionBody, Program};
use oxc_ast::AstKind;
use oxc_ast_visit::Visit;
use std::fmt;

use crate::error::ScanError;

/// `walk` is the single authoritative traversal mechanism for syntax trees.
///
/// Rules:
/// 1. Descendants of the root are visited in document order (pre-order). The root itself is not visited.
/// 2. Each visit sees the node, the strict ancestors from outermost to innermost, and a debug sink
///    indented to the node's depth.
/// 3. Returning `Some` prunes that node's descendants. The first such value in document order is
///    the walk's result; later ones are dropped, but traversal of the rest of the tree continues.
/// 4. The tree is never mutated.
pub fn walk<'a, R>(
    root: &impl Walkable<'a>,
    sink: &mut DebugSink<'_>,
    mut on_visit: impl FnMut(&NodeVisit<'a, '_>, &mut DebugSink<'_>) -> Result<Option<R>, ScanError>,
) -> Result<Option<R>, ScanError> {
    let mut flattener = Flattener::default();
    root.accept(&mut flattener);

    let mut ancestors: Vec<AstKind<'a>> = Vec::new();
    let mut pruned_at: Option<usize> = None;
    let mut result = None;

    for (node, depth) in flattener.nodes {
        ancestors.truncate(depth);

        if let Some(limit) = pruned_at {
            if depth > limit {
                continue;
            }
            pruned_at = None;
        }

        if depth > 0 {
            let visit = NodeVisit {
                node,
                depth,
                ancestors: &ancestors,
            };
            let mut node_sink = sink.indented(depth - 1);
            if let Some(value) = on_visit(&visit, &mut node_sink)? {
                if result.is_none() {
                    result = Some(value);
                }
                pruned_at = Some(depth);
            }
        }

        ancestors.push(node);
    }

    Ok(result)
}

/// A single callback invocation of `walk`.
pub struct NodeVisit<'a, 'v> {
    pub node: AstKind<'a>,
    /// 1 for the root's children.
    pub depth: usize,
    /// Strict ancestors, outermost first. The walk root is the first entry.
    pub ancestors: &'v [AstKind<'a>],
}

impl<'a, 'v> NodeVisit<'a, 'v> {
    pub fn parent(&self) -> Option<AstKind<'a>> {
        self.ancestors.last().copied()
    }

    /// Ancestor `n` levels up; `nth_ancestor(0)` is the parent.
    pub fn nth_ancestor(&self, n: usize) -> Option<AstKind<'a>> {
        self.ancestors.iter().rev().nth(n).copied()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WALK ROOTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Anything `walk` can start from.
pub trait Walkable<'a> {
    fn accept<V: Visit<'a>>(&self, visitor: &mut V);

    /// Whether the root itself is a template element or fragment. `walk`
    /// never visits the root, so callers looking for templates check it here.
    fn is_template(&self) -> bool {
        false
    }
}

impl<'a> Walkable<'a> for Program<'a> {
    fn accept<V: Visit<'a>>(&self, visitor: &mut V) {
        visitor.visit_program(self);
    }
}

impl<'a> Walkable<'a> for FunctionBody<'a> {
    fn accept<V: Visit<'a>>(&self, visitor: &mut V) {
        visitor.visit_function_body(self);
    }
}

impl<'a> Walkable<'a> for Class<'a> {
    fn accept<V: Visit<'a>>(&self, visitor: &mut V) {
        visitor.visit_class(self);
    }
}

impl<'a> Walkable<'a> for Expression<'a> {
    fn accept<V: Visit<'a>>(&self, visitor: &mut V) {
        visitor.visit_expression(self);
    }

    fn is_template(&self) -> bool {
        matches!(self, Expression::JSXElement(_) | Expression::JSXFragment(_))
    }
}

/// Records every node with its depth through the enter/leave hooks.
#[derive(Default)]
struct Flattener<'a> {
    nodes: Vec<(AstKind<'a>, usize)>,
    depth: usize,
}

impl<'a> Visit<'a> for Flattener<'a> {
    fn enter_node(&mut self, kind: AstKind<'a>) {
        self.nodes.push((kind, self.depth));
        self.depth += 1;
    }

    fn leave_node(&mut self, _kind: AstKind<'a>) {
        self.depth -= 1;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEBUG SINK
// ═══════════════════════════════════════════════════════════════════════════════

/// Structured debug output threaded through a walk.
///
/// Lines are kept for `ScanReport::debug_log` and mirrored to `tracing`.
pub struct DebugSink<'s> {
    lines: &'s mut Vec<String>,
    indent: usize,
}

impl<'s> DebugSink<'s> {
    pub fn new(lines: &'s mut Vec<String>) -> Self {
        Self { lines, indent: 0 }
    }

    /// Sink for output nested `extra` levels deeper.
    pub fn indented(&mut self, extra: usize) -> DebugSink<'_> {
        DebugSink {
            lines: &mut *self.lines,
            indent: self.indent + extra,
        }
    }

    pub fn log(&mut self, message: impl fmt::Display) {
        let line = format!("{}{}", "  ".repeat(self.indent), message);
        tracing::trace!(target: "codecanvas::walk", "{}", line);
        self.lines.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CompilationSession;
    use oxc_allocator::Allocator;

    fn kinds_visited(source: &str, prune: impl Fn(&AstKind) -> bool) -> (Vec<String>, Option<String>) {
        let allocator = Allocator::default();
        let session = CompilationSession::new(&allocator, "src/t.tsx", source).unwrap();
        let mut lines = Vec::new();
        let mut sink = DebugSink::new(&mut lines);
        let mut seen = Vec::new();
        let result = walk(session.program(), &mut sink, |visit, _| {
            if let AstKind::BindingIdentifier(ident) = visit.node {
                seen.push(ident.name.to_string());
            }
            Ok(if prune(&visit.node) {
                Some(session.print(visit.node).to_string())
            } else {
                None
            })
        })
        .unwrap();
        (seen, result)
    }

    #[test]
    fn test_visits_in_document_order() {
        let (seen, result) = kinds_visited("function a() { const b = 1; }\nconst c = 2;", |_| false);
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert!(result.is_none());
    }

    #[test]
    fn test_pruning_skips_subtree_and_keeps_first_value() {
        let source = "function a() { const b = 1; }\nfunction d() { const e = 1; }\nconst c = 2;";
        let (seen, result) = kinds_visited(source, |kind| matches!(kind, AstKind::FunctionBody(_)));
        // Bodies pruned: inner bindings never seen, siblings still visited.
        assert_eq!(seen, vec!["a", "d", "c"]);
        assert_eq!(result.as_deref(), Some("{ const b = 1; }"));
    }

    #[test]
    fn test_ancestors_are_strict_and_outer_to_inner() {
        let allocator = Allocator::default();
        let session =
            CompilationSession::new(&allocator, "src/t.tsx", "function a() { return 1; }").unwrap();
        let mut lines = Vec::new();
        let mut sink = DebugSink::new(&mut lines);
        let found = walk(session.program(), &mut sink, |visit, _| {
            Ok(match visit.node {
                AstKind::ReturnStatement(_) => Some((
                    matches!(visit.ancestors.first(), Some(AstKind::Program(_))),
                    matches!(visit.parent(), Some(AstKind::FunctionBody(_))),
                    matches!(visit.nth_ancestor(1), Some(AstKind::Function(_))),
                )),
                _ => None,
            })
        })
        .unwrap();
        assert_eq!(found, Some((true, true, true)));
    }

    #[test]
    fn test_debug_sink_indents_by_depth() {
        let allocator = Allocator::default();
        let session = CompilationSession::new(&allocator, "src/t.tsx", "const a = 1;").unwrap();
        let mut lines = Vec::new();
        let mut sink = DebugSink::new(&mut lines);
        walk(session.program(), &mut sink, |visit, sink| {
            if let AstKind::BindingIdentifier(ident) = visit.node {
                sink.log(format!("binding {}", ident.name));
            }
            Ok(None::<()>)
        })
        .unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("  "), "nested node must be indented: {:?}", lines[0]);
        assert_eq!(lines[0].trim_start(), "binding a");
    }
}
