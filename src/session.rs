//! Compilation Session
//!
//! Parses one source file into an arena-allocated program, builds its semantic
//! model (the symbol checker every detector resolves names through), and
//! indexes the documentation comments by the offset of the token they attach to.

use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, Function, IdentifierReference, Program};
use oxc_ast::AstKind;
use oxc_parser::Parser;
use oxc_semantic::{Scoping, Semantic, SemanticBuilder};
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::symbol::SymbolId;
use std::collections::HashMap;

use crate::error::ScanError;
use crate::jsdoc::{doc_comment_span, parse_doc_comment, DocComment};
use crate::location::{LineIndex, SourceLocation};
use crate::report::SymbolDescriptor;

pub struct CompilationSession<'a> {
    path: String,
    source: &'a str,
    program: &'a Program<'a>,
    semantic: Semantic<'a>,
    lines: LineIndex,
    doc_comments: HashMap<u32, Vec<DocComment>>,
}

impl<'a> CompilationSession<'a> {
    /// Parses `source` as the file at `path` (relative to the repository root).
    ///
    /// Any parse diagnostic is fatal for the scan.
    pub fn new(allocator: &'a Allocator, path: &str, source: &'a str) -> Result<Self, ScanError> {
        let source_type = SourceType::from_path(path).unwrap_or_else(|_| {
            SourceType::default()
                .with_typescript(true)
                .with_module(true)
                .with_jsx(true)
        });

        let ret = Parser::new(allocator, source, source_type).parse();
        if ret.panicked || !ret.errors.is_empty() {
            return Err(ScanError::Parse {
                path: path.to_string(),
                messages: ret.errors.iter().map(|e| e.to_string()).collect(),
            });
        }

        let program: &'a Program<'a> = allocator.alloc(ret.program);
        let semantic = SemanticBuilder::new().build(program).semantic;

        let mut doc_comments: HashMap<u32, Vec<DocComment>> = HashMap::new();
        for comment in program.comments.iter() {
            // Trailing comments have nothing after them to attach to.
            if comment.attached_to < comment.span.end {
                continue;
            }
            if let Some(span) = doc_comment_span(source, comment.span) {
                doc_comments
                    .entry(comment.attached_to)
                    .or_default()
                    .push(parse_doc_comment(source, span));
            }
        }

        tracing::debug!(
            path,
            doc_comments = doc_comments.len(),
            "compilation session ready"
        );

        Ok(Self {
            path: path.to_string(),
            source,
            program,
            semantic,
            lines: LineIndex::new(source),
            doc_comments,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn program(&self) -> &'a Program<'a> {
        self.program
    }

    pub fn scoping(&self) -> &Scoping {
        self.semantic.scoping()
    }

    /// Renders a node back to text. The source slice is the printed form.
    pub fn print(&self, node: impl GetSpan) -> &'a str {
        node.span().source_text(self.source)
    }

    /// Printed text with all whitespace removed, for structural name matching.
    pub fn print_compact(&self, node: impl GetSpan) -> String {
        self.print(node).split_whitespace().collect()
    }

    pub fn location(&self, span: Span) -> SourceLocation {
        let (start, end) = self.lines.lines_of(span);
        SourceLocation::new(self.path.clone(), start, end)
    }

    /// Documentation comments attached to the token starting at `offset`.
    pub fn doc_comments_at(&self, offset: u32) -> &[DocComment] {
        self.doc_comments
            .get(&offset)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SYMBOL CHECKER
    // ═══════════════════════════════════════════════════════════════════════════

    /// Symbol a node names, if the checker can resolve one.
    ///
    /// Only identifier nodes resolve; declarations resolve through their name
    /// node (see the identity fallback chain).
    pub fn symbol_at(&self, node: AstKind<'a>) -> Option<SymbolId> {
        match node {
            AstKind::BindingIdentifier(ident) => ident.symbol_id.get(),
            AstKind::IdentifierReference(ident) => self.reference_symbol(ident),
            _ => None,
        }
    }

    pub fn reference_symbol(&self, ident: &IdentifierReference<'a>) -> Option<SymbolId> {
        let reference_id = ident.reference_id.get()?;
        self.scoping().get_reference(reference_id).symbol_id()
    }

    pub fn symbol_name(&self, symbol_id: SymbolId) -> &str {
        self.scoping().symbol_name(symbol_id)
    }

    /// Location of the symbol's declaring identifier.
    pub fn symbol_location(&self, symbol_id: SymbolId) -> SourceLocation {
        self.location(self.scoping().symbol_span(symbol_id))
    }

    /// Snapshot of a declaration's public-facing description.
    ///
    /// `declaration` is the full declaration node; `doc_anchor` is the offset
    /// its documentation comments attach to (the `export` keyword when exported).
    pub fn describe(&self, name: &str, declaration: AstKind<'a>, doc_anchor: u32) -> SymbolDescriptor {
        let documentation = self
            .doc_comments_at(doc_anchor)
            .iter()
            .map(|doc| doc.description.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        SymbolDescriptor {
            path: self.path.clone(),
            source_location: self.location(declaration.span()),
            name: name.to_string(),
            documentation,
            type_signature: self.type_signature(declaration),
        }
    }

    /// Declared signature text: parameter list and return annotation for
    /// function-likes, the class header for classes.
    pub fn type_signature(&self, declaration: AstKind<'a>) -> Option<String> {
        let span = match declaration {
            AstKind::Function(func) => function_signature_span(func),
            AstKind::VariableDeclarator(decl) => decl.init.as_ref().and_then(expression_signature_span)?,
            AstKind::MethodDefinition(method) => function_signature_span(&method.value),
            AstKind::PropertyDefinition(prop) => prop.value.as_ref().and_then(expression_signature_span)?,
            AstKind::Class(class) => Span::new(class.span.start, class.body.span.start),
            _ => return None,
        };

        let text = self.print(span).split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn function_signature_span(func: &Function) -> Span {
    let start = func
        .type_parameters
        .as_ref()
        .map_or(func.params.span.start, |params| params.span.start);
    let end = func
        .return_type
        .as_ref()
        .map_or(func.params.span.end, |ret| ret.span.end);
    Span::new(start, end)
}

fn expression_signature_span(expr: &Expression) -> Option<Span> {
    match expr {
        Expression::ArrowFunctionExpression(arrow) => {
            let start = arrow
                .type_parameters
                .as_ref()
                .map_or(arrow.params.span.start, |params| params.span.start);
            let end = arrow
                .return_type
                .as_ref()
                .map_or(arrow.params.span.end, |ret| ret.span.end);
            Some(Span::new(start, end))
        }
        Expression::FunctionExpression(func) => Some(function_signature_span(func)),
        _ => None,
    }
}
