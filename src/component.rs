//! Component detectors.
//!
//! A component is a declaration whose body renders template elements:
//! top-level function declarations and `const X = () => <.../>` initializers,
//! classes extending a known component base, and `lazy(() => import(...))`
//! bindings. Definitions carry the identities of every component they render.

use oxc_ast::ast::{
    BindingPattern, ClassElement, Expression, ExportDefaultDeclarationKind, FunctionBody,
    MethodDefinitionKind, ModuleExportName, PropertyKey,
};
use oxc_ast::AstKind;
use oxc_span::GetSpan;

use crate::detector::{Detector, ScanContext};
use crate::error::ScanError;
use crate::identity::{is_class_declaration, is_function_declaration};
use crate::matcher::PatternMatcher;
use crate::report::{DefinedComponent, NodeIdentity, ReferencedComponent, UNRESOLVED_LOCATION};
use crate::template::{contains_template, find_jsx};
use crate::visitor::{DebugSink, NodeVisit, Walkable};

/// Export name reported for `export default function Foo`.
pub const DEFAULT_EXPORT: &str = "default";

// ═══════════════════════════════════════════════════════════════════════════════
// PLACEMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a declaration sits relative to the module's top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Nested,
    TopLevel,
    NamedExport { start: u32 },
    DefaultExport { start: u32 },
}

impl Placement {
    /// Classifies a declaration from its container chain (the ancestors
    /// between it and the program, innermost last).
    fn of(containers: &[AstKind<'_>]) -> Self {
        let mut outer = containers.iter().rev();
        match (outer.next(), outer.next()) {
            (Some(AstKind::Program(_)), _) => Placement::TopLevel,
            (Some(AstKind::ExportNamedDeclaration(export)), Some(AstKind::Program(_))) => {
                Placement::NamedExport {
                    start: export.span.start,
                }
            }
            (Some(AstKind::ExportDefaultDeclaration(export)), Some(AstKind::Program(_))) => {
                Placement::DefaultExport {
                    start: export.span.start,
                }
            }
            _ => Placement::Nested,
        }
    }

    fn is_top_level(self) -> bool {
        self != Placement::Nested
    }

    fn exported_as(self, name: &str) -> Option<String> {
        match self {
            Placement::NamedExport { .. } => Some(name.to_string()),
            Placement::DefaultExport { .. } => Some(DEFAULT_EXPORT.to_string()),
            Placement::Nested | Placement::TopLevel => None,
        }
    }

    /// Offset that leading doc comments attach to.
    fn doc_anchor(self, declaration_start: u32) -> u32 {
        match self {
            Placement::NamedExport { start } | Placement::DefaultExport { start } => start,
            Placement::Nested | Placement::TopLevel => declaration_start,
        }
    }
}

/// A definition ready to be recorded, minus its rendered references.
struct Candidate<'a> {
    name: String,
    declaration: AstKind<'a>,
    placement: Placement,
    doc_anchor: u32,
}

fn record_definition<'a>(
    cx: &mut ScanContext<'_, 'a>,
    candidate: Candidate<'a>,
    identity: NodeIdentity,
    referenced_components: Vec<NodeIdentity>,
    sink: &mut DebugSink<'_>,
) {
    let span = candidate.declaration.span();
    let exported_as = candidate.placement.exported_as(&candidate.name);
    let meta = cx
        .session
        .describe(&candidate.name, candidate.declaration, candidate.doc_anchor);

    let component = DefinedComponent {
        name: candidate.name,
        source_location: cx.session.location(span),
        exported_as: exported_as.clone(),
        referenced_components,
        meta,
    };

    if !cx.report.define(identity.clone(), component) {
        sink.log(format!("{} already defined, keeping first", identity));
        return;
    }
    if exported_as.is_some() {
        cx.report.mark_exported(&identity);
    }
    sink.log(format!("defined {}", identity));
}

// ═══════════════════════════════════════════════════════════════════════════════
// FUNCTION COMPONENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Top-level named functions, and top-level `const` bindings of arrow or
/// function expressions, whose bodies contain template elements.
pub struct FunctionComponentDetector;

impl FunctionComponentDetector {
    fn inspect<'a>(
        cx: &mut ScanContext<'_, 'a>,
        candidate: Candidate<'a>,
        body: &'a FunctionBody<'a>,
        sink: &mut DebugSink<'_>,
    ) -> Result<(), ScanError> {
        if !contains_template(body, sink)? {
            return Ok(());
        }
        let identity = cx.session.identify(candidate.declaration)?;
        let referenced = find_jsx(cx, body, sink)?;
        record_definition(cx, candidate, identity, referenced, sink);
        Ok(())
    }
}

impl Detector for FunctionComponentDetector {
    fn name(&self) -> &'static str {
        "function-component"
    }

    fn visit<'a>(
        &self,
        cx: &mut ScanContext<'_, 'a>,
        visit: &NodeVisit<'a, '_>,
        sink: &mut DebugSink<'_>,
    ) -> Result<(), ScanError> {
        match visit.node {
            AstKind::Function(func) if is_function_declaration(func) => {
                let (Some(id), Some(body)) = (&func.id, func.body.as_deref()) else {
                    return Ok(());
                };
                let placement = Placement::of(visit.ancestors);
                if !placement.is_top_level() {
                    return Ok(());
                }
                let candidate = Candidate {
                    name: id.name.to_string(),
                    declaration: visit.node,
                    placement,
                    doc_anchor: placement.doc_anchor(func.span.start),
                };
                Self::inspect(cx, candidate, body, sink)
            }
            AstKind::VariableDeclarator(decl) => {
                let BindingPattern::BindingIdentifier(id) = &decl.id else {
                    return Ok(());
                };
                let body = match &decl.init {
                    Some(Expression::ArrowFunctionExpression(arrow)) => &*arrow.body,
                    Some(Expression::FunctionExpression(func)) => match func.body.as_deref() {
                        Some(body) => body,
                        None => return Ok(()),
                    },
                    _ => return Ok(()),
                };
                // The declarator's container chain ends with its declaration list.
                let containers = match visit.ancestors.split_last() {
                    Some((AstKind::VariableDeclaration(_), containers)) => containers,
                    _ => return Ok(()),
                };
                let placement = Placement::of(containers);
                if !placement.is_top_level() {
                    return Ok(());
                }
                // Docs of `const X = ...` attach to the `const` keyword.
                let list_start = visit.parent().map_or(decl.span.start, |list| list.span().start);
                let candidate = Candidate {
                    name: id.name.to_string(),
                    declaration: visit.node,
                    placement,
                    doc_anchor: placement.doc_anchor(list_start),
                };
                Self::inspect(cx, candidate, body, sink)
            }
            _ => Ok(()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASS COMPONENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Named class declarations whose base class matches the configured
/// component bases.
///
/// The `render` method supplies the class's references. Any other member
/// whose body renders template elements becomes its own pseudo-component
/// `<classIdentity>.<member>()`.
pub struct ClassComponentDetector {
    base_classes: Box<dyn PatternMatcher>,
}

impl ClassComponentDetector {
    pub fn new(base_classes: Box<dyn PatternMatcher>) -> Self {
        Self { base_classes }
    }

    fn render_helper<'a>(
        cx: &mut ScanContext<'_, 'a>,
        class: (&str, &NodeIdentity),
        member: String,
        declaration: AstKind<'a>,
        root: &impl Walkable<'a>,
        sink: &mut DebugSink<'_>,
    ) -> Result<(), ScanError> {
        if !contains_template(root, sink)? {
            return Ok(());
        }
        let (class_name, class_identity) = class;
        let identity = format!("{}.{}()", class_identity, member);
        let referenced = find_jsx(cx, root, sink)?;
        let candidate = Candidate {
            name: format!("{}.{}", class_name, member),
            declaration,
            placement: Placement::Nested,
            doc_anchor: declaration.span().start,
        };
        record_definition(cx, candidate, identity, referenced, sink);
        Ok(())
    }
}

/// Body of a function-valued expression, as in `render = () => <View/>`.
fn function_body<'a>(value: &'a Expression<'a>) -> Option<&'a FunctionBody<'a>> {
    match value {
        Expression::ArrowFunctionExpression(arrow) => Some(&*arrow.body),
        Expression::FunctionExpression(func) => func.body.as_deref(),
        _ => None,
    }
}

/// Static name of a class member key, `#name` for private members.
pub(crate) fn member_name(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ident.name.to_string()),
        PropertyKey::PrivateIdentifier(ident) => Some(format!("#{}", ident.name)),
        PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

impl Detector for ClassComponentDetector {
    fn name(&self) -> &'static str {
        "class-component"
    }

    fn visit<'a>(
        &self,
        cx: &mut ScanContext<'_, 'a>,
        visit: &NodeVisit<'a, '_>,
        sink: &mut DebugSink<'_>,
    ) -> Result<(), ScanError> {
        let AstKind::Class(class) = visit.node else {
            return Ok(());
        };
        if !is_class_declaration(class) {
            return Ok(());
        }
        let (Some(id), Some(super_class)) = (&class.id, &class.super_class) else {
            return Ok(());
        };
        let base = cx.session.print_compact(super_class.span());
        if !self.base_classes.matches(&base) {
            sink.log(format!(
                "class {} extends {}: not a {}",
                id.name,
                base,
                self.base_classes.describe()
            ));
            return Ok(());
        }

        let class_name = id.name.to_string();
        let identity = cx.session.identify(visit.node)?;
        let mut referenced = Vec::new();

        for element in &class.body.body {
            match element {
                ClassElement::MethodDefinition(method) => {
                    let (Some(member), Some(body)) =
                        (member_name(&method.key), method.value.body.as_deref())
                    else {
                        continue;
                    };
                    if method.kind == MethodDefinitionKind::Constructor {
                        continue;
                    }
                    if member == "render" && method.kind == MethodDefinitionKind::Method {
                        referenced = find_jsx(cx, body, sink)?;
                        continue;
                    }
                    let declaration = AstKind::MethodDefinition(&**method);
                    Self::render_helper(cx, (&class_name, &identity), member, declaration, body, sink)?;
                }
                ClassElement::PropertyDefinition(prop) => {
                    let (Some(member), Some(value)) = (member_name(&prop.key), &prop.value) else {
                        continue;
                    };
                    if member == "render" && !prop.r#static {
                        if let Some(body) = function_body(value) {
                            referenced = find_jsx(cx, body, sink)?;
                            continue;
                        }
                    }
                    let declaration = AstKind::PropertyDefinition(&**prop);
                    Self::render_helper(cx, (&class_name, &identity), member, declaration, value, sink)?;
                }
                _ => {}
            }
        }

        let placement = Placement::of(visit.ancestors);
        let candidate = Candidate {
            name: class_name,
            declaration: visit.node,
            placement,
            doc_anchor: placement.doc_anchor(class.span.start),
        };
        record_definition(cx, candidate, identity, referenced, sink);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LAZY COMPONENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// `const X = lazy(() => import("./X"))`: records `X` as a referenced
/// component whose definition location is the imported module specifier.
pub struct LazyComponentDetector {
    callees: Box<dyn PatternMatcher>,
}

impl LazyComponentDetector {
    pub fn new(callees: Box<dyn PatternMatcher>) -> Self {
        Self { callees }
    }
}

impl Detector for LazyComponentDetector {
    fn name(&self) -> &'static str {
        "lazy-component"
    }

    fn visit<'a>(
        &self,
        cx: &mut ScanContext<'_, 'a>,
        visit: &NodeVisit<'a, '_>,
        sink: &mut DebugSink<'_>,
    ) -> Result<(), ScanError> {
        let AstKind::ImportExpression(import) = visit.node else {
            return Ok(());
        };

        let session = cx.session;
        let Some(call_index) = visit.ancestors.iter().rposition(|ancestor| {
            matches!(ancestor, AstKind::CallExpression(call)
                if self.callees.matches(&session.print_compact(call.callee.span())))
        }) else {
            sink.log("dynamic import outside a lazy wrapper");
            return Ok(());
        };

        let Some(declarator) = visit.ancestors[..call_index]
            .iter()
            .rev()
            .find(|ancestor| matches!(ancestor, AstKind::VariableDeclarator(_)))
            .copied()
        else {
            sink.log("lazy wrapper is not bound to a variable");
            return Ok(());
        };

        let identity = session.identify(declarator)?;
        let name = match declarator {
            AstKind::VariableDeclarator(decl) => match &decl.id {
                BindingPattern::BindingIdentifier(id) => id.name.to_string(),
                other => session.print(other.span()).to_string(),
            },
            _ => return Ok(()),
        };
        let definition_location = match &import.source {
            Expression::StringLiteral(specifier) => specifier.value.to_string(),
            _ => UNRESOLVED_LOCATION.to_string(),
        };

        if cx.report.reference(
            identity.clone(),
            ReferencedComponent {
                name,
                definition_location,
            },
        ) {
            sink.log(format!("lazy {}", identity));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPORT ALIASES
// ═══════════════════════════════════════════════════════════════════════════════

/// `export { Foo as Bar }` and `export default Foo` for components declared
/// elsewhere in the module. Aliases are collected here and applied after the
/// walk, since the definition may come later in the file.
pub struct ExportAliasDetector;

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

impl Detector for ExportAliasDetector {
    fn name(&self) -> &'static str {
        "export-alias"
    }

    fn visit<'a>(
        &self,
        cx: &mut ScanContext<'_, 'a>,
        visit: &NodeVisit<'a, '_>,
        _sink: &mut DebugSink<'_>,
    ) -> Result<(), ScanError> {
        match visit.node {
            // Re-exports (`export { A } from "./a"`) name bindings of another module.
            AstKind::ExportNamedDeclaration(export) if export.source.is_none() => {
                for specifier in &export.specifiers {
                    let ModuleExportName::IdentifierReference(local) = &specifier.local else {
                        continue;
                    };
                    if cx.session.reference_symbol(local).is_none() {
                        continue;
                    }
                    let identity = cx.session.identify(AstKind::IdentifierReference(local))?;
                    cx.export_aliases
                        .push((identity, export_name(&specifier.exported)));
                }
            }
            AstKind::ExportDefaultDeclaration(export) => {
                if let ExportDefaultDeclarationKind::Identifier(ident) = &export.declaration {
                    if cx.session.reference_symbol(ident).is_some() {
                        let identity = cx.session.identify(AstKind::IdentifierReference(&**ident))?;
                        cx.export_aliases.push((identity, DEFAULT_EXPORT.to_string()));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
