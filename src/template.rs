//! Template element discovery.
//!
//! A tag whose name starts with an uppercase letter refers to a component;
//! lowercase tags are intrinsic elements and are skipped. Every component tag
//! found is also recorded in the report as a referenced component (a definition
//! found elsewhere in the file replaces it).

use oxc_ast::ast::{
    Expression, IdentifierReference, JSXAttributeItem, JSXAttributeName, JSXAttributeValue,
    JSXElementName, JSXMemberExpression, JSXMemberExpressionObject, JSXOpeningElement,
};
use oxc_ast::AstKind;

use crate::detector::ScanContext;
use crate::error::ScanError;
use crate::report::{NodeIdentity, ReferencedComponent, UNRESOLVED_LOCATION};
use crate::visitor::{walk, DebugSink, Walkable};

/// Attribute whose identifier value names a component rendered indirectly,
/// as in `<Route component={Settings} />`.
pub const COMPONENT_ATTRIBUTE: &str = "component";

/// Whether `root` is or contains any template element or fragment.
pub fn contains_template<'a>(
    root: &impl Walkable<'a>,
    sink: &mut DebugSink<'_>,
) -> Result<bool, ScanError> {
    if root.is_template() {
        return Ok(true);
    }
    let found = walk(root, sink, |visit, _| {
        Ok(match visit.node {
            AstKind::JSXElement(_) | AstKind::JSXFragment(_) => Some(()),
            _ => None,
        })
    })?;
    Ok(found.is_some())
}

/// Identities of the components referenced under `root`, deduplicated, in
/// first-appearance order.
pub fn find_jsx<'a>(
    cx: &mut ScanContext<'_, 'a>,
    root: &impl Walkable<'a>,
    sink: &mut DebugSink<'_>,
) -> Result<Vec<NodeIdentity>, ScanError> {
    let mut found: Vec<NodeIdentity> = Vec::new();

    walk(root, sink, |visit, sink| {
        if let AstKind::JSXOpeningElement(opening) = visit.node {
            if let Some(identity) = tag_reference(cx, &opening.name, sink)? {
                push_unique(&mut found, identity);
            }
            for identity in attribute_references(cx, opening, sink)? {
                push_unique(&mut found, identity);
            }
        }
        Ok(None::<()>)
    })?;

    Ok(found)
}

fn push_unique(found: &mut Vec<NodeIdentity>, identity: NodeIdentity) {
    if !found.contains(&identity) {
        found.push(identity);
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn tag_reference<'a>(
    cx: &mut ScanContext<'_, 'a>,
    name: &'a JSXElementName<'a>,
    sink: &mut DebugSink<'_>,
) -> Result<Option<NodeIdentity>, ScanError> {
    match name {
        JSXElementName::IdentifierReference(ident) => {
            if !starts_uppercase(&ident.name) {
                return Ok(None);
            }
            record_reference(cx, Some(&**ident), ident.name.as_str(), "", sink).map(Some)
        }
        JSXElementName::Identifier(ident) => {
            if !starts_uppercase(&ident.name) {
                return Ok(None);
            }
            record_reference(cx, None, ident.name.as_str(), "", sink).map(Some)
        }
        JSXElementName::MemberExpression(member) => {
            let printed = cx.session.print_compact(member.span);
            if !starts_uppercase(&printed) {
                return Ok(None);
            }
            match member_root(member) {
                Some(root) => {
                    let suffix = &printed[root.name.len()..];
                    record_reference(cx, Some(root), &printed, suffix, sink).map(Some)
                }
                None => record_reference(cx, None, &printed, "", sink).map(Some),
            }
        }
        JSXElementName::NamespacedName(namespaced) => {
            let printed = cx.session.print(namespaced.span);
            if !starts_uppercase(printed) {
                return Ok(None);
            }
            Err(ScanError::UnexpectedShape {
                kind: "JSXNamespacedName".to_string(),
                text: printed.to_string(),
                expected: "component tag name must be an identifier or member expression",
            })
        }
        JSXElementName::ThisExpression(_) => Ok(None),
    }
}

/// Outermost identifier of `<A.B.C>`, or `None` for `<this.X>`.
fn member_root<'a>(member: &'a JSXMemberExpression<'a>) -> Option<&'a IdentifierReference<'a>> {
    match &member.object {
        JSXMemberExpressionObject::IdentifierReference(ident) => Some(&**ident),
        JSXMemberExpressionObject::MemberExpression(inner) => member_root(inner),
        JSXMemberExpressionObject::ThisExpression(_) => None,
    }
}

fn attribute_references<'a>(
    cx: &mut ScanContext<'_, 'a>,
    opening: &'a JSXOpeningElement<'a>,
    sink: &mut DebugSink<'_>,
) -> Result<Vec<NodeIdentity>, ScanError> {
    let mut identities = Vec::new();

    for item in &opening.attributes {
        let JSXAttributeItem::Attribute(attribute) = item else {
            continue;
        };
        // Namespaced attribute names (`xlink:href`) can never be `component`.
        let JSXAttributeName::Identifier(attribute_name) = &attribute.name else {
            continue;
        };
        if attribute_name.name.as_str() != COMPONENT_ATTRIBUTE {
            continue;
        }
        let Some(JSXAttributeValue::ExpressionContainer(container)) = &attribute.value else {
            continue;
        };
        if let Some(Expression::Identifier(ident)) = container.expression.as_expression() {
            identities.push(record_reference(cx, Some(&**ident), ident.name.as_str(), "", sink)?);
        }
    }

    Ok(identities)
}

/// Mints the identity for a referenced name and records it in the report.
///
/// Resolved names share the identity of their declaration; `suffix` carries
/// the member path of `<Foo.Bar>` past the resolved root.
fn record_reference<'a>(
    cx: &mut ScanContext<'_, 'a>,
    ident: Option<&'a IdentifierReference<'a>>,
    name: &str,
    suffix: &str,
    sink: &mut DebugSink<'_>,
) -> Result<NodeIdentity, ScanError> {
    let symbol = ident.and_then(|ident| cx.session.reference_symbol(ident));

    let (identity, definition_location) = match (ident, symbol) {
        (Some(ident), Some(symbol)) => {
            let root = cx.session.identify(AstKind::IdentifierReference(ident))?;
            let location = cx.session.symbol_location(symbol).to_string();
            (format!("{}{}", root, suffix), location)
        }
        _ => {
            sink.log(format!("unresolved tag <{}>", name));
            (
                format!("{}:{}", cx.session.path(), name),
                UNRESOLVED_LOCATION.to_string(),
            )
        }
    };

    if cx.report.reference(
        identity.clone(),
        ReferencedComponent {
            name: name.to_string(),
            definition_location,
        },
    ) {
        sink.log(format!("referenced {}", identity));
    }

    Ok(identity)
}
