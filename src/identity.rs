//! Node Identity Resolver
//!
//! `identify` mints the `<path>:<symbolName>` key of a node. Nodes the checker
//! cannot resolve directly are walked down an ordered chain of fallbacks, each
//! of which strictly descends into a child, so resolution terminates in at
//! most depth-many steps. Exhausting the chain is a hard error.

use oxc_ast::ast::{BindingPattern, Class, Function};
use oxc_ast::AstKind;
use oxc_span::GetSpan;

use crate::error::ScanError;
use crate::report::NodeIdentity;
use crate::session::CompilationSession;

/// One matcher/recursor pair of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Named function declaration -> its name.
    FunctionName,
    /// Variable declaration list -> its first declarator.
    FirstDeclarator,
    /// Single declarator -> its name.
    DeclaratorName,
    /// Named class declaration -> its name.
    ClassName,
    InterfaceName,
    TypeAliasName,
    EnumName,
}

/// Evaluated in order after direct symbol resolution fails.
pub const FALLBACK_CHAIN: &[Fallback] = &[
    Fallback::FunctionName,
    Fallback::FirstDeclarator,
    Fallback::DeclaratorName,
    Fallback::ClassName,
    Fallback::InterfaceName,
    Fallback::TypeAliasName,
    Fallback::EnumName,
];

impl Fallback {
    /// Child node to recurse on, if this rule applies to `node`.
    pub fn descend<'a>(self, node: AstKind<'a>) -> Option<AstKind<'a>> {
        match (self, node) {
            (Fallback::FunctionName, AstKind::Function(func)) if is_function_declaration(func) => {
                func.id.as_ref().map(AstKind::BindingIdentifier)
            }
            (Fallback::FirstDeclarator, AstKind::VariableDeclaration(decl)) => {
                decl.declarations.first().map(AstKind::VariableDeclarator)
            }
            (Fallback::DeclaratorName, AstKind::VariableDeclarator(decl)) => match &decl.id {
                BindingPattern::BindingIdentifier(id) => Some(AstKind::BindingIdentifier(id)),
                _ => None,
            },
            (Fallback::ClassName, AstKind::Class(class)) if is_class_declaration(class) => {
                class.id.as_ref().map(AstKind::BindingIdentifier)
            }
            (Fallback::InterfaceName, AstKind::TSInterfaceDeclaration(decl)) => {
                Some(AstKind::BindingIdentifier(&decl.id))
            }
            (Fallback::TypeAliasName, AstKind::TSTypeAliasDeclaration(decl)) => {
                Some(AstKind::BindingIdentifier(&decl.id))
            }
            (Fallback::EnumName, AstKind::TSEnumDeclaration(decl)) => {
                Some(AstKind::BindingIdentifier(&decl.id))
            }
            _ => None,
        }
    }
}

pub fn is_function_declaration(func: &Function) -> bool {
    func.is_declaration()
}

pub fn is_class_declaration(class: &Class) -> bool {
    class.is_declaration()
}

impl<'a> CompilationSession<'a> {
    pub fn identify(&self, node: AstKind<'a>) -> Result<NodeIdentity, ScanError> {
        let mut current = node;
        'resolve: loop {
            if let Some(symbol_id) = self.symbol_at(current) {
                return Ok(format!("{}:{}", self.path(), self.symbol_name(symbol_id)));
            }

            for fallback in FALLBACK_CHAIN {
                if let Some(child) = fallback.descend(current) {
                    current = child;
                    continue 'resolve;
                }
            }

            return Err(ScanError::UnresolvableIdentity {
                kind: current.debug_name().to_string(),
                text: self.print(current.span()).to_string(),
            });
        }
    }
}
