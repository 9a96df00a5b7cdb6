//! Structural name matching over printed node text.
//!
//! The class-base and lazy-callee checks compare printed source, not resolved
//! imports: `import { Component as Base } from "react"` is not recognized.
//! Keeping the check behind `PatternMatcher` lets a resolving strategy replace
//! it without touching the detectors.

use std::collections::HashSet;

pub trait PatternMatcher: Send + Sync {
    /// `printed` is whitespace-free node text, e.g. `React.Component`.
    fn matches(&self, printed: &str) -> bool;

    fn describe(&self) -> String;
}

/// Matches printed text against a fixed set of qualified names.
///
/// Type arguments are ignored, so `React.Component<Props>` matches `React.Component`.
#[derive(Debug, Clone, Default)]
pub struct PrintedNameMatcher {
    names: HashSet<String>,
}

impl PrintedNameMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl PatternMatcher for PrintedNameMatcher {
    fn matches(&self, printed: &str) -> bool {
        let bare = printed.split('<').next().unwrap_or(printed);
        self.names.contains(bare)
    }

    fn describe(&self) -> String {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        format!("printed name in [{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_qualified_names() {
        let matcher = PrintedNameMatcher::new(["React.Component", "Component"]);
        assert!(matcher.matches("React.Component"));
        assert!(matcher.matches("Component"));
        assert!(!matcher.matches("React.Components"));
        assert!(!matcher.matches("Base"));
    }

    #[test]
    fn test_type_arguments_ignored() {
        let matcher = PrintedNameMatcher::new(["React.PureComponent"]);
        assert!(matcher.matches("React.PureComponent<Props,State>"));
    }

    #[test]
    fn test_describe_is_sorted() {
        let matcher = PrintedNameMatcher::new(["lazy", "React.lazy"]);
        assert_eq!(matcher.describe(), "printed name in [React.lazy, lazy]");
    }
}
