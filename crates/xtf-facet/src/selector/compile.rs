//! Compiling selection expressions into selector chains.

use xtf_select::{Filter, SelectExpr, SelectPath, Target};

use super::{
    ChildSelector, DescendantSelector, DocsSelector, GroupSelector, MarkSelector, NameSelector,
    RangeSelector, RootSelector, SelectorChain, SiblingSelector, TopChoiceSelector,
    UnionSelector,
};
use crate::error::FacetError;

/// Parses and compiles a selection expression. An empty expression selects
/// only the root.
pub fn compile(input: &str) -> Result<SelectorChain, FacetError> {
    Ok(match xtf_select::parse(input)? {
        Some(expr) => compile_expr(&expr),
        None => SelectorChain::root_only(),
    })
}

/// Compiles a parsed expression. Several paths become a single union stage.
pub fn compile_expr(expr: &SelectExpr) -> SelectorChain {
    match expr.paths.as_slice() {
        [path] => compile_path(path),
        paths => SelectorChain::new(vec![Box::new(UnionSelector::new(
            paths.iter().map(compile_path).collect(),
        ))]),
    }
}

/// Compiles one path: root, then each step's target and filters, then an
/// optional hit window, then the terminal mark.
fn compile_path(path: &SelectPath) -> SelectorChain {
    let mut stages: Vec<Box<dyn GroupSelector>> = vec![Box::new(RootSelector)];

    for step in &path.steps {
        stages.push(match &step.target {
            Target::Children => Box::new(ChildSelector),
            Target::Descendants => Box::new(DescendantSelector),
            Target::Named(name) => Box::new(NameSelector::new(name.as_str())),
        });
        for filter in &step.filters {
            stages.push(match filter {
                Filter::Range(range) => Box::new(RangeSelector::new(*range)),
                Filter::Siblings => Box::new(SiblingSelector::default()),
                Filter::TopChoices => Box::new(TopChoiceSelector::default()),
            });
        }
    }

    if let Some(window) = path.docs {
        stages.push(Box::new(DocsSelector::new(window)));
    }
    stages.push(Box::new(MarkSelector));

    SelectorChain::new(stages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(input: &str) -> String {
        compile(input).unwrap().to_string()
    }

    #[test]
    fn empty_selects_root() {
        assert_eq!(chain(""), "root -> mark");
        assert_eq!(chain("   "), "root -> mark");
    }

    #[test]
    fn single_path() {
        assert_eq!(chain("*"), "root -> * -> mark");
        assert_eq!(
            chain("Fiction::*[2-5][siblings]#1-10"),
            "root -> \"Fiction\" -> * -> [2-5] -> [siblings] -> #1-10 -> mark"
        );
        assert_eq!(chain("**[topChoices]#all"), "root -> ** -> [topChoices] -> #all -> mark");
    }

    #[test]
    fn alternatives_become_a_union() {
        assert_eq!(
            chain("Fiction | Nonfiction::*"),
            "union(root -> \"Fiction\" -> mark | root -> \"Nonfiction\" -> * -> mark)"
        );
    }

    #[test]
    fn syntax_errors_surface() {
        let err = compile("*[").unwrap_err();
        assert!(matches!(err, FacetError::Select(_)));
    }
}
