//! Graph traversal helpers over a diagram snapshot
//!
//! Ancestors follow `ref` back-references upward; children flatten an
//! element's own properties. Results are ids in a deterministic order.

use crate::errors::DisplayResult;
use diagrammer_editor::DiagramState;
use diagrammer_grammar::ElementId;

/// Ids of every ancestor of `id`, innermost first, excluding `id` itself
pub fn get_ancestors(state: &DiagramState, id: &str) -> DisplayResult<Vec<ElementId>> {
    Ok(state.ancestor_ids(id)?)
}

/// Distinct ids referenced by `id`, in schema declaration order
pub fn get_children(state: &DiagramState, id: &str) -> DisplayResult<Vec<ElementId>> {
    let item = state.get_item(id)?;
    let mut children: Vec<ElementId> = Vec::new();

    for reference in item.references() {
        if !children.contains(&reference.id) {
            children.push(reference.id);
        }
    }

    Ok(children)
}

/// The other children of `id`'s parent; empty for roots
pub fn get_siblings(state: &DiagramState, id: &str) -> DisplayResult<Vec<ElementId>> {
    let item = state.get_item(id)?;
    let Some(parent_id) = &item.parent else {
        return Ok(Vec::new());
    };

    Ok(get_children(state, parent_id)?
        .into_iter()
        .filter(|sibling| sibling != id)
        .collect())
}

/// Elements shown at finer granularity when `id` has focus:
/// its children, its siblings and the siblings of each ancestor.
///
/// Never contains `id` or any of its ancestors.
pub fn get_expanded_elements(state: &DiagramState, id: &str) -> DisplayResult<Vec<ElementId>> {
    let ancestors = get_ancestors(state, id)?;
    let mut expanded: Vec<ElementId> = Vec::new();

    let mut push = |candidate: ElementId| {
        if candidate != id && !ancestors.contains(&candidate) && !expanded.contains(&candidate) {
            expanded.push(candidate);
        }
    };

    for child in get_children(state, id)? {
        push(child);
    }
    for sibling in get_siblings(state, id)? {
        push(sibling);
    }
    for ancestor in &ancestors {
        for sibling in get_siblings(state, ancestor)? {
            push(sibling);
        }
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagrammer_editor::fixtures::quick_brown_fox;
    use crate::errors::DisplayError;
    use diagrammer_editor::DiagramError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ancestors_innermost_first() {
        let state = quick_brown_fox();
        assert_eq!(
            get_ancestors(&state, "the1").unwrap(),
            vec!["the1Det", "quickBrownAdjPhrase", "foxNounPhrase", "indClause"]
        );
        assert!(get_ancestors(&state, "indClause").unwrap().is_empty());
    }

    #[test]
    fn test_ancestors_of_missing_element() {
        let state = quick_brown_fox();
        assert_eq!(
            get_ancestors(&state, "catNoun"),
            Err(DisplayError::Diagram(DiagramError::NotFound("catNoun".to_string())))
        );
    }

    #[test]
    fn test_children_and_siblings() {
        let state = quick_brown_fox();
        assert_eq!(
            get_children(&state, "quickBrownAdjPhrase").unwrap(),
            vec!["quickBrownAdj", "the1Det"]
        );
        assert_eq!(get_siblings(&state, "the1Det").unwrap(), vec!["quickBrownAdj"]);
        assert_eq!(get_siblings(&state, "quick").unwrap(), vec!["brown"]);
        assert!(get_siblings(&state, "indClause").unwrap().is_empty());
        assert!(get_children(&state, "fox").unwrap().is_empty());
    }

    #[test]
    fn test_expanded_elements_around_focus() {
        let state = quick_brown_fox();
        assert_eq!(
            get_expanded_elements(&state, "overPrepPhrase").unwrap(),
            vec!["overPrep", "dogNounPhrase", "jumpsVerb", "foxNounPhrase"]
        );
    }
}
