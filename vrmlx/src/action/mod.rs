//! Synthesis step run once a node's children have been traversed
//!
//! An [`ActionMap`] maps canonical node names to [`Action`]s.  The map is
//! typed by the payload it accumulates, so one traversal engine serves both
//! the geometry pass ([`to_geom_actions`]) and small helper passes such as
//! [`coordinate_actions`].
use crate::{
    context::ConversionContext, error::TraversalError,
    transform::TransformationMatrix, traverse::TraversalScope,
    validate::NodeView,
};
use std::collections::HashMap;

mod geometry;

pub use geometry::{coordinate_actions, to_geom_actions};

/// Everything an [`Action`] may look at
pub struct ActionInput<'a, T> {
    /// Validated view of the node
    pub view: NodeView<'a>,
    /// Results of the traversed children, tagged with their field name
    pub children: Vec<(&'static str, ConversionContext<T>)>,
    /// Whether the node sits below a `Shape`
    pub is_shape_descendant: bool,
    /// Accumulated transform at this node
    pub transform: TransformationMatrix,
    /// Document and settings of the running traversal
    pub scope: TraversalScope<'a>,
}

impl<T> ActionInput<'_, T> {
    /// Merges every child result, in traversal order
    pub fn merge_children(&mut self) -> ConversionContext<T> {
        std::mem::take(&mut self.children)
            .into_iter()
            .map(|(_, c)| c)
            .collect()
    }

    /// Merges the child results of a single field
    pub fn take(&mut self, field: &str) -> ConversionContext<T> {
        let (out, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.children)
            .into_iter()
            .partition(|(name, _)| *name == field);
        self.children = rest;
        out.into_iter().map(|(_, c)| c).collect()
    }
}

/// Synthesis function for a single node type
pub type Action<T> = Box<
    dyn Fn(ActionInput<'_, T>) -> Result<ConversionContext<T>, TraversalError>
        + Send
        + Sync,
>;

/// Map from canonical node names to actions
pub struct ActionMap<T> {
    actions: HashMap<&'static str, Action<T>>,
}

impl<T> Default for ActionMap<T> {
    fn default() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }
}

impl<T> ActionMap<T> {
    /// Builds an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action, replacing any previous one for `node`
    pub fn insert<F>(&mut self, node: &'static str, f: F)
    where
        F: Fn(ActionInput<'_, T>) -> Result<ConversionContext<T>, TraversalError>
            + Send
            + Sync
            + 'static,
    {
        self.actions.insert(node, Box::new(f));
    }

    /// Registers an action (builder-style)
    pub fn with<F>(mut self, node: &'static str, f: F) -> Self
    where
        F: Fn(ActionInput<'_, T>) -> Result<ConversionContext<T>, TraversalError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(node, f);
        self
    }

    /// Checks whether an action is registered for `node`
    pub fn contains(&self, node: &str) -> bool {
        self.actions.contains_key(node)
    }

    /// Runs the action registered for the input's node
    ///
    /// Nodes without an action produce an empty context.
    pub fn apply(
        &self,
        input: ActionInput<'_, T>,
    ) -> Result<ConversionContext<T>, TraversalError> {
        match self.actions.get(input.view.header()) {
            Some(f) => f(input),
            None => Ok(ConversionContext::new()),
        }
    }
}

/// Action which concatenates every child result
pub fn merge_children<T>(
    mut input: ActionInput<'_, T>,
) -> Result<ConversionContext<T>, TraversalError> {
    Ok(input.merge_children())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::Config,
        parser::{ParsedFile, parse_str},
        schema::{Catalog, Synonyms},
        validate::validate,
    };

    fn children() -> Vec<(&'static str, ConversionContext<i32>)> {
        vec![
            ("children", ConversionContext::from(1)),
            ("proxy", ConversionContext::from(2)),
            ("children", [3, 4].into_iter().collect()),
        ]
    }

    fn with_input<R>(f: impl FnOnce(ActionInput<'_, i32>) -> R) -> R {
        let parsed: ParsedFile = parse_str("#VRML V2.0 utf8\nGroup {}").unwrap();
        let catalog = Catalog::standard();
        let synonyms = Synonyms::new();
        let config = Config::default();
        let root = parsed.document.roots()[0];
        let desc = catalog.get("Group").unwrap();
        let view =
            validate(&parsed.document, root, &parsed.aliases, desc).unwrap();
        f(ActionInput {
            view,
            children: children(),
            is_shape_descendant: false,
            transform: TransformationMatrix::identity(),
            scope: TraversalScope {
                document: &parsed.document,
                aliases: &parsed.aliases,
                catalog: &catalog,
                synonyms: &synonyms,
                config: &config,
            },
        })
    }

    #[test]
    fn test_take() {
        with_input(|mut input| {
            let c = input.take("children");
            assert_eq!(c.into_inner(), vec![1, 3, 4]);
            assert_eq!(input.children.len(), 1);
            assert_eq!(input.merge_children().into_inner(), vec![2]);
            assert!(input.children.is_empty());
        });
    }

    #[test]
    fn test_apply() {
        let empty = ActionMap::<i32>::new();
        assert!(!empty.contains("Group"));
        let out = with_input(|input| empty.apply(input)).unwrap();
        assert!(out.is_empty());

        let map = ActionMap::new().with("Group", merge_children);
        assert!(map.contains("Group"));
        let out = with_input(|input| map.apply(input)).unwrap();
        assert_eq!(out.into_inner(), vec![1, 2, 3, 4]);

        let map = ActionMap::new().with("Group", |input: ActionInput<'_, i32>| {
            Ok(ConversionContext::from(input.children.len() as i32))
        });
        let out = with_input(|input| map.apply(input)).unwrap();
        assert_eq!(out.into_inner(), vec![3]);
    }
}
