//! Recursive walk over the scene tree
//!
//! A [`Traversor`] pairs the read-only state of one conversion (a
//! [`TraversalScope`]) with an [`ActionMap`].  Each visited node is
//! canonicalized, validated, and handed to the handler for its node type,
//! which decides which children to visit and with what state; the node's
//! action then combines the results.
use crate::{
    action::{ActionInput, ActionMap},
    config::Config,
    context::ConversionContext,
    error::TraversalError,
    parser::{AliasRegistry, Document, NodeId},
    schema::{Catalog, NodeDescriptor, Synonyms},
    transform::TransformationMatrix,
    validate::{NodeView, validate},
};
use log::{debug, info};
use std::cell::RefCell;

mod handler;

use handler::Handler;

/// Read-only state shared by every step of a traversal
///
/// The catalog should already be widened with the same synonyms (see
/// [`Catalog::with_synonyms`]), so that header checks accept them.
#[derive(Copy, Clone)]
pub struct TraversalScope<'a> {
    /// Node arena
    pub document: &'a Document,
    /// `DEF` names of the document
    pub aliases: &'a AliasRegistry,
    /// Descriptors of every supported node type
    pub catalog: &'a Catalog,
    /// Alternate header spellings
    pub synonyms: &'a Synonyms,
    /// Conversion settings
    pub config: &'a Config,
}

/// Walks a document, producing a [`ConversionContext`] of `T`
pub struct Traversor<'a, T> {
    scope: TraversalScope<'a>,
    actions: &'a ActionMap<T>,
    /// Nodes between the root and the node being visited
    path: RefCell<Vec<NodeId>>,
}

impl<'a, T> Traversor<'a, T> {
    /// Builds a traversor over the given scope
    pub fn new(scope: TraversalScope<'a>, actions: &'a ActionMap<T>) -> Self {
        Self {
            scope,
            actions,
            path: RefCell::new(vec![]),
        }
    }

    /// Returns the traversal scope
    pub fn scope(&self) -> TraversalScope<'a> {
        self.scope
    }

    /// Traverses every root node of the document
    ///
    /// Roots start at the identity transform, outside of any shape; their
    /// results are merged in document order.
    pub fn traverse_file(&self) -> Result<ConversionContext<T>, TraversalError> {
        let start = std::time::Instant::now();
        let mut out = ConversionContext::new();
        let roots = self.scope.document.roots();
        for (index, &root) in roots.iter().enumerate() {
            let c = self
                .traverse(root, false, TransformationMatrix::identity())
                .map_err(|e| TraversalError::FileTraversal {
                    index,
                    source: Box::new(e),
                })?;
            out.merge(c);
        }
        info!(
            "traversed {} root node(s) into {} item(s) in {:?}",
            roots.len(),
            out.len(),
            start.elapsed()
        );
        Ok(out)
    }

    /// Traverses a single node and its descendants
    ///
    /// Reaching a node which is already on the current path (a `USE` of an
    /// enclosing `DEF`) fails with [`TraversalError::CyclicUseNode`].
    pub fn traverse(
        &self,
        node: NodeId,
        is_shape_descendant: bool,
        transform: TransformationMatrix,
    ) -> Result<ConversionContext<T>, TraversalError> {
        let header = &self.scope.document[node].header;
        if header.is_empty() {
            return Ok(ConversionContext::new());
        }
        let canonical = self.scope.synonyms.canonical(header);
        let Some(desc) = self.scope.catalog.get(canonical) else {
            if self.scope.config.ignore_unknown_node {
                info!("ignoring unknown node <{header}>");
                return Ok(ConversionContext::new());
            }
            return Err(TraversalError::UnknownVrmlNode(header.clone()));
        };
        if self.path.borrow().contains(&node) {
            let alias = self.scope.document[node].alias.as_ref();
            return Err(TraversalError::CyclicUseNode {
                alias: alias.unwrap_or(header).clone(),
            });
        }
        self.path.borrow_mut().push(node);
        let out = self.visit(node, desc, is_shape_descendant, transform);
        self.path.borrow_mut().pop();
        out.map_err(|e| TraversalError::in_node(header, e))
    }

    fn visit(
        &self,
        node: NodeId,
        desc: &'a NodeDescriptor,
        is_shape_descendant: bool,
        transform: TransformationMatrix,
    ) -> Result<ConversionContext<T>, TraversalError> {
        let view = validate(self.scope.document, node, self.scope.aliases, desc)?;
        debug!("handling node <{}> ({node:?})", desc.id());
        Handler::for_node(desc.id()).handle(
            self,
            view,
            is_shape_descendant,
            transform,
        )
    }

    /// Passes a node's view and child results to its action
    fn act(
        &self,
        view: NodeView<'a>,
        children: Vec<(&'static str, ConversionContext<T>)>,
        is_shape_descendant: bool,
        transform: TransformationMatrix,
    ) -> Result<ConversionContext<T>, TraversalError> {
        self.actions.apply(ActionInput {
            view,
            children,
            is_shape_descendant,
            transform,
            scope: self.scope,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        action::to_geom_actions,
        error::ValidationError,
        parser::{ParsedFile, parse_str},
        task::MeshTask,
    };

    struct Fixture {
        parsed: ParsedFile,
        catalog: Catalog,
        synonyms: Synonyms,
        config: Config,
        actions: ActionMap<MeshTask>,
    }

    impl Fixture {
        fn new(body: &str) -> Self {
            let synonyms = Synonyms::new().with_vrml_prefix();
            Self {
                parsed: parse_str(&format!("#VRML V2.0 utf8\n{body}")).unwrap(),
                catalog: Catalog::standard().with_synonyms(&synonyms),
                synonyms,
                config: Config::default(),
                actions: to_geom_actions(),
            }
        }

        fn run(&self) -> Result<ConversionContext<MeshTask>, TraversalError> {
            let scope = TraversalScope {
                document: &self.parsed.document,
                aliases: &self.parsed.aliases,
                catalog: &self.catalog,
                synonyms: &self.synonyms,
                config: &self.config,
            };
            Traversor::new(scope, &self.actions).traverse_file()
        }
    }

    #[test]
    fn test_box_needs_shape() {
        let f = Fixture::new("Box {}");
        assert_eq!(f.run().unwrap().len(), 0);
        let f = Fixture::new("Shape { geometry Box {} }");
        assert_eq!(f.run().unwrap().len(), 1);
        let f = Fixture::new("Group { children [ Shape { geometry Box {} } ] }");
        assert_eq!(f.run().unwrap().len(), 1);
    }

    #[test]
    fn test_synonyms() {
        let f = Fixture::new(
            "VRMLGroup { children VRMLShape { geometry VRMLBox {} } }",
        );
        assert_eq!(f.run().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_node() {
        let mut f = Fixture::new("Group { children [ Frobnicator {} ] }");
        let e = f.run().unwrap_err();
        let TraversalError::FileTraversal { index: 0, source } = e else {
            panic!("unexpected error {e:?}");
        };
        let TraversalError::NodeTraversal { header, source } = *source else {
            panic!("missing node context");
        };
        assert_eq!(header, "Group");
        assert!(matches!(*source, TraversalError::UnknownVrmlNode(ref h) if h == "Frobnicator"));

        f.config.ignore_unknown_node = true;
        assert_eq!(f.run().unwrap().len(), 0);
    }

    #[test]
    fn test_validation_error_is_wrapped() {
        let f = Fixture::new("Shape { geometry Box { radius 1 } }");
        let e = f.run().unwrap_err();
        let root = crate::error::innermost(&e);
        let v = root.downcast_ref::<ValidationError>().unwrap();
        assert!(matches!(v, ValidationError::InvalidFieldName { .. }));
        let chain = crate::error::chain(&e);
        assert!(chain.contains("<Shape>"));
        assert!(chain.contains("<Box>"));
    }

    #[test]
    fn test_cyclic_use() {
        let f = Fixture::new("DEF A Group { children [ USE A ] }");
        let e = f.run().unwrap_err();
        assert!(matches!(
            crate::error::innermost(&e).downcast_ref::<TraversalError>(),
            Some(TraversalError::CyclicUseNode { alias }) if alias == "A"
        ));

        let f = Fixture::new(
            "DEF A Transform {
                children [
                    Shape { geometry Box {} }
                    DEF B Group { children [ USE A ] }
                ]
            }",
        );
        assert!(f.run().is_err());

        // Reuse of a sibling is not a cycle
        let f = Fixture::new(
            "DEF S Shape { geometry Box {} }
            Group { children [ USE S, Group { children [ USE S ] } ] }",
        );
        assert_eq!(f.run().unwrap().len(), 3);
    }

    #[test]
    fn test_switch() {
        for (which, n) in [(-1, 0), (0, 1), (1, 0), (2, 0), (7, 0)] {
            let f = Fixture::new(&format!(
                "Switch {{
                    whichChoice {which}
                    choice [
                        Shape {{ geometry Box {{}} }}
                        Group {{}}
                    ]
                }}"
            ));
            assert_eq!(f.run().unwrap().len(), n, "whichChoice {which}");
        }
        let f = Fixture::new("Switch { whichChoice 3 }");
        assert_eq!(f.run().unwrap().len(), 0);
    }

    #[test]
    fn test_deterministic() {
        let f = Fixture::new(
            "Transform {
                translation 1 0 0
                children [
                    Shape { geometry Box { size 1 2 3 } }
                    Shape { geometry Box {} }
                ]
            }",
        );
        let a: Vec<_> = f.run().unwrap().into_iter().map(|t| t.run()).collect();
        let b: Vec<_> = f.run().unwrap().into_iter().map(|t| t.run()).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }
}
