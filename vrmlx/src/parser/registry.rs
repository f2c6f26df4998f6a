//! `DEF` name lookup
use super::model::{Document, FieldValue, NodeId, NodeRef};
use log::warn;
use std::collections::HashMap;

/// Map from `DEF` names to the nodes which declared them
///
/// The registry is filled by a single pre-order walk over the document and is
/// read-only afterwards.  If a name is declared more than once, the first
/// declaration in document order wins and later ones are ignored with a
/// warning.
#[derive(Clone, Debug, Default)]
pub struct AliasRegistry {
    map: HashMap<String, NodeId>,
}

impl AliasRegistry {
    /// Builds an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks every node reachable from the document roots
    pub fn populate(doc: &Document) -> Self {
        let mut out = Self::new();
        for &root in doc.roots() {
            out.visit(doc, root);
        }
        out
    }

    fn visit(&mut self, doc: &Document, id: NodeId) {
        let node = &doc[id];
        if let Some(alias) = &node.alias {
            self.declare(alias, id);
        }
        for f in &node.fields {
            match &f.value {
                FieldValue::Node(child) => self.visit(doc, *child),
                FieldValue::NodeArray(entries) => {
                    for e in entries {
                        if let NodeRef::Node(child) = e {
                            self.visit(doc, *child);
                        }
                    }
                }
                _ => (),
            }
        }
    }

    /// Records a declaration, keeping the existing one on collision
    ///
    /// Returns `true` if the name was newly registered.
    pub fn declare(&mut self, alias: &str, id: NodeId) -> bool {
        if let Some(prev) = self.map.get(alias) {
            warn!(
                "node name <{alias}> is declared more than once; keeping the \
                 first declaration ({prev:?}) and ignoring {id:?}"
            );
            return false;
        }
        self.map.insert(alias.to_owned(), id);
        true
    }

    /// Looks up a `DEF` name
    pub fn resolve(&self, alias: &str) -> Option<NodeId> {
        self.map.get(alias).copied()
    }

    /// Returns the number of registered names
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Checks whether no names are registered
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
