//! Node descriptors and the catalog of supported node types
//!
//! A [`NodeDescriptor`] declares, for one node type, the name, kind, and
//! default of every field.  The [`Catalog`] maps canonical node names to
//! descriptors; [`Synonyms`] maps alternate header spellings to canonical
//! names.
use crate::parser::{FieldKind, FieldValue, NodeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

mod catalog;
mod synonyms;

pub use catalog::NODE_NAMES;
pub use synonyms::Synonyms;

/// Schema for a single field
#[derive(Clone, Debug)]
pub struct FieldSchema {
    kind: FieldKind,
    default: FieldValue,
    allowed_headers: BTreeSet<String>,
    allowed_values: Vec<&'static str>,
}

impl FieldSchema {
    /// Builds a schema whose kind is that of its default value
    pub fn value(default: FieldValue) -> Self {
        Self {
            kind: default.kind(),
            default,
            allowed_headers: BTreeSet::new(),
            allowed_values: vec![],
        }
    }

    /// Builds a string schema
    pub fn string(default: &str) -> Self {
        Self::value(FieldValue::String(default.to_owned()))
    }

    /// Builds a single-node schema, accepting the given headers
    ///
    /// The default is [`NodeId::EMPTY`].
    pub fn node(allowed: &[&str]) -> Self {
        Self {
            kind: FieldKind::Node,
            default: FieldValue::Node(NodeId::EMPTY),
            allowed_headers: allowed.iter().map(|s| s.to_string()).collect(),
            allowed_values: vec![],
        }
    }

    /// Builds a node-array schema, accepting any header
    pub fn nodes() -> Self {
        Self {
            kind: FieldKind::NodeArray,
            default: FieldValue::NodeArray(vec![]),
            allowed_headers: BTreeSet::new(),
            allowed_values: vec![],
        }
    }

    /// Restricts a string field to the given values
    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.allowed_values = values.to_vec();
        self
    }

    /// Kind the field must have
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Value used when the field is absent
    pub fn default_value(&self) -> &FieldValue {
        &self.default
    }

    /// Headers accepted by a node-typed field
    ///
    /// An empty set accepts any header.
    pub fn allowed_headers(&self) -> &BTreeSet<String> {
        &self.allowed_headers
    }

    /// Values accepted by a string field; empty accepts anything
    pub fn allowed_values(&self) -> &[&'static str] {
        &self.allowed_values
    }

    /// Checks whether a node with the given header may fill this field
    pub fn accepts_header(&self, header: &str) -> bool {
        self.allowed_headers.is_empty() || self.allowed_headers.contains(header)
    }
}

/// Schema for one node type
#[derive(Clone, Debug)]
pub struct NodeDescriptor {
    id: &'static str,
    aliases: BTreeSet<String>,
    fields: BTreeMap<&'static str, FieldSchema>,
    check_header: bool,
}

impl NodeDescriptor {
    /// Builds a descriptor with no fields
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            aliases: BTreeSet::new(),
            fields: BTreeMap::new(),
            check_header: true,
        }
    }

    /// Adds a field (builder-style)
    pub fn field(mut self, name: &'static str, schema: FieldSchema) -> Self {
        self.fields.insert(name, schema);
        self
    }

    /// Adds a field with the given default value (builder-style)
    pub fn with(self, name: &'static str, default: FieldValue) -> Self {
        self.field(name, FieldSchema::value(default))
    }

    /// Disables header checking during validation
    pub fn without_header_check(mut self) -> Self {
        self.check_header = false;
        self
    }

    /// Canonical node name
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Alternate header spellings accepted for this node
    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// Whether validation checks the node header against this descriptor
    pub fn check_header(&self) -> bool {
        self.check_header
    }

    /// Checks whether a header names this descriptor
    pub fn accepts_header(&self, header: &str) -> bool {
        header == self.id || self.aliases.contains(header)
    }

    /// Looks up a field schema by name
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Looks up a field schema by name, returning its interned name too
    pub fn entry(&self, name: &str) -> Option<(&'static str, &FieldSchema)> {
        self.fields.get_key_value(name).map(|(k, v)| (*k, v))
    }

    /// Iterates over `(name, schema)` pairs, sorted by name
    pub fn fields(
        &self,
    ) -> impl Iterator<Item = (&'static str, &FieldSchema)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Map from canonical node names to their descriptors
///
/// The catalog is an ordinary value: build it once, then pass it by reference
/// to everything that needs it.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    nodes: HashMap<&'static str, NodeDescriptor>,
}

impl Catalog {
    /// Builds an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the catalog of every supported node type
    pub fn standard() -> Self {
        let mut out = Self::new();
        for d in catalog::descriptors() {
            out.insert(d);
        }
        out
    }

    /// Adds or replaces a descriptor
    pub fn insert(&mut self, desc: NodeDescriptor) {
        self.nodes.insert(desc.id, desc);
    }

    /// Looks up a descriptor by canonical name
    pub fn get(&self, canonical: &str) -> Option<&NodeDescriptor> {
        self.nodes.get(canonical)
    }

    /// Returns the number of descriptors
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Widens every header check to accept synonyms
    ///
    /// Each descriptor learns the synonyms of its own name, and each
    /// node-typed field learns the synonyms of the headers it allows.
    pub fn with_synonyms(mut self, synonyms: &Synonyms) -> Self {
        for desc in self.nodes.values_mut() {
            desc.aliases
                .extend(synonyms.synonyms_of(desc.id).map(str::to_owned));
            for schema in desc.fields.values_mut() {
                let extra: Vec<String> = schema
                    .allowed_headers
                    .iter()
                    .flat_map(|h| synonyms.synonyms_of(h))
                    .map(str::to_owned)
                    .collect();
                schema.allowed_headers.extend(extra);
            }
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let c = Catalog::standard();
        assert_eq!(c.len(), NODE_NAMES.len());
        for name in NODE_NAMES {
            let d = c.get(name).unwrap();
            assert_eq!(d.id(), name);
        }
        let b = c.get("Box").unwrap();
        assert_eq!(b.get("size").unwrap().kind(), FieldKind::Vec3f);
        assert!(b.get("radius").is_none());
    }

    #[test]
    fn test_with_synonyms() {
        let mut s = Synonyms::new();
        s.insert("VRMLShape", "Shape");
        s.insert("Cube", "Box");
        let c = Catalog::standard().with_synonyms(&s);

        let shape = c.get("Shape").unwrap();
        assert!(shape.accepts_header("Shape"));
        assert!(shape.accepts_header("VRMLShape"));
        assert!(!shape.accepts_header("Group"));

        let geometry = shape.get("geometry").unwrap();
        assert!(geometry.accepts_header("Box"));
        assert!(geometry.accepts_header("Cube"));
        assert!(!geometry.accepts_header("Group"));
    }

    #[test]
    fn test_node_array_accepts_anything() {
        let c = Catalog::standard();
        let children = c.get("Group").unwrap().get("children").unwrap();
        assert_eq!(children.kind(), FieldKind::NodeArray);
        assert!(children.accepts_header("Whatever"));
    }
}
