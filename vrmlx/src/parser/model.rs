//! Generic scene tree produced by the grammar
//!
//! Nodes are stored in a [`Document`] arena and addressed by [`NodeId`];
//! fields hold a [`FieldValue`], which is agnostic to any node descriptor.
use std::borrow::Cow;

/// Two-component vector
pub type Vec2f = nalgebra::Vector2<f32>;
/// Three-component vector
pub type Vec3f = nalgebra::Vector3<f32>;
/// Four-component vector (typically an axis-angle rotation)
pub type Vec4f = nalgebra::Vector4<f32>;

/// Index of a node within a [`Document`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    /// Node with an empty header, present in every [`Document`]
    ///
    /// This is the value of absent node-typed fields; traversing it produces
    /// nothing.
    pub const EMPTY: NodeId = NodeId(0);
}

impl From<usize> for NodeId {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

impl From<NodeId> for usize {
    fn from(v: NodeId) -> Self {
        v.0
    }
}

/// Entry in a node array: either an inline node or a `USE` reference
#[derive(Clone, Debug, PartialEq)]
pub enum NodeRef {
    /// Node declared inline
    Node(NodeId),
    /// Reference to a `DEF`'d node
    Use(String),
}

/// Discriminant of a [`FieldValue`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, strum::Display)]
pub enum FieldKind {
    /// Quoted string
    String,
    /// Array of quoted strings
    StringArray,
    /// `TRUE` or `FALSE`
    Bool,
    /// 32-bit float
    Float,
    /// 32-bit int
    Int,
    /// Two floats
    Vec2f,
    /// Three floats
    Vec3f,
    /// Four floats
    Vec4f,
    /// Flat array of floats
    FloatArray,
    /// Array of two-float tuples
    Vec2fArray,
    /// Array of three-float tuples
    Vec3fArray,
    /// Array of 32-bit ints
    Int32Array,
    /// Child node
    Node,
    /// `USE` reference
    Use,
    /// Array of child nodes or `USE` references
    NodeArray,
}

/// Payload of a single field
///
/// The grammar cannot always tell which type a literal is meant to have: `5`
/// is an int, `5.0` is a float, and a bracketed list of numbers is grouped by
/// its commas.  The `as_*` accessors reinterpret values on demand, e.g.
/// [`as_float`](Self::as_float) accepts an int and
/// [`as_int32_array`](Self::as_int32_array) accepts any integral numeric
/// array.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Quoted string
    String(String),
    /// Array of quoted strings
    StringArray(Vec<String>),
    /// Boolean
    Bool(bool),
    /// Float
    Float(f32),
    /// Int
    Int(i32),
    /// Two floats
    Vec2f(Vec2f),
    /// Three floats
    Vec3f(Vec3f),
    /// Four floats
    Vec4f(Vec4f),
    /// Flat array of floats
    FloatArray(Vec<f32>),
    /// Array of two-float tuples
    Vec2fArray(Vec<Vec2f>),
    /// Array of three-float tuples
    Vec3fArray(Vec<Vec3f>),
    /// Array of ints
    Int32Array(Vec<i32>),
    /// Child node
    Node(NodeId),
    /// `USE` reference
    Use(String),
    /// Array of child nodes or `USE` references
    NodeArray(Vec<NodeRef>),
}

impl FieldValue {
    /// Returns the discriminant of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::String(..) => FieldKind::String,
            FieldValue::StringArray(..) => FieldKind::StringArray,
            FieldValue::Bool(..) => FieldKind::Bool,
            FieldValue::Float(..) => FieldKind::Float,
            FieldValue::Int(..) => FieldKind::Int,
            FieldValue::Vec2f(..) => FieldKind::Vec2f,
            FieldValue::Vec3f(..) => FieldKind::Vec3f,
            FieldValue::Vec4f(..) => FieldKind::Vec4f,
            FieldValue::FloatArray(..) => FieldKind::FloatArray,
            FieldValue::Vec2fArray(..) => FieldKind::Vec2fArray,
            FieldValue::Vec3fArray(..) => FieldKind::Vec3fArray,
            FieldValue::Int32Array(..) => FieldKind::Int32Array,
            FieldValue::Node(..) => FieldKind::Node,
            FieldValue::Use(..) => FieldKind::Use,
            FieldValue::NodeArray(..) => FieldKind::NodeArray,
        }
    }

    /// Checks whether this is an array of any kind with no items
    ///
    /// `[]` is parsed as an empty [`FieldValue::Vec3fArray`], but must be
    /// usable wherever any other array kind is expected.
    pub fn is_empty_array(&self) -> bool {
        match self {
            FieldValue::StringArray(v) => v.is_empty(),
            FieldValue::FloatArray(v) => v.is_empty(),
            FieldValue::Vec2fArray(v) => v.is_empty(),
            FieldValue::Vec3fArray(v) => v.is_empty(),
            FieldValue::Int32Array(v) => v.is_empty(),
            FieldValue::NodeArray(v) => v.is_empty(),
            _ => false,
        }
    }

    /// Returns a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a float, converting from an int if needed
    pub fn as_float(&self) -> Option<f32> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    /// Returns an int, converting from a whole-number float if needed
    pub fn as_int(&self) -> Option<i32> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Float(f) => integral(*f),
            _ => None,
        }
    }

    /// Returns a string; a single-item string array is also accepted
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            FieldValue::StringArray(v) if v.len() == 1 => Some(&v[0]),
            _ => None,
        }
    }

    /// Returns a string array, promoting a single string if needed
    pub fn as_string_array(&self) -> Option<Cow<'_, [String]>> {
        match self {
            FieldValue::StringArray(v) => Some(Cow::Borrowed(v)),
            FieldValue::String(s) => Some(Cow::Owned(vec![s.clone()])),
            _ if self.is_empty_array() => Some(Cow::Owned(vec![])),
            _ => None,
        }
    }

    /// Returns a two-component vector
    pub fn as_vec2f(&self) -> Option<Vec2f> {
        match self {
            FieldValue::Vec2f(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a three-component vector
    pub fn as_vec3f(&self) -> Option<Vec3f> {
        match self {
            FieldValue::Vec3f(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a four-component vector
    pub fn as_vec4f(&self) -> Option<Vec4f> {
        match self {
            FieldValue::Vec4f(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns every number of a numeric array, flattened in document order
    pub fn as_float_array(&self) -> Option<Cow<'_, [f32]>> {
        match self {
            FieldValue::FloatArray(v) => Some(Cow::Borrowed(v)),
            FieldValue::Int32Array(v) => {
                Some(Cow::Owned(v.iter().map(|i| *i as f32).collect()))
            }
            FieldValue::Vec2fArray(v) => {
                Some(Cow::Owned(v.iter().flat_map(|p| [p.x, p.y]).collect()))
            }
            FieldValue::Vec3fArray(v) => Some(Cow::Owned(
                v.iter().flat_map(|p| [p.x, p.y, p.z]).collect(),
            )),
            _ if self.is_empty_array() => Some(Cow::Owned(vec![])),
            _ => None,
        }
    }

    /// Returns an int array
    ///
    /// Any numeric array is accepted if every number in it is integral; this
    /// makes `[0 1 2, 2 3 0]` (parsed as a [`FieldValue::Vec3fArray`]) usable
    /// as an index list.
    pub fn as_int32_array(&self) -> Option<Cow<'_, [i32]>> {
        match self {
            FieldValue::Int32Array(v) => Some(Cow::Borrowed(v)),
            _ => {
                let flat = self.as_float_array()?;
                flat.iter()
                    .map(|f| integral(*f))
                    .collect::<Option<Vec<_>>>()
                    .map(Cow::Owned)
            }
        }
    }

    /// Returns an array of two-component vectors
    ///
    /// Flat numeric arrays are regrouped if their length is even.
    pub fn as_vec2f_array(&self) -> Option<Cow<'_, [Vec2f]>> {
        match self {
            FieldValue::Vec2fArray(v) => Some(Cow::Borrowed(v)),
            _ => {
                let flat = self.as_float_array()?;
                (flat.len() % 2 == 0).then(|| {
                    Cow::Owned(
                        flat.chunks_exact(2)
                            .map(|c| Vec2f::new(c[0], c[1]))
                            .collect(),
                    )
                })
            }
        }
    }

    /// Returns an array of three-component vectors
    ///
    /// Flat numeric arrays are regrouped if their length is a multiple of 3.
    pub fn as_vec3f_array(&self) -> Option<Cow<'_, [Vec3f]>> {
        match self {
            FieldValue::Vec3fArray(v) => Some(Cow::Borrowed(v)),
            _ => {
                let flat = self.as_float_array()?;
                (flat.len() % 3 == 0).then(|| {
                    Cow::Owned(
                        flat.chunks_exact(3)
                            .map(|c| Vec3f::new(c[0], c[1], c[2]))
                            .collect(),
                    )
                })
            }
        }
    }

    /// Returns a node array; a single node or `USE` is promoted
    pub fn as_node_array(&self) -> Option<Cow<'_, [NodeRef]>> {
        match self {
            FieldValue::NodeArray(v) => Some(Cow::Borrowed(v)),
            FieldValue::Node(n) => Some(Cow::Owned(vec![NodeRef::Node(*n)])),
            FieldValue::Use(s) => Some(Cow::Owned(vec![NodeRef::Use(s.clone())])),
            _ if self.is_empty_array() => Some(Cow::Owned(vec![])),
            _ => None,
        }
    }

    /// Reinterprets this value as the given kind, if possible
    ///
    /// Returns a borrowed value when no conversion is needed.  Node-typed
    /// kinds are never converted here; they need alias resolution, which is
    /// the validator's job.
    pub fn coerce(&self, kind: FieldKind) -> Option<Cow<'_, FieldValue>> {
        if self.kind() == kind {
            return Some(Cow::Borrowed(self));
        }
        let v = match kind {
            FieldKind::String => FieldValue::String(self.as_str()?.to_owned()),
            FieldKind::StringArray => {
                FieldValue::StringArray(self.as_string_array()?.into_owned())
            }
            FieldKind::Float => FieldValue::Float(self.as_float()?),
            FieldKind::Int => FieldValue::Int(self.as_int()?),
            FieldKind::FloatArray => {
                FieldValue::FloatArray(self.as_float_array()?.into_owned())
            }
            FieldKind::Vec2fArray => {
                FieldValue::Vec2fArray(self.as_vec2f_array()?.into_owned())
            }
            FieldKind::Vec3fArray => {
                FieldValue::Vec3fArray(self.as_vec3f_array()?.into_owned())
            }
            FieldKind::Int32Array => {
                FieldValue::Int32Array(self.as_int32_array()?.into_owned())
            }
            FieldKind::Bool
            | FieldKind::Vec2f
            | FieldKind::Vec3f
            | FieldKind::Vec4f
            | FieldKind::Node
            | FieldKind::Use
            | FieldKind::NodeArray => return None,
        };
        Some(Cow::Owned(v))
    }
}

/// Converts a whole-number float into an int
fn integral(f: f32) -> Option<i32> {
    (f.fract() == 0.0 && f >= i32::MIN as f32 && f <= i32::MAX as f32)
        .then_some(f as i32)
}

/// Named field of a [`TreeNode`]
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field payload
    pub value: FieldValue,
}

/// Single node of the scene tree
///
/// Fields are kept in document order; duplicates are preserved so that the
/// validator can report them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeNode {
    /// Name given with `DEF`, if any
    pub alias: Option<String>,
    /// Node type as written in the document
    pub header: String,
    /// Fields in document order
    pub fields: Vec<Field>,
}

impl TreeNode {
    /// Returns the first field with the given name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Arena holding every node of a parsed file
///
/// Slot 0 always holds an empty node ([`NodeId::EMPTY`]).
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            nodes: vec![TreeNode::default()],
            roots: vec![],
        }
    }
}

impl Document {
    /// Builds an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a node in the arena, returning its index
    ///
    /// The node is not attached as a root; use [`Document::push_root`] for
    /// that.
    pub fn insert(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId::from(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Stores a node in the arena and appends it to the root list
    pub fn push_root(&mut self, node: TreeNode) -> NodeId {
        let id = self.insert(node);
        self.roots.push(id);
        id
    }

    /// Returns the root nodes, in document order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Looks up a node by index
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(usize::from(id))
    }

    /// Returns the number of nodes in the arena, excluding the empty node
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Checks whether the arena holds any nodes besides the empty node
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::ops::Index<NodeId> for Document {
    type Output = TreeNode;
    fn index(&self, i: NodeId) -> &TreeNode {
        &self.nodes[usize::from(i)]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_int_float_reinterpretation() {
        assert_eq!(FieldValue::Int(5).as_float(), Some(5.0));
        assert_eq!(FieldValue::Float(5.0).as_int(), Some(5));
        assert_eq!(FieldValue::Float(5.5).as_int(), None);
        assert_eq!(FieldValue::Bool(true).as_float(), None);
    }

    #[test]
    fn test_empty_array_reinterpretation() {
        let empty = FieldValue::Vec3fArray(vec![]);
        assert!(empty.as_int32_array().unwrap().is_empty());
        assert!(empty.as_vec2f_array().unwrap().is_empty());
        assert!(empty.as_node_array().unwrap().is_empty());
        assert!(empty.as_string_array().unwrap().is_empty());

        let v = empty.coerce(FieldKind::Int32Array).unwrap();
        assert_eq!(*v, FieldValue::Int32Array(vec![]));
    }

    #[test]
    fn test_array_regrouping() {
        let v = FieldValue::Vec3fArray(vec![
            Vec3f::new(0.0, 1.0, 2.0),
            Vec3f::new(-1.0, 2.0, 3.0),
        ]);
        assert_eq!(
            v.as_int32_array().unwrap().as_ref(),
            &[0, 1, 2, -1, 2, 3]
        );
        assert_eq!(v.as_vec2f_array().unwrap().len(), 3);

        let v = FieldValue::Int32Array(vec![0, 0, 0, 1, 0, 0]);
        let points = v.as_vec3f_array().unwrap();
        assert_eq!(points.as_ref(), &[Vec3f::zeros(), Vec3f::x()]);

        let v = FieldValue::FloatArray(vec![0.5, 1.0, 2.0, 3.0]);
        assert!(v.as_vec3f_array().is_none());
        assert!(v.as_int32_array().is_none());
    }

    #[test]
    fn test_coerce_borrows_when_possible() {
        let v = FieldValue::Int32Array(vec![1, 2, 3]);
        assert!(matches!(
            v.coerce(FieldKind::Int32Array),
            Some(Cow::Borrowed(..))
        ));
        assert!(v.coerce(FieldKind::Bool).is_none());
        assert!(FieldValue::Node(NodeId::EMPTY)
            .coerce(FieldKind::NodeArray)
            .is_none());
    }

    #[test]
    fn test_document_empty_slot() {
        let mut doc = Document::new();
        assert!(doc.is_empty());
        assert!(doc[NodeId::EMPTY].header.is_empty());
        let id = doc.push_root(TreeNode {
            header: "Group".to_owned(),
            ..Default::default()
        });
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.roots(), &[id]);
        assert_eq!(doc[id].header, "Group");
    }
}
