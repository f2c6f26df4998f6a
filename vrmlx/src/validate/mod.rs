//! Checks a raw tree node against its descriptor
//!
//! [`validate`] produces a [`NodeView`]: a read-only projection in which every
//! field declared by the descriptor is bound, either to the value found in the
//! document (reinterpreted as the declared kind, with `USE` references
//! resolved) or to the declared default.
use crate::{
    error::ValidationError,
    parser::{
        AliasRegistry, Document, FieldKind, FieldValue, NodeId, NodeRef, Vec2f,
        Vec3f, Vec4f,
    },
    schema::{FieldSchema, NodeDescriptor},
};
use std::{borrow::Cow, collections::BTreeMap};

/// Validated, typed view of a single node
///
/// Views are cheap to build; values that need no conversion are borrowed from
/// the [`Document`].
#[derive(Clone, Debug)]
pub struct NodeView<'a> {
    id: NodeId,
    header: &'static str,
    fields: BTreeMap<&'static str, Cow<'a, FieldValue>>,
}

impl<'a> NodeView<'a> {
    /// Index of the node in its document
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Canonical name of the node's descriptor
    pub fn header(&self) -> &'static str {
        self.header
    }

    /// Returns the raw bound value of a field
    ///
    /// # Panics
    /// If the field is not declared by the node's descriptor
    pub fn value(&self, name: &str) -> &FieldValue {
        match self.fields.get(name) {
            Some(v) => v,
            None => panic!(
                "field <{name}> is not bound in view of <{}>",
                self.header
            ),
        }
    }

    /// Reads a field as the given type
    ///
    /// # Panics
    /// If the field is not declared by the node's descriptor; asking for an
    /// undeclared field is a programming error, not a property of the input.
    pub fn get<'v, T: FromFieldValue<'v>>(
        &'v self,
        name: &str,
    ) -> Result<T, ValidationError> {
        let v = self.value(name);
        T::from_value(v).ok_or_else(|| ValidationError::InvalidFieldValueType {
            field: name.to_owned(),
            expected: T::KIND,
            found: v.kind(),
        })
    }
}

/// Conversion from a bound field value into a Rust type
pub trait FromFieldValue<'v>: Sized {
    /// Kind reported when the conversion fails
    const KIND: FieldKind;

    /// Performs the conversion
    fn from_value(v: &'v FieldValue) -> Option<Self>;
}

macro_rules! from_value {
    ($ty:ty, $kind:ident, $v:ident => $e:expr) => {
        impl<'v> FromFieldValue<'v> for $ty {
            const KIND: FieldKind = FieldKind::$kind;
            fn from_value($v: &'v FieldValue) -> Option<Self> {
                $e
            }
        }
    };
}

from_value!(bool, Bool, v => v.as_bool());
from_value!(f32, Float, v => v.as_float());
from_value!(i32, Int, v => v.as_int());
from_value!(Vec2f, Vec2f, v => v.as_vec2f());
from_value!(Vec3f, Vec3f, v => v.as_vec3f());
from_value!(Vec4f, Vec4f, v => v.as_vec4f());
from_value!(&'v str, String, v => v.as_str());
from_value!(&'v [String], StringArray, v => match v {
    FieldValue::StringArray(s) => Some(s.as_slice()),
    _ => None,
});
from_value!(&'v [f32], FloatArray, v => match v {
    FieldValue::FloatArray(s) => Some(s.as_slice()),
    _ => None,
});
from_value!(&'v [i32], Int32Array, v => match v {
    FieldValue::Int32Array(s) => Some(s.as_slice()),
    _ => None,
});
from_value!(&'v [Vec2f], Vec2fArray, v => match v {
    FieldValue::Vec2fArray(s) => Some(s.as_slice()),
    _ => None,
});
from_value!(&'v [Vec3f], Vec3fArray, v => match v {
    FieldValue::Vec3fArray(s) => Some(s.as_slice()),
    _ => None,
});
from_value!(NodeId, Node, v => match v {
    FieldValue::Node(id) => Some(*id),
    _ => None,
});
from_value!(Vec<NodeId>, NodeArray, v => match v {
    FieldValue::NodeArray(refs) => refs
        .iter()
        .map(|r| match r {
            NodeRef::Node(id) => Some(*id),
            NodeRef::Use(..) => None,
        })
        .collect(),
    _ => None,
});

////////////////////////////////////////////////////////////////////////////////

/// Validates a node against a descriptor
///
/// The descriptor's header check is skipped for [`NodeId::EMPTY`], so an
/// absent node yields a view bound entirely to defaults.
pub fn validate<'a>(
    doc: &'a Document,
    id: NodeId,
    aliases: &AliasRegistry,
    desc: &'a NodeDescriptor,
) -> Result<NodeView<'a>, ValidationError> {
    let node = &doc[id];
    if desc.check_header()
        && id != NodeId::EMPTY
        && !desc.accepts_header(&node.header)
    {
        return Err(ValidationError::InvalidHeader {
            expected: desc.id().to_owned(),
            found: node.header.clone(),
        });
    }

    let mut fields = BTreeMap::new();
    for f in &node.fields {
        let Some((name, schema)) = desc.entry(&f.name) else {
            return Err(ValidationError::InvalidFieldName {
                node: node.header.clone(),
                field: f.name.clone(),
            });
        };
        if fields.contains_key(name) {
            return Err(ValidationError::DuplicatedFieldName {
                node: node.header.clone(),
                field: f.name.clone(),
            });
        }
        let v = extract(doc, aliases, name, schema, &f.value)?;
        fields.insert(name, v);
    }
    for (name, schema) in desc.fields() {
        fields
            .entry(name)
            .or_insert_with(|| Cow::Borrowed(schema.default_value()));
    }
    Ok(NodeView {
        id,
        header: desc.id(),
        fields,
    })
}

/// Converts a single field value into its declared kind
fn extract<'a>(
    doc: &Document,
    aliases: &AliasRegistry,
    name: &str,
    schema: &FieldSchema,
    raw: &'a FieldValue,
) -> Result<Cow<'a, FieldValue>, ValidationError> {
    let mismatch = || ValidationError::InvalidFieldValueType {
        field: name.to_owned(),
        expected: schema.kind(),
        found: raw.kind(),
    };
    match schema.kind() {
        FieldKind::Node => {
            let id = match raw {
                FieldValue::Node(id) => *id,
                FieldValue::Use(alias) => resolve(aliases, name, alias)?,
                _ => return Err(mismatch()),
            };
            check_header(doc, name, schema, id)?;
            Ok(match raw {
                FieldValue::Node(..) => Cow::Borrowed(raw),
                _ => Cow::Owned(FieldValue::Node(id)),
            })
        }
        FieldKind::NodeArray => {
            let refs = raw.as_node_array().ok_or_else(mismatch)?;
            let mut out = Vec::with_capacity(refs.len());
            for r in refs.iter() {
                let id = match r {
                    NodeRef::Node(id) => *id,
                    NodeRef::Use(alias) => resolve(aliases, name, alias)?,
                };
                check_header(doc, name, schema, id)?;
                out.push(NodeRef::Node(id));
            }
            Ok(Cow::Owned(FieldValue::NodeArray(out)))
        }
        kind => {
            let v = raw.coerce(kind).ok_or_else(mismatch)?;
            let allowed = schema.allowed_values();
            if let FieldValue::String(s) = v.as_ref() {
                if !allowed.is_empty() && !allowed.iter().any(|a| a == s) {
                    return Err(ValidationError::InvalidStringValue {
                        field: name.to_owned(),
                        value: s.clone(),
                        allowed: allowed.join(", "),
                    });
                }
            }
            Ok(v)
        }
    }
}

fn resolve(
    aliases: &AliasRegistry,
    field: &str,
    alias: &str,
) -> Result<NodeId, ValidationError> {
    aliases
        .resolve(alias)
        .ok_or_else(|| ValidationError::MissingDefNodeForUseNode {
            field: field.to_owned(),
            alias: alias.to_owned(),
        })
}

/// Checks a field's node against its allowed headers; `NULL` always passes
fn check_header(
    doc: &Document,
    field: &str,
    schema: &FieldSchema,
    id: NodeId,
) -> Result<(), ValidationError> {
    let header = &doc[id].header;
    if id == NodeId::EMPTY || schema.accepts_header(header) {
        Ok(())
    } else {
        Err(ValidationError::InvalidVrmlNodeForGivenField {
            field: field.to_owned(),
            header: header.clone(),
            allowed: schema
                .allowed_headers()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        parser::{ParsedFile, parse_str},
        schema::{Catalog, Synonyms},
    };

    fn parse(body: &str) -> ParsedFile {
        parse_str(&format!("#VRML V2.0 utf8\n{body}")).unwrap()
    }

    fn check(
        parsed: &ParsedFile,
        catalog: &Catalog,
        header: &str,
    ) -> Result<(), ValidationError> {
        let root = parsed.document.roots()[0];
        validate(
            &parsed.document,
            root,
            &parsed.aliases,
            catalog.get(header).unwrap(),
        )
        .map(|_| ())
    }

    #[test]
    fn test_defaults_and_values() {
        let parsed = parse("Transform { translation 1 2 3 }");
        let c = Catalog::standard();
        let root = parsed.document.roots()[0];
        let v = validate(
            &parsed.document,
            root,
            &parsed.aliases,
            c.get("Transform").unwrap(),
        )
        .unwrap();
        assert_eq!(v.header(), "Transform");
        assert_eq!(v.get::<Vec3f>("translation"), Ok(Vec3f::new(1.0, 2.0, 3.0)));
        assert_eq!(v.get::<Vec3f>("scale"), Ok(Vec3f::new(1.0, 1.0, 1.0)));
        assert_eq!(v.get::<Vec<NodeId>>("children"), Ok(vec![]));
        assert!(matches!(
            v.get::<f32>("translation"),
            Err(ValidationError::InvalidFieldValueType {
                expected: FieldKind::Float,
                found: FieldKind::Vec3f,
                ..
            })
        ));
    }

    #[test]
    #[should_panic(expected = "not bound")]
    fn test_unbound_field_panics() {
        let parsed = parse("Box {}");
        let c = Catalog::standard();
        let root = parsed.document.roots()[0];
        let v = validate(
            &parsed.document,
            root,
            &parsed.aliases,
            c.get("Box").unwrap(),
        )
        .unwrap();
        let _ = v.get::<f32>("radius");
    }

    #[test]
    fn test_reinterpretation() {
        let parsed = parse(
            "IndexedFaceSet {
                coordIndex [0 1 2, 2 3 0]
                creaseAngle 1
            }",
        );
        let c = Catalog::standard();
        let root = parsed.document.roots()[0];
        let v = validate(
            &parsed.document,
            root,
            &parsed.aliases,
            c.get("IndexedFaceSet").unwrap(),
        )
        .unwrap();
        assert_eq!(v.get::<&[i32]>("coordIndex"), Ok(&[0, 1, 2, 2, 3, 0][..]));
        assert_eq!(v.get::<f32>("creaseAngle"), Ok(1.0));
        assert_eq!(v.get::<&[i32]>("colorIndex"), Ok(&[][..]));
    }

    #[test]
    fn test_field_errors() {
        let c = Catalog::standard();
        let p = parse("Box { radius 1 }");
        assert!(matches!(
            check(&p, &c, "Box"),
            Err(ValidationError::InvalidFieldName { .. })
        ));
        let p = parse("Box { size 1 1 1 size 2 2 2 }");
        assert!(matches!(
            check(&p, &c, "Box"),
            Err(ValidationError::DuplicatedFieldName { .. })
        ));
        let p = parse("Box { size TRUE }");
        assert!(matches!(
            check(&p, &c, "Box"),
            Err(ValidationError::InvalidFieldValueType {
                expected: FieldKind::Vec3f,
                found: FieldKind::Bool,
                ..
            })
        ));
        let p = parse("Sphere {}");
        assert!(matches!(
            check(&p, &c, "Box"),
            Err(ValidationError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_use_resolution() {
        let c = Catalog::standard();
        let p = parse("Shape { geometry USE missing }");
        assert_eq!(
            check(&p, &c, "Shape"),
            Err(ValidationError::MissingDefNodeForUseNode {
                field: "geometry".to_owned(),
                alias: "missing".to_owned(),
            })
        );

        let p = parse(
            "Shape { geometry DEF b Box {} }
             Group { children [ USE b, Shape { geometry USE b } ] }",
        );
        let group = p.document.roots()[1];
        let v = validate(
            &p.document,
            group,
            &p.aliases,
            c.get("Group").unwrap(),
        )
        .unwrap();
        let children = v.get::<Vec<NodeId>>("children").unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(Some(children[0]), p.aliases.resolve("b"));
    }

    #[test]
    fn test_allowed_headers() {
        let c = Catalog::standard();
        let p = parse("Shape { geometry Group {} }");
        assert!(matches!(
            check(&p, &c, "Shape"),
            Err(ValidationError::InvalidVrmlNodeForGivenField { .. })
        ));

        let mut s = Synonyms::new();
        s.insert("Cube", "Box");
        let c = c.with_synonyms(&s);
        let p = parse("Shape { geometry Cube {} }");
        assert_eq!(check(&p, &c, "Shape"), Ok(()));
    }

    #[test]
    fn test_string_enumeration() {
        let c = Catalog::standard();
        let p = parse(r#"FontStyle { style "BOLD" }"#);
        assert_eq!(check(&p, &c, "FontStyle"), Ok(()));
        let p = parse(r#"FontStyle { style "HEAVY" }"#);
        assert!(matches!(
            check(&p, &c, "FontStyle"),
            Err(ValidationError::InvalidStringValue { .. })
        ));
    }

    #[test]
    fn test_null_node() {
        let c = Catalog::standard();
        let p = parse("Shape { appearance NULL geometry Box {} }");
        assert_eq!(check(&p, &c, "Shape"), Ok(()));
        let v = validate(
            &p.document,
            p.document.roots()[0],
            &p.aliases,
            c.get("Shape").unwrap(),
        )
        .unwrap();
        assert_eq!(v.get::<NodeId>("appearance"), Ok(NodeId::EMPTY));

        // A non-empty node is still checked against the allowed headers
        let p = parse("Shape { appearance Box {} }");
        assert!(matches!(
            check(&p, &c, "Shape"),
            Err(ValidationError::InvalidVrmlNodeForGivenField { .. })
        ));
    }

    #[test]
    fn test_empty_node_view() {
        let doc = Document::new();
        let c = Catalog::standard();
        let v = validate(
            &doc,
            NodeId::EMPTY,
            &AliasRegistry::new(),
            c.get("Coordinate").unwrap(),
        )
        .unwrap();
        assert_eq!(v.get::<&[Vec3f]>("point"), Ok(&[][..]));
    }
}
