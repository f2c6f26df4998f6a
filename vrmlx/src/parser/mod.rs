//! Parsing of VRML 2.0 text into a generic scene tree
//!
//! ```
//! use vrmlx::parser::{parse_str, FieldValue};
//!
//! let parsed = parse_str("#VRML V2.0 utf8\nDEF b Box { size 1 2 3 }")?;
//! let root = parsed.document.roots()[0];
//! assert_eq!(parsed.aliases.resolve("b"), Some(root));
//! assert!(matches!(
//!     parsed.document[root].field("size"),
//!     Some(FieldValue::Vec3f(..))
//! ));
//! # Ok::<(), vrmlx::Error>(())
//! ```
use crate::error::ParseError;
use log::debug;

mod grammar;
mod model;
mod registry;

pub use grammar::HEADER;
pub use model::{
    Document, Field, FieldKind, FieldValue, NodeId, NodeRef, TreeNode, Vec2f,
    Vec3f, Vec4f,
};
pub use registry::AliasRegistry;

use grammar::{RawEntry, RawNode, RawValue};

/// Result of parsing a file: its node arena and `DEF` registry
#[derive(Clone, Debug)]
pub struct ParsedFile {
    /// Every node of the file
    pub document: Document,
    /// Map from `DEF` names to nodes
    pub aliases: AliasRegistry,
}

/// Parses a byte buffer, which must be UTF-8
pub fn parse(input: &[u8]) -> Result<ParsedFile, ParseError> {
    parse_str(std::str::from_utf8(input)?)
}

/// Parses a string
///
/// Parsing fails unless the whole input is consumed.  On success, the alias
/// registry is populated from the resulting tree.
pub fn parse_str(input: &str) -> Result<ParsedFile, ParseError> {
    let start = std::time::Instant::now();
    let raw = grammar::parse_document(input)?;
    let mut document = Document::new();
    for node in raw {
        let node = flatten(&mut document, node);
        document.push_root(node);
    }
    let aliases = AliasRegistry::populate(&document);
    debug!(
        "parsed {} nodes ({} roots, {} names) in {:?}",
        document.len(),
        document.roots().len(),
        aliases.len(),
        start.elapsed()
    );
    Ok(ParsedFile { document, aliases })
}

/// Moves the children of a raw node into the arena
fn flatten(doc: &mut Document, raw: RawNode) -> TreeNode {
    let fields = raw
        .fields
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                RawValue::Plain(v) => v,
                RawValue::Use(alias) => FieldValue::Use(alias),
                RawValue::Node(n) => {
                    let child = flatten(doc, *n);
                    FieldValue::Node(doc.insert(child))
                }
                RawValue::NodeArray(entries) => FieldValue::NodeArray(
                    entries
                        .into_iter()
                        .map(|e| match e {
                            RawEntry::Use(alias) => NodeRef::Use(alias),
                            RawEntry::Node(n) => {
                                let child = flatten(doc, n);
                                NodeRef::Node(doc.insert(child))
                            }
                        })
                        .collect(),
                ),
            };
            Field { name, value }
        })
        .collect();
    TreeNode {
        alias: raw.alias,
        header: raw.header,
        fields,
    }
}
