//! `vrmlx` converts VRML 2.0 scenes into indexed triangle meshes.
//!
//! Conversion runs in a fixed sequence of stages:
//!
//! - The [`parser`] turns text into a generic tree of nodes stored in an
//!   arena, and records every `DEF` name in an
//!   [`AliasRegistry`](crate::parser::AliasRegistry).
//! - The [`schema`] module describes each supported node type: its fields,
//!   their kinds and their defaults.  The [`validate`] module checks a node
//!   against its descriptor, producing a typed
//!   [`NodeView`](crate::validate::NodeView).
//! - A [`Traversor`](crate::traverse::Traversor) walks the tree while
//!   accumulating a [transform](crate::transform) and a "below a `Shape`"
//!   flag.  At each node, an [action](crate::action) synthesizes a
//!   [`ConversionContext`](crate::context::ConversionContext): for the mesh
//!   pass, a list of deferred [`MeshTask`](crate::task::MeshTask)s.
//! - The [`executor`] runs those tasks (each one a [calculator](crate::calc))
//!   on a thread pool and merges the results into one [`Mesh`](crate::mesh::Mesh).
//!
//! The [`convert`] module wires all of this together:
//! ```
//! use vrmlx::{config::Config, convert::Converter};
//!
//! let conv = Converter::new(Config::default())?;
//! let mesh = conv.convert_str(
//!     "#VRML V2.0 utf8
//!     Transform {
//!         translation 0 0 5
//!         children Shape { geometry Box {} }
//!     }",
//! )?;
//! assert_eq!(mesh.triangles.len(), 12);
//! assert!(mesh.vertices.iter().all(|v| v.z >= 4.0));
//! # Ok::<(), vrmlx::Error>(())
//! ```
#![warn(missing_docs)]

pub mod action;
pub mod calc;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod executor;
pub mod mesh;
pub mod parser;
pub mod schema;
pub mod task;
pub mod transform;
pub mod traverse;
pub mod validate;

pub use error::Error;
