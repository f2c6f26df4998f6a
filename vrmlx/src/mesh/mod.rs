//! Indexed triangle meshes
//!
//! Calculators build meshes through a [`MeshBuilder`]; the executor then
//! joins them with [`Mesh::append`] and the result is written with one of the
//! functions in [`output`].
mod builder;
pub mod output;

pub use builder::MeshBuilder;

/// An indexed 3D mesh
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Mesh {
    /// Triangles, as indexes into [`self.vertices`](Self::vertices)
    pub triangles: Vec<nalgebra::Vector3<usize>>,
    /// Vertex positions
    pub vertices: Vec<nalgebra::Vector3<f32>>,
}

impl Mesh {
    /// Builds a new mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Moves every vertex and triangle of `other` into this mesh
    ///
    /// Triangle indices of `other` are offset past the existing vertices.
    pub fn append(&mut self, other: Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices);
        self.triangles.extend(
            other
                .triangles
                .into_iter()
                .map(|t| t.add_scalar(offset)),
        );
    }
}
