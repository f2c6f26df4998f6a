use super::Mesh;
use crate::parser::Vec3f;

/// Container used during construction of a [`Mesh`]
///
/// Vertices are deduplicated by their index in the source coordinate list, so
/// faces sharing a corner share a mesh vertex.
#[derive(Default)]
pub struct MeshBuilder {
    /// Map from source coordinate indexes to `out.vertices`
    ///
    /// `usize::MAX` is used a marker for an unmapped vertex
    map: Vec<usize>,
    out: Mesh,
}

impl MeshBuilder {
    /// Builds an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the given source vertex, adding it to the mesh if needed
    ///
    /// `pos` is only evaluated the first time that `v` is seen.
    pub fn get(&mut self, v: usize, pos: impl FnOnce() -> Vec3f) -> usize {
        if v >= self.map.len() {
            self.map.resize(v + 1, usize::MAX);
        }
        match self.map[v] {
            usize::MAX => {
                let next_vert = self.out.vertices.len();
                self.out.vertices.push(pos());
                self.map[v] = next_vert;

                next_vert
            }
            u => u,
        }
    }

    /// Adds a vertex with no source index
    pub fn push_vertex(&mut self, pos: Vec3f) -> usize {
        self.out.vertices.push(pos);
        self.out.vertices.len() - 1
    }

    /// Adds a triangle, as indexes into the output mesh
    pub fn push(&mut self, tri: nalgebra::Vector3<usize>) {
        self.out.triangles.push(tri)
    }

    /// Finishes construction
    pub fn take(self) -> Mesh {
        self.out
    }
}
