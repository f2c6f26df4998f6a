use super::vertex_index;
use crate::{
    error::CalculatorError,
    mesh::{Mesh, MeshBuilder},
    parser::Vec3f,
    transform::TransformationMatrix,
};
use log::warn;
use nalgebra::Vector3;

/// General indexed face set
///
/// Faces are runs of coordinate indices terminated by `-1`; a trailing run
/// without a terminator is also a face.  Faces with more than three corners
/// are fan-triangulated, which is only correct for convex faces.
#[derive(Clone, Debug)]
pub struct IndexedFaceSetCalculator {
    /// Untransformed coordinates
    pub points: Vec<Vec3f>,
    /// Face indices, with `-1` separators
    pub indices: Vec<i32>,
    /// Whether faces are known to be convex
    pub convex: bool,
    /// Whether to reject indices outside of `points`
    pub check_range: bool,
    /// Transform applied to every point
    pub transform: TransformationMatrix,
}

impl IndexedFaceSetCalculator {
    /// Builds the mesh
    pub fn calculate(&self) -> Result<Mesh, CalculatorError> {
        self.run().map_err(|e| {
            CalculatorError::IndexedFaceSetCalculator(Box::new(e))
        })
    }

    fn run(&self) -> Result<Mesh, CalculatorError> {
        if self.indices.is_empty() {
            warn!("indexed face set has no faces; skipping");
            return Ok(Mesh::new());
        }
        if self.points.is_empty() {
            return Err(CalculatorError::PropertiesError(Box::new(
                CalculatorError::EmptyArray("coord"),
            )));
        }

        let mut b = MeshBuilder::new();
        let mut face = Vec::with_capacity(4);
        // A final sentinel closes the last face rather than opening a new one
        let indices = self
            .indices
            .strip_suffix(&[-1])
            .unwrap_or(&self.indices[..]);
        for chunk in indices.split(|i| *i == -1) {
            face.clear();
            let mut skip = false;
            for &i in chunk {
                match vertex_index(i, self.points.len(), self.check_range)? {
                    Some(v) => face.push(v),
                    None => skip = true,
                }
            }
            self.face(&mut b, &face, chunk.len(), skip)?;
        }
        Ok(b.take())
    }

    /// Emits the triangles of a single face
    fn face(
        &self,
        b: &mut MeshBuilder,
        face: &[usize],
        len: usize,
        skip: bool,
    ) -> Result<(), CalculatorError> {
        if len < 3 {
            return Err(CalculatorError::InvalidNumberOfCoordinatesForFace(len));
        }
        if len > 3 && !self.convex {
            return Err(CalculatorError::UnsupportedOperation(format!(
                "triangulation of non-convex faces with {len} coordinates"
            )));
        }
        if skip {
            return Ok(());
        }
        let points = &self.points;
        let transform = &self.transform;
        let mut get = |v: usize| b.get(v, || transform.transform_point(&points[v]));
        let first = get(face[0]);
        let mut prev = get(face[1]);
        let mut tris = Vec::with_capacity(face.len() - 2);
        for &v in &face[2..] {
            let next = get(v);
            tris.push(Vector3::new(first, prev, next));
            prev = next;
        }
        for t in tris {
            b.push(t);
        }
        Ok(())
    }
}
