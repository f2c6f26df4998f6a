use super::vertex_index;
use crate::{
    error::CalculatorError,
    mesh::{Mesh, MeshBuilder},
    parser::Vec3f,
    transform::TransformationMatrix,
};
use log::warn;
use nalgebra::Vector3;

/// Indexed face set whose faces are all triangles
///
/// Indices must be laid out as `a, b, c, -1` quadruples (the final `-1` may be
/// omitted).  The layout is checked up front, then every triangle is read at a
/// fixed stride.
#[derive(Clone, Debug)]
pub struct IndexedTriangularFaceSetCalculator {
    /// Untransformed coordinates
    pub points: Vec<Vec3f>,
    /// Face indices, with `-1` separators
    pub indices: Vec<i32>,
    /// Whether to reject indices outside of `points`
    pub check_range: bool,
    /// Transform applied to every point
    pub transform: TransformationMatrix,
}

impl IndexedTriangularFaceSetCalculator {
    /// Builds the mesh
    pub fn calculate(&self) -> Result<Mesh, CalculatorError> {
        self.run().map_err(|e| {
            CalculatorError::IndexedTriangularFaceSetCalculator(Box::new(e))
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
        self.check_layout()
            .map_err(|e| CalculatorError::PropertiesError(Box::new(e)))?;

        let mut b = MeshBuilder::new();
        let count = self.points.len();
        for tri in self.indices.chunks(4) {
            let mut src = [0; 3];
            let mut skip = false;
            for (s, &i) in src.iter_mut().zip(&tri[..3]) {
                match vertex_index(i, count, self.check_range)? {
                    Some(v) => *s = v,
                    None => skip = true,
                }
            }
            if skip {
                continue;
            }
            let out = src.map(|v| {
                b.get(v, || self.transform.transform_point(&self.points[v]))
            });
            b.push(Vector3::from(out));
        }
        Ok(b.take())
    }

    /// Checks that every fourth index is a sentinel
    fn check_layout(&self) -> Result<(), CalculatorError> {
        let n = self.indices.len();
        if n % 4 != 0 && n % 4 != 3 {
            return Err(CalculatorError::InvalidTriangularLayout {
                position: n - n % 4 + 3,
                found: self.indices[n - 1],
            });
        }
        for position in (3..n).step_by(4) {
            let found = self.indices[position];
            if found != -1 {
                return Err(CalculatorError::InvalidTriangularLayout {
                    position,
                    found,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn calc(indices: Vec<i32>) -> IndexedTriangularFaceSetCalculator {
        IndexedTriangularFaceSetCalculator {
            points: vec![
                Vec3f::new(0.0, 0.0, 0.0),
                Vec3f::new(1.0, 0.0, 0.0),
                Vec3f::new(1.0, 1.0, 0.0),
                Vec3f::new(0.0, 1.0, 0.0),
                Vec3f::new(0.0, 0.0, 1.0),
                Vec3f::new(1.0, 0.0, 1.0),
                Vec3f::new(1.0, 1.0, 1.0),
                Vec3f::new(0.0, 1.0, 1.0),
            ],
            indices,
            check_range: true,
            transform: TransformationMatrix::identity(),
        }
    }

    #[test]
    fn test_cube_triangles() {
        let faces = [
            [0, 3, 2], [0, 2, 1], [4, 5, 6], [4, 6, 7],
            [0, 1, 5], [0, 5, 4], [1, 2, 6], [1, 6, 5],
            [2, 3, 7], [2, 7, 6], [3, 0, 4], [3, 4, 7],
        ];
        let mut indices: Vec<i32> =
            faces.iter().flat_map(|f| [f[0], f[1], f[2], -1]).collect();
        indices.pop(); // final sentinel is optional
        let m = calc(indices).calculate().unwrap();
        assert_eq!(m.vertices.len(), 8);
        assert_eq!(m.triangles.len(), 12);
    }

    #[test]
    fn test_bad_layout() {
        // A quad cannot be read at stride 4
        let e = calc(vec![0, 1, 2, 3, -1]).calculate().unwrap_err();
        assert!(matches!(
            e,
            CalculatorError::IndexedTriangularFaceSetCalculator(..)
        ));
        assert!(e.contains(|e| matches!(
            e,
            CalculatorError::PropertiesError(..)
        )));
        assert_eq!(
            e.innermost(),
            &CalculatorError::InvalidTriangularLayout {
                position: 3,
                found: 3
            }
        );

        let e = calc(vec![0, 1, 2, -1, 3, 4]).calculate().unwrap_err();
        assert!(matches!(
            e.innermost(),
            CalculatorError::InvalidTriangularLayout { .. }
        ));
    }

    #[test]
    fn test_range_check() {
        let e = calc(vec![0, 1, 9, -1]).calculate().unwrap_err();
        assert!(e.contains(|e| matches!(
            e,
            CalculatorError::VertexIndexOutOfRange(..)
        )));

        let mut c = calc(vec![0, 1, 9, -1, 0, 1, 2, -1]);
        c.check_range = false;
        assert_eq!(c.calculate().unwrap().triangles.len(), 1);
    }
}
