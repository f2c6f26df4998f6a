use crate::{
    error::CalculatorError,
    mesh::{Mesh, MeshBuilder},
    parser::Vec3f,
    transform::TransformationMatrix,
};
use nalgebra::Vector3;

/// Corner signs, indexed as `0(-,-,-) 1(+,-,-) 2(+,+,-) 3(-,+,-)` on the low
/// face and `4..8` in the same order on the high face
const CORNERS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Two triangles per face, wound counter-clockwise from outside
const TRIANGLES: [[usize; 3]; 12] = [
    [4, 5, 6], // +z
    [4, 6, 7],
    [1, 0, 3], // -z
    [1, 3, 2],
    [7, 6, 2], // +y
    [7, 2, 3],
    [0, 1, 5], // -y
    [0, 5, 4],
    [5, 1, 2], // +x
    [5, 2, 6],
    [0, 4, 7], // -x
    [0, 7, 3],
];

/// Axis-aligned box centered on the origin
#[derive(Clone, Debug)]
pub struct BoxCalculator {
    /// Edge lengths
    pub size: Vec3f,
    /// Transform applied to every corner
    pub transform: TransformationMatrix,
}

impl BoxCalculator {
    /// Builds the 8-vertex, 12-triangle mesh
    pub fn calculate(&self) -> Result<Mesh, CalculatorError> {
        self.check()
            .map_err(|e| CalculatorError::BoxCalculator(Box::new(e)))?;
        let half = self.size / 2.0;
        let mut b = MeshBuilder::new();
        for c in CORNERS {
            let p = Vec3f::from(c).component_mul(&half);
            b.push_vertex(self.transform.transform_point(&p));
        }
        for t in TRIANGLES {
            b.push(Vector3::from(t));
        }
        Ok(b.take())
    }

    fn check(&self) -> Result<(), CalculatorError> {
        for (field, value) in ["x", "y", "z"].into_iter().zip(self.size.iter()) {
            if *value <= 0.0 {
                return Err(CalculatorError::PropertiesError(Box::new(
                    CalculatorError::NonPositiveValue {
                        field,
                        value: *value,
                    },
                )));
            }
        }
        Ok(())
    }
}
