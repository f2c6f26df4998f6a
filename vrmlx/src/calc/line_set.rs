use crate::{
    error::CalculatorError, mesh::Mesh, parser::Vec3f,
    transform::TransformationMatrix,
};

/// Indexed line set
///
/// Lines have no area, so they cannot become triangles; any non-empty line
/// set is rejected.
#[derive(Clone, Debug)]
pub struct IndexedLineSetCalculator {
    /// Untransformed coordinates
    pub points: Vec<Vec3f>,
    /// Polyline indices, with `-1` separators
    pub indices: Vec<i32>,
    /// Transform applied to every point
    pub transform: TransformationMatrix,
}

impl IndexedLineSetCalculator {
    /// Builds the mesh, which is only possible when there are no lines
    pub fn calculate(&self) -> Result<Mesh, CalculatorError> {
        self.run().map_err(|e| {
            CalculatorError::IndexedLineSetCalculator(Box::new(e))
        })
    }

    fn run(&self) -> Result<Mesh, CalculatorError> {
        if self.indices.is_empty() {
            return Ok(Mesh::new());
        }
        if self.points.is_empty() {
            return Err(CalculatorError::PropertiesError(Box::new(
                CalculatorError::EmptyArray("coord"),
            )));
        }
        Err(CalculatorError::UnsupportedOperation(
            "line sets cannot be converted into a triangle mesh".to_owned(),
        ))
    }
}
