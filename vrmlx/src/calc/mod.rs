//! Geometry calculators
//!
//! Each calculator owns copies of its inputs, so it can be moved into a
//! [`MeshTask`](crate::task::MeshTask) and run on any thread.  Calculators
//! check their own data (sizes, index bounds, face layout) and report
//! failures as a [`CalculatorError`] wrapped in a per-calculator context.
use crate::error::CalculatorError;

mod cuboid;
mod face_set;
mod line_set;
mod triangle_set;

pub use cuboid::BoxCalculator;
pub use face_set::IndexedFaceSetCalculator;
pub use line_set::IndexedLineSetCalculator;
pub use triangle_set::IndexedTriangularFaceSetCalculator;

/// Builds the error for an index outside of `[0, count)`
fn out_of_range(value: i32, count: usize) -> CalculatorError {
    CalculatorError::VertexIndexOutOfRange(Box::new(
        CalculatorError::NumberOutOfRange {
            value: value.into(),
            min: 0,
            max: count as i64 - 1,
        },
    ))
}

/// Converts a raw coordinate index, checking it against the point count
///
/// Returns `Ok(None)` for an invalid index when `check_range` is off, so the
/// caller can skip it without reading.
fn vertex_index(
    i: i32,
    count: usize,
    check_range: bool,
) -> Result<Option<usize>, CalculatorError> {
    match usize::try_from(i) {
        Ok(u) if u < count => Ok(Some(u)),
        _ if check_range => Err(out_of_range(i, count)),
        _ => Ok(None),
    }
}
