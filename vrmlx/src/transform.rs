//! Affine transforms accumulated during traversal
use crate::parser::{Vec3f, Vec4f};
use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion};

/// Homogeneous 4×4 affine transform
///
/// This is a small `Copy` value; each traversal level receives its own.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransformationMatrix(Matrix4<f32>);

impl Default for TransformationMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f32>> for TransformationMatrix {
    fn from(m: Matrix4<f32>) -> Self {
        Self(m)
    }
}

impl TransformationMatrix {
    /// The identity transform
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// Builds the local matrix of a `Transform` node
    ///
    /// Points are taken through `-center`, the inverse scale orientation,
    /// `scale`, the scale orientation, `rotation`, `center` and finally
    /// `translation`.  Rotations are axis-angle `(x, y, z, radians)`.
    pub fn from_components(
        translation: Vec3f,
        rotation: Vec4f,
        scale: Vec3f,
        scale_orientation: Vec4f,
        center: Vec3f,
    ) -> Self {
        let r = rotation_matrix(rotation);
        let sr = rotation_matrix(scale_orientation);
        let sr_inv = sr.try_inverse().unwrap_or_else(Matrix4::identity);
        let m = Matrix4::new_translation(&translation)
            * Matrix4::new_translation(&center)
            * r
            * sr
            * Matrix4::new_nonuniform_scaling(&scale)
            * sr_inv
            * Matrix4::new_translation(&-center);
        Self(m)
    }

    /// Applies `local` inside of this transform (`self * local`)
    pub fn compose(&self, local: &TransformationMatrix) -> Self {
        Self(self.0 * local.0)
    }

    /// Transforms a point
    pub fn transform_point(&self, p: &Vec3f) -> Vec3f {
        self.0.transform_point(&Point3::from(*p)).coords
    }

    /// Returns the underlying matrix
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.0
    }
}

/// Converts an axis-angle rotation into a matrix
///
/// A zero-length axis yields the identity.
fn rotation_matrix(r: Vec4f) -> Matrix4<f32> {
    match Unit::try_new(r.xyz(), f32::EPSILON) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, r.w).to_homogeneous(),
        None => Matrix4::identity(),
    }
}
