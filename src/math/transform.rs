// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Matrix4f, Vector3f, NORMALIZE_EPSILON};
use nalgebra::{Rotation3, Unit};

/// Affine point transform used by the geometry editing operations
/// (move, rotate about a pivot, scale about a pivot).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
}

impl Transform {
    /// Rotation by `degrees` around `axis` passing through `pivot`.
    /// Returns None for a zero-length axis.
    pub fn rotation_about(pivot: &Vector3f, axis: &Vector3f, degrees: Float) -> Option<Self> {
        let axis = Unit::try_new(*axis, NORMALIZE_EPSILON)?;
        let rotation = Rotation3::from_axis_angle(&axis, degrees.to_radians()).to_homogeneous();
        let matrix = Matrix4f::new_translation(pivot) * rotation * Matrix4f::new_translation(&(-pivot));
        Some(Self { matrix })
    }

    /// Uniform scale by `k` with `pivot` kept fixed.
    pub fn scale_about(pivot: &Vector3f, k: Float) -> Self {
        let matrix = Matrix4f::new_translation(pivot)
            * Matrix4f::new_scaling(k)
            * Matrix4f::new_translation(&(-pivot));
        Self { matrix }
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        let x = p[0] * self.matrix[(0, 0)] + p[1] * self.matrix[(0, 1)] +
            p[2] * self.matrix[(0, 2)] + self.matrix[(0, 3)];
        let y = p[0] * self.matrix[(1, 0)] + p[1] * self.matrix[(1, 1)] +
            p[2] * self.matrix[(1, 2)] + self.matrix[(1, 3)];
        let z = p[0] * self.matrix[(2, 0)] + p[1] * self.matrix[(2, 1)] +
            p[2] * self.matrix[(2, 2)] + self.matrix[(2, 3)];
        let w = p[0] * self.matrix[(3, 0)] + p[1] * self.matrix[(3, 1)] +
            p[2] * self.matrix[(3, 2)] + self.matrix[(3, 3)];

        Vector3f::new(x / w, y / w, z / w)
    }
}
