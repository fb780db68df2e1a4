// Copyright @yucwang 2023

use crate::core::error::ConfigError;
use crate::core::material::GraphicParams;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

pub trait Shape: crate::core::computation_node::ComputationNode + Send + Sync {
    /// Distance to the nearest hit in front of the ray origin.
    fn ray_intersection(&self, ray: &Ray3f) -> Option<Float>;

    fn ray_intersect(&self, ray: &Ray3f) -> bool {
        self.ray_intersection(ray).is_some()
    }

    fn position(&self) -> Vector3f;
    fn set_position(&mut self, position: Vector3f);

    /// Material at `ray.at(t)`, with the normal facing against `ray`.
    fn hit_params(&self, ray: &Ray3f, t: Float) -> GraphicParams;

    fn params(&self) -> &GraphicParams;
    fn set_params(&mut self, params: GraphicParams) -> Result<(), ConfigError>;
}

/// Flip `normal` so it opposes `dir`.
pub fn face_forward(normal: Vector3f, dir: &Vector3f) -> Vector3f {
    if normal.dot(dir) > 0.0 {
        -normal
    } else {
        normal
    }
}
