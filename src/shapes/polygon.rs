// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::core::error::{require_positive, ConfigError};
use crate::core::material::GraphicParams;
use crate::core::shape::{face_forward, Shape};
use crate::math::constants::{Float, Vector3f, NORMALIZE_EPSILON, TRIANGLE_EPSILON};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// A single triangle.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: [Vector3f; 3],
    normal: Vector3f,
    params: GraphicParams,
}

impl ComputationNode for Polygon {
    fn to_string(&self) -> String {
        format!("Polygon: {:?} {:?} {:?}", self.vertices[0], self.vertices[1], self.vertices[2])
    }
}

impl Shape for Polygon {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<Float> {
        let edge0 = self.vertices[1] - self.vertices[0];
        let edge1 = self.vertices[2] - self.vertices[0];
        let h = ray.dir().cross(&edge1);
        let a = edge0.dot(&h);

        // Parallel to the plane.
        if a.abs() < TRIANGLE_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.vertices[0];
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge0);
        let v = f * ray.dir().dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge1.dot(&q);
        if t > TRIANGLE_EPSILON {
            Some(t)
        } else {
            None
        }
    }

    fn position(&self) -> Vector3f {
        self.vertices[0]
    }

    fn set_position(&mut self, position: Vector3f) {
        self.translate(&(position - self.vertices[0]));
    }

    fn hit_params(&self, ray: &Ray3f, _t: Float) -> GraphicParams {
        self.params.with_normal(face_forward(self.normal, &ray.dir()))
    }

    fn params(&self) -> &GraphicParams {
        &self.params
    }

    fn set_params(&mut self, params: GraphicParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }
}

impl Polygon {
    pub fn new(v0: Vector3f, v1: Vector3f, v2: Vector3f, params: GraphicParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let normal = Self::compute_normal(&[v0, v1, v2])?;
        Ok(Self { vertices: [v0, v1, v2], normal, params })
    }

    fn compute_normal(vertices: &[Vector3f; 3]) -> Result<Vector3f, ConfigError> {
        (vertices[1] - vertices[0])
            .cross(&(vertices[2] - vertices[0]))
            .try_normalize(NORMALIZE_EPSILON)
            .ok_or(ConfigError::Degenerate("polygon has zero area"))
    }

    pub fn vertices(&self) -> &[Vector3f; 3] {
        &self.vertices
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn centroid(&self) -> Vector3f {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    pub fn translate(&mut self, delta: &Vector3f) {
        for v in self.vertices.iter_mut() {
            *v += delta;
        }
    }

    /// Rotate by `degrees` around `axis` through `center`.
    pub fn rotate(&mut self, center: &Vector3f, axis: &Vector3f, degrees: Float) -> Result<(), ConfigError> {
        let transform = Transform::rotation_about(center, axis, degrees)
            .ok_or(ConfigError::Degenerate("rotation axis has zero length"))?;
        self.apply(&transform)
    }

    /// Scale by `k` with `center` fixed.
    pub fn scale(&mut self, center: &Vector3f, k: Float) -> Result<(), ConfigError> {
        require_positive("scale factor", k)?;
        self.apply(&Transform::scale_about(center, k))
    }

    pub(crate) fn apply(&mut self, transform: &Transform) -> Result<(), ConfigError> {
        let vertices = [
            transform.apply_point(self.vertices[0]),
            transform.apply_point(self.vertices[1]),
            transform.apply_point(self.vertices[2]),
        ];
        self.normal = Self::compute_normal(&vertices)?;
        self.vertices = vertices;
        Ok(())
    }
}
