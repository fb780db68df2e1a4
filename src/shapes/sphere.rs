// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::core::error::{require_positive, ConfigError};
use crate::core::material::GraphicParams;
use crate::core::shape::{face_forward, Shape};
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

/// Parameter interval (t_near, t_far) where the ray line is inside the sphere.
/// Both values may be negative.
pub(crate) fn sphere_interval(center: &Vector3f, radius: Float, ray: &Ray3f) -> Option<(Float, Float)> {
    let oc = ray.origin() - center;
    let a = ray.dir().norm_squared();
    let half_b = oc.dot(&ray.dir());
    let c = oc.norm_squared() - radius * radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 || a == 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    Some(((-half_b - sqrt_d) / a, (-half_b + sqrt_d) / a))
}

pub struct Sphere {
    center: Vector3f,
    radius: Float,
    params: GraphicParams,
}

impl ComputationNode for Sphere {
    fn to_string(&self) -> String {
        format!("Sphere: center {:?}, radius {}", self.center, self.radius)
    }
}

impl Shape for Sphere {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<Float> {
        let (t_near, t_far) = sphere_interval(&self.center, self.radius, ray)?;

        // Origin inside the sphere: the near root is behind us.
        if t_near > 0.0 {
            Some(t_near)
        } else if t_far > 0.0 {
            Some(t_far)
        } else {
            None
        }
    }

    fn position(&self) -> Vector3f {
        self.center
    }

    fn set_position(&mut self, position: Vector3f) {
        self.center = position;
    }

    fn hit_params(&self, ray: &Ray3f, t: Float) -> GraphicParams {
        let n = (ray.at(t) - self.center) / self.radius;
        self.params.with_normal(face_forward(n, &ray.dir()))
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

impl Sphere {
    pub fn new(center: Vector3f, radius: Float, params: GraphicParams) -> Result<Self, ConfigError> {
        require_positive("sphere radius", radius)?;
        params.validate()?;
        Ok(Self { center, radius, params })
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn set_radius(&mut self, radius: Float) -> Result<(), ConfigError> {
        self.radius = require_positive("sphere radius", radius)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vector3f::zeros(), 1.0, GraphicParams::default()).unwrap()
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = unit_sphere();
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, -2.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(sphere.ray_intersect(&ray));
        let t = sphere.ray_intersection(&ray).unwrap();
        assert!(t > 0.0 && t < 2.0);
        assert_relative_eq!(t, 1.0, epsilon = 1e-6);

        let params = sphere.hit_params(&ray, t);
        assert_relative_eq!(params.normal, Vector3f::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = unit_sphere();
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0));
        let t = sphere.ray_intersection(&ray).unwrap();
        assert_relative_eq!(t, 1.0, epsilon = 1e-6);
        // Normal still faces the incoming ray.
        let params = sphere.hit_params(&ray, t);
        assert_relative_eq!(params.normal, Vector3f::new(-1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere();
        let away = Ray3f::new(Vector3f::new(0.0, 0.0, -2.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(!sphere.ray_intersect(&away));
        assert!(sphere.ray_intersection(&away).is_none());

        let beside = Ray3f::new(Vector3f::new(0.0, 2.0, -2.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!sphere.ray_intersect(&beside));
    }

    #[test]
    fn test_sphere_rejects_bad_radius() {
        assert!(Sphere::new(Vector3f::zeros(), 0.0, GraphicParams::default()).is_err());
        let mut sphere = unit_sphere();
        assert!(sphere.set_radius(-1.0).is_err());
        assert_eq!(sphere.radius(), 1.0);
    }
}
