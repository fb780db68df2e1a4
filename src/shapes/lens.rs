// Copyright @yucwang 2023

use super::sphere::sphere_interval;

use crate::core::computation_node::ComputationNode;
use crate::core::error::{require_positive, ConfigError};
use crate::core::material::GraphicParams;
use crate::core::shape::{face_forward, Shape};
use crate::math::constants::{Float, Vector3f, NORMALIZE_EPSILON};
use crate::math::ray::Ray3f;

/// Biconvex lens: the region inside both of two equal "focal" spheres whose
/// centers sit on the lens axis, `sqrt(curve_radius^2 - radius^2)` to either
/// side of the lens center. `radius` is the aperture radius.
#[derive(Debug, Clone)]
pub struct Lens {
    position: Vector3f,
    direction: Vector3f,
    curve_radius: Float,
    radius: Float,
    params: GraphicParams,
    focal_centers: [Vector3f; 2],
}

impl ComputationNode for Lens {
    fn to_string(&self) -> String {
        format!(
            "Lens: position {:?}, direction {:?}, curve radius {}, radius {}",
            self.position, self.direction, self.curve_radius, self.radius
        )
    }
}

impl Shape for Lens {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<Float> {
        let (near0, far0) = sphere_interval(&self.focal_centers[0], self.curve_radius, ray)?;
        let (near1, far1) = sphere_interval(&self.focal_centers[1], self.curve_radius, ray)?;

        let enter = near0.max(near1);
        let exit = far0.min(far1);
        if enter >= exit || exit <= 0.0 {
            return None;
        }

        if enter > 0.0 {
            Some(enter)
        } else {
            Some(exit)
        }
    }

    fn position(&self) -> Vector3f {
        self.position
    }

    fn set_position(&mut self, position: Vector3f) {
        self.position = position;
        self.focal_centers = Self::focal_centers(&position, &self.direction, self.curve_radius, self.radius);
    }

    fn hit_params(&self, ray: &Ray3f, t: Float) -> GraphicParams {
        let p = ray.at(t);
        let dist0 = ((p - self.focal_centers[0]).norm() - self.curve_radius).abs();
        let dist1 = ((p - self.focal_centers[1]).norm() - self.curve_radius).abs();
        let center = if dist0 <= dist1 { self.focal_centers[0] } else { self.focal_centers[1] };

        let n = (p - center) / self.curve_radius;
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

impl Lens {
    pub fn new(
        position: Vector3f,
        direction: Vector3f,
        curve_radius: Float,
        radius: Float,
        params: GraphicParams,
    ) -> Result<Self, ConfigError> {
        require_positive("lens radius", radius)?;
        require_positive("lens curve radius", curve_radius)?;
        if curve_radius <= radius {
            return Err(ConfigError::LensCurvature { curve_radius, radius });
        }
        let direction = direction
            .try_normalize(NORMALIZE_EPSILON)
            .ok_or(ConfigError::Degenerate("lens direction has zero length"))?;
        params.validate()?;

        let focal_centers = Self::focal_centers(&position, &direction, curve_radius, radius);
        Ok(Self { position, direction, curve_radius, radius, params, focal_centers })
    }

    fn focal_centers(position: &Vector3f, direction: &Vector3f, curve_radius: Float, radius: Float) -> [Vector3f; 2] {
        let offset = (curve_radius * curve_radius - radius * radius).sqrt();
        [position + direction * offset, position - direction * offset]
    }

    pub fn direction(&self) -> Vector3f {
        self.direction
    }

    pub fn curve_radius(&self) -> Float {
        self.curve_radius
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    /// Distance between the two lens vertices along the axis.
    pub fn thickness(&self) -> Float {
        2.0 * (self.curve_radius - (self.curve_radius * self.curve_radius - self.radius * self.radius).sqrt())
    }

    pub fn set_direction(&mut self, direction: Vector3f) -> Result<(), ConfigError> {
        *self = Self::new(self.position, direction, self.curve_radius, self.radius, self.params)?;
        Ok(())
    }

    pub fn set_radius(&mut self, radius: Float) -> Result<(), ConfigError> {
        *self = Self::new(self.position, self.direction, self.curve_radius, radius, self.params)?;
        Ok(())
    }

    pub fn set_curve_radius(&mut self, curve_radius: Float) -> Result<(), ConfigError> {
        *self = Self::new(self.position, self.direction, curve_radius, self.radius, self.params)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lens() -> Lens {
        Lens::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 5.0, 2.0, GraphicParams::default()).unwrap()
    }

    #[test]
    fn test_lens_construction() {
        let lens = lens();
        // offset sqrt(21), vertices at +-(5 - sqrt(21))
        assert_relative_eq!(lens.thickness(), 2.0 * (5.0 - (21.0 as Float).sqrt()), epsilon = 1e-5);

        let bad = Lens::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 1.0, 2.0, GraphicParams::default());
        assert_eq!(bad.unwrap_err(), ConfigError::LensCurvature { curve_radius: 1.0, radius: 2.0 });
        assert!(Lens::new(Vector3f::zeros(), Vector3f::zeros(), 5.0, 2.0, GraphicParams::default()).is_err());
        assert!(Lens::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 2.0, 2.0, GraphicParams::default()).is_err());
    }

    #[test]
    fn test_lens_axis_hit() {
        let lens = lens();
        let half = lens.thickness() / 2.0;
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0));
        let t = lens.ray_intersection(&ray).unwrap();
        assert_relative_eq!(t, 10.0 - half, epsilon = 1e-4);

        let params = lens.hit_params(&ray, t);
        assert_relative_eq!(params.normal, Vector3f::new(0.0, 0.0, -1.0), epsilon = 1e-4);

        // From inside the lens the exit surface is found.
        let inside = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0));
        assert_relative_eq!(lens.ray_intersection(&inside).unwrap(), half, epsilon = 1e-4);
    }

    #[test]
    fn test_lens_miss_outside_aperture() {
        let lens = lens();
        let ray = Ray3f::new(Vector3f::new(0.0, 2.5, -10.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!lens.ray_intersect(&ray));
        let behind = Ray3f::new(Vector3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(lens.ray_intersection(&behind).is_none());
    }

    #[test]
    fn test_lens_setters_revalidate() {
        let mut lens = lens();
        assert!(lens.set_radius(6.0).is_err());
        assert_eq!(lens.radius(), 2.0);
        assert!(lens.set_curve_radius(1.5).is_err());
        assert_eq!(lens.curve_radius(), 5.0);

        lens.set_direction(Vector3f::new(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(lens.direction(), Vector3f::new(1.0, 0.0, 0.0));
        let ray = Ray3f::new(Vector3f::new(-10.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(lens.ray_intersect(&ray));

        lens.set_position(Vector3f::new(0.0, 10.0, 0.0));
        assert!(!lens.ray_intersect(&ray));
    }
}
