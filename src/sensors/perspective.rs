// Copyright @yucwang 2026

use crate::core::error::{require_positive, ConfigError};
use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f, NORMALIZE_EPSILON, PI};
use crate::math::ray::Ray3f;

pub const DEFAULT_FOV: Float = 60.0;

/// Pinhole camera. The screen sits `screen_distance` in front of the
/// camera, `fov` is the vertical field of view in degrees.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    position: Vector3f,
    direction: Vector3f,
    screen_distance: Float,
    fov: Float,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov: Float,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        let direction = Vector3f::new(1.0, 0.0, 0.0);
        let (right, up) = Self::basis(&direction);
        Self {
            position: Vector3f::zeros(),
            direction,
            screen_distance: 1.0,
            fov: DEFAULT_FOV,
            right,
            up,
            tan_half_fov: (DEFAULT_FOV * PI / 360.0).tan(),
        }
    }
}

impl PerspectiveCamera {
    pub fn new(position: Vector3f, direction: Vector3f, screen_distance: Float, fov: Float) -> Result<Self, ConfigError> {
        let direction = direction
            .try_normalize(NORMALIZE_EPSILON)
            .ok_or(ConfigError::Degenerate("camera direction has zero length"))?;
        require_positive("screen distance", screen_distance)?;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::OutOfRange { name: "field of view", value: fov });
        }

        let (right, up) = Self::basis(&direction);
        Ok(Self {
            position,
            direction,
            screen_distance,
            fov,
            right,
            up,
            tan_half_fov: (fov * PI / 360.0).tan(),
        })
    }

    // Right is X cross direction, Y cross direction when looking along X.
    fn basis(direction: &Vector3f) -> (Vector3f, Vector3f) {
        let right = Vector3f::new(1.0, 0.0, 0.0)
            .cross(direction)
            .try_normalize(NORMALIZE_EPSILON)
            .unwrap_or_else(|| Vector3f::new(0.0, 1.0, 0.0).cross(direction).normalize());
        let up = direction.cross(&right).normalize();
        (right, up)
    }

    pub fn position(&self) -> Vector3f {
        self.position
    }

    pub fn direction(&self) -> Vector3f {
        self.direction
    }

    pub fn screen_distance(&self) -> Float {
        self.screen_distance
    }

    pub fn fov(&self) -> Float {
        self.fov
    }

    pub fn set_position(&mut self, position: Vector3f) {
        self.position = position;
    }

    pub fn set_direction(&mut self, direction: Vector3f) -> Result<(), ConfigError> {
        *self = Self::new(self.position, direction, self.screen_distance, self.fov)?;
        Ok(())
    }

    pub fn set_screen_distance(&mut self, screen_distance: Float) -> Result<(), ConfigError> {
        *self = Self::new(self.position, self.direction, screen_distance, self.fov)?;
        Ok(())
    }

    pub fn set_fov(&mut self, fov: Float) -> Result<(), ConfigError> {
        *self = Self::new(self.position, self.direction, self.screen_distance, fov)?;
        Ok(())
    }
}

impl Sensor for PerspectiveCamera {
    fn sample_ray(&self, u: &Vector2f, aspect: Float) -> Ray3f {
        let x = (2.0 * u.x - 1.0) * aspect * self.tan_half_fov;
        let y = (1.0 - 2.0 * u.y) * self.tan_half_fov;

        let on_screen = self.position + self.direction * self.screen_distance + self.right * x + self.up * y;
        let dir = (on_screen - self.position).normalize();
        Ray3f::new(self.position, dir)
    }

    fn describe(&self) -> String {
        format!(
            "PerspectiveCamera: position {:?}, direction {:?}, fov {}",
            self.position, self.direction, self.fov
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sensor::pixel_ray;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.position(), Vector3f::zeros());
        assert_eq!(camera.direction(), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(camera.screen_distance(), 1.0);

        let ray = camera.sample_ray(&Vector2f::new(0.5, 0.5), 1.0);
        assert_relative_eq!(ray.dir(), Vector3f::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_center_ray_follows_direction() {
        let camera = PerspectiveCamera::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 3.0), 1.0, 60.0).unwrap();
        let ray = camera.sample_ray(&Vector2f::new(0.5, 0.5), 4.0 / 3.0);
        assert_eq!(ray.origin(), Vector3f::new(0.0, 0.0, -5.0));
        assert_relative_eq!(ray.dir(), Vector3f::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_pixel_rays_are_symmetric() {
        let camera = PerspectiveCamera::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 1.0, 90.0).unwrap();
        let left = pixel_ray(&camera, 0, 2, 4, 5);
        let right = pixel_ray(&camera, 3, 2, 4, 5);
        assert_relative_eq!(left.dir().norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(left.dir().z, right.dir().z, epsilon = 1e-6);
        assert_relative_eq!((left.dir() + right.dir()).dot(&camera.right), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_camera_validation() {
        assert!(PerspectiveCamera::new(Vector3f::zeros(), Vector3f::zeros(), 1.0, 60.0).is_err());
        assert!(PerspectiveCamera::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), 0.0, 60.0).is_err());
        assert!(PerspectiveCamera::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), 1.0, 180.0).is_err());

        let mut camera = PerspectiveCamera::default();
        assert!(camera.set_fov(-1.0).is_err());
        assert_eq!(camera.fov(), DEFAULT_FOV);
        camera.set_direction(Vector3f::new(0.0, 2.0, 0.0)).unwrap();
        assert_eq!(camera.direction(), Vector3f::new(0.0, 1.0, 0.0));
    }
}
