// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};
use crate::math::ray::Ray3f;

pub trait Sensor: Sync {
    /// Primary ray through film coordinate `u` in [0, 1]^2, (0, 0) being the
    /// top left corner of a film with the given width / height ratio.
    fn sample_ray(&self, u: &Vector2f, aspect: Float) -> Ray3f;
    fn describe(&self) -> String {
        String::from("Sensor")
    }
}

/// Ray through the center of pixel (x, y).
pub fn pixel_ray(sensor: &dyn Sensor, x: usize, y: usize, width: usize, height: usize) -> Ray3f {
    let u = Vector2f::new(
        (x as Float + 0.5) / width as Float,
        (y as Float + 0.5) / height as Float,
    );
    sensor.sample_ray(&u, width as Float / height as Float)
}
