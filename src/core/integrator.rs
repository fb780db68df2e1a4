// Copyright @yucwang 2026

use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

/// Normalization constants measured by the density pre-pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotonDensity {
    /// Mean number of photons seen per pixel, never below 1.
    pub reference_count: Float,
    /// Mean global photon count over hits that found any.
    pub avg_direct_photons: Float,
}

impl Default for PhotonDensity {
    fn default() -> Self {
        Self { reference_count: 1.0, avg_direct_photons: 0.0 }
    }
}

/// Running sums of the density pre-pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DensityAccumulator {
    pub direct_photons: usize,
    pub direct_hits: usize,
    pub nearest_sum: usize,
    pub nearest_max: usize,
    pub pixels: usize,
}

impl DensityAccumulator {
    pub fn record_direct(&mut self, count: usize) {
        if count > 0 {
            self.direct_photons += count;
            self.direct_hits += 1;
        }
    }

    pub fn add_pixel(&mut self, nearest: usize) {
        self.nearest_sum += nearest;
        self.nearest_max = self.nearest_max.max(nearest);
        self.pixels += 1;
    }

    pub fn finish(&self) -> PhotonDensity {
        let mean = if self.pixels > 0 { self.nearest_sum as Float / self.pixels as Float } else { 0.0 };
        let avg_direct = if self.direct_hits > 0 {
            self.direct_photons as Float / self.direct_hits as Float
        } else {
            0.0
        };
        PhotonDensity { reference_count: mean.max(1.0), avg_direct_photons: avg_direct }
    }
}

pub trait Integrator: Sync {
    /// Radiance arriving along `ray`.
    fn trace(&self, scene: &Scene, ray: &Ray3f, density: &PhotonDensity) -> Vector3f;
    /// Largest photon count visible along `ray` and its specular
    /// continuations. Only measures, nothing is shaded.
    fn closest_nodes(&self, scene: &Scene, ray: &Ray3f, acc: &mut DensityAccumulator) -> usize;
}
