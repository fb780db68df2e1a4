// Copyright @yucwang 2023

use super::constants::{Float, Vector3f};
use crate::core::rng::LcgRng;

// Points closer to the origin than this are rejected as well, so that the
// final normalization never divides by (almost) zero.
const MIN_SAMPLE_LENGTH_SQ: Float = 1e-8;

/// Uniform direction on the unit sphere by rejection sampling in the cube
/// [-1, 1]^3. Roughly half of the candidates are rejected, about two draws
/// per accepted direction on average.
pub fn random_unit_vector(rng: &mut LcgRng) -> Vector3f {
    loop {
        let p = Vector3f::new(rng.next_symmetric(), rng.next_symmetric(), rng.next_symmetric());
        let length_sq = p.norm_squared();
        if length_sq < 1.0 && length_sq > MIN_SAMPLE_LENGTH_SQ {
            return p / length_sq.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = LcgRng::new(1);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_random_unit_vector_covers_sphere() {
        let mut rng = LcgRng::new(5);
        let mut mean = Vector3f::zeros();
        let mut octants = [0usize; 8];
        let samples = 20000;
        for _ in 0..samples {
            let v = random_unit_vector(&mut rng);
            mean += v;
            let idx = (v.x > 0.0) as usize | (((v.y > 0.0) as usize) << 1) | (((v.z > 0.0) as usize) << 2);
            octants[idx] += 1;
        }
        mean /= samples as Float;
        assert!(mean.norm() < 0.05);
        for count in octants.iter() {
            assert!(*count > samples / 8 - samples / 40);
        }
    }

    #[test]
    fn test_random_unit_vector_deterministic_for_seed() {
        let mut a = LcgRng::new(42);
        let mut b = LcgRng::new(42);
        for _ in 0..10 {
            assert_eq!(random_unit_vector(&mut a), random_unit_vector(&mut b));
        }
    }
}
