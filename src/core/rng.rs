// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Small seedable generator. Photon emission is the only consumer; a fixed
/// seed makes a photon map reproducible.
#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    pub fn next_f32(&mut self) -> Float {
        (self.next_u32() as Float) / (u32::MAX as Float)
    }

    /// Uniform in [-1, 1].
    pub fn next_symmetric(&mut self) -> Float {
        2.0 * self.next_f32() - 1.0
    }
}
