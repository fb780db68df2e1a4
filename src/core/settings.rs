// Copyright @yucwang 2026

use crate::core::error::{require_positive, ConfigError};
use crate::math::constants::{Float, Vector3f};

/// Parameters shared by the photon emission pass and the frame renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Maximum recursion depth for both photons and camera rays.
    pub rendering_depth: u32,
    /// Accepted photon samples emitted from each emissive shape.
    pub photons_per_light: u32,
    /// Informational capacity stored with each photon tree.
    pub nearest_photons_num: u32,
    /// Gather radius for indirect light.
    pub indirect_light_max_r: Float,
    /// Scales the cone filter support relative to the gather radius.
    pub filter_constant: Float,
    /// Radiance of rays that leave the scene.
    pub background: Vector3f,
    pub seed: u64,
    /// Worker threads for the shading pass, None picks the core count.
    pub threads: Option<usize>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            rendering_depth: 10,
            photons_per_light: 100000,
            nearest_photons_num: 50,
            indirect_light_max_r: 0.1,
            filter_constant: 1.0,
            background: Vector3f::zeros(),
            seed: 0,
            threads: None,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("rendering depth", self.rendering_depth as Float)?;
        require_positive("photons per light", self.photons_per_light as Float)?;
        require_positive("nearest photons number", self.nearest_photons_num as Float)?;
        require_positive("indirect light radius", self.indirect_light_max_r)?;
        require_positive("filter constant", self.filter_constant)?;
        if let Some(threads) = self.threads {
            require_positive("thread count", threads as Float)?;
        }
        Ok(())
    }

    pub fn thread_count(&self) -> usize {
        match self.threads {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = RenderSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.rendering_depth, 10);
        assert_eq!(settings.photons_per_light, 100000);
        assert!(settings.thread_count() >= 1);
    }

    #[test]
    fn test_invalid_settings() {
        let mut settings = RenderSettings::default();
        settings.rendering_depth = 0;
        assert!(settings.validate().is_err());

        let mut settings = RenderSettings::default();
        settings.photons_per_light = 0;
        assert!(settings.validate().is_err());

        let mut settings = RenderSettings::default();
        settings.indirect_light_max_r = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = RenderSettings::default();
        settings.filter_constant = -1.0;
        assert!(settings.validate().is_err());

        let mut settings = RenderSettings::default();
        settings.threads = Some(0);
        assert!(settings.validate().is_err());
    }
}
