// Copyright @yucwang 2023

use crate::core::error::{require_positive, require_unit_interval, ConfigError};
use crate::math::constants::{Float, Vector3f};

pub const DEFAULT_DISPERSION_R: Float = -0.005;
pub const DEFAULT_DISPERSION_B: Float = 0.004;

/// Light given off by a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub color: Vector3f,
    pub intensity: Float,
}

impl Default for Emission {
    fn default() -> Self {
        Self { color: Vector3f::zeros(), intensity: 0.0 }
    }
}

impl Emission {
    pub fn new(color: Vector3f, intensity: Float) -> Self {
        Self { color, intensity }
    }

    pub fn radiance(&self) -> Vector3f {
        self.color * self.intensity
    }

    pub fn is_emissive(&self) -> bool {
        self.intensity > 0.0 && self.color != Vector3f::zeros()
    }
}

/// Optical properties of a surface. Shapes keep one and hand out copies with
/// the normal filled in for a particular hit.
///
/// Transparency and reflectivity are each limited to [0, 1] but their sum is
/// not, a surface with both at 1 reflects and transmits at full strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicParams {
    pub color: Vector3f,
    pub transparency: Float,
    pub refractive_index: Float,
    pub reflectivity: Float,
    pub normal: Vector3f,
    pub emission: Emission,
    pub dispersion_r: Float,
    pub dispersion_b: Float,
}

impl Default for GraphicParams {
    fn default() -> Self {
        Self {
            color: Vector3f::new(1.0, 1.0, 1.0),
            transparency: 0.0,
            refractive_index: 1.0,
            reflectivity: 0.0,
            normal: Vector3f::zeros(),
            emission: Emission::default(),
            dispersion_r: DEFAULT_DISPERSION_R,
            dispersion_b: DEFAULT_DISPERSION_B,
        }
    }
}

impl GraphicParams {
    pub fn new(color: Vector3f) -> Self {
        Self { color, ..Self::default() }
    }

    pub fn with_transparency(mut self, transparency: Float) -> Self {
        self.transparency = transparency;
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: Float) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    pub fn with_refractive_index(mut self, refractive_index: Float) -> Self {
        self.refractive_index = refractive_index;
        self
    }

    pub fn with_emission(mut self, color: Vector3f, intensity: Float) -> Self {
        self.emission = Emission::new(color, intensity);
        self
    }

    pub fn with_dispersion(mut self, delta_r: Float, delta_b: Float) -> Self {
        self.dispersion_r = delta_r;
        self.dispersion_b = delta_b;
        self
    }

    pub fn with_normal(mut self, normal: Vector3f) -> Self {
        self.normal = normal;
        self
    }

    /// Refractive index seen by each RGB channel.
    pub fn channel_indices(&self) -> [Float; 3] {
        [
            self.refractive_index + self.dispersion_r,
            self.refractive_index,
            self.refractive_index + self.dispersion_b,
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_unit_interval("transparency", self.transparency)?;
        require_unit_interval("reflectivity", self.reflectivity)?;
        require_positive("refractive index", self.refractive_index)?;
        for idx in self.channel_indices().iter() {
            require_positive("dispersed refractive index", *idx)?;
        }
        for c in 0..3 {
            if !(self.color[c] >= 0.0) {
                return Err(ConfigError::OutOfRange { name: "color", value: self.color[c] });
            }
            if !(self.emission.color[c] >= 0.0) {
                return Err(ConfigError::OutOfRange { name: "emission color", value: self.emission.color[c] });
            }
        }
        if !(self.emission.intensity >= 0.0) {
            return Err(ConfigError::OutOfRange { name: "emission intensity", value: self.emission.intensity });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = GraphicParams::default();
        assert_eq!(params.color, Vector3f::new(1.0, 1.0, 1.0));
        assert_eq!(params.transparency, 0.0);
        assert_eq!(params.reflectivity, 0.0);
        assert_eq!(params.refractive_index, 1.0);
        assert!(!params.emission.is_emissive());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_channel_indices() {
        let params = GraphicParams::default().with_refractive_index(1.5).with_dispersion(-0.01, 0.02);
        let idx = params.channel_indices();
        assert!((idx[0] - 1.49).abs() < 1e-6);
        assert_eq!(idx[1], 1.5);
        assert!((idx[2] - 1.52).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(GraphicParams::default().with_transparency(1.2).validate().is_err());
        assert!(GraphicParams::default().with_reflectivity(-0.1).validate().is_err());
        assert!(GraphicParams::default().with_refractive_index(0.0).validate().is_err());
        assert!(GraphicParams::default().with_emission(Vector3f::new(1.0, 1.0, 1.0), -1.0).validate().is_err());
        assert!(GraphicParams::new(Vector3f::new(-1.0, 0.0, 0.0)).validate().is_err());
    }

    #[test]
    fn test_full_transparency_and_reflectivity_is_allowed() {
        let params = GraphicParams::default().with_transparency(1.0).with_reflectivity(1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_emission() {
        let params = GraphicParams::default().with_emission(Vector3f::new(1.0, 0.5, 0.0), 2.0);
        assert!(params.emission.is_emissive());
        assert_eq!(params.emission.radiance(), Vector3f::new(2.0, 1.0, 0.0));
        let dark = GraphicParams::default().with_emission(Vector3f::zeros(), 5.0);
        assert!(!dark.emission.is_emissive());
    }
}
