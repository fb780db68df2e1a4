// Copyright @yucwang 2026

use super::constants::{Float, Vector3f};

/// Mirror `incident` about `normal`. Length is preserved for unit normals.
pub fn reflect(incident: &Vector3f, normal: &Vector3f) -> Vector3f {
    incident - normal * 2.0 * incident.dot(normal)
}

/// Snell refraction between a medium of index `eta_i` (the side `normal`
/// points to) and one of index `eta_t`. When the incident direction travels
/// along the normal the ray is leaving, so the indices are swapped and the
/// normal flipped. Total internal reflection yields the zero vector.
pub fn refract(incident: &Vector3f, normal: &Vector3f, eta_i: Float, eta_t: Float) -> Vector3f {
    let cos_i = incident.dot(normal).clamp(-1.0, 1.0);
    let (cos_i, eta_i, eta_t, n) = if cos_i < 0.0 {
        (-cos_i, eta_i, eta_t, *normal)
    } else {
        (cos_i, eta_t, eta_i, -normal)
    };

    let eta_ratio = eta_i / eta_t;
    match transmitted_cos(cos_i, eta_ratio) {
        Some(cos_t) => incident * eta_ratio + n * (eta_ratio * cos_i - cos_t),
        None => Vector3f::zeros(),
    }
}

/// Refraction from open space (index 1.0) into a medium of relative index `eta`.
pub fn refract_relative(incident: &Vector3f, normal: &Vector3f, eta: Float) -> Vector3f {
    refract(incident, normal, 1.0, eta)
}

/// Unpolarized Fresnel reflectance at an interface with relative index `ior`.
/// Orientation rules match `refract`; total internal reflection gives 1.0.
pub fn fresnel(incident: &Vector3f, normal: &Vector3f, ior: Float) -> Float {
    let cos_i = incident.dot(normal).clamp(-1.0, 1.0);
    let (eta_i, eta_t) = if cos_i < 0.0 { (1.0, ior) } else { (ior, 1.0) };
    let cos_i = cos_i.abs();

    match transmitted_cos(cos_i, eta_i / eta_t) {
        None => 1.0,
        Some(cos_t) => {
            let rs = ((eta_t * cos_i) - (eta_i * cos_t)) / ((eta_t * cos_i) + (eta_i * cos_t));
            let rp = ((eta_i * cos_i) - (eta_t * cos_t)) / ((eta_i * cos_i) + (eta_t * cos_t));
            (rs * rs + rp * rp) / 2.0
        }
    }
}

// cos(theta_t) from Snell's law, None once sin(theta_t) reaches 1.
fn transmitted_cos(cos_i: Float, eta_ratio: Float) -> Option<Float> {
    let sin2_t = eta_ratio * eta_ratio * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t >= 1.0 {
        None
    } else {
        Some((1.0 - sin2_t).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::math::warp::random_unit_vector;
    use approx::assert_relative_eq;

    #[test]
    fn test_reflect_preserves_length() {
        let mut rng = LcgRng::new(17);
        for _ in 0..200 {
            let n = random_unit_vector(&mut rng);
            let d = random_unit_vector(&mut rng) * (0.1 + 3.0 * rng.next_f32());
            let r = reflect(&d, &n);
            assert_relative_eq!(r.norm(), d.norm(), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_reflect_mirror() {
        let d = Vector3f::new(1.0, -1.0, 0.0);
        let n = Vector3f::new(0.0, 1.0, 0.0);
        assert_eq!(reflect(&d, &n), Vector3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_normal_incidence_passes_straight() {
        let d = Vector3f::new(0.0, 0.0, 1.0);
        let n = Vector3f::new(0.0, 0.0, -1.0);
        let t = refract(&d, &n, 1.0, 1.5);
        assert_relative_eq!(t, d, epsilon = 1e-6);
    }

    #[test]
    fn test_refract_bends_towards_normal() {
        let d = Vector3f::new(1.0, -1.0, 0.0).normalize();
        let n = Vector3f::new(0.0, 1.0, 0.0);
        let t = refract(&d, &n, 1.0, 1.5);
        let sin_i = d.x;
        let sin_t = t.x / t.norm();
        assert_relative_eq!(sin_i, 1.5 * sin_t, epsilon = 1e-5);
        assert_relative_eq!(t.norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_refract_overloads_agree() {
        let mut rng = LcgRng::new(3);
        for _ in 0..100 {
            let d = random_unit_vector(&mut rng);
            let n = random_unit_vector(&mut rng);
            let a = refract(&d, &n, 1.0, 1.33);
            let b = refract_relative(&d, &n, 1.33);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_total_internal_reflection_agrees_with_fresnel() {
        let mut rng = LcgRng::new(99);
        let n = Vector3f::new(0.0, 0.0, 1.0);
        for _ in 0..500 {
            // Directions leaving the medium, so the critical angle matters.
            let mut d = random_unit_vector(&mut rng);
            d.z = d.z.abs();
            let t = refract(&d, &n, 1.0, 1.6);
            let f = fresnel(&d, &n, 1.6);
            if t == Vector3f::zeros() {
                assert_eq!(f, 1.0);
            } else {
                assert!(f < 1.0);
            }
        }
    }

    #[test]
    fn test_fresnel_normal_incidence() {
        let d = Vector3f::new(0.0, 0.0, -1.0);
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let f = fresnel(&d, &n, 1.5);
        assert_relative_eq!(f, 0.04, epsilon = 1e-5);
    }

    #[test]
    fn test_fresnel_beyond_critical_angle() {
        // Leaving glass at 60 degrees, past the ~41.8 degree critical angle.
        let d = Vector3f::new((60.0 as Float).to_radians().sin(), 0.0, (60.0 as Float).to_radians().cos());
        let n = Vector3f::new(0.0, 0.0, 1.0);
        assert_eq!(fresnel(&d, &n, 1.5), 1.0);
        assert_eq!(refract(&d, &n, 1.0, 1.5), Vector3f::zeros());
    }
}
