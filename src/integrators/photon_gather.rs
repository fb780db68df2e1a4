// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::error::ConfigError;
use crate::core::integrator::{DensityAccumulator, Integrator, PhotonDensity};
use crate::core::interaction::SurfaceIntersection;
use crate::core::material::GraphicParams;
use crate::core::photon_map::Photon;
use crate::core::scene::Scene;
use crate::core::settings::RenderSettings;
use crate::math::constants::{Float, Vector3f, RAY_BIAS};
use crate::math::optics::{fresnel, reflect, refract};
use crate::math::ray::Ray3f;

/// Whitted-style specular recursion plus photon map density estimates for
/// the diffuse part.
pub struct PhotonGatherIntegrator {
    pub max_depth: u32,
    pub radius: Float,
    pub filter_constant: Float,
    pub background: Vector3f,
}

impl ComputationNode for PhotonGatherIntegrator {
    fn to_string(&self) -> String {
        format!(
            "PhotonGatherIntegrator: depth {}, radius {}, filter {}",
            self.max_depth, self.radius, self.filter_constant
        )
    }
}

impl PhotonGatherIntegrator {
    pub fn new(settings: &RenderSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            max_depth: settings.rendering_depth,
            radius: settings.indirect_light_max_r,
            filter_constant: settings.filter_constant,
            background: settings.background,
        })
    }

    pub fn trace_depth(&self, scene: &Scene, ray: &Ray3f, depth: u32, density: &PhotonDensity) -> Vector3f {
        if depth == 0 {
            return self.background;
        }
        let hit = match scene.ray_intersection(ray) {
            Some(hit) => hit,
            None => return self.background,
        };

        let params = hit.params();
        let n = hit.normal();
        let albedo = params.color;
        let mut color = params.emission.radiance();

        if params.transparency > 0.0 {
            let eta_from = ray.previous_refraction();
            let eta_to = ray.transmitted_index(params.refractive_index);

            let refracted_dir = refract(&ray.dir(), &n, eta_from, eta_to);
            let refracted = if refracted_dir == Vector3f::zeros() {
                Vector3f::zeros()
            } else {
                let refracted_ray = transmitted_ray(ray, &hit, refracted_dir, params.refractive_index);
                self.trace_depth(scene, &refracted_ray, depth - 1, density).component_mul(&albedo)
            };

            let f = fresnel(&ray.dir(), &n, eta_to / eta_from);
            let reflected = self.trace_depth(scene, &reflected_ray(ray, &hit), depth - 1, density).component_mul(&albedo);
            color += reflected * f + refracted * (1.0 - f);
        }

        if params.reflectivity > 0.0 {
            let lr = self.trace_depth(scene, &reflected_ray(ray, &hit), depth - 1, density);
            let opacity = 1.0 - params.transparency;
            let diffuse = albedo.component_mul(&lr) * (1.0 - params.reflectivity) * opacity;
            let mirror = lr * params.reflectivity * opacity;
            color += diffuse + mirror;
        }

        let caustics = scene.caustic_map().find_photons_in_radius(&hit.p(), self.radius, None);
        if let Some(estimate) = self.gather(&hit, params, &caustics) {
            color += estimate * (caustics.len() as Float / density.reference_count);
        }

        let photons = scene.photon_map().find_photons_in_radius(&hit.p(), self.radius, None);
        if let Some(estimate) = self.gather(&hit, params, &photons) {
            color += estimate * (density.avg_direct_photons / density.reference_count);
        }

        color.map(|c| c.clamp(0.0, 1.0))
    }

    // Cone filtered average of the photons' contribution, None when no
    // photon carries any filter weight.
    fn gather(&self, hit: &SurfaceIntersection, params: &GraphicParams, photons: &[Photon]) -> Option<Vector3f> {
        let support = self.filter_constant * self.radius;
        let mut total_weight: Float = 0.0;
        let mut sum = Vector3f::zeros();

        for photon in photons.iter() {
            let intensity = hit.normal().dot(&-photon.direction).max(0.0);
            let distance = (hit.p() - photon.position).norm();
            let weight = (1.0 - distance / support).max(0.0);
            total_weight += weight;
            sum += params.color.component_mul(&photon.color) * (intensity * weight * (1.0 - params.transparency));
        }

        if total_weight > 0.0 {
            Some(sum / total_weight)
        } else {
            None
        }
    }

    pub fn closest_nodes_depth(&self, scene: &Scene, ray: &Ray3f, depth: u32, acc: &mut DensityAccumulator) -> usize {
        if depth == 0 {
            return 0;
        }
        let hit = match scene.ray_intersection(ray) {
            Some(hit) => hit,
            None => return 0,
        };
        let params = hit.params();

        let mut refracted = 0;
        if params.transparency > 0.0 {
            let eta_to = ray.transmitted_index(params.refractive_index);
            let dir = refract(&ray.dir(), &hit.normal(), ray.previous_refraction(), eta_to);
            if dir != Vector3f::zeros() {
                let refracted_ray = transmitted_ray(ray, &hit, dir, params.refractive_index);
                refracted = self.closest_nodes_depth(scene, &refracted_ray, depth - 1, acc);
            }
        }

        let mut reflected = 0;
        if params.reflectivity > 0.0 {
            reflected = self.closest_nodes_depth(scene, &reflected_ray(ray, &hit), depth - 1, acc);
        }

        let direct = scene.photon_map().find_photons_in_radius(&hit.p(), self.radius, None).len();
        acc.record_direct(direct);
        let caustic = scene.caustic_map().find_photons_in_radius(&hit.p(), self.radius, None).len();

        (direct + caustic).max(refracted).max(reflected)
    }
}

impl Integrator for PhotonGatherIntegrator {
    fn trace(&self, scene: &Scene, ray: &Ray3f, density: &PhotonDensity) -> Vector3f {
        self.trace_depth(scene, ray, self.max_depth, density)
    }

    fn closest_nodes(&self, scene: &Scene, ray: &Ray3f, acc: &mut DensityAccumulator) -> usize {
        self.closest_nodes_depth(scene, ray, self.max_depth, acc)
    }
}

fn reflected_ray(ray: &Ray3f, hit: &SurfaceIntersection) -> Ray3f {
    let dir = reflect(&ray.dir(), &hit.normal()).normalize();
    ray.spawn(hit.p() + hit.normal() * RAY_BIAS, dir)
}

fn transmitted_ray(ray: &Ray3f, hit: &SurfaceIntersection, dir: Vector3f, refractive_index: Float) -> Ray3f {
    ray.cross_interface(hit.p() - hit.normal() * RAY_BIAS, dir.normalize(), refractive_index)
}
