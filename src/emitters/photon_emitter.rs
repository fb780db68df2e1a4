// Copyright @yucwang 2026

use crate::core::error::ConfigError;
use crate::core::photon_map::{Photon, PhotonTree};
use crate::core::progress::{ProgressObserver, PHASE_PHOTON_MAP};
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::settings::RenderSettings;
use crate::math::constants::{Float, Vector3f, RAY_BIAS};
use crate::math::optics::{reflect, refract};
use crate::math::ray::Ray3f;
use crate::math::warp::random_unit_vector;

// Attempts allowed per requested sample before an emitter is given up on.
const ATTEMPTS_PER_SAMPLE: usize = 100;

fn channel_masks() -> [Vector3f; 3] {
    [Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(0.0, 0.0, 1.0)]
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmissionStats {
    pub emitters: usize,
    pub accepted: usize,
    pub attempts: usize,
    pub global_photons: usize,
    pub caustic_photons: usize,
    /// Emitters that ran out of attempts before reaching their quota.
    pub exhausted_emitters: usize,
}

pub struct PhotonMaps {
    pub global: PhotonTree,
    pub caustic: PhotonTree,
    pub stats: EmissionStats,
}

// Photons collected during one pass.
#[derive(Default)]
struct Deposits {
    global: Vec<Photon>,
    caustic: Vec<Photon>,
}

/// Shoots photons from every emissive shape and sorts the deposits into the
/// global map (first hit) and the caustic map (after at least one specular
/// bounce or refraction).
pub struct PhotonEmitter {
    settings: RenderSettings,
}

impl PhotonEmitter {
    pub fn new(settings: RenderSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Emit, build both trees and install them into `scene`.
    pub fn update_photon_map(&self, scene: &mut Scene, progress: &dyn ProgressObserver) -> EmissionStats {
        let maps = self.emit(scene, progress);
        scene.install_photon_maps(maps.global, maps.caustic);
        maps.stats
    }

    pub fn emit(&self, scene: &Scene, progress: &dyn ProgressObserver) -> PhotonMaps {
        progress.phase_changed(PHASE_PHOTON_MAP);
        progress.progress_changed(0.0);

        let quota = self.settings.photons_per_light as usize;
        let max_depth = self.settings.rendering_depth;
        let emitters: Vec<usize> = scene
            .objects()
            .iter()
            .enumerate()
            .filter(|(_, object)| object.params().emission.is_emissive())
            .map(|(index, _)| index)
            .collect();

        let total = (quota * emitters.len()).max(1);
        let report_every = (total / 100).max(1);

        let mut rng = LcgRng::new(self.settings.seed);
        let mut deposits = Deposits::default();
        let mut stats = EmissionStats { emitters: emitters.len(), ..EmissionStats::default() };
        let masks = channel_masks();

        for &light_index in emitters.iter() {
            let light = &scene.objects()[light_index];
            let radiance = light.params().emission.radiance();
            let max_attempts = quota * ATTEMPTS_PER_SAMPLE;

            let mut accepted = 0usize;
            let mut attempts = 0usize;
            while accepted < quota && attempts < max_attempts {
                attempts += 1;

                let dir = random_unit_vector(&mut rng);
                let probe = Ray3f::new(light.position(), dir);
                // Start just outside the emitter surface.
                let origin = match light.ray_intersection(&probe) {
                    Some(t) => probe.at(t) - light.hit_params(&probe, t).normal * RAY_BIAS,
                    None => probe.origin(),
                };
                let ray = Ray3f::new(origin, dir);
                if !scene.hits_other_object(&ray, light_index) {
                    continue;
                }

                for mask in masks.iter() {
                    self.trace_photon(scene, &ray, radiance.component_mul(mask), max_depth, &mut deposits);
                }

                accepted += 1;
                stats.accepted += 1;
                if stats.accepted % report_every == 0 {
                    progress.progress_changed(stats.accepted as f64 / total as f64 * 95.0);
                }
            }

            stats.attempts += attempts;
            if accepted < quota {
                stats.exhausted_emitters += 1;
                log::warn!(
                    "Emitter {} accepted only {} of {} photons after {} attempts.",
                    light_index, accepted, quota, attempts
                );
            }
        }

        stats.global_photons = deposits.global.len();
        stats.caustic_photons = deposits.caustic.len();
        log::info!(
            "Photon emission: {} emitters, {} accepted samples in {} attempts, {} global and {} caustic photons.",
            stats.emitters, stats.accepted, stats.attempts, stats.global_photons, stats.caustic_photons
        );

        let k = self.settings.nearest_photons_num as usize;
        let global = PhotonTree::new(deposits.global, k);
        let caustic = PhotonTree::new(deposits.caustic, k);
        progress.progress_changed(100.0);

        PhotonMaps { global, caustic, stats }
    }

    fn trace_photon(&self, scene: &Scene, ray: &Ray3f, color: Vector3f, depth: u32, deposits: &mut Deposits) {
        if depth == 0 || color == Vector3f::zeros() {
            return;
        }

        let hit = match scene.ray_intersection(ray) {
            Some(hit) => hit,
            None => return,
        };
        let params = hit.params();
        let p = hit.p();
        let n = hit.normal();

        if params.transparency < 1.0 && params.reflectivity < 1.0 {
            let photon = Photon::new(p, ray.dir(), color);
            if depth == self.settings.rendering_depth {
                deposits.global.push(photon);
            } else {
                deposits.caustic.push(photon);
            }
        }

        if params.reflectivity > 0.0 {
            let dir = reflect(&ray.dir(), &n).normalize();
            let reflected = ray.spawn(p + n * RAY_BIAS, dir);
            self.trace_photon(scene, &reflected, color * params.reflectivity, depth - 1, deposits);
        }

        if params.transparency > 0.0 {
            let color = (color * params.transparency).component_mul(&params.color);
            let masks = channel_masks();
            // Each channel bends by its own index, which splits white light.
            for (mask, index) in masks.iter().zip(params.channel_indices().iter()) {
                let eta_to: Float = ray.transmitted_index(*index);
                let dir = refract(&ray.dir(), &n, ray.previous_refraction(), eta_to);
                if dir == Vector3f::zeros() {
                    continue;
                }
                let refracted = ray.cross_interface(p - n * RAY_BIAS, dir.normalize(), *index);
                self.trace_photon(scene, &refracted, color.component_mul(mask), depth - 1, deposits);
            }
        }
    }
}
