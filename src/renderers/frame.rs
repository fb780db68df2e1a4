// Copyright @yucwang 2021

use crate::core::computation_node::ComputationNode;
use crate::core::error::{require_positive, RenderError};
use crate::core::integrator::{DensityAccumulator, Integrator, PhotonDensity};
use crate::core::progress::{ProgressObserver, PHASE_DENSITY, PHASE_RENDERING};
use crate::core::scene::Scene;
use crate::core::sensor::{pixel_ray, Sensor};
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

pub use super::renderer::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RenderPhase {
    Idle = 0,
    DensityPrePass = 1,
    ShadingPass = 2,
    Complete = 3,
}

impl RenderPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RenderPhase::DensityPrePass,
            2 => RenderPhase::ShadingPass,
            3 => RenderPhase::Complete,
            _ => RenderPhase::Idle,
        }
    }
}

/// Renders one frame in two passes: a single threaded density measurement,
/// then shading with one task per row spread over a fixed set of workers.
pub struct FrameRenderer {
    integrator: Box<dyn Integrator>,
    threads: usize,
    phase: AtomicU8,
    completed_rows: AtomicUsize,
}

impl ComputationNode for FrameRenderer {
    fn to_string(&self) -> String {
        format!("FrameRenderer: {} threads", self.threads)
    }
}

impl Renderer for FrameRenderer {
    fn render(
        &self,
        scene: &Scene,
        width: usize,
        height: usize,
        progress: &dyn ProgressObserver,
    ) -> Result<Bitmap, RenderError> {
        require_positive("image width", width as Float)?;
        require_positive("image height", height as Float)?;
        let camera = scene.camera().ok_or(RenderError::MissingCamera)?;

        self.set_phase(RenderPhase::DensityPrePass);
        let density = self.measure_density(scene, camera, width, height, progress);
        log::info!(
            "Photon density: {:.2} photons per pixel, {:.2} direct photons per hit.",
            density.reference_count, density.avg_direct_photons
        );

        self.set_phase(RenderPhase::ShadingPass);
        match self.shade(scene, camera, &density, width, height, progress) {
            Ok(bitmap) => {
                self.set_phase(RenderPhase::Complete);
                Ok(bitmap)
            }
            Err(err) => {
                self.set_phase(RenderPhase::Idle);
                Err(err)
            }
        }
    }
}

impl FrameRenderer {
    pub fn new(integrator: Box<dyn Integrator>, threads: usize) -> Self {
        Self {
            integrator,
            threads: threads.max(1),
            phase: AtomicU8::new(RenderPhase::Idle as u8),
            completed_rows: AtomicUsize::new(0),
        }
    }

    pub fn phase(&self) -> RenderPhase {
        RenderPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn completed_rows(&self) -> usize {
        self.completed_rows.load(Ordering::SeqCst)
    }

    fn set_phase(&self, phase: RenderPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    /// Density pre-pass. Must finish before any row is shaded.
    pub fn measure_density(
        &self,
        scene: &Scene,
        camera: &dyn Sensor,
        width: usize,
        height: usize,
        progress: &dyn ProgressObserver,
    ) -> PhotonDensity {
        progress.phase_changed(PHASE_DENSITY);
        let mut acc = DensityAccumulator::default();
        for y in 0..height {
            for x in 0..width {
                let ray = pixel_ray(camera, x, y, width, height);
                let nearest = self.integrator.closest_nodes(scene, &ray, &mut acc);
                acc.add_pixel(nearest);
            }
            progress.progress_changed((y + 1) as f64 / height as f64 * 100.0);
        }
        acc.finish()
    }

    fn shade(
        &self,
        scene: &Scene,
        camera: &dyn Sensor,
        density: &PhotonDensity,
        width: usize,
        height: usize,
        progress: &dyn ProgressObserver,
    ) -> Result<Bitmap, RenderError> {
        progress.phase_changed(PHASE_RENDERING);
        self.completed_rows.store(0, Ordering::SeqCst);

        let next_row = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let integrator: &dyn Integrator = self.integrator.as_ref();
        let (tx, rx) = mpsc::channel::<(usize, Option<Vec<Vector3f>>)>();
        let mut bitmap = Bitmap::new(width, height);
        let mut failed_row: Option<usize> = None;

        thread::scope(|scope| {
            for _ in 0..self.threads.min(height) {
                let tx = tx.clone();
                let next_row = &next_row;
                let abort = &abort;
                scope.spawn(move || loop {
                    if abort.load(Ordering::SeqCst) {
                        break;
                    }
                    let y = next_row.fetch_add(1, Ordering::SeqCst);
                    if y >= height {
                        break;
                    }

                    let row = panic::catch_unwind(AssertUnwindSafe(|| {
                        (0..width)
                            .map(|x| integrator.trace(scene, &pixel_ray(camera, x, y, width, height), density))
                            .collect::<Vec<Vector3f>>()
                    }))
                    .ok();
                    if tx.send((y, row)).is_err() {
                        break;
                    }
                });
            }

            drop(tx);
            for (y, row) in rx.iter() {
                match row {
                    Some(pixels) => {
                        bitmap.row_mut(y).copy_from_slice(&pixels);
                        let done = self.completed_rows.fetch_add(1, Ordering::SeqCst) + 1;
                        progress.progress_changed(done as f64 / height as f64 * 100.0);
                    }
                    None => {
                        log::error!("Row {} failed, aborting frame.", y);
                        abort.store(true, Ordering::SeqCst);
                        failed_row = Some(failed_row.map_or(y, |first| first.min(y)));
                    }
                }
            }
        });

        match failed_row {
            Some(row) => Err(RenderError::RowFailed { row }),
            None => Ok(bitmap),
        }
    }
}
