// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::photon_map::PhotonTree;
use crate::core::shape::Shape;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::sensors::perspective::PerspectiveCamera;
use std::sync::Arc;

/// Shapes, the active camera and the two photon maps. Shapes are shared
/// read-only with the emitter and the renderer; a shape can only be edited
/// while nobody else holds it.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Arc<dyn Shape>>,
    camera: Option<PerspectiveCamera>,
    photon_map: PhotonTree,
    caustic_map: PhotonTree,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: Arc<dyn Shape>) -> usize {
        log::debug!("Adding {}", object.to_string());
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn remove_object(&mut self, index: usize) -> Option<Arc<dyn Shape>> {
        if index < self.objects.len() {
            Some(self.objects.remove(index))
        } else {
            None
        }
    }

    pub fn objects(&self) -> &[Arc<dyn Shape>] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&Arc<dyn Shape>> {
        self.objects.get(index)
    }

    /// Mutable access, None if the index is out of range or the shape is
    /// currently shared.
    pub fn object_mut(&mut self, index: usize) -> Option<&mut (dyn Shape + 'static)> {
        self.objects.get_mut(index).and_then(Arc::get_mut)
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut PerspectiveCamera> {
        self.camera.as_mut()
    }

    pub fn set_camera(&mut self, camera: PerspectiveCamera) {
        self.camera = Some(camera);
    }

    pub fn take_camera(&mut self) -> Option<PerspectiveCamera> {
        self.camera.take()
    }

    pub fn photon_map(&self) -> &PhotonTree {
        &self.photon_map
    }

    pub fn caustic_map(&self) -> &PhotonTree {
        &self.caustic_map
    }

    /// Replace both photon maps at once.
    pub fn install_photon_maps(&mut self, photon_map: PhotonTree, caustic_map: PhotonTree) {
        log::info!(
            "Installing photon maps: {} global, {} caustic photons.",
            photon_map.len(),
            caustic_map.len()
        );
        self.photon_map = photon_map;
        self.caustic_map = caustic_map;
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let mut closest: Option<(usize, Float)> = None;
        for (index, object) in self.objects.iter().enumerate() {
            if let Some(t) = object.ray_intersection(ray) {
                if closest.map_or(true, |(_, t_min)| t < t_min) {
                    closest = Some((index, t));
                }
            }
        }

        closest.map(|(index, t)| {
            let params = self.objects[index].hit_params(ray, t);
            SurfaceIntersection::new(ray.at(t), t, params, index)
        })
    }

    /// Whether `ray` hits any shape other than the one at `skip`.
    pub fn hits_other_object(&self, ray: &Ray3f, skip: usize) -> bool {
        self.objects
            .iter()
            .enumerate()
            .any(|(index, object)| index != skip && object.ray_intersect(ray))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material::GraphicParams;
    use crate::core::photon_map::Photon;
    use crate::math::constants::Vector3f;
    use crate::shapes::sphere::Sphere;

    fn sphere_at(z: Float) -> Arc<dyn Shape> {
        Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, z), 1.0, GraphicParams::default()).unwrap())
    }

    #[test]
    fn test_nearest_object_wins() {
        let mut scene = Scene::new();
        scene.add_object(sphere_at(10.0));
        scene.add_object(sphere_at(5.0));

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0));
        let hit = scene.ray_intersection(&ray).unwrap();
        assert_eq!(hit.object_index(), 1);
        assert!((hit.t() - 4.0).abs() < 1e-5);
        assert_eq!(hit.normal(), Vector3f::new(0.0, 0.0, -1.0));

        assert!(scene.hits_other_object(&ray, 1));
        assert!(!scene.hits_other_object(&Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0)), 0));
    }

    #[test]
    fn test_add_remove_and_edit() {
        let mut scene = Scene::new();
        scene.add_object(sphere_at(1.0));
        let shared = sphere_at(2.0);
        scene.add_object(shared.clone());

        assert!(scene.object_mut(0).is_some());
        // Still held outside the scene.
        assert!(scene.object_mut(1).is_none());
        drop(shared);
        scene.object_mut(1).unwrap().set_position(Vector3f::new(0.0, 0.0, 7.0));
        assert_eq!(scene.object(1).unwrap().position(), Vector3f::new(0.0, 0.0, 7.0));

        assert!(scene.remove_object(0).is_some());
        assert!(scene.remove_object(5).is_none());
        assert_eq!(scene.objects().len(), 1);
    }

    #[test]
    fn test_camera_and_maps() {
        let mut scene = Scene::new();
        assert!(scene.camera().is_none());
        scene.set_camera(PerspectiveCamera::default());
        assert!(scene.camera().is_some());

        assert!(scene.photon_map().is_empty());
        let photon = Photon::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(1.0, 1.0, 1.0));
        scene.install_photon_maps(PhotonTree::new(vec![photon], 50), PhotonTree::empty());
        assert_eq!(scene.photon_map().len(), 1);
        assert!(scene.caustic_map().is_empty());
    }
}
