// Copyright @yucwang 2023

use super::polygon::Polygon;
use super::sphere::sphere_interval;

use crate::core::computation_node::ComputationNode;
use crate::core::error::{require_positive, ConfigError};
use crate::core::material::GraphicParams;
use crate::core::shape::Shape;
use crate::io::obj_utils::{self, ImportError};
use crate::math::constants::{Float, Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

use std::path::Path;
use std::vec::Vec;

/// Triangle mesh guarded by a bounding sphere. All triangles share one
/// material.
pub struct PolygonalModel {
    polygons: Vec<Polygon>,
    center: Vector3f,
    bound_radius: Float,
    params: GraphicParams,
}

impl ComputationNode for PolygonalModel {
    fn to_string(&self) -> String {
        format!("PolygonalModel: {} polygons, center {:?}", self.polygons.len(), self.center)
    }
}

impl Shape for PolygonalModel {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<Float> {
        let (_, t_far) = sphere_interval(&self.center, self.bound_radius, ray)?;
        if t_far < 0.0 {
            return None;
        }

        self.polygons
            .iter()
            .filter_map(|polygon| polygon.ray_intersection(ray))
            .fold(None, |closest: Option<Float>, t| match closest {
                Some(best) if best <= t => Some(best),
                _ => Some(t),
            })
    }

    fn position(&self) -> Vector3f {
        self.center
    }

    fn set_position(&mut self, position: Vector3f) {
        let delta = position - self.center;
        for polygon in self.polygons.iter_mut() {
            polygon.translate(&delta);
        }
        self.center = position;
    }

    fn hit_params(&self, ray: &Ray3f, t: Float) -> GraphicParams {
        // The triangle is looked up again, nothing is cached from the hit test.
        let closest = self
            .polygons
            .iter()
            .filter_map(|polygon| polygon.ray_intersection(ray).map(|t_hit| ((t_hit - t).abs(), polygon)))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        match closest {
            Some((_, polygon)) => polygon.hit_params(ray, t),
            None => self.params.with_normal(-ray.dir()),
        }
    }

    fn params(&self) -> &GraphicParams {
        &self.params
    }

    fn set_params(&mut self, params: GraphicParams) -> Result<(), ConfigError> {
        params.validate()?;
        for polygon in self.polygons.iter_mut() {
            polygon.set_params(params)?;
        }
        self.params = params;
        Ok(())
    }
}

impl PolygonalModel {
    pub fn new(polygons: Vec<Polygon>, params: GraphicParams) -> Result<Self, ConfigError> {
        if polygons.is_empty() {
            return Err(ConfigError::Degenerate("polygonal model has no polygons"));
        }

        let mut model = Self { polygons, center: Vector3f::zeros(), bound_radius: 0.0, params: GraphicParams::default() };
        model.set_params(params)?;
        model.update_bounds();
        Ok(model)
    }

    pub fn from_obj<P: AsRef<Path>>(path: P, params: GraphicParams) -> Result<Self, ImportError> {
        let path = path.as_ref();
        log::info!("Loading mesh from: {}.", path.display());
        let data = std::fs::read_to_string(path)?;
        let polygons = obj_utils::load_polygons_from_str(data, params)?;
        log::info!("Mesh loaded, {} polygons.", polygons.len());
        Ok(Self::new(polygons, params)?)
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn bound_radius(&self) -> Float {
        self.bound_radius
    }

    /// Uniform scale about the bounding sphere center.
    pub fn scale(&mut self, k: Float) -> Result<(), ConfigError> {
        require_positive("scale factor", k)?;
        self.apply(&Transform::scale_about(&self.center, k))
    }

    /// Rotation about the bounding sphere center.
    pub fn rotate(&mut self, axis: &Vector3f, degrees: Float) -> Result<(), ConfigError> {
        let transform = Transform::rotation_about(&self.center, axis, degrees)
            .ok_or(ConfigError::Degenerate("rotation axis has zero length"))?;
        self.apply(&transform)
    }

    fn apply(&mut self, transform: &Transform) -> Result<(), ConfigError> {
        let mut polygons = self.polygons.clone();
        for polygon in polygons.iter_mut() {
            polygon.apply(transform)?;
        }
        self.polygons = polygons;
        self.update_bounds();
        Ok(())
    }

    fn update_bounds(&mut self) {
        let vertex_count = (self.polygons.len() * 3) as Float;
        let center = self
            .polygons
            .iter()
            .flat_map(|polygon| polygon.vertices().iter())
            .fold(Vector3f::zeros(), |acc, v| acc + v)
            / vertex_count;

        let radius = self
            .polygons
            .iter()
            .flat_map(|polygon| polygon.vertices().iter())
            .map(|v| (v - center).norm())
            .fold(0.0, Float::max);

        self.center = center;
        // Slack keeps vertices on the sphere boundary inside the test.
        self.bound_radius = radius * (1.0 + EPSILON) + EPSILON;
    }
}
