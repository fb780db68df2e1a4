// Copyright @yucwang 2023

use crate::core::material::GraphicParams;
use crate::math::constants::{Float, Vector3f};

/// Nearest hit of a ray against the scene.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceIntersection {
    p: Vector3f,
    t: Float,
    params: GraphicParams,
    object_index: usize,
}

impl SurfaceIntersection {
    pub fn new(p: Vector3f, t: Float, params: GraphicParams, object_index: usize) -> Self {
        Self { p, t, params, object_index }
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn params(&self) -> &GraphicParams {
        &self.params
    }

    pub fn normal(&self) -> Vector3f {
        self.params.normal
    }

    pub fn object_index(&self) -> usize {
        self.object_index
    }
}
