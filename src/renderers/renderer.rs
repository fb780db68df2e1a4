// Copyright @yucwang 2021

use crate::core::error::RenderError;
use crate::core::progress::ProgressObserver;
use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;

pub trait Renderer {
    fn render(
        &self,
        scene: &Scene,
        width: usize,
        height: usize,
        progress: &dyn ProgressObserver,
    ) -> Result<Bitmap, RenderError>;
}
