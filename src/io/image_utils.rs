// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;

use image::{ImageResult, RgbImage};

/// Clamp to [0, 1] and save as 8-bit RGB; the format follows the file
/// extension.
pub fn write_ldr_to_file(image: &Bitmap, file_path: &str) -> ImageResult<()> {
    log::info!("Starting writing image: {}.", file_path);

    let rgb = image.to_rgb8();
    let buffer = RgbImage::from_fn(image.width() as u32, image.height() as u32, |x, y| {
        let i = (y as usize * image.width() + x as usize) * 3;
        image::Rgb([rgb[i], rgb[i + 1], rgb[i + 2]])
    });
    buffer.save(file_path)?;

    log::info!("Image written to: {}.", file_path);
    Ok(())
}
