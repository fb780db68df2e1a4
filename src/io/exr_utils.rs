/* Copyright 2020 @TwoCookingMice */

use crate::math::bitmap::Bitmap;

use exr::prelude::*;

// Write a linear RGB frame to an EXR file
pub fn write_exr_to_file(image: &Bitmap, file_path: &str) -> std::result::Result<(), Error> {
    log::info!("Starting writing openexr images: {}.", file_path);

    let width = image.width();
    write_rgb_file(file_path, width, image.height(), |x, y| {
        let pixel = image.pixels()[y * width + x];
        (pixel.x, pixel.y, pixel.z)
    })?;

    log::info!("EXR written to: {}.", file_path);
    Ok(())
}
