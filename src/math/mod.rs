// Copyright 2020 @TwoCookingMice

pub mod bitmap;
pub mod constants;
pub mod optics;
pub mod ray;
pub mod transform;
pub mod warp;
