// Copyright @yucwang 2023

pub mod lens;
pub mod polygon;
pub mod polygonal_model;
pub mod sphere;
