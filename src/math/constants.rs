/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;
pub type Matrix4f = nalgebra::Matrix4<Float>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = 3.14159265359;

// Offset applied along the surface normal when spawning secondary rays.
pub const RAY_BIAS: Float = 1e-4;

// Determinant threshold below which a ray is parallel to a triangle.
pub const TRIANGLE_EPSILON: Float = 1e-6;

// Shortest length a vector may have and still be normalized.
pub const NORMALIZE_EPSILON: Float = 1e-12;
