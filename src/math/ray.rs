// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

/// A light path segment. Besides origin and direction the ray remembers which
/// medium it currently travels through, so refraction can pick the right pair
/// of indices regardless of how a shape orients its normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    inside_object: bool,
    previous_refraction: Float,
}

impl Ray3f {
    /// Ray in open space (index 1.0). The direction is stored as given; callers
    /// are expected to hand in unit vectors.
    pub fn new(o: Vector3f, d: Vector3f) -> Self {
        Self { origin: o, dir: d, inside_object: false, previous_refraction: 1.0 }
    }

    pub fn with_medium(o: Vector3f, d: Vector3f, inside_object: bool, previous_refraction: Float) -> Self {
        Self { origin: o, dir: d, inside_object, previous_refraction }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn inside_object(&self) -> bool {
        self.inside_object
    }

    pub fn previous_refraction(&self) -> Float {
        self.previous_refraction
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    /// Same medium, new segment.
    pub fn spawn(&self, o: Vector3f, d: Vector3f) -> Self {
        Self { origin: o, dir: d, ..*self }
    }

    /// Index of the medium on the far side of the next interface crossed by
    /// this ray, given the index of the object it is about to enter or leave.
    pub fn transmitted_index(&self, object_index: Float) -> Float {
        if self.inside_object {
            1.0
        } else {
            object_index
        }
    }

    /// Segment that continues on the other side of an interface.
    pub fn cross_interface(&self, o: Vector3f, d: Vector3f, object_index: Float) -> Self {
        Self {
            origin: o,
            dir: d,
            inside_object: !self.inside_object,
            previous_refraction: self.transmitted_index(object_index),
        }
    }
}
