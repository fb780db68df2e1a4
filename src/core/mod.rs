// Copyright @yucwang 2021

pub mod computation_node;
pub mod error;
pub mod integrator;
pub mod interaction;
pub mod material;
pub mod photon_map;
pub mod progress;
pub mod rng;
pub mod scene;
pub mod scene_loader;
pub mod sensor;
pub mod settings;
pub mod shape;
