// Copyright @yucwang 2021

pub mod frame;
pub mod renderer;
