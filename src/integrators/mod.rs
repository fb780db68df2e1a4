// Copyright @yucwang 2026

pub mod photon_gather;
