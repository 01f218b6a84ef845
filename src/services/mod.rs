// src/services/mod.rs
//! Engine stages, external collaborators and view projections.

pub mod classifier;
pub mod directory;
pub mod extractor;
pub mod pipeline;
pub mod trust;
pub mod views;
