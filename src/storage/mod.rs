// src/storage/mod.rs
pub mod snapshot;
