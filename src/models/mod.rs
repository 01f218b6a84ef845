// src/models/mod.rs
//! Data structures shared by the engine stages.

pub mod classification;
pub mod credential;
pub mod evidence;
pub mod trust_score;
