// src/wallet/mod.rs
pub mod credential_store;
