// src/lib.rs — Library root for retouch

pub mod agent;
pub mod cli;
pub mod core;
pub mod infra;
pub mod media;
pub mod provider;
