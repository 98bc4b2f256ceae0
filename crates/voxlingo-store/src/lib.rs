//! # voxlingo-store
//!
//! Staging directory for request artifacts: uploaded recordings (`.wav`)
//! live for the duration of one request, synthesized speech (`.mp3`) until
//! the reaper removes it.

#![deny(unsafe_code)]

pub mod disk;
pub mod reaper;

pub use disk::DiskArtifactStore;
pub use reaper::{run_reaper, spawn_reaper};
