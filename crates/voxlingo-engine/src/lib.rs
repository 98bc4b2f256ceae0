//! # voxlingo-engine
//!
//! The translation pipeline: stage the upload, transcribe it, then fan the
//! text out to every other configured language for translation and speech
//! synthesis.

#![deny(unsafe_code)]

pub mod errors;
pub mod orchestrator;
mod upload;

pub use errors::PipelineError;
pub use orchestrator::Orchestrator;
