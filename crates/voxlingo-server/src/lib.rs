//! # voxlingo-server
//!
//! HTTP surface over the translation pipeline.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | recorder page |
//! | `GET /static/*` | files from the configured static directory |
//! | `GET /health` | liveness and uptime |
//! | `POST /api/translate` | multipart upload → transcription, translations, audio URLs |
//! | `GET /api/audio/{filename}` | synthesized speech as `audio/mpeg` |

#![deny(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;

pub use error::ApiError;
pub use server::{build_router, start, AppState, ServerHandle};
pub use shutdown::ShutdownCoordinator;
