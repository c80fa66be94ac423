//! Shared types for the Someleon workspace.
//!
//! Everything the other crates agree on lives here: the error type, the
//! configuration tree, agent output units, run frames, the structured
//! result document, and trace events.

pub mod config;
pub mod error;
pub mod frame;
pub mod result;
pub mod stream;
pub mod trace;

pub use error::{Error, Result};
pub use frame::{Phase, RunFrame};
pub use result::StructuredResult;
pub use stream::{AgentUnit, BoxStream};
