//! Session state for Someleon.
//!
//! Chat transcripts are normalised into speaker-tagged turns and kept in a
//! process-scoped, in-memory store. Nothing is persisted: sessions live for
//! the lifetime of the server process.

pub mod store;
pub mod transcript;

pub use store::{Session, SessionStore};
pub use transcript::{parse, render, Speaker, Turn};
