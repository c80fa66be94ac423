//! Agent runtime adapters.
//!
//! The rest of the workspace only sees [`TaskRunner`] and [`RunnerSource`]:
//! hand a prompt to a model, get back a stream of [`AgentUnit`]s. The
//! production runner talks to the Anthropic Messages API; [`scripted`]
//! replays canned output for tests and offline use.
//!
//! [`AgentUnit`]: sl_domain::AgentUnit

pub mod anthropic;
pub mod scripted;
pub mod source;
pub mod traits;
pub(crate) mod sse;
pub mod util;

pub use anthropic::AnthropicRunner;
pub use scripted::{Script, ScriptedRunner, StaticSource, UnavailableSource};
pub use source::AnthropicSource;
pub use traits::{RunnerSource, TaskRunner, UnitStream};
