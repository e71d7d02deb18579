//! # tutorlink-model
//!
//! Shared domain types for the tutorlink admin console: the entities served
//! by the placement API and the messages delivered over the push channel.
//!
//! ## Design Principles
//!
//! - Wire JSON uses camelCase field names; structs keep Rust naming and map
//!   via serde attributes
//! - Fields the server may omit are defaulted so a partial record still
//!   decodes
//! - Push frames decode in two steps so an unknown message type is
//!   distinguishable from a malformed payload

mod error;
mod message;
mod status;
mod types;

pub use error::MessageError;
pub use message::*;
pub use status::*;
pub use types::*;
