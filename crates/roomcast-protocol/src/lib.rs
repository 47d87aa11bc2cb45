//! Wire protocol for Roomcast.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`ChatMessage`],
//!   [`User`]): the events that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer doesn't know about rooms or connections beyond
//! the [`ConnectionId`](roomcast_transport::ConnectionId) carried in a
//! [`User`]; it only knows how to serialize and deserialize events.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ChatMessage, ClientEvent, ServerEvent, User};
