//! # Summary
//!
//! This module abstracts over how nodes reach each other. The proposer
//! only needs to send a `Request` to an address and get a `Response` back;
//! how the address is resolved and the call carried is up to the
//! `Transport`.
//!
//! Two transports are provided: `LocalNetwork`, which dispatches to nodes
//! living in the same process and can simulate crashed peers, and
//! `TcpTransport`, which carries bincode frames over TCP.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::{Request, Response};

/// In-process transport.
mod local;

/// TCP transport and server loop.
mod tcp;

pub use self::local::LocalNetwork;
pub use self::tcp::{serve, TcpTransport};

/// Client side of a call to a peer.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn call(&self, peer: &str, request: Request) -> Result<Response>;
}

/// Server side of a call: anything that can answer a `Request`.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    async fn handle(&self, request: Request) -> Response;
}
