//! # Summary
//!
//! A replicated key-value store. Every write runs its own single-decree
//! Paxos instance across a static replica set; reads are served from the
//! local store without consensus.

#[macro_use] extern crate derivative;
#[macro_use] extern crate log;

mod config;
mod error;
mod fault;
mod message;
mod node;
mod role;
mod shared;
mod socket;
mod store;
mod transport;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::fault::{Fault, NoFault, Probabilistic, Scripted};
pub use crate::message::{Operation, Phase, ProposalNumber, Request, Response};
pub use crate::node::Node;
pub use crate::role::acceptor::AcceptorState;
pub use crate::role::proposer::{majority, Ballots, MAX_NODES};
pub use crate::store::Store;
pub use crate::transport::{LocalNetwork, Service, TcpTransport, Transport, serve};
