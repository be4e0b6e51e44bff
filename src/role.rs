//! # Summary
//!
//! This module contains the three Paxos roles every node plays. Each
//! write runs its own single-decree instance: there are no slots, and a
//! decided operation is applied as soon as it is learned.

/// Promise/accept memory.
pub(crate) mod acceptor;

/// Applies decided operations.
pub(crate) mod learner;

/// Drives rounds and numbers proposals.
pub(crate) mod proposer;
