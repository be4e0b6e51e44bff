//! # Summary
//!
//! This module defines the `Acceptor`, which acts as Paxos's distributed
//! memory. Acceptors remember the highest proposal number they have
//! promised, and the most recent proposal they accepted.
//!
//! State lives for the lifetime of the process and is never persisted.
//! All calls happen under the owning node's lock, so each comparison and
//! update below is atomic with respect to other proposers.

use crate::fault::Fault;
use crate::message::{Operation, Phase, ProposalNumber};

/// Snapshot of an acceptor's memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AcceptorState {
    /// Highest number promised; never decreases
    pub highest_promised: ProposalNumber,

    /// Number of the most recently accepted proposal
    pub highest_accepted: ProposalNumber,

    /// Operation of the most recently accepted proposal
    pub accepted_operation: Option<Operation>,
}

/// Functions as distributed memory.
#[derive(Derivative)]
#[derivative(Debug)]
pub(crate) struct Acceptor {
    /// ID of the owning node
    id: u64,

    state: AcceptorState,

    /// Consulted before every prepare and accept
    #[derivative(Debug = "ignore")]
    fault: Box<dyn Fault>,
}

impl Acceptor {
    pub fn new(id: u64, fault: Box<dyn Fault>) -> Self {
        Acceptor {
            id,
            state: AcceptorState::default(),
            fault,
        }
    }

    pub fn state(&self) -> &AcceptorState {
        &self.state
    }

    /// Promises not to accept anything numbered below `number`, if no
    /// equal or higher number has been promised yet.
    pub fn prepare(&mut self, number: ProposalNumber, operation: &Operation) -> bool {
        if self.fault.inject(Phase::Prepare) {
            debug!("{} injected prepare failure for {}", self.id, number);
            return false
        }
        if number > self.state.highest_promised {
            self.state.highest_promised = number;
            debug!("{} promised {} for {}", self.id, number, operation);
            true
        } else {
            debug!("{} rejected prepare {} (promised {})", self.id, number, self.state.highest_promised);
            false
        }
    }

    /// Accepts the proposal unless a higher number has been promised.
    pub fn accept(&mut self, number: ProposalNumber, operation: &Operation) -> bool {
        if self.fault.inject(Phase::Accept) {
            debug!("{} injected accept failure for {}", self.id, number);
            return false
        }
        if number >= self.state.highest_promised {
            self.state.highest_promised = number;
            self.state.highest_accepted = number;
            self.state.accepted_operation = Some(operation.clone());
            debug!("{} accepted {} for {}", self.id, number, operation);
            true
        } else {
            debug!("{} rejected accept {} (promised {})", self.id, number, self.state.highest_promised);
            false
        }
    }
}
