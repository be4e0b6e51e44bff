//! # Summary
//!
//! This module holds the per-node state that every role touches. Acceptor
//! memory and the store sit behind one exclusive lock, so a promise/accept
//! comparison can never interleave with another call's update, nor with a
//! store mutation.
//!
//! Guards must never be held across an `.await`.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::fault::Fault;
use crate::message::{Operation, ProposalNumber};
use crate::role::acceptor::{Acceptor, AcceptorState};
use crate::role::learner;
use crate::store::Store;

/// Thread-safe handle to a node's `State`.
#[derive(Clone, Debug)]
pub struct Shared(Arc<Mutex<State>>);

impl Shared {
    pub fn new(id: u64, fault: Box<dyn Fault>) -> Self {
        Shared(Arc::new(Mutex::new(State {
            id,
            acceptor: Acceptor::new(id, fault),
            store: Store::default(),
        })))
    }

    /// Acquires the node lock.
    pub fn lock(&self) -> MutexGuard<State> {
        self.0.lock()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().store.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().store.contains(key)
    }

    pub fn prepare(&self, number: ProposalNumber, operation: &Operation) -> bool {
        self.lock().acceptor.prepare(number, operation)
    }

    pub fn accept(&self, number: ProposalNumber, operation: &Operation) -> bool {
        self.lock().acceptor.accept(number, operation)
    }

    pub fn learn(&self, operation: &Operation) -> bool {
        let mut state = self.lock();
        let id = state.id;
        learner::apply(id, &mut state.store, operation)
    }

    pub fn acceptor(&self) -> AcceptorState {
        self.lock().acceptor.state().clone()
    }

    pub fn store(&self) -> Store {
        self.lock().store.clone()
    }
}

/// Everything guarded by the node lock.
#[derive(Debug)]
pub struct State {
    id: u64,
    acceptor: Acceptor,
    store: Store,
}
