//! # Summary
//!
//! This module defines the `Node`, which composes a proposer, an acceptor,
//! a learner and a store behind one lock, and exposes them as the six
//! calls a replica answers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fault::Fault;
use crate::message::{Operation, ProposalNumber, Request, Response};
use crate::role::acceptor::AcceptorState;
use crate::role::proposer::Proposer;
use crate::shared::Shared;
use crate::store::Store;
use crate::transport::{Service, Transport};

/// One replica of the key-value store.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Node<T> {
    id: u64,
    shared: Shared,
    proposer: Proposer<T>,
}

impl<T: Transport> Node<T> {
    /// Fault injection follows the configured probability.
    pub fn new(config: &Config, transport: T) -> Result<Self> {
        Self::with_fault(config, transport, config.fault())
    }

    /// Overrides the configured fault injection.
    pub fn with_fault(config: &Config, transport: T, fault: Box<dyn Fault>) -> Result<Self> {
        config.validate()?;
        let shared = Shared::new(config.id(), fault);
        let proposer = Proposer::new(config, shared.clone(), Arc::new(transport));
        Ok(Node {
            id: config.id(),
            shared,
            proposer,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Reads the local store; no consensus, possibly stale.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = self.shared.get(key);
        debug!("{} get {} -> {:?}", self.id, key, value);
        value
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<ProposalNumber> {
        let operation = Operation::put(key, value)?;
        self.proposer.propose(&operation).await
    }

    /// Fails with `NotFound`, without running a round, if this node does
    /// not hold `key`.
    pub async fn delete(&self, key: &str) -> Result<ProposalNumber> {
        let operation = Operation::delete(key)?;
        if !self.shared.contains(key) {
            debug!("{} delete {} not found", self.id, key);
            return Err(Error::NotFound { key: key.to_string() })
        }
        self.proposer.propose(&operation).await
    }

    pub fn prepare(&self, number: ProposalNumber, operation: &Operation) -> bool {
        self.shared.prepare(number, operation)
    }

    pub fn accept(&self, number: ProposalNumber, operation: &Operation) -> bool {
        self.shared.accept(number, operation)
    }

    /// Applies a decided operation, returning whether the key was present.
    pub fn learn(&self, operation: &Operation) -> bool {
        self.shared.learn(operation)
    }

    pub fn acceptor(&self) -> AcceptorState {
        self.shared.acceptor()
    }

    pub fn store(&self) -> Store {
        self.shared.store()
    }
}

#[async_trait]
impl<T: Transport> Service for Node<T> {
    async fn handle(&self, request: Request) -> Response {
        trace!("{} handling {:?}", self.id, request);
        match request {
        | Request::Get { key } => Response::Value(self.get(&key)),
        | Request::Put { key, value } => match self.put(&key, &value).await {
            | Ok(_) => Response::Written(true),
            | Err(error) => {
                info!("{} put {} failed: {}", self.id, key, error);
                Response::Written(false)
            }
        },
        | Request::Delete { key } => match self.delete(&key).await {
            | Ok(_) => Response::Deleted(true),
            | Err(error) => {
                info!("{} delete {} failed: {}", self.id, key, error);
                Response::Deleted(false)
            }
        },
        | Request::Prepare { number, operation } => Response::Promise(self.prepare(number, &operation)),
        | Request::Accept { number, operation } => Response::Accepted(self.accept(number, &operation)),
        | Request::Learn { operation } => {
            self.learn(&operation);
            Response::Learned
        }
        }
    }
}
