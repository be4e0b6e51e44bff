//! # Summary
//!
//! This module defines the `Proposer`, which coordinates one write at a
//! time across the replica set:
//!
//! 1. Prepare: every replica is asked to promise a fresh proposal number.
//! 2. Accept: every replica is asked to accept the operation under that number.
//! 3. Learn: every replica is told to apply the operation, and so is this node.
//!
//! Prepare and Accept each need a strict majority of the configured replica
//! set. Unreachable replicas, timeouts, and rejections all count the same:
//! as a missing acknowledgement. A failed attempt is retried with a higher
//! number, up to the configured limit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use tokio::time;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::{Operation, Phase, ProposalNumber, Request, Response};
use crate::shared::Shared;
use crate::transport::Transport;

/// Exclusive upper bound on node IDs, and the stride between a node's
/// consecutive proposal numbers.
pub const MAX_NODES: u64 = 1000;

/// Smallest number of acknowledgements that is more than half of `count`.
pub fn majority(count: usize) -> usize {
    count / 2 + 1
}

/// Generates proposal numbers of the form `counter * MAX_NODES + id`.
///
/// Numbers from one generator strictly increase, and generators with
/// distinct IDs below `MAX_NODES` never produce the same number.
#[derive(Debug)]
pub struct Ballots {
    id: u64,
    counter: AtomicU64,
}

impl Ballots {
    pub fn new(id: u64) -> Self {
        Ballots {
            id,
            counter: AtomicU64::new(0),
        }
    }

    /// Next number, raised above the round of `floor` if necessary.
    pub fn next(&self, floor: ProposalNumber) -> Result<ProposalNumber> {
        let round = floor.0 / MAX_NODES;
        let previous = self.counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |counter| {
                counter.max(round).checked_add(1)
            })
            .map_err(|_| Error::ProposalOverflow)?;
        let counter = previous.max(round) + 1;
        counter.checked_mul(MAX_NODES)
            .and_then(|number| number.checked_add(self.id))
            .map(ProposalNumber)
            .ok_or(Error::ProposalOverflow)
    }
}

/// Drives Paxos rounds on behalf of one node.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub(crate) struct Proposer<T> {
    id: u64,

    /// Own entry in the replica set, served without the transport
    address: String,

    replicas: Vec<String>,

    retries: usize,

    /// Bound on each remote call
    timeout: Duration,

    /// Base delay between attempts; zero retries immediately
    backoff: Duration,

    ballots: Ballots,

    shared: Shared,

    #[derivative(Debug = "ignore")]
    transport: Arc<T>,
}

impl<T: Transport> Proposer<T> {
    pub fn new(config: &Config, shared: Shared, transport: Arc<T>) -> Self {
        Proposer {
            id: config.id(),
            address: config.address().to_string(),
            replicas: config.replicas().to_vec(),
            retries: config.retries(),
            timeout: config.timeout(),
            backoff: config.backoff(),
            ballots: Ballots::new(config.id()),
            shared,
            transport,
        }
    }

    /// Runs up to `retries` rounds for `operation`, returning the number
    /// it was decided under.
    pub async fn propose(&self, operation: &Operation) -> Result<ProposalNumber> {
        for attempt in 1..=self.retries {
            let floor = self.shared.acceptor().highest_promised;
            let number = self.ballots.next(floor)?;
            info!("{} proposing {} as {} (attempt {}/{})", self.id, operation, number, attempt, self.retries);
            match self.round(number, operation).await {
            | Ok(()) => {
                info!("{} committed {} as {}", self.id, operation, number);
                return Ok(number)
            }
            | Err(error) => debug!("{} attempt {} for {} failed: {}", self.id, attempt, operation, error),
            }
            if attempt < self.retries {
                self.pause(attempt).await;
            }
        }
        warn!("{} gave up on {} after {} attempts", self.id, operation, self.retries);
        Err(Error::RetryExhausted { attempts: self.retries })
    }

    async fn round(&self, number: ProposalNumber, operation: &Operation) -> Result<()> {
        let prepare = Request::Prepare { number, operation: operation.clone() };
        self.phase(Phase::Prepare, prepare).await?;
        let accept = Request::Accept { number, operation: operation.clone() };
        self.phase(Phase::Accept, accept).await?;
        self.learn(operation).await;
        Ok(())
    }

    /// Sends `request` to every replica and waits for all of them before
    /// counting acknowledgements.
    async fn phase(&self, phase: Phase, request: Request) -> Result<usize> {
        let needed = majority(self.replicas.len());
        let responses = future::join_all(
            self.replicas.iter().map(|peer| self.send(peer, request.clone()))
        ).await;
        let acks = responses.iter()
            .zip(&self.replicas)
            .filter(|(response, peer)| match response {
            | Ok(response) => response.acknowledges(phase),
            | Err(error) => {
                debug!("{} {} to {} failed: {}", self.id, phase, peer, error);
                false
            }
            })
            .count();
        debug!("{} {} acknowledged by {} of {}", self.id, phase, acks, self.replicas.len());
        if acks >= needed {
            Ok(acks)
        } else {
            Err(Error::QuorumNotReached { phase, acks, needed })
        }
    }

    /// Best-effort broadcast, then local application.
    async fn learn(&self, operation: &Operation) {
        let remote = self.replicas.iter()
            .filter(|peer| **peer != self.address)
            .collect::<Vec<_>>();
        let results = future::join_all(remote.iter().map(|peer| {
            self.send(peer, Request::Learn { operation: operation.clone() })
        })).await;
        for (result, peer) in results.into_iter().zip(remote) {
            if let Err(error) = result {
                debug!("{} learn to {} failed: {}", self.id, peer, error);
            }
        }
        self.shared.learn(operation);
    }

    async fn send(&self, peer: &str, request: Request) -> Result<Response> {
        if peer == self.address {
            return self.local(&request).ok_or_else(|| Error::Transport {
                peer: peer.to_string(),
                reason: format!("{:?} cannot be served locally", request),
            })
        }
        trace!("{} sending {:?} to {}", self.id, request, peer);
        match time::timeout(self.timeout, self.transport.call(peer, request)).await {
        | Ok(response) => response,
        | Err(_) => Err(Error::Timeout { peer: peer.to_string() }),
        }
    }

    /// Serves this node's own share of a phase without a round trip.
    fn local(&self, request: &Request) -> Option<Response> {
        match request {
        | Request::Prepare { number, operation } => {
            Some(Response::Promise(self.shared.prepare(*number, operation)))
        }
        | Request::Accept { number, operation } => {
            Some(Response::Accepted(self.shared.accept(*number, operation)))
        }
        | Request::Learn { operation } => {
            self.shared.learn(operation);
            Some(Response::Learned)
        }
        | Request::Get { .. } | Request::Put { .. } | Request::Delete { .. } => None,
        }
    }

    async fn pause(&self, attempt: usize) {
        if self.backoff.as_nanos() == 0 {
            return
        }
        let jitter = 1.0 + rand::random::<f64>() / 2.0;
        let delay = self.backoff.mul_f64(attempt as f64 * jitter);
        trace!("{} backing off for {:?}", self.id, delay);
        time::sleep(delay).await;
    }
}
