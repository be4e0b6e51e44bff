use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::error::{Error, Result};
use crate::fault::{Fault, NoFault, Probabilistic};
use crate::node::Node;
use crate::role::proposer::MAX_NODES;
use crate::transport::{self, TcpTransport};

const DEFAULT_RETRIES: usize = 5;

#[derive(Clone, Debug)]
pub struct Config {
    /// Unique node ID, below `MAX_NODES`
    id: u64,

    /// Address this node listens on; its entry in `replicas`
    address: String,

    /// Every member of the replica set, this node included
    replicas: Vec<String>,

    /// Rounds attempted per write before giving up
    retries: usize,

    /// Timeout for each call to a peer
    timeout: Duration,

    /// Base delay between rounds of the same write
    backoff: Duration,

    /// Chance that an acceptor call fails synthetically
    fault_probability: f64,
}

impl Config {
    pub fn new<A: Into<String>>(id: u64, address: A, replicas: Vec<String>) -> Self {
        Config {
            id,
            address: address.into(),
            replicas,
            retries: DEFAULT_RETRIES,
            timeout: Duration::from_secs(1),
            backoff: Duration::from_millis(0),
            fault_probability: 0.0,
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_fault_probability(mut self, probability: f64) -> Self {
        self.fault_probability = probability;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn replicas(&self) -> &[String] {
        &self.replicas
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    pub fn fault_probability(&self) -> f64 {
        self.fault_probability
    }

    /// Fault injection described by this configuration.
    pub fn fault(&self) -> Box<dyn Fault> {
        if self.fault_probability > 0.0 {
            Box::new(Probabilistic::new(self.fault_probability))
        } else {
            Box::new(NoFault)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id >= MAX_NODES {
            return Err(Error::Config(format!("node ID {} must be below {}", self.id, MAX_NODES)))
        }
        if self.replicas.is_empty() {
            return Err(Error::Config("replica set is empty".to_string()))
        }
        if self.retries == 0 {
            return Err(Error::Config("at least one attempt is required".to_string()))
        }
        if !(0.0..=1.0).contains(&self.fault_probability) {
            return Err(Error::Config(format!(
                "fault probability {} is outside [0, 1]",
                self.fault_probability,
            )))
        }
        if !self.replicas.iter().any(|replica| *replica == self.address) {
            warn!("{} is not in its own replica set and will only coordinate", self.address);
        }
        Ok(())
    }

    /// Serves a node over TCP on `address` until the listener fails.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.address).await?;
        let node = Arc::new(Node::new(&self, TcpTransport::new())?);
        info!("node {} serving replicas {:?}", self.id, self.replicas);
        transport::serve(listener, node).await
    }
}
