use std::sync::{Arc, Weak};

use async_trait::async_trait;
use hashbrown::{HashMap as Map, HashSet as Set};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::message::{Request, Response};
use crate::transport::{Service, Transport};

/// Registry of services reachable within this process. All clones share
/// the same registry.
///
/// Holds only weak references, so a dropped node becomes unreachable
/// instead of being kept alive by its peers.
#[derive(Clone, Default)]
pub struct LocalNetwork(Arc<RwLock<Registry>>);

#[derive(Default)]
struct Registry {
    services: Map<String, Weak<dyn Service>>,
    crashed: Set<String>,
}

impl LocalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `service` reachable at `address`, replacing any previous one.
    pub fn register<S: Service>(&self, address: &str, service: &Arc<S>) {
        let service: Arc<dyn Service> = service.clone();
        self.0.write().services.insert(address.to_string(), Arc::downgrade(&service));
    }

    /// Calls to `address` fail until it recovers.
    pub fn crash(&self, address: &str) {
        info!("crashing {}", address);
        self.0.write().crashed.insert(address.to_string());
    }

    pub fn recover(&self, address: &str) {
        info!("recovering {}", address);
        self.0.write().crashed.remove(address);
    }

    pub fn is_crashed(&self, address: &str) -> bool {
        self.0.read().crashed.contains(address)
    }
}

#[async_trait]
impl Transport for LocalNetwork {
    async fn call(&self, peer: &str, request: Request) -> Result<Response> {
        let service = {
            let registry = self.0.read();
            if registry.crashed.contains(peer) {
                return Err(Error::Transport {
                    peer: peer.to_string(),
                    reason: "crashed".to_string(),
                })
            }
            registry.services
                .get(peer)
                .and_then(Weak::upgrade)
                .ok_or_else(|| Error::Transport {
                    peer: peer.to_string(),
                    reason: "no such node".to_string(),
                })?
        };
        Ok(service.handle(request).await)
    }
}
