use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};

use crate::error::{Error, Result};
use crate::message::{Request, Response};
use crate::socket;
use crate::transport::{Service, Transport};

/// Opens a fresh connection for every call, so a restarted peer is
/// picked up without any reconnection logic.
#[derive(Copy, Clone, Debug, Default)]
pub struct TcpTransport;

impl TcpTransport {
    pub fn new() -> Self {
        TcpTransport
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn call(&self, peer: &str, request: Request) -> Result<Response> {
        let unreachable = |reason: String| Error::Transport {
            peer: peer.to_string(),
            reason,
        };
        let stream = TcpStream::connect(peer)
            .await
            .map_err(|error| unreachable(error.to_string()))?;
        stream.set_nodelay(true)?;
        let (mut rx, mut tx) = socket::split::<Response, Request>(stream);
        tx.send(&request).await?;
        rx.recv()
            .await?
            .ok_or_else(|| unreachable("connection closed before response".to_string()))
    }
}

/// Accepts connections until the listener fails, answering every request
/// on each connection with `service`.
pub async fn serve<S: Service>(listener: TcpListener, service: Arc<S>) -> Result<()> {
    info!("listening on {}", listener.local_addr()?);
    loop {
        let (stream, addr) = listener.accept().await?;
        trace!("accepted connection from {}", addr);
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(error) = respond(stream, service).await {
                debug!("connection from {} dropped: {}", addr, error);
            }
        });
    }
}

async fn respond<S: Service>(stream: TcpStream, service: Arc<S>) -> Result<()> {
    stream.set_nodelay(true)?;
    let (mut rx, mut tx) = socket::split::<Request, Response>(stream);
    while let Some(request) = rx.recv().await? {
        trace!("received {:?}", request);
        let response = service.handle(request).await;
        tx.send(&response).await?;
    }
    Ok(())
}
