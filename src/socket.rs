//! # Summary
//!
//! This module abstracts over TCP connections between clients, peers
//! and servers.
//!
//! Currently uses `bincode` to serialize messages inside `tokio-util`'s
//! length-delimited codec, which in turn wraps the two halves of a
//! `tokio` TCP stream. This lets us send and receive Rust structs
//! over a connection with minimal boilerplate on either end.

use std::marker::PhantomData;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::error::Result;

/// Receiving channel. Expects length-delimited, bincode-encoded data of type `R`.
pub struct Rx<R> {
    inner: FramedRead<OwnedReadHalf, LengthDelimitedCodec>,
    _marker: PhantomData<fn() -> R>,
}

/// Transmitting channel. Sends length-delimited, bincode-encoded data of type `T`.
pub struct Tx<T> {
    inner: FramedWrite<OwnedWriteHalf, LengthDelimitedCodec>,
    _marker: PhantomData<fn(T)>,
}

/// Split a `TcpStream` into a pair of receiving and transmitting channels.
pub fn split<R, T>(stream: TcpStream) -> (Rx<R>, Tx<T>)
where R: serde::de::DeserializeOwned,
      T: serde::Serialize,
{
    let (rx, tx) = stream.into_split();
    let rx = Rx {
        inner: FramedRead::new(rx, LengthDelimitedCodec::new()),
        _marker: PhantomData,
    };
    let tx = Tx {
        inner: FramedWrite::new(tx, LengthDelimitedCodec::new()),
        _marker: PhantomData,
    };
    (rx, tx)
}

impl<R: serde::de::DeserializeOwned> Rx<R> {
    /// Next message, or `None` once the peer closes its end.
    pub async fn recv(&mut self) -> Result<Option<R>> {
        match self.inner.next().await {
        | None => Ok(None),
        | Some(frame) => Ok(Some(bincode::deserialize(&frame?)?)),
        }
    }
}

impl<T: serde::Serialize> Tx<T> {
    pub async fn send(&mut self, message: &T) -> Result<()> {
        let frame = bincode::serialize(message)?;
        self.inner.send(Bytes::from(frame)).await?;
        Ok(())
    }
}
