//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Duplex byte transport used by the negotiation driver

use crate::{Result, TelnetError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use metrics::counter;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

/// A connected byte stream to the peer
///
/// `poll_recv` must return `Ok(None)` when nothing arrives within `timeout`; only a closed or
/// failed transport is an error.
#[async_trait]
pub trait Transport: Send {
    /// Write all of `data` to the peer
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for the next chunk of bytes
    async fn poll_recv(&mut self, timeout: Duration) -> Result<Option<Bytes>>;

    /// False once the transport has closed or failed
    fn is_connected(&self) -> bool;
}

/// [`Transport`] over any `AsyncRead + AsyncWrite` stream (TCP socket, duplex pipe)
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
    buffer: BytesMut,
    buffer_size: usize,
    connected: bool,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap `stream`, reading at most `buffer_size` bytes per poll
    pub fn new(stream: S, buffer_size: usize) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(buffer_size),
            buffer_size: buffer_size.max(1),
            connected: true,
        }
    }

    /// Get a reference to the wrapped stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(TelnetError::ConnectionClosed);
        }
        trace!(len = data.len(), "sending");
        let written = async {
            self.stream.write_all(data).await?;
            self.stream.flush().await
        }
        .await;
        if let Err(error) = written {
            self.connected = false;
            return Err(error.into());
        }
        counter!("telnego.bytes.sent").increment(data.len() as u64);
        Ok(())
    }

    async fn poll_recv(&mut self, timeout: Duration) -> Result<Option<Bytes>> {
        if !self.connected {
            return Err(TelnetError::ConnectionClosed);
        }
        self.buffer.reserve(self.buffer_size);
        let mut limited = (&mut self.stream).take(self.buffer_size as u64);
        match tokio::time::timeout(timeout, limited.read_buf(&mut self.buffer)).await {
            Err(_elapsed) => Ok(None),
            Ok(Ok(0)) => {
                debug!("peer closed the transport");
                self.connected = false;
                Err(TelnetError::ConnectionClosed)
            }
            Ok(Ok(read)) => {
                trace!(len = read, "received");
                counter!("telnego.bytes.received").increment(read as u64);
                Ok(Some(self.buffer.split().freeze()))
            }
            Ok(Err(error)) => {
                self.connected = false;
                Err(error.into())
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
