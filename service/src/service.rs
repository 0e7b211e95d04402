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

//! Upward API used by the terminal layer riding on a negotiated session

use crate::{
    FeedOutput, NegotiatedOptions, Negotiator, Result, ServiceConfig, SessionId, SessionManager,
    SessionSnapshot, Transport,
};
use bytes::BytesMut;
use std::time::Duration;
use telnego_codec::{Encoder, NegotiationTable, Role, SessionConfig};
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

/// Telnet negotiation service
///
/// Owns the session store. Every operation takes the session id; I/O happens on the transport
/// passed in, never under a session lock.
#[derive(Debug)]
pub struct TelnetService {
    manager: SessionManager,
    config: ServiceConfig,
}

impl Default for TelnetService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl TelnetService {
    /// Create a service
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            manager: SessionManager::new(config.max_sessions)
                .with_pending_limit(config.max_pending_bytes),
            config,
        }
    }

    /// Service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The session store
    pub fn sessions(&self) -> &SessionManager {
        &self.manager
    }

    fn negotiator(&self) -> Negotiator<'_> {
        Negotiator::new(&self.manager, &self.config.negotiation)
    }

    /// Create a session
    pub fn create_session(&self, role: Role, config: SessionConfig) -> Result<SessionId> {
        self.manager.create(role, config)
    }

    /// Negotiate `table` on session `id` over `transport`
    pub async fn negotiate<T>(
        &self,
        id: SessionId,
        transport: &mut T,
        table: &NegotiationTable,
    ) -> Result<NegotiatedOptions>
    where
        T: Transport + ?Sized,
    {
        self.negotiator().negotiate(id, transport, table).await
    }

    /// Feed received bytes to session `id`
    ///
    /// Application data that arrived during [`TelnetService::negotiate`] and was not read yet
    /// comes first in [`FeedOutput::data`]. The caller is responsible for sending
    /// [`FeedOutput::replies`] to the peer.
    pub fn feed(&self, id: SessionId, input: &[u8]) -> Result<FeedOutput> {
        self.manager.feed(id, input)
    }

    /// Snapshot of session `id`
    pub fn get_state(&self, id: SessionId) -> Result<SessionSnapshot> {
        self.manager.snapshot(id)
    }

    /// Stop or resume echoing input on session `id` without renegotiating
    ///
    /// Returns the previous setting, so it can be restored after e.g. a password prompt.
    pub fn set_echo_suppressed(&self, id: SessionId, suppressed: bool) -> Result<bool> {
        self.manager
            .with_session(id, |session| session.set_echo_suppressed(suppressed))
    }

    /// Destroy session `id`
    pub fn destroy(&self, id: SessionId) -> Result<()> {
        self.manager.destroy(id)
    }

    /// Read the next application byte, handling Telnet commands on the way
    ///
    /// Returns `None` if nothing arrives within `timeout`. When echo is negotiated and not
    /// suppressed the byte is echoed back to the peer.
    #[instrument(skip(self, transport), fields(session_id = %id))]
    pub async fn read_filtered<T>(
        &self,
        id: SessionId,
        transport: &mut T,
        timeout: Duration,
    ) -> Result<Option<u8>>
    where
        T: Transport + ?Sized,
    {
        let deadline = Instant::now() + timeout;
        let negotiator = self.negotiator();
        loop {
            if let Some(byte) = self.manager.pop_pending(id)? {
                if self.manager.with_session(id, |session| session.echo_enabled())? {
                    trace!(byte, "echoing");
                    self.send_data(id, transport, &[byte]).await?;
                }
                return Ok(Some(byte));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let wait = remaining.min(self.config.negotiation.poll_timeout);
            if let Some(input) = transport.poll_recv(wait).await? {
                negotiator.pump(id, transport, &input).await?;
            }
        }
    }

    /// Read until `pattern` appears in the application data or `timeout` elapses
    ///
    /// Returns true if the pattern was seen.
    #[instrument(skip(self, transport, pattern), fields(session_id = %id, len = pattern.len()))]
    pub async fn wait_for_pattern<T>(
        &self,
        id: SessionId,
        transport: &mut T,
        pattern: &[u8],
        timeout: Duration,
    ) -> Result<bool>
    where
        T: Transport + ?Sized,
    {
        if pattern.is_empty() {
            return Ok(true);
        }
        let deadline = Instant::now() + timeout;
        let mut window = Vec::with_capacity(pattern.len());
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(byte) = self.read_filtered(id, transport, remaining).await? else {
                debug!("pattern not seen");
                return Ok(false);
            };
            if window.len() == pattern.len() {
                window.remove(0);
            }
            window.push(byte);
            if window == pattern {
                return Ok(true);
            }
        }
    }

    /// Send application bytes, doubling `0xFF`
    pub async fn send_data<T>(&self, id: SessionId, transport: &mut T, data: &[u8]) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        let encoded = self.manager.with_session(id, |session| {
            let mut buffer = BytesMut::with_capacity(data.len());
            session.encode(data, &mut buffer).map(|()| buffer.freeze())
        })??;
        transport.send(&encoded).await
    }

    /// Send a line of text followed by the session's line ending
    pub async fn send_line<T>(&self, id: SessionId, transport: &mut T, line: &str) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        let encoded = self.manager.with_session(id, |session| {
            let mut buffer = BytesMut::with_capacity(line.len() + 2);
            session.encode(line, &mut buffer).map(|()| buffer.freeze())
        })??;
        transport.send(&encoded).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StreamTransport, TelnetError};
    use telnego_codec::consts;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_destroyed_session_not_found() {
        let service = TelnetService::default();
        let id = service
            .create_session(Role::Server, SessionConfig::default())
            .unwrap();
        service.destroy(id).unwrap();
        assert!(matches!(
            service.get_state(id),
            Err(TelnetError::SessionNotFound(_))
        ));
        assert!(matches!(
            service.feed(id, b"x"),
            Err(TelnetError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_send_data_escapes_iac() {
        let service = TelnetService::default();
        let id = service
            .create_session(Role::Client, SessionConfig::default())
            .unwrap();
        let (local, remote) = duplex(64);
        let mut local = StreamTransport::new(local, 64);
        let mut remote = StreamTransport::new(remote, 64);

        service
            .send_data(id, &mut local, &[b'a', consts::IAC])
            .await
            .unwrap();
        service.send_line(id, &mut local, "ok").await.unwrap();
        let received = remote
            .poll_recv(Duration::from_millis(100))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&received[..], &[b'a', consts::IAC, consts::IAC, b'o', b'k', b'\r', b'\n']);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_filtered_times_out() {
        let service = TelnetService::default();
        let id = service
            .create_session(Role::Client, SessionConfig::default())
            .unwrap();
        let (local, _remote) = duplex(64);
        let mut local = StreamTransport::new(local, 64);
        let read = service
            .read_filtered(id, &mut local, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(read, None);
    }
}
