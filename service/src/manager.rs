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

//! Session state store
//!
//! The SessionManager is responsible for:
//! - Owning every live session, keyed by a never-reused id
//! - Serializing access to one session through the map's entry lock
//! - Feeding received bytes to a session and collecting what it produced
//! - Session lifecycle metrics
//!
//! All access goes through synchronous closures, so no lock is held across an await.

use crate::types::extend_application_bytes;
use crate::{FeedOutput, Result, SessionId, SessionSnapshot, TelnetError};
use bytes::Bytes;
use dashmap::DashMap;
use metrics::{counter, gauge};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use telnego_codec::{Role, SessionConfig, TelnetEvent, TelnetSession};
use tracing::{debug, info, warn};

/// Stored session entry
#[derive(Debug)]
struct ManagedSession {
    /// The protocol state
    session: TelnetSession,
    /// Application bytes received by the driver but not yet read
    pending: VecDeque<u8>,
}

impl ManagedSession {
    /// Run the parser over `input`, returning events and queued replies.
    fn process(&mut self, id: SessionId, input: &[u8]) -> (Vec<TelnetEvent>, Bytes) {
        let before = self.session.stats().violations();
        let events = self.session.receive(input);
        let violations = self.session.stats().violations() - before;
        if violations > 0 {
            counter!("telnego.protocol.violations").increment(violations);
            debug!(session_id = %id, violations, "input contained protocol violations");
        }
        (events, self.session.take_outbound())
    }
}

/// Concurrent store of live sessions
#[derive(Debug)]
pub struct SessionManager {
    /// Live sessions (lock-free concurrent map)
    sessions: DashMap<SessionId, ManagedSession>,
    /// Next session ID (monotonically increasing)
    next_id: AtomicU64,
    /// Session limit
    max_sessions: usize,
    /// Unread application bytes kept per session
    max_pending: usize,
}

impl SessionManager {
    /// Create an empty store holding at most `max_sessions` sessions
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
            max_sessions,
            max_pending: 64 * 1024,
        }
    }

    /// Limit the unread application bytes kept per session
    pub fn with_pending_limit(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Get the next session ID
    fn next_session_id(&self) -> SessionId {
        SessionId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a session for `role`
    pub fn create(&self, role: Role, config: SessionConfig) -> Result<SessionId> {
        if self.sessions.len() >= self.max_sessions {
            return Err(TelnetError::MaxSessionsReached(self.max_sessions));
        }
        let id = self.next_session_id();
        self.sessions.insert(
            id,
            ManagedSession {
                session: TelnetSession::new(role, config),
                pending: VecDeque::new(),
            },
        );

        counter!("telnego.sessions.created").increment(1);
        gauge!("telnego.sessions.active").increment(1.0);
        info!(session_id = %id, role = %role, "session created");
        Ok(id)
    }

    /// Run `f` on a session under its entry lock
    pub fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut TelnetSession) -> R) -> Result<R> {
        self.sessions
            .get_mut(&id)
            .map(|mut entry| f(&mut entry.session))
            .ok_or(TelnetError::SessionNotFound(id))
    }

    /// Feed received bytes to a session, returning everything it produced
    ///
    /// Unread bytes kept from earlier reads come first in [`FeedOutput::data`].
    pub fn feed(&self, id: SessionId, input: &[u8]) -> Result<FeedOutput> {
        self.sessions
            .get_mut(&id)
            .map(|mut entry| {
                let (events, replies) = entry.process(id, input);
                let mut output = FeedOutput::from_events(events, replies);
                if !entry.pending.is_empty() {
                    let mut data: Vec<u8> = entry.pending.drain(..).collect();
                    data.append(&mut output.data);
                    output.data = data;
                }
                output
            })
            .ok_or(TelnetError::SessionNotFound(id))
    }

    /// Feed received bytes to a session, keeping application bytes for later reads.
    /// Returns the replies owed to the peer.
    pub fn ingest(&self, id: SessionId, input: &[u8]) -> Result<Bytes> {
        self.sessions
            .get_mut(&id)
            .map(|mut entry| {
                let (events, replies) = entry.process(id, input);
                let mut data = Vec::new();
                extend_application_bytes(&mut data, &events);
                let room = self.max_pending.saturating_sub(entry.pending.len());
                if data.len() > room {
                    warn!(session_id = %id, dropped = data.len() - room, "unread data limit reached");
                    data.truncate(room);
                }
                entry.pending.extend(data);
                replies
            })
            .ok_or(TelnetError::SessionNotFound(id))
    }

    /// Take the oldest unread application byte
    pub fn pop_pending(&self, id: SessionId) -> Result<Option<u8>> {
        self.sessions
            .get_mut(&id)
            .map(|mut entry| entry.pending.pop_front())
            .ok_or(TelnetError::SessionNotFound(id))
    }

    /// Snapshot of a session
    pub fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot> {
        self.sessions
            .get(&id)
            .map(|entry| SessionSnapshot::capture(id, &entry.session))
            .ok_or(TelnetError::SessionNotFound(id))
    }

    /// Remove a session
    pub fn destroy(&self, id: SessionId) -> Result<()> {
        if self.sessions.remove(&id).is_some() {
            gauge!("telnego.sessions.active").decrement(1.0);
            info!(session_id = %id, "session destroyed");
            Ok(())
        } else {
            Err(TelnetError::SessionNotFound(id))
        }
    }

    /// Check whether a session exists
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Get all session IDs
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Get the number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True if no session is live
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
