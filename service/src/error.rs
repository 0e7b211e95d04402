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

//! Error types for the negotiation service

use crate::types::SessionId;
use thiserror::Error;

/// Result type for operations
pub type Result<T> = std::result::Result<T, TelnetError>;

/// Negotiation service error types
#[derive(Debug, Error)]
pub enum TelnetError {
    /// I/O error from the underlying transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error from the codec layer
    #[error("Protocol error: {0}")]
    Protocol(#[from] telnego_codec::CodecError),

    /// Session with the given ID was not found
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),

    /// The peer closed the transport
    #[error("Connection closed")]
    ConnectionClosed,

    /// Maximum number of sessions reached
    #[error("Maximum sessions ({0}) reached")]
    MaxSessionsReached(usize),
}

impl TelnetError {
    /// Check if the error is recoverable
    ///
    /// Recoverable errors leave the service usable; retrying the operation might succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TelnetError::MaxSessionsReached(_))
    }

    /// Check if the error means the transport is gone
    pub fn is_connection_error(&self) -> bool {
        matches!(self, TelnetError::ConnectionClosed | TelnetError::Io(_))
    }

    /// Check if the error came from the codec
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, TelnetError::Protocol(_))
    }
}
