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

//! Negotiation and service configuration types and builders
//!
//! # Examples
//!
//! ```
//! use telnego_service::{NegotiationConfig, ServiceConfig};
//! use std::time::Duration;
//!
//! let negotiation = NegotiationConfig::default()
//!     .with_retry_budget(3)
//!     .with_poll_timeout(Duration::from_millis(50));
//!
//! let service = ServiceConfig::default()
//!     .with_max_sessions(64)
//!     .with_negotiation(negotiation);
//! assert_eq!(service.negotiation.retry_budget, 3);
//! ```

use std::time::Duration;

/// Timing of the negotiation driver's wait loop
#[derive(Debug, Clone)]
pub struct NegotiationConfig {
    /// Idle polls allowed per `negotiate` call, shared by all options
    pub retry_budget: u32,

    /// How long one transport poll waits for data
    pub poll_timeout: Duration,

    /// Sleep after the first idle poll
    pub initial_backoff: Duration,

    /// Factor applied to the backoff after every idle poll
    pub backoff_coefficient: u32,

    /// Upper bound for the backoff
    pub max_backoff: Duration,

    /// Read buffer size for stream transports
    pub recv_buffer_size: usize,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            retry_budget: 5,
            poll_timeout: Duration::from_millis(200),
            initial_backoff: Duration::from_millis(10),
            backoff_coefficient: 2,
            max_backoff: Duration::from_millis(200),
            recv_buffer_size: 4096,
        }
    }
}

impl NegotiationConfig {
    /// Set the retry budget
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Set the poll timeout
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the initial backoff
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the backoff coefficient
    pub fn with_backoff_coefficient(mut self, coefficient: u32) -> Self {
        self.backoff_coefficient = coefficient;
        self
    }

    /// Set the maximum backoff
    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Set the receive buffer size
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// The backoff that follows `current`.
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.backoff_coefficient)
            .min(self.max_backoff)
    }

    /// Deadline for one `negotiate` call, whatever the peer sends.
    pub fn worst_case_wait(&self) -> Duration {
        (self.poll_timeout + self.max_backoff).saturating_mul(self.retry_budget)
    }
}

/// Service-wide configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum number of live sessions
    pub max_sessions: usize,

    /// Unread application bytes kept per session; later bytes are dropped
    pub max_pending_bytes: usize,

    /// Driver timing used by `negotiate` and the filtered reads
    pub negotiation: NegotiationConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1024,
            max_pending_bytes: 64 * 1024,
            negotiation: NegotiationConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Set the session limit
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the per-session limit on unread application bytes
    pub fn with_max_pending_bytes(mut self, max: usize) -> Self {
        self.max_pending_bytes = max;
        self
    }

    /// Set the negotiation timing
    pub fn with_negotiation(mut self, negotiation: NegotiationConfig) -> Self {
        self.negotiation = negotiation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiation_defaults() {
        let config = NegotiationConfig::default();
        assert_eq!(config.retry_budget, 5);
        assert_eq!(config.poll_timeout, Duration::from_millis(200));
        assert_eq!(config.initial_backoff, Duration::from_millis(10));
        assert_eq!(config.backoff_coefficient, 2);
        assert_eq!(config.max_backoff, Duration::from_millis(200));
        assert_eq!(config.recv_buffer_size, 4096);
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = NegotiationConfig::default();
        let mut backoff = config.initial_backoff;
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(backoff.as_millis());
            backoff = config.next_backoff(backoff);
        }
        assert_eq!(seen, vec![10, 20, 40, 80, 160, 200]);
    }

    #[test]
    fn test_worst_case_wait() {
        let config = NegotiationConfig::default()
            .with_retry_budget(3)
            .with_poll_timeout(Duration::from_millis(100))
            .with_max_backoff(Duration::from_millis(50));
        assert_eq!(config.worst_case_wait(), Duration::from_millis(450));
    }

    #[test]
    fn test_service_builder() {
        let config = ServiceConfig::default()
            .with_max_sessions(2)
            .with_max_pending_bytes(16);
        assert_eq!(config.max_sessions, 2);
        assert_eq!(config.max_pending_bytes, 16);
        assert_eq!(config.negotiation.retry_budget, 5);
    }
}
