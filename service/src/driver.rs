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

//! Negotiation driver
//!
//! Installs a table on a session, sends the resulting commands, then polls the transport until
//! every installed option has settled or the retry budget is spent. Options are waited on in the
//! fixed order Terminal Type, NAWS, Suppress Go Ahead, Echo, Binary. The budget is shared by the
//! whole call: idle polls consume retries, and the call ends at a deadline of
//! `retry_budget * (poll_timeout + max_backoff)` however much the peer sends.

use crate::{
    NegotiatedOptions, NegotiationConfig, OptionOutcome, Result, SessionId, SessionManager,
    Transport,
};
use metrics::counter;
use std::time::Duration;
use telnego_codec::{NegotiationTable, OptionState, Resolution, TelnetOption};
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Idle-poll and deadline accounting for one `negotiate` call
#[derive(Debug, Clone, Copy)]
struct RetryBudget {
    remaining: u32,
    backoff: Duration,
    deadline: Instant,
}

impl RetryBudget {
    fn new(config: &NegotiationConfig) -> Self {
        Self {
            remaining: config.retry_budget,
            backoff: config.initial_backoff,
            deadline: Instant::now() + config.worst_case_wait(),
        }
    }

    fn exhausted(&self) -> bool {
        self.remaining == 0 || self.time_left().is_zero()
    }

    fn time_left(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Consume one retry, returning how long to sleep.
    fn consume(&mut self, config: &NegotiationConfig) -> Duration {
        let sleep = self.backoff;
        self.backoff = config.next_backoff(self.backoff);
        self.remaining = self.remaining.saturating_sub(1);
        sleep
    }
}

/// Drives negotiation of one session over one transport
#[derive(Debug, Clone, Copy)]
pub struct Negotiator<'a> {
    manager: &'a SessionManager,
    config: &'a NegotiationConfig,
}

impl<'a> Negotiator<'a> {
    /// Create a driver over `manager`'s sessions
    pub fn new(manager: &'a SessionManager, config: &'a NegotiationConfig) -> Self {
        Self { manager, config }
    }

    /// Negotiate `table` on session `id`
    ///
    /// Only transport failures are errors; options the peer never settles end as
    /// [`OptionOutcome::TimedOut`]. Application data received meanwhile is kept for
    /// filtered reads.
    #[instrument(skip(self, transport, table), fields(session_id = %id))]
    pub async fn negotiate<T>(
        &self,
        id: SessionId,
        transport: &mut T,
        table: &NegotiationTable,
    ) -> Result<NegotiatedOptions>
    where
        T: Transport + ?Sized,
    {
        let greeting = self.manager.with_session(id, |session| {
            let queued = session.install(table);
            debug!(queued, "installed negotiation table");
            session.take_outbound()
        })?;
        if !greeting.is_empty() {
            transport.send(&greeting).await?;
        }

        let mut budget = RetryBudget::new(self.config);
        let mut outcomes = NegotiatedOptions::default();
        for option in TelnetOption::TRACKED {
            if !self.manager.with_session(id, |session| session.is_installed(option))? {
                trace!(option = %option, "not installed");
                outcomes.push(option, OptionOutcome::NotInstalled);
                continue;
            }
            let outcome = self.wait_for(id, transport, option, &mut budget).await?;
            debug!(option = %option, outcome = %outcome, "option finished");
            if outcome == OptionOutcome::TimedOut {
                counter!("telnego.negotiation.timeouts").increment(1);
            }
            outcomes.push(option, outcome);
        }

        counter!("telnego.negotiation.completed").increment(1);
        if outcomes.all_resolved() {
            info!(outcomes = %outcomes, "negotiation complete");
        } else {
            warn!(outcomes = %outcomes, "negotiation incomplete");
        }
        Ok(outcomes)
    }

    async fn wait_for<T>(
        &self,
        id: SessionId,
        transport: &mut T,
        option: TelnetOption,
        budget: &mut RetryBudget,
    ) -> Result<OptionOutcome>
    where
        T: Transport + ?Sized,
    {
        loop {
            let settled = self.manager.with_session(id, |session| {
                session.is_settled(option).then(|| {
                    session
                        .option(option)
                        .map_or(Resolution::Unresolved, OptionState::resolution)
                })
            })?;
            if let Some(resolution) = settled {
                return Ok(OptionOutcome::Resolved(resolution));
            }
            if budget.exhausted() {
                return Ok(OptionOutcome::TimedOut);
            }
            let wait = self.config.poll_timeout.min(budget.time_left());
            match transport.poll_recv(wait).await? {
                Some(input) => self.pump(id, transport, &input).await?,
                None => {
                    let sleep = budget.consume(self.config).min(budget.time_left());
                    trace!(option = %option, remaining = budget.remaining, ?sleep, "idle poll");
                    tokio::time::sleep(sleep).await;
                }
            }
        }
    }

    /// Feed received bytes to the session and send whatever it owes the peer.
    ///
    /// The session lock is released before sending.
    pub async fn pump<T>(&self, id: SessionId, transport: &mut T, input: &[u8]) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        let replies = self.manager.ingest(id, input)?;
        if !replies.is_empty() {
            transport.send(&replies).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StreamTransport;
    use telnego_codec::{Role, SessionConfig, Stance};
    use tracing_test::traced_test;

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_partial_result_on_silence() {
        let manager = SessionManager::new(4);
        let config = NegotiationConfig::default().with_retry_budget(2);
        let id = manager.create(Role::Client, SessionConfig::default()).unwrap();
        let (local, _peer) = tokio::io::duplex(256);
        let mut transport = StreamTransport::new(local, 256);

        let table = NegotiationTable::new()
            .with(Stance::Require, TelnetOption::TransmitBinary)
            .with(Stance::Decline, TelnetOption::Echo);
        let outcomes = Negotiator::new(&manager, &config)
            .negotiate(id, &mut transport, &table)
            .await
            .unwrap();

        assert_eq!(
            outcomes.get(TelnetOption::Echo),
            Some(OptionOutcome::Resolved(Resolution::Declined))
        );
        assert_eq!(
            outcomes.get(TelnetOption::TransmitBinary),
            Some(OptionOutcome::TimedOut)
        );
        assert_eq!(
            outcomes.get(TelnetOption::NAWS),
            Some(OptionOutcome::NotInstalled)
        );
        assert!(logs_contain("negotiation incomplete"));
    }

    #[test]
    fn test_retry_budget_backoff() {
        let config = NegotiationConfig::default().with_retry_budget(3);
        let mut budget = RetryBudget::new(&config);
        assert!(!budget.exhausted());
        assert_eq!(budget.consume(&config), Duration::from_millis(10));
        assert_eq!(budget.consume(&config), Duration::from_millis(20));
        assert_eq!(budget.consume(&config), Duration::from_millis(40));
        assert!(budget.exhausted());
        assert_eq!(budget.consume(&config), Duration::from_millis(80));
        assert_eq!(budget.remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_deadline() {
        let config = NegotiationConfig::default()
            .with_retry_budget(2)
            .with_poll_timeout(Duration::from_millis(100))
            .with_max_backoff(Duration::from_millis(50));
        let budget = RetryBudget::new(&config);
        assert_eq!(budget.time_left(), Duration::from_millis(300));
        tokio::time::advance(Duration::from_millis(300)).await;
        assert_eq!(budget.remaining, 2);
        assert!(budget.exhausted());
    }
}
