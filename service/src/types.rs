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

//! Core types for the negotiation service

use bytes::Bytes;
use std::fmt;
use telnego_codec::{
    LineEnding, OptionState, ParseState, ProtocolStats, Resolution, Role, TelnetEvent,
    TelnetOption, TelnetSession, TerminalType, WindowSize, consts,
};

/// Unique identifier for a session (monotonically increasing, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a new session ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// How waiting on one option ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOutcome {
    /// Negotiation reached a terminal combination
    Resolved(Resolution),
    /// The retry budget ran out first
    TimedOut,
    /// The table had no stance for the option
    NotInstalled,
}

impl OptionOutcome {
    /// True for [`OptionOutcome::Resolved`]
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl fmt::Display for OptionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(resolution) => write!(f, "resolved ({resolution:?})"),
            Self::TimedOut => write!(f, "timed out"),
            Self::NotInstalled => write!(f, "not installed"),
        }
    }
}

/// Result of a `negotiate` call, one entry per tracked option in wait order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiatedOptions {
    outcomes: Vec<(TelnetOption, OptionOutcome)>,
}

impl NegotiatedOptions {
    pub(crate) fn push(&mut self, option: TelnetOption, outcome: OptionOutcome) {
        self.outcomes.push((option, outcome));
    }

    /// Outcome for `option`, if it was waited on
    pub fn get(&self, option: TelnetOption) -> Option<OptionOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| *candidate == option)
            .map(|(_, outcome)| *outcome)
    }

    /// All outcomes in wait order
    pub fn iter(&self) -> impl Iterator<Item = (TelnetOption, OptionOutcome)> + '_ {
        self.outcomes.iter().copied()
    }

    /// True if no installed option timed out
    pub fn all_resolved(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|(_, outcome)| *outcome == OptionOutcome::TimedOut)
    }

    /// Options that timed out
    pub fn timed_out(&self) -> Vec<TelnetOption> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == OptionOutcome::TimedOut)
            .map(|(option, _)| *option)
            .collect()
    }
}

impl fmt::Display for NegotiatedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (option, outcome) in &self.outcomes {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{option}: {outcome}")?;
        }
        Ok(())
    }
}

/// What the session knows about one option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSnapshot {
    /// Option
    pub option: TelnetOption,
    /// Both sides' stances
    pub state: OptionState,
    /// Derived resolution
    pub resolution: Resolution,
    /// Whether negotiation reached a terminal combination for this role
    pub settled: bool,
}

/// Session snapshot for non-blocking debug information
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Session ID
    pub id: SessionId,
    /// Connection role
    pub role: Role,
    /// Tracked options in wait order
    pub options: Vec<OptionSnapshot>,
    /// Current window size
    pub window_size: WindowSize,
    /// Current terminal type
    pub terminal_type: TerminalType,
    /// Backspace key code
    pub backspace_code: u8,
    /// Delete key code
    pub delete_code: u8,
    /// Line terminator for encoded text
    pub line_ending: LineEnding,
    /// Framing parser position
    pub parse_state: ParseState,
    /// We echo the peer's input
    pub echo_enabled: bool,
    /// Echo is locally suppressed
    pub echo_suppressed: bool,
    /// Recovered faults and replies
    pub stats: ProtocolStats,
}

impl SessionSnapshot {
    pub(crate) fn capture(id: SessionId, session: &TelnetSession) -> Self {
        let options = session
            .options()
            .iter()
            .map(|(option, state)| OptionSnapshot {
                option,
                state: *state,
                resolution: state.resolution(),
                settled: session.is_settled(option),
            })
            .collect();
        Self {
            id,
            role: session.role(),
            options,
            window_size: session.window_size(),
            terminal_type: session.terminal_type().clone(),
            backspace_code: session.backspace_code(),
            delete_code: session.delete_code(),
            line_ending: session.line_ending(),
            parse_state: session.parse_state(),
            echo_enabled: session.echo_enabled(),
            echo_suppressed: session.echo_suppressed(),
            stats: *session.stats(),
        }
    }

    /// Snapshot of one option
    pub fn option(&self, option: TelnetOption) -> Option<&OptionSnapshot> {
        self.options.iter().find(|snapshot| snapshot.option == option)
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TelnetSession {{ id: {}, role: {}, window: {}, terminal: {}, state: {} }}",
            self.id, self.role, self.window_size, self.terminal_type, self.parse_state
        )
    }
}

/// Everything one `feed` call produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedOutput {
    /// Application bytes for the layer above: data with `IAC IAC` collapsed, and terminal key
    /// sequences as received
    pub data: Vec<u8>,
    /// Every recognised event, data included, in arrival order
    pub events: Vec<TelnetEvent>,
    /// Bytes the session owes the peer
    pub replies: Bytes,
}

impl FeedOutput {
    pub(crate) fn from_events(events: Vec<TelnetEvent>, replies: Bytes) -> Self {
        let mut data = Vec::new();
        extend_application_bytes(&mut data, &events);
        Self {
            data,
            events,
            replies,
        }
    }
}

/// Append the application bytes carried by `events` to `out`.
pub(crate) fn extend_application_bytes(out: &mut impl Extend<u8>, events: &[TelnetEvent]) {
    for event in events {
        match *event {
            TelnetEvent::Data(byte) => out.extend([byte]),
            TelnetEvent::TerminalKey { intro, code } => out.extend([consts::ESC, intro, code]),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id() {
        let id1 = SessionId::new(1);
        let id2 = SessionId::new(2);

        assert_eq!(id1.as_u64(), 1);
        assert_ne!(id1, id2);
        assert!(id1 < id2);
        assert_eq!(id2.to_string(), "session-2");
    }

    #[test]
    fn test_negotiated_options_queries() {
        let mut outcomes = NegotiatedOptions::default();
        outcomes.push(
            TelnetOption::TerminalType,
            OptionOutcome::Resolved(Resolution::Accepted),
        );
        outcomes.push(TelnetOption::NAWS, OptionOutcome::TimedOut);
        outcomes.push(TelnetOption::TransmitBinary, OptionOutcome::NotInstalled);

        assert_eq!(outcomes.get(TelnetOption::NAWS), Some(OptionOutcome::TimedOut));
        assert_eq!(outcomes.get(TelnetOption::Echo), None);
        assert!(!outcomes.all_resolved());
        assert_eq!(outcomes.timed_out(), vec![TelnetOption::NAWS]);
        assert!(
            outcomes
                .get(TelnetOption::TerminalType)
                .is_some_and(OptionOutcome::is_resolved)
        );
    }

    #[test]
    fn test_snapshot_of_fresh_session() {
        let session = TelnetSession::server();
        let snapshot = SessionSnapshot::capture(SessionId::new(7), &session);
        assert_eq!(snapshot.role, Role::Server);
        assert_eq!(snapshot.options.len(), 5);
        assert!(snapshot.options.iter().all(|option| option.settled));
        assert_eq!(
            snapshot.option(TelnetOption::Echo).map(|option| option.resolution),
            Some(Resolution::Unresolved)
        );
        assert_eq!(snapshot.parse_state, ParseState::Normal);
    }

    #[test]
    fn test_feed_output_collects_data() {
        let output = FeedOutput::from_events(
            vec![
                TelnetEvent::Data(b'o'),
                TelnetEvent::NoOperation,
                TelnetEvent::Data(b'k'),
                TelnetEvent::TerminalKey {
                    intro: b'[',
                    code: b'A',
                },
            ],
            Bytes::new(),
        );
        assert_eq!(output.data, b"ok\x1b[A");
        assert_eq!(output.events.len(), 4);
    }
}
