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

use crate::{
    Intent, LineEnding, NegotiationTable, OptionState, OptionStates, ProtocolViolation, Role,
    RoleBehavior, SessionConfig, TelnetEvent, TelnetFrame, TelnetOption, TerminalType, Verb,
    WindowSize,
};
use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

///
/// Per-connection Telnet state: negotiation records, session parameters and the resumable
/// framing parser.
///
/// A `TelnetSession` does no I/O. Received bytes go in through [`TelnetSession::receive`] or the
/// [`tokio_util::codec::Decoder`] implementation; replies produced while handling them collect in
/// an outbound buffer drained with [`TelnetSession::take_outbound`].
///
#[derive(Debug)]
pub struct TelnetSession {
    behavior: &'static dyn RoleBehavior,
    config: SessionConfig,
    options: OptionStates,
    window_size: WindowSize,
    terminal_type: TerminalType,
    pub(crate) parse_state: ParseState,
    pub(crate) subneg_buffer: BytesMut,
    outbound: BytesMut,
    echo_suppressed: bool,
    stats: ProtocolStats,
}

impl TelnetSession {
    /// Create a session for `role`.
    pub fn new(role: Role, config: SessionConfig) -> Self {
        let terminal_type = match role {
            Role::Client => TerminalType::from_name(&config.terminal_name),
            Role::Server => TerminalType::default(),
        };
        Self {
            behavior: role.behavior(),
            window_size: config.window_size,
            subneg_buffer: BytesMut::with_capacity(config.max_subnegotiation_len),
            config,
            options: OptionStates::default(),
            terminal_type,
            parse_state: ParseState::Normal,
            outbound: BytesMut::new(),
            echo_suppressed: false,
            stats: ProtocolStats::default(),
        }
    }

    /// Client session with default settings.
    pub fn client() -> Self {
        Self::new(Role::Client, SessionConfig::default())
    }

    /// Server session with default settings.
    pub fn server() -> Self {
        Self::new(Role::Server, SessionConfig::default())
    }

    /// Connection role.
    pub fn role(&self) -> Role {
        self.behavior.role()
    }

    /// Settings the session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// All negotiation records.
    pub fn options(&self) -> &OptionStates {
        &self.options
    }

    /// Negotiation record for a tracked option.
    pub fn option(&self, option: TelnetOption) -> Option<&OptionState> {
        self.options.get(option)
    }

    pub(crate) fn option_mut(&mut self, option: TelnetOption) -> Option<&mut OptionState> {
        self.options.get_mut(option)
    }

    pub(crate) fn options_mut(&mut self) -> &mut OptionStates {
        &mut self.options
    }

    pub(crate) fn behavior(&self) -> &'static dyn RoleBehavior {
        self.behavior
    }

    /// Last reported window size, or the configured one before any report.
    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    pub(crate) fn set_window_size(&mut self, size: WindowSize) {
        self.window_size = size;
    }

    /// Terminal type in effect.
    pub fn terminal_type(&self) -> &TerminalType {
        &self.terminal_type
    }

    pub(crate) fn set_terminal_type(&mut self, terminal_type: TerminalType) {
        self.terminal_type = terminal_type;
    }

    /// Current framing parser state.
    pub fn parse_state(&self) -> ParseState {
        self.parse_state
    }

    /// Byte the terminal sends for backspace.
    pub fn backspace_code(&self) -> u8 {
        self.config.backspace_code
    }

    /// Byte the terminal sends for delete.
    pub fn delete_code(&self) -> u8 {
        self.config.delete_code
    }

    /// Line terminator for encoded text.
    pub fn line_ending(&self) -> LineEnding {
        self.config.line_ending
    }

    /// Protocol statistics.
    pub fn stats(&self) -> &ProtocolStats {
        &self.stats
    }

    /// We agreed to echo the peer's input (`WILL ECHO` answered by `DO ECHO`).
    pub fn echo_negotiated(&self) -> bool {
        self.options
            .get(TelnetOption::Echo)
            .is_some_and(OptionState::enabled_local)
    }

    /// Input should be echoed: echo was negotiated and is not locally suppressed.
    pub fn echo_enabled(&self) -> bool {
        self.echo_negotiated() && !self.echo_suppressed
    }

    /// Whether echo is locally suppressed.
    pub fn echo_suppressed(&self) -> bool {
        self.echo_suppressed
    }

    /// Stop or resume echoing without renegotiating, e.g. around password entry.
    ///
    /// Nothing is sent to the peer. Returns the previous setting so it can be restored.
    pub fn set_echo_suppressed(&mut self, suppressed: bool) -> bool {
        debug!(suppressed, negotiated = self.echo_negotiated(), "echo override changed");
        std::mem::replace(&mut self.echo_suppressed, suppressed)
    }

    /// The peer transmits in binary mode, so key sequences are not interpreted.
    pub fn binary_receive(&self) -> bool {
        self.options
            .get(TelnetOption::TransmitBinary)
            .is_some_and(OptionState::enabled_remote)
    }

    /// Go-ahead signals are meaningless unless we explicitly refused to suppress them.
    pub fn go_ahead_suppressed(&self) -> bool {
        self.options
            .get(TelnetOption::SuppressGoAhead)
            .is_none_or(|state| state.sent_will() || !state.sent_wont())
    }

    pub(crate) fn recognizes_keys(&self) -> bool {
        self.config.recognize_key_sequences && !self.binary_receive()
    }

    /// True if `option` has a recorded local stance.
    pub fn is_installed(&self, option: TelnetOption) -> bool {
        self.options
            .get(option)
            .is_some_and(OptionState::has_local_stance)
    }

    /// True if negotiation of `option` reached a terminal combination for this role.
    pub fn is_settled(&self, option: TelnetOption) -> bool {
        self.options
            .get(option)
            .is_some_and(|state| self.behavior.is_settled(option, state))
    }

    /// Record the stances of `table` and queue the matching commands.
    ///
    /// Entries not allowed for this role, for untracked options, or contradicting a stance
    /// already recorded are skipped. Returns the number of commands queued.
    pub fn install(&mut self, table: &NegotiationTable) -> usize {
        let role = self.role();
        let mut queued = 0;
        for entry in table.entries() {
            if !entry.option.is_tracked() || !entry.stance.applies_to(entry.option, role) {
                warn!(option = %entry.option, stance = ?entry.stance, role = %role, "skipping table entry");
                continue;
            }
            for &verb in entry.stance.verbs() {
                if self.record_local(verb, entry.option) {
                    debug!(option = %entry.option, verb = %verb, "installing stance");
                    self.queue_frame(TelnetFrame::negotiate(verb, entry.option));
                    queued += 1;
                } else {
                    warn!(option = %entry.option, verb = %verb, "stance conflicts with an earlier one");
                }
            }
        }
        queued
    }

    fn record_local(&mut self, verb: Verb, option: TelnetOption) -> bool {
        let Some(state) = self.options.get_mut(option) else {
            return false;
        };
        match verb {
            Verb::Will => state.set_offer(Intent::Enable),
            Verb::Wont => state.set_offer(Intent::Disable),
            Verb::Do => state.set_request(Intent::Enable),
            Verb::Dont => state.set_request(Intent::Disable),
        }
    }

    /// Run the framing parser over `input`, returning everything it recognised.
    pub fn receive(&mut self, input: &[u8]) -> Vec<TelnetEvent> {
        let mut src = BytesMut::from(input);
        let mut events = Vec::new();
        while let Some(event) = self.next_event(&mut src) {
            events.push(event);
        }
        events
    }

    /// Queue a frame for the peer.
    pub fn queue_frame(&mut self, frame: TelnetFrame) {
        if let Err(error) = frame.encode(&mut self.outbound) {
            warn!(frame = %frame, error = %error, "dropping unencodable frame");
        }
    }

    /// Queue a reply produced while handling received data.
    pub(crate) fn queue_reply(&mut self, frame: TelnetFrame) {
        self.stats.replies_queued += 1;
        self.queue_frame(frame);
    }

    /// Queue raw data for the peer, doubling `0xFF`.
    pub fn queue_data(&mut self, data: &[u8]) {
        crate::frame::put_escaped(&mut self.outbound, data);
    }

    /// True if bytes are waiting to be sent.
    pub fn has_outbound(&self) -> bool {
        !self.outbound.is_empty()
    }

    /// Take all bytes waiting to be sent.
    pub fn take_outbound(&mut self) -> Bytes {
        self.outbound.split().freeze()
    }

    pub(crate) fn note_violation(&mut self, violation: ProtocolViolation) {
        warn!(violation = %violation, "recovered from protocol violation");
        match violation {
            ProtocolViolation::MalformedCommand(_)
            | ProtocolViolation::MalformedSubnegotiation { .. } => {
                self.stats.malformed_commands += 1;
            }
            ProtocolViolation::SubnegotiationOverflow { .. } => {
                self.stats.subnegotiation_overflows += 1;
            }
        }
        self.stats.last_violation = Some(violation);
    }

    pub(crate) fn note_role_violation(&mut self, option: TelnetOption) {
        debug!(option = %option, role = %self.role(), "ignoring message from the wrong role");
        self.stats.role_violations += 1;
    }
}

/// Framing parser position between bytes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ParseState {
    /// Plain data.
    #[default]
    Normal,
    /// Saw `ESC`, waiting to see whether a key sequence follows.
    EscSeen,
    /// Saw `ESC` and an introducer, waiting for the final byte.
    EscSequence(u8),
    /// Saw `IAC`.
    IacSeen,
    /// Saw `IAC` and a negotiation verb, waiting for the option.
    CmdArg(Verb),
    /// Saw `IAC SB`, waiting for the option.
    SubNegStart,
    /// Inside a subnegotiation payload.
    SubNegBody,
    /// Saw `IAC` inside a subnegotiation payload.
    SubNegIacInBody,
}

impl std::fmt::Display for ParseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseState::Normal => write!(f, "Normal"),
            ParseState::EscSeen => write!(f, "EscSeen"),
            ParseState::EscSequence(intro) => write!(f, "EscSequence({})", *intro as char),
            ParseState::IacSeen => write!(f, "IacSeen"),
            ParseState::CmdArg(verb) => write!(f, "CmdArg({verb})"),
            ParseState::SubNegStart => write!(f, "SubNegStart"),
            ParseState::SubNegBody => write!(f, "SubNegBody"),
            ParseState::SubNegIacInBody => write!(f, "SubNegIacInBody"),
        }
    }
}

/// Counters of recovered faults and generated replies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    /// Malformed commands, including malformed subnegotiation terminators.
    pub malformed_commands: u64,
    /// Subnegotiations discarded for exceeding the bound.
    pub subnegotiation_overflows: u64,
    /// Messages ignored because they came from the wrong role.
    pub role_violations: u64,
    /// Negotiation and subnegotiation replies queued by handlers.
    pub replies_queued: u64,
    /// Most recent recovered violation.
    pub last_violation: Option<ProtocolViolation>,
}

impl ProtocolStats {
    /// Total recovered violations.
    pub fn violations(&self) -> u64 {
        self.malformed_commands + self.subnegotiation_overflows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Stance, consts};

    #[test]
    fn test_new_session_defaults() {
        let session = TelnetSession::server();
        assert_eq!(session.role(), Role::Server);
        assert_eq!(session.window_size(), WindowSize::new(80, 24));
        assert_eq!(session.terminal_type(), &TerminalType::Vt100);
        assert_eq!(session.backspace_code(), 127);
        assert_eq!(session.delete_code(), 8);
        assert_eq!(session.parse_state(), ParseState::Normal);
        assert!(!session.has_outbound());
    }

    #[test]
    fn test_install_default_server_table() {
        let mut session = TelnetSession::server();
        let queued = session.install(&NegotiationTable::server_default());
        assert_eq!(queued, 5);
        assert_eq!(
            &session.take_outbound()[..],
            &[
                consts::IAC,
                consts::DO,
                consts::option::NAWS,
                consts::IAC,
                consts::DO,
                consts::option::TTYPE,
                consts::IAC,
                consts::DO,
                consts::option::SGA,
                consts::IAC,
                consts::WILL,
                consts::option::SGA,
                consts::IAC,
                consts::WILL,
                consts::option::ECHO,
            ]
        );
        let naws = session.option(TelnetOption::NAWS).unwrap();
        assert!(naws.sent_do());
        assert!(session.is_installed(TelnetOption::Echo));
        assert!(!session.is_installed(TelnetOption::TransmitBinary));
    }

    #[test]
    fn test_install_skips_role_restricted_entries() {
        let mut session = TelnetSession::client();
        let table = NegotiationTable::new()
            .with(Stance::Require, TelnetOption::NAWS)
            .with(Stance::RequireThenDecline, TelnetOption::TerminalType)
            .with(Stance::Require, TelnetOption::Unknown(99));
        assert_eq!(session.install(&table), 0);
        assert!(!session.has_outbound());
    }

    #[test]
    fn test_install_never_contradicts() {
        let mut session = TelnetSession::client();
        let table = NegotiationTable::new()
            .with(Stance::Decline, TelnetOption::Echo)
            .with(Stance::Support, TelnetOption::Echo);
        assert_eq!(session.install(&table), 1);
        assert!(session.option(TelnetOption::Echo).unwrap().sent_wont());
        assert_eq!(session.install(&table), 0);
    }

    #[test]
    fn test_echo_suppression_is_local() {
        let mut session = TelnetSession::server();
        session.install(&NegotiationTable::new().with(Stance::Support, TelnetOption::Echo));
        session.take_outbound();
        session.receive(&[consts::IAC, consts::DO, consts::option::ECHO]);
        assert!(session.echo_enabled());

        assert!(!session.set_echo_suppressed(true));
        assert!(session.echo_negotiated());
        assert!(!session.echo_enabled());
        assert!(!session.has_outbound());

        assert!(session.set_echo_suppressed(false));
        assert!(session.echo_enabled());
    }

    #[test]
    fn test_echo_suppression_cannot_force_echo() {
        let mut session = TelnetSession::client();
        session.set_echo_suppressed(false);
        assert!(!session.echo_enabled());
    }
}
