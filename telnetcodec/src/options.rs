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

use crate::consts;
use std::collections::BTreeSet;
use std::fmt::Formatter;

///
/// [Telnet Terminal Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
/// understood by the negotiation engine. Every other code is carried as [`TelnetOption::Unknown`].
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum TelnetOption {
    /// [`consts::option::BINARY`] Telnet Binary Transmission [RFC856](https://tools.ietf.org/html/rfc856)
    TransmitBinary,
    /// [`consts::option::ECHO`] Telnet Echo Option [RFC857](https://tools.ietf.org/html/rfc857)
    Echo,
    /// [`consts::option::SGA`] Suppress Go ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead,
    /// [`consts::option::TTYPE`] Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091)
    TerminalType,
    /// [`consts::option::NAWS`] Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    NAWS,
    /// Any option code the engine does not track.
    Unknown(u8),
}

impl TelnetOption {
    /// Options carrying per-option negotiation state, in driver wait order.
    pub const TRACKED: [TelnetOption; 5] = [
        TelnetOption::TerminalType,
        TelnetOption::NAWS,
        TelnetOption::SuppressGoAhead,
        TelnetOption::Echo,
        TelnetOption::TransmitBinary,
    ];

    /// Convert to the option code used on the wire.
    pub fn to_u8(&self) -> u8 {
        match self {
            TelnetOption::TransmitBinary => consts::option::BINARY,
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::TerminalType => consts::option::TTYPE,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::Unknown(byte) => *byte,
        }
    }

    /// Convert from an option code received on the wire.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::BINARY => TelnetOption::TransmitBinary,
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::TTYPE => TelnetOption::TerminalType,
            consts::option::NAWS => TelnetOption::NAWS,
            byte => TelnetOption::Unknown(byte),
        }
    }

    /// True for options that only the client reports to the server (NAWS, Terminal Type).
    pub fn is_client_reported(&self) -> bool {
        matches!(self, TelnetOption::NAWS | TelnetOption::TerminalType)
    }

    /// True for options with a negotiation state record.
    pub fn is_tracked(&self) -> bool {
        self.tracked_index().is_some()
    }

    fn tracked_index(&self) -> Option<usize> {
        TelnetOption::TRACKED.iter().position(|option| option == self)
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::TransmitBinary => write!(f, "TransmitBinary"),
            TelnetOption::Echo => write!(f, "Echo"),
            TelnetOption::SuppressGoAhead => write!(f, "SuppressGoAhead"),
            TelnetOption::TerminalType => write!(f, "TerminalType"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::Unknown(byte) => write!(f, "Unknown({byte})"),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        TelnetOption::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

/// The four option negotiation verbs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Verb {
    /// Sender offers to perform the option.
    Will,
    /// Sender refuses to perform the option.
    Wont,
    /// Sender asks its peer to perform the option.
    Do,
    /// Sender asks its peer to stop performing the option.
    Dont,
}

impl Verb {
    /// Command byte for this verb.
    pub fn to_u8(&self) -> u8 {
        match self {
            Verb::Will => consts::WILL,
            Verb::Wont => consts::WONT,
            Verb::Do => consts::DO,
            Verb::Dont => consts::DONT,
        }
    }

    /// Parse a command byte, `None` if it isn't a negotiation verb.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            consts::WILL => Some(Verb::Will),
            consts::WONT => Some(Verb::Wont),
            consts::DO => Some(Verb::Do),
            consts::DONT => Some(Verb::Dont),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verb::Will => write!(f, "WILL"),
            Verb::Wont => write!(f, "WONT"),
            Verb::Do => write!(f, "DO"),
            Verb::Dont => write!(f, "DONT"),
        }
    }
}

/// A single side's declared position on one half of an option.
///
/// For our own positions the value leaves [`Intent::Unset`] at most once, so we can never send
/// both `DO` and `DONT` (or both `WILL` and `WONT`) for the same option. Peer positions are
/// overwritten by whatever the peer said last.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Intent {
    /// Nothing said yet.
    #[default]
    Unset,
    /// `WILL` or `DO`.
    Enable,
    /// `WONT` or `DONT`.
    Disable,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Unset => write!(f, "Unset"),
            Intent::Enable => write!(f, "Enable"),
            Intent::Disable => write!(f, "Disable"),
        }
    }
}

/// Summary of where negotiation of one option stands.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Resolution {
    /// Neither side has said anything.
    Unresolved,
    /// We asked to enable the option and have no answer yet.
    Offered,
    /// Both sides agreed to enable the option in at least one direction.
    Accepted,
    /// We refused the option.
    Declined,
    /// The peer asked to enable the option and we have not answered.
    PeerOffered,
    /// The peer refused the option.
    PeerDeclined,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Unresolved => write!(f, "Unresolved"),
            Resolution::Offered => write!(f, "Offered"),
            Resolution::Accepted => write!(f, "Accepted"),
            Resolution::Declined => write!(f, "Declined"),
            Resolution::PeerOffered => write!(f, "PeerOffered"),
            Resolution::PeerDeclined => write!(f, "PeerDeclined"),
        }
    }
}

/// Subnegotiation progress for options that carry a payload exchange (NAWS, Terminal Type).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SubnegotiationFlags {
    /// We asked the peer for a subnegotiation (server sent `TTYPE SEND`).
    pub requested: bool,
    /// The peer delivered its subnegotiation payload.
    pub peer_sent: bool,
    /// The peer asked us for a subnegotiation (client saw `TTYPE SEND`).
    pub peer_requested: bool,
    /// We delivered our subnegotiation payload.
    pub sent: bool,
}

/// Negotiation record for one tracked option.
///
/// `offer` and `request` are what we told the peer (`WILL`/`WONT` and `DO`/`DONT`),
/// `peer_offer` and `peer_request` are what the peer told us.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct OptionState {
    offer: Intent,
    request: Intent,
    peer_offer: Intent,
    peer_request: Intent,
    /// Subnegotiation progress.
    pub subneg: SubnegotiationFlags,
}

impl OptionState {
    /// What we said about performing the option ourselves.
    pub fn offer(&self) -> Intent {
        self.offer
    }

    /// What we asked the peer to do.
    pub fn request(&self) -> Intent {
        self.request
    }

    /// What the peer said about performing the option.
    pub fn peer_offer(&self) -> Intent {
        self.peer_offer
    }

    /// What the peer asked us to do.
    pub fn peer_request(&self) -> Intent {
        self.peer_request
    }

    /// Record our `WILL`/`WONT`. Returns false, leaving the state unchanged, if we already
    /// stated a position.
    pub fn set_offer(&mut self, intent: Intent) -> bool {
        if self.offer != Intent::Unset || intent == Intent::Unset {
            return false;
        }
        self.offer = intent;
        true
    }

    /// Record our `DO`/`DONT`. Returns false, leaving the state unchanged, if we already
    /// stated a position.
    pub fn set_request(&mut self, intent: Intent) -> bool {
        if self.request != Intent::Unset || intent == Intent::Unset {
            return false;
        }
        self.request = intent;
        true
    }

    /// Record the peer's `WILL`/`WONT`.
    pub fn set_peer_offer(&mut self, intent: Intent) {
        self.peer_offer = intent;
    }

    /// Record the peer's `DO`/`DONT`.
    pub fn set_peer_request(&mut self, intent: Intent) {
        self.peer_request = intent;
    }

    /// We sent `WILL`.
    pub fn sent_will(&self) -> bool {
        self.offer == Intent::Enable
    }

    /// We sent `WONT`.
    pub fn sent_wont(&self) -> bool {
        self.offer == Intent::Disable
    }

    /// We sent `DO`.
    pub fn sent_do(&self) -> bool {
        self.request == Intent::Enable
    }

    /// We sent `DONT`.
    pub fn sent_dont(&self) -> bool {
        self.request == Intent::Disable
    }

    /// The peer sent `WILL`.
    pub fn peer_will(&self) -> bool {
        self.peer_offer == Intent::Enable
    }

    /// The peer sent `WONT`.
    pub fn peer_wont(&self) -> bool {
        self.peer_offer == Intent::Disable
    }

    /// The peer sent `DO`.
    pub fn peer_do(&self) -> bool {
        self.peer_request == Intent::Enable
    }

    /// The peer sent `DONT`.
    pub fn peer_dont(&self) -> bool {
        self.peer_request == Intent::Disable
    }

    /// True if we have stated any position on this option.
    pub fn has_local_stance(&self) -> bool {
        self.offer != Intent::Unset || self.request != Intent::Unset
    }

    /// The option is in effect on the peer's side (`DO` answered by `WILL`).
    pub fn enabled_remote(&self) -> bool {
        self.sent_do() && self.peer_will()
    }

    /// The option is in effect on our side (`WILL` answered by `DO`).
    pub fn enabled_local(&self) -> bool {
        self.sent_will() && self.peer_do()
    }

    /// Derived summary of the record.
    pub fn resolution(&self) -> Resolution {
        if self.enabled_local() || self.enabled_remote() {
            Resolution::Accepted
        } else if self.sent_dont() || self.sent_wont() {
            Resolution::Declined
        } else if self.peer_wont() || self.peer_dont() {
            Resolution::PeerDeclined
        } else if self.sent_do() || self.sent_will() {
            Resolution::Offered
        } else if self.peer_will() || self.peer_do() {
            Resolution::PeerOffered
        } else {
            Resolution::Unresolved
        }
    }
}

impl std::fmt::Display for OptionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "offer={} request={} peer_offer={} peer_request={}",
            self.offer, self.request, self.peer_offer, self.peer_request
        )
    }
}

/// Negotiation records for every option of one session.
///
/// Tracked options get a full [`OptionState`]. For all other codes only the refusal guards are
/// kept, so an unknown option is refused at most once per direction.
#[derive(Clone, Debug, Default)]
pub struct OptionStates {
    tracked: [OptionState; 5],
    refused_offers: BTreeSet<u8>,
    refused_requests: BTreeSet<u8>,
}

impl OptionStates {
    /// Record for a tracked option.
    pub fn get(&self, option: TelnetOption) -> Option<&OptionState> {
        option.tracked_index().map(|index| &self.tracked[index])
    }

    /// Mutable record for a tracked option.
    pub fn get_mut(&mut self, option: TelnetOption) -> Option<&mut OptionState> {
        option.tracked_index().map(|index| &mut self.tracked[index])
    }

    /// Iterate over tracked options and their records, in driver wait order.
    pub fn iter(&self) -> impl Iterator<Item = (TelnetOption, &OptionState)> {
        TelnetOption::TRACKED.iter().copied().zip(self.tracked.iter())
    }

    /// Mark that we answered the peer's `WILL <code>` with `DONT`. Returns true the first time.
    pub(crate) fn refuse_offer(&mut self, code: u8) -> bool {
        self.refused_offers.insert(code)
    }

    /// Mark that we answered the peer's `DO <code>` with `WONT`. Returns true the first time.
    pub(crate) fn refuse_request(&mut self, code: u8) -> bool {
        self.refused_requests.insert(code)
    }
}
