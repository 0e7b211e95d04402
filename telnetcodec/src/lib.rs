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

//! # Telnego Telnet Negotiation Codec
//!
//! A sans-IO implementation of Telnet (RFC 854) framing and option negotiation for
//! TRANSMIT-BINARY (RFC 856), ECHO (RFC 857), SUPPRESS-GO-AHEAD (RFC 858), NAWS (RFC 1073) and
//! TERMINAL-TYPE (RFC 1091).
//!
//! ## Core Components
//!
//! ### [`TelnetSession`]
//!
//! Per-connection state. It implements [`Decoder`] and [`Encoder`] from `tokio_util::codec`:
//! decoding runs the resumable framing parser, applies negotiation commands and
//! subnegotiations to the session, and yields [`TelnetEvent`]s. Replies the session owes the
//! peer are queued internally and taken with [`TelnetSession::take_outbound`].
//!
//! ### [`NegotiationTable`]
//!
//! The initial stance per option, installed once when negotiation starts.
//!
//! ### [`OptionState`]
//!
//! What each side has said about one option, with a derived [`Resolution`].
//!
//! ## Usage Example
//!
//! ```rust
//! use telnego_codec::{NegotiationTable, TelnetEvent, TelnetOption, TelnetSession};
//!
//! let mut server = TelnetSession::server();
//! server.install(&NegotiationTable::server_default());
//! let greeting = server.take_outbound();
//! assert!(!greeting.is_empty());
//!
//! // The client agrees to report its window size and does so.
//! let events = server.receive(b"\xff\xfb\x1f\xff\xfa\x1f\x00\x50\x00\x18\xff\xf0hi");
//! assert_eq!(server.window_size().cols, 80);
//! assert!(events.contains(&TelnetEvent::Data(b'h')));
//! assert!(server.is_settled(TelnetOption::NAWS));
//! ```
//!
//! ## Loop Prevention
//!
//! Requests the session did not make are refused exactly once per option and direction, and
//! the session never answers anything with `WILL` or `DO`. Two peers that both decline an option
//! therefore exchange a bounded number of commands.
//!

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod args;
mod codec;
mod config;
pub mod consts;
mod event;
mod frame;
mod handlers;
mod options;
mod result;
mod role;
mod session;
mod subneg;
mod table;

pub use self::args::naws::WindowSize;
pub use self::args::ttype::{TerminalType, TerminalTypeCommand};
pub use self::args::{TelnetArgument, naws, ttype};
pub use self::config::{LineEnding, SessionConfig};
pub use self::event::TelnetEvent;
pub use self::frame::{TelnetFrame, put_escaped};
pub use self::options::{
    Intent, OptionState, OptionStates, Resolution, SubnegotiationFlags, TelnetOption, Verb,
};
pub use self::result::{CodecError, CodecResult, ProtocolViolation, SubnegotiationErrorKind};
pub use self::role::{ClientRole, Role, RoleBehavior, ServerRole};
pub use self::session::{ParseState, ProtocolStats, TelnetSession};
pub use self::table::{NegotiationTable, Stance, TableEntry};
pub use tokio_util::codec::{Decoder, Encoder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_receives_window_report() {
        let mut server = TelnetSession::server();
        server.install(&NegotiationTable::server_default());
        server.take_outbound();

        let events = server.receive(&[
            consts::IAC,
            consts::WILL,
            consts::option::NAWS,
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0,
            100,
            0,
            50,
            consts::IAC,
            consts::SE,
        ]);
        assert_eq!(
            events,
            vec![
                TelnetEvent::Negotiation(Verb::Will, TelnetOption::NAWS),
                TelnetEvent::WindowSizeChanged(WindowSize::new(100, 50)),
            ]
        );
        assert!(server.is_settled(TelnetOption::NAWS));
        assert!(!server.has_outbound());
    }

    #[test]
    fn test_client_reports_window_when_asked() {
        let mut client = TelnetSession::new(
            Role::Client,
            SessionConfig::default().with_window_size(120, 40),
        );
        client.install(&NegotiationTable::client_default());
        client.take_outbound();

        client.receive(&[consts::IAC, consts::DO, consts::option::NAWS]);
        client.receive(&[consts::IAC, consts::DO, consts::option::NAWS]);
        assert_eq!(
            &client.take_outbound()[..],
            &[
                consts::IAC,
                consts::SB,
                consts::option::NAWS,
                0,
                120,
                0,
                40,
                consts::IAC,
                consts::SE
            ]
        );
        assert!(client.is_settled(TelnetOption::NAWS));
    }
}
