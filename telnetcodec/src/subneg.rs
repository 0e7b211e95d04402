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

//! Subnegotiation payload dispatch.

use crate::{TelnetArgument, TelnetEvent, TelnetOption, TelnetSession};
use tracing::{debug, trace};

impl TelnetSession {
    /// Handle a complete, unescaped subnegotiation. `payload[0]` is the option code.
    ///
    /// Payloads that fail to decode, or that the role doesn't expect, are ignored.
    pub(crate) fn handle_subnegotiation(&mut self, payload: &[u8]) -> Option<TelnetEvent> {
        let (&code, mut body) = payload.split_first()?;
        let option = TelnetOption::from_u8(code);
        let behavior = self.behavior();
        match TelnetArgument::decode(option, &mut body) {
            Ok(TelnetArgument::TerminalType(command)) => behavior.terminal_type(self, command),
            Ok(TelnetArgument::NAWSWindowSize(size)) => behavior.window_size(self, size),
            Ok(argument) => {
                trace!(argument = %argument, "ignoring subnegotiation");
                None
            }
            Err(error) => {
                debug!(option = %option, error = %error, "ignoring malformed subnegotiation");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        NegotiationTable, Stance, TelnetEvent, TelnetOption, TelnetSession, TerminalType, Verb,
        WindowSize, consts,
    };

    #[test]
    fn test_naws_updates_server_window() {
        let mut session = TelnetSession::server();
        let event = session.handle_subnegotiation(&[consts::option::NAWS, 0, 132, 0, 43]);
        assert_eq!(
            event,
            Some(TelnetEvent::WindowSizeChanged(WindowSize::new(132, 43)))
        );
        assert_eq!(session.window_size(), WindowSize::new(132, 43));
        assert!(session.option(TelnetOption::NAWS).unwrap().peer_will());
    }

    #[test]
    fn test_naws_short_payload_ignored() {
        let mut session = TelnetSession::server();
        assert_eq!(session.handle_subnegotiation(&[consts::option::NAWS, 0, 132]), None);
        assert_eq!(session.window_size(), WindowSize::default());
    }

    #[test]
    fn test_terminal_type_is_requires_request() {
        let mut session = TelnetSession::server();
        assert_eq!(
            session.handle_subnegotiation(b"\x18\x00ANSI"),
            None
        );
        assert_eq!(session.terminal_type(), &TerminalType::Vt100);

        session.install(&NegotiationTable::new().with(Stance::Require, TelnetOption::TerminalType));
        session.handle_negotiation(Verb::Will, TelnetOption::TerminalType);
        assert_eq!(
            session.handle_subnegotiation(b"\x18\x00ansi"),
            Some(TelnetEvent::TerminalTypeChanged(TerminalType::Ansi))
        );
        assert!(session.is_settled(TelnetOption::TerminalType));
    }

    #[test]
    fn test_client_answers_send_once() {
        let mut session = TelnetSession::client();
        session.install(&NegotiationTable::client_default());
        session.handle_negotiation(Verb::Do, TelnetOption::TerminalType);
        session.take_outbound();

        session.handle_subnegotiation(&[consts::option::TTYPE, consts::ttype::SEND]);
        session.handle_subnegotiation(&[consts::option::TTYPE, consts::ttype::SEND]);
        assert_eq!(&session.take_outbound()[..], b"\xff\xfa\x18\x00VT100\xff\xf0");
        assert!(session.is_settled(TelnetOption::TerminalType));
    }

    #[test]
    fn test_unknown_subnegotiation_ignored() {
        let mut session = TelnetSession::client();
        assert_eq!(session.handle_subnegotiation(&[42, 1, 2, 3]), None);
        assert_eq!(session.handle_subnegotiation(&[]), None);
        assert!(!session.has_outbound());
    }
}
