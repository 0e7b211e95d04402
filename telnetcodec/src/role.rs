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

//! Client and server specific negotiation behavior.
//!
//! NAWS and Terminal Type are asymmetric: only a client reports them and only a server asks for
//! them. Everything that depends on which end of the connection a session is lives behind
//! [`RoleBehavior`], chosen once when the session is created.

use crate::{
    OptionState, TelnetArgument, TelnetEvent, TelnetFrame, TelnetOption, TelnetSession,
    TerminalType, TerminalTypeCommand, Verb, WindowSize,
};
use std::fmt::Formatter;
use tracing::debug;

/// Which end of the connection a session is. Fixed for the life of the session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Role {
    /// The end that opened the connection and owns the terminal.
    Client,
    /// The end that accepted the connection.
    Server,
}

impl Role {
    /// Behavior implementation for this role.
    pub fn behavior(self) -> &'static dyn RoleBehavior {
        match self {
            Role::Client => &ClientRole,
            Role::Server => &ServerRole,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => write!(f, "Client"),
            Role::Server => write!(f, "Server"),
        }
    }
}

/// Role-dependent parts of negotiation.
pub trait RoleBehavior: std::fmt::Debug + Send + Sync {
    /// The role this behavior implements.
    fn role(&self) -> Role;

    /// Whether a received `verb` about NAWS or Terminal Type is acted on.
    fn acts_on(&self, verb: Verb) -> bool;

    /// Called after the peer's `WILL` answered our `DO`.
    fn peer_will_accepted(&self, session: &mut TelnetSession, option: TelnetOption);

    /// Called after the peer's `DO` answered our `WILL`.
    fn peer_do_accepted(&self, session: &mut TelnetSession, option: TelnetOption);

    /// A Terminal Type subnegotiation arrived.
    fn terminal_type(
        &self,
        session: &mut TelnetSession,
        command: TerminalTypeCommand,
    ) -> Option<TelnetEvent>;

    /// A NAWS subnegotiation arrived.
    fn window_size(&self, session: &mut TelnetSession, size: WindowSize) -> Option<TelnetEvent>;

    /// Whether negotiation of `option` has reached a state worth no further waiting.
    fn is_settled(&self, option: TelnetOption, state: &OptionState) -> bool;
}

/// Settled test shared by Binary, Suppress Go Ahead and Echo. Nothing to wait for without a
/// local stance.
fn symmetric_settled(state: &OptionState) -> bool {
    !state.has_local_stance()
        || state.enabled_remote()
        || state.enabled_local()
        || state.sent_wont()
        || state.sent_dont()
        || state.peer_wont()
        || state.peer_dont()
}

/// Reports window size and terminal type when asked.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientRole;

impl RoleBehavior for ClientRole {
    fn role(&self) -> Role {
        Role::Client
    }

    fn acts_on(&self, verb: Verb) -> bool {
        matches!(verb, Verb::Do | Verb::Dont)
    }

    fn peer_will_accepted(&self, _session: &mut TelnetSession, _option: TelnetOption) {}

    fn peer_do_accepted(&self, session: &mut TelnetSession, option: TelnetOption) {
        if option != TelnetOption::NAWS {
            return;
        }
        let Some(state) = session.option_mut(option) else {
            return;
        };
        if state.subneg.sent {
            return;
        }
        state.subneg.sent = true;
        let size = session.config().window_size;
        debug!(size = %size, "reporting window size");
        session.queue_reply(TelnetFrame::Subnegotiate(TelnetArgument::NAWSWindowSize(
            size,
        )));
    }

    fn terminal_type(
        &self,
        session: &mut TelnetSession,
        command: TerminalTypeCommand,
    ) -> Option<TelnetEvent> {
        let TerminalTypeCommand::Send = command else {
            session.note_role_violation(TelnetOption::TerminalType);
            return None;
        };
        let state = session.option_mut(TelnetOption::TerminalType)?;
        if !(state.peer_do() && state.sent_will()) || state.subneg.sent {
            debug!("ignoring terminal type request");
            return None;
        }
        state.subneg.sent = true;
        state.subneg.peer_requested = true;
        let name = session.config().terminal_name.clone();
        debug!(terminal = %name, "reporting terminal type");
        session.set_terminal_type(TerminalType::from_name(&name));
        session.queue_reply(TelnetFrame::Subnegotiate(TelnetArgument::TerminalType(
            TerminalTypeCommand::Is(name),
        )));
        None
    }

    fn window_size(&self, session: &mut TelnetSession, _size: WindowSize) -> Option<TelnetEvent> {
        session.note_role_violation(TelnetOption::NAWS);
        None
    }

    fn is_settled(&self, option: TelnetOption, state: &OptionState) -> bool {
        let stated = state.sent_will() || state.sent_wont();
        match option {
            TelnetOption::TerminalType => {
                !stated
                    || (state.subneg.peer_requested && state.subneg.sent)
                    || (state.peer_dont() && stated)
                    || (state.peer_do() && state.sent_wont())
            }
            TelnetOption::NAWS => !stated || state.peer_do() || state.peer_dont(),
            _ => symmetric_settled(state),
        }
    }
}

/// Asks for window size and terminal type and records what the client reports.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerRole;

impl RoleBehavior for ServerRole {
    fn role(&self) -> Role {
        Role::Server
    }

    fn acts_on(&self, verb: Verb) -> bool {
        matches!(verb, Verb::Will | Verb::Wont)
    }

    fn peer_will_accepted(&self, session: &mut TelnetSession, option: TelnetOption) {
        if option != TelnetOption::TerminalType {
            return;
        }
        let Some(state) = session.option_mut(option) else {
            return;
        };
        if state.subneg.requested {
            return;
        }
        state.subneg.requested = true;
        debug!("requesting terminal type");
        session.queue_reply(TelnetFrame::Subnegotiate(TelnetArgument::TerminalType(
            TerminalTypeCommand::Send,
        )));
    }

    fn peer_do_accepted(&self, _session: &mut TelnetSession, _option: TelnetOption) {}

    fn terminal_type(
        &self,
        session: &mut TelnetSession,
        command: TerminalTypeCommand,
    ) -> Option<TelnetEvent> {
        let TerminalTypeCommand::Is(name) = command else {
            session.note_role_violation(TelnetOption::TerminalType);
            return None;
        };
        let state = session.option_mut(TelnetOption::TerminalType)?;
        if !(state.subneg.requested && state.peer_will()) {
            debug!(terminal = %name, "ignoring unrequested terminal type");
            return None;
        }
        state.subneg.peer_sent = true;
        let terminal_type = TerminalType::from_name(&name);
        debug!(terminal = %terminal_type, "peer reported terminal type");
        session.set_terminal_type(terminal_type.clone());
        Some(TelnetEvent::TerminalTypeChanged(terminal_type))
    }

    fn window_size(&self, session: &mut TelnetSession, size: WindowSize) -> Option<TelnetEvent> {
        let state = session.option_mut(TelnetOption::NAWS)?;
        state.set_peer_offer(crate::Intent::Enable);
        state.subneg.peer_sent = true;
        debug!(size = %size, "peer reported window size");
        session.set_window_size(size);
        Some(TelnetEvent::WindowSizeChanged(size))
    }

    fn is_settled(&self, option: TelnetOption, state: &OptionState) -> bool {
        let stated = state.sent_do() || state.sent_dont();
        match option {
            TelnetOption::TerminalType => {
                !stated
                    || (state.subneg.requested && state.subneg.peer_sent)
                    || (state.peer_will() && state.sent_dont())
                    || (state.peer_wont() && stated)
            }
            TelnetOption::NAWS => {
                !stated
                    || (state.sent_do() && state.subneg.peer_sent)
                    || (state.peer_will() && state.sent_dont())
                    || (state.peer_wont() && stated)
            }
            _ => symmetric_settled(state),
        }
    }
}
