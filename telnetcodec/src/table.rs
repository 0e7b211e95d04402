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

//! Declarative initial negotiation stances.
//!
//! A [`NegotiationTable`] lists, in order, what a session announces about each option when
//! negotiation starts. Each [`Stance`] expands to one or two negotiation commands.

use crate::{Role, TelnetOption, Verb};

/// Initial position announced for one option.
///
/// Variants are listed in legacy command index order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stance {
    /// `DO`
    Require,
    /// `DONT`
    Refuse,
    /// `WILL`
    Support,
    /// `WONT`
    Decline,
    /// `DONT` then `WILL`: we perform the option, the peer must not.
    RequireThenSupport,
    /// `DONT` then `WONT`: the option is off in both directions.
    RequireThenDecline,
    /// `DO` then `WONT`: only the peer performs the option.
    SupportButRefused,
    /// `DO` then `WILL`: the option is on in both directions.
    SupportButDeclined,
    /// Nothing is sent.
    Noop,
}

impl Stance {
    /// Commands this stance sends, in wire order.
    pub fn verbs(&self) -> &'static [Verb] {
        match self {
            Stance::Require => &[Verb::Do],
            Stance::Refuse => &[Verb::Dont],
            Stance::Support => &[Verb::Will],
            Stance::Decline => &[Verb::Wont],
            Stance::RequireThenSupport => &[Verb::Dont, Verb::Will],
            Stance::RequireThenDecline => &[Verb::Dont, Verb::Wont],
            Stance::SupportButRefused => &[Verb::Do, Verb::Wont],
            Stance::SupportButDeclined => &[Verb::Do, Verb::Will],
            Stance::Noop => &[],
        }
    }

    /// True for the stances that send two commands.
    pub fn is_combined(&self) -> bool {
        self.verbs().len() == 2
    }

    /// Whether this stance may be installed for `option` by a session with `role`.
    ///
    /// Combined stances apply to Binary, Suppress Go Ahead and Echo only. `DO` for NAWS and
    /// Terminal Type is a server request and `WILL` for them a client offer.
    pub fn applies_to(&self, option: TelnetOption, role: Role) -> bool {
        if self.is_combined() {
            return matches!(
                option,
                TelnetOption::TransmitBinary | TelnetOption::SuppressGoAhead | TelnetOption::Echo
            );
        }
        match (self, option.is_client_reported()) {
            (Stance::Require, true) => role == Role::Server,
            (Stance::Support, true) => role == Role::Client,
            _ => true,
        }
    }
}

/// One `(stance, option)` pair.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TableEntry {
    /// What to announce.
    pub stance: Stance,
    /// Which option it concerns.
    pub option: TelnetOption,
}

impl TableEntry {
    /// Build an entry.
    pub fn new(stance: Stance, option: TelnetOption) -> Self {
        Self { stance, option }
    }

}

/// Ordered list of initial stances.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NegotiationTable {
    entries: Vec<TableEntry>,
}

impl NegotiationTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn with(mut self, stance: Stance, option: TelnetOption) -> Self {
        self.entries.push(TableEntry::new(stance, option));
        self
    }

    /// Default table for `role`.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Client => Self::client_default(),
            Role::Server => Self::server_default(),
        }
    }

    /// Report window size and terminal type, run without go-ahead, never echo locally.
    pub fn client_default() -> Self {
        Self::new()
            .with(Stance::Support, TelnetOption::NAWS)
            .with(Stance::Support, TelnetOption::TerminalType)
            .with(Stance::SupportButDeclined, TelnetOption::SuppressGoAhead)
            .with(Stance::Decline, TelnetOption::Echo)
    }

    /// Ask for window size and terminal type, run without go-ahead, offer to echo.
    pub fn server_default() -> Self {
        Self::new()
            .with(Stance::Require, TelnetOption::NAWS)
            .with(Stance::Require, TelnetOption::TerminalType)
            .with(Stance::SupportButDeclined, TelnetOption::SuppressGoAhead)
            .with(Stance::Support, TelnetOption::Echo)
    }

    /// Entries in order.
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// True if some entry mentions `option`.
    pub fn contains(&self, option: TelnetOption) -> bool {
        self.entries.iter().any(|entry| entry.option == option)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<TableEntry> for NegotiationTable {
    fn from_iter<I: IntoIterator<Item = TableEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
