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

use crate::{TelnetOption, TerminalType, Verb, WindowSize};

///
/// What the decoder recognised in the received byte stream.
///
/// Negotiation replies are not events: handlers queue them in the session's outbound buffer.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetEvent {
    /// A plain data byte for the application.
    Data(u8),
    /// A VT key sequence, `ESC intro code`, for the key translation layer.
    TerminalKey {
        /// `[` or `O`
        intro: u8,
        /// Final byte of the sequence
        code: u8,
    },
    /// IAC NOP
    NoOperation,
    /// IAC DM
    DataMark,
    /// IAC BRK
    Break,
    /// IAC IP
    InterruptProcess,
    /// IAC AO
    AbortOutput,
    /// IAC AYT, already answered.
    AreYouThere,
    /// IAC EC
    EraseCharacter,
    /// IAC EL
    EraseLine,
    /// IAC GA received while go-ahead is not suppressed.
    GoAhead,
    /// The peer sent a negotiation command; the handler has already run.
    Negotiation(Verb, TelnetOption),
    /// A NAWS report updated the session window size.
    WindowSizeChanged(WindowSize),
    /// A Terminal Type report updated the session terminal type.
    TerminalTypeChanged(TerminalType),
}

impl TelnetEvent {
    /// The data byte, if this is a data event.
    pub fn as_data(&self) -> Option<u8> {
        match self {
            TelnetEvent::Data(byte) => Some(*byte),
            _ => None,
        }
    }
}
