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

//! Terminal Type (RFC 1091)
//!

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, TelnetOption, consts};
use bytes::{Buf, BufMut};

/// Terminal type reported by a client.
///
/// Only VT100 and ANSI are recognised; any other name is kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TerminalType {
    /// The client reported an empty name.
    Unknown,
    /// DEC VT100, also the default before negotiation.
    #[default]
    Vt100,
    /// ANSI terminal.
    Ansi,
    /// Any other terminal name.
    Other(String),
}

impl TerminalType {
    /// Map a reported name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() {
            TerminalType::Unknown
        } else if name.eq_ignore_ascii_case("VT100") {
            TerminalType::Vt100
        } else if name.eq_ignore_ascii_case("ANSI") {
            TerminalType::Ansi
        } else {
            TerminalType::Other(name.to_string())
        }
    }

    /// Name as sent on the wire.
    pub fn name(&self) -> &str {
        match self {
            TerminalType::Unknown => "UNKNOWN",
            TerminalType::Vt100 => "VT100",
            TerminalType::Ansi => "ANSI",
            TerminalType::Other(name) => name,
        }
    }
}

impl std::fmt::Display for TerminalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Body of a Terminal Type subnegotiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalTypeCommand {
    /// `IS <name>`: the client's terminal name.
    Is(String),
    /// `SEND`: the server asks for the terminal name.
    Send,
}

impl TerminalTypeCommand {
    /// Encoded (unescaped) payload length, excluding the option byte.
    pub fn len(&self) -> usize {
        match self {
            TerminalTypeCommand::Is(name) => 1 + name.len(),
            TerminalTypeCommand::Send => 1,
        }
    }

    /// Always false; a command has at least its command byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Write the raw payload.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        match self {
            TerminalTypeCommand::Is(name) => {
                dst.put_u8(consts::ttype::IS);
                dst.put_slice(name.as_bytes());
            }
            TerminalTypeCommand::Send => dst.put_u8(consts::ttype::SEND),
        }
        Ok(self.len())
    }

    /// Decode an unescaped payload. Non-UTF-8 names are decoded lossily.
    pub fn decode<T: Buf>(src: &mut T) -> CodecResult<Self> {
        if !src.has_remaining() {
            return Err(CodecError::SubnegotiationError {
                option: TelnetOption::TerminalType,
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 1,
                    available: 0,
                },
            });
        }
        match src.get_u8() {
            consts::ttype::IS => {
                let name = src.copy_to_bytes(src.remaining());
                Ok(TerminalTypeCommand::Is(
                    String::from_utf8_lossy(&name).into_owned(),
                ))
            }
            consts::ttype::SEND => Ok(TerminalTypeCommand::Send),
            command => Err(CodecError::SubnegotiationError {
                option: TelnetOption::TerminalType,
                reason: SubnegotiationErrorKind::InvalidCommand { command },
            }),
        }
    }
}
