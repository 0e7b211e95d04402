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

use crate::TelnetOption;
use crate::args::naws::WindowSize;
use crate::args::ttype::TerminalTypeCommand;
use crate::result::CodecResult;
use bytes::{Buf, BufMut, BytesMut};

pub mod naws;
pub mod ttype;

///
/// Telnet Subnegotiation Argument
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetArgument {
    /// A subnegotiation for the window size.
    NAWSWindowSize(WindowSize),
    /// A Terminal Type `IS` or `SEND`.
    TerminalType(TerminalTypeCommand),
    /// A subnegotiation for an option without a dedicated decoder.
    Unknown(TelnetOption, BytesMut),
}

impl TelnetArgument {
    /// The option this argument belongs to.
    pub fn option(&self) -> TelnetOption {
        match self {
            TelnetArgument::NAWSWindowSize(_) => TelnetOption::NAWS,
            TelnetArgument::TerminalType(_) => TelnetOption::TerminalType,
            TelnetArgument::Unknown(option, _) => *option,
        }
    }

    /// Unescaped payload length, excluding the option byte.
    pub fn len(&self) -> usize {
        match self {
            TelnetArgument::NAWSWindowSize(_) => WindowSize::LEN,
            TelnetArgument::TerminalType(command) => command.len(),
            TelnetArgument::Unknown(_, payload) => payload.len(),
        }
    }

    /// True when the payload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the unescaped payload, excluding the option byte.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        match self {
            TelnetArgument::NAWSWindowSize(size) => size.encode(dst),
            TelnetArgument::TerminalType(command) => command.encode(dst),
            TelnetArgument::Unknown(_, payload) => {
                dst.put_slice(payload);
                Ok(payload.len())
            }
        }
    }

    /// Decode an unescaped payload for `option`.
    pub fn decode<T: Buf>(option: TelnetOption, src: &mut T) -> CodecResult<Self> {
        match option {
            TelnetOption::NAWS => Ok(TelnetArgument::NAWSWindowSize(WindowSize::decode(src)?)),
            TelnetOption::TerminalType => Ok(TelnetArgument::TerminalType(
                TerminalTypeCommand::decode(src)?,
            )),
            option => {
                let mut payload = BytesMut::with_capacity(src.remaining());
                payload.put(src);
                Ok(TelnetArgument::Unknown(option, payload))
            }
        }
    }
}

impl std::fmt::Display for TelnetArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetArgument::NAWSWindowSize(size) => write!(f, "NAWS {size}"),
            TelnetArgument::TerminalType(TerminalTypeCommand::Is(name)) => {
                write!(f, "TTYPE IS {name}")
            }
            TelnetArgument::TerminalType(TerminalTypeCommand::Send) => write!(f, "TTYPE SEND"),
            TelnetArgument::Unknown(option, payload) => {
                write!(f, "{option} [{} bytes]", payload.len())
            }
        }
    }
}
