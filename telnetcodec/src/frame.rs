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

use crate::{CodecResult, TelnetArgument, TelnetOption, Verb, consts};
use bytes::{BufMut, BytesMut};

///
/// A single unit on the Telnet wire.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetFrame {
    /// A data byte. `0xFF` is doubled when encoded.
    Data(u8),
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
    /// IAC AYT
    AreYouThere,
    /// IAC EC
    EraseCharacter,
    /// IAC EL
    EraseLine,
    /// IAC GA
    GoAhead,
    /// IAC DO option
    Do(TelnetOption),
    /// IAC DONT option
    Dont(TelnetOption),
    /// IAC WILL option
    Will(TelnetOption),
    /// IAC WONT option
    Wont(TelnetOption),
    /// IAC SB option payload IAC SE
    Subnegotiate(TelnetArgument),
}

impl TelnetFrame {
    /// Build the negotiation frame for `verb`.
    pub fn negotiate(verb: Verb, option: TelnetOption) -> Self {
        match verb {
            Verb::Will => TelnetFrame::Will(option),
            Verb::Wont => TelnetFrame::Wont(option),
            Verb::Do => TelnetFrame::Do(option),
            Verb::Dont => TelnetFrame::Dont(option),
        }
    }

    /// Append the wire form of this frame to `dst`.
    ///
    /// Literal `0xFF` bytes in data and subnegotiation payloads are doubled.
    pub fn encode(&self, dst: &mut BytesMut) -> CodecResult<()> {
        match self {
            TelnetFrame::Data(byte) => {
                dst.reserve(2);
                if *byte == consts::IAC {
                    dst.put_u8(consts::IAC);
                }
                dst.put_u8(*byte);
            }
            TelnetFrame::NoOperation => put_command(dst, consts::NOP),
            TelnetFrame::DataMark => put_command(dst, consts::DM),
            TelnetFrame::Break => put_command(dst, consts::BRK),
            TelnetFrame::InterruptProcess => put_command(dst, consts::IP),
            TelnetFrame::AbortOutput => put_command(dst, consts::AO),
            TelnetFrame::AreYouThere => put_command(dst, consts::AYT),
            TelnetFrame::EraseCharacter => put_command(dst, consts::EC),
            TelnetFrame::EraseLine => put_command(dst, consts::EL),
            TelnetFrame::GoAhead => put_command(dst, consts::GA),
            TelnetFrame::Do(option) => put_negotiation(dst, consts::DO, *option),
            TelnetFrame::Dont(option) => put_negotiation(dst, consts::DONT, *option),
            TelnetFrame::Will(option) => put_negotiation(dst, consts::WILL, *option),
            TelnetFrame::Wont(option) => put_negotiation(dst, consts::WONT, *option),
            TelnetFrame::Subnegotiate(argument) => {
                let mut payload = BytesMut::with_capacity(argument.len());
                argument.encode(&mut payload)?;
                dst.reserve(5 + payload.len() * 2);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SB);
                dst.put_u8(argument.option().to_u8());
                put_escaped(dst, &payload);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SE);
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for TelnetFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetFrame::Data(byte) => write!(f, "Data(0x{byte:02X})"),
            TelnetFrame::NoOperation => write!(f, "IAC NOP"),
            TelnetFrame::DataMark => write!(f, "IAC DM"),
            TelnetFrame::Break => write!(f, "IAC BRK"),
            TelnetFrame::InterruptProcess => write!(f, "IAC IP"),
            TelnetFrame::AbortOutput => write!(f, "IAC AO"),
            TelnetFrame::AreYouThere => write!(f, "IAC AYT"),
            TelnetFrame::EraseCharacter => write!(f, "IAC EC"),
            TelnetFrame::EraseLine => write!(f, "IAC EL"),
            TelnetFrame::GoAhead => write!(f, "IAC GA"),
            TelnetFrame::Do(option) => write!(f, "IAC DO {option}"),
            TelnetFrame::Dont(option) => write!(f, "IAC DONT {option}"),
            TelnetFrame::Will(option) => write!(f, "IAC WILL {option}"),
            TelnetFrame::Wont(option) => write!(f, "IAC WONT {option}"),
            TelnetFrame::Subnegotiate(argument) => write!(f, "IAC SB {argument} IAC SE"),
        }
    }
}

/// Append `data`, doubling every `0xFF`.
pub fn put_escaped(dst: &mut BytesMut, data: &[u8]) {
    dst.reserve(data.len());
    for &byte in data {
        if byte == consts::IAC {
            dst.put_u8(consts::IAC);
        }
        dst.put_u8(byte);
    }
}

fn put_command(dst: &mut BytesMut, command: u8) {
    dst.reserve(2);
    dst.put_u8(consts::IAC);
    dst.put_u8(command);
}

fn put_negotiation(dst: &mut BytesMut, verb: u8, option: TelnetOption) {
    dst.reserve(3);
    dst.put_u8(consts::IAC);
    dst.put_u8(verb);
    dst.put_u8(option.to_u8());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naws::WindowSize;

    fn encode(frame: TelnetFrame) -> BytesMut {
        let mut buffer = BytesMut::new();
        frame.encode(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_encode_negotiation() {
        assert_eq!(
            &encode(TelnetFrame::negotiate(Verb::Dont, TelnetOption::Echo))[..],
            &[consts::IAC, consts::DONT, consts::option::ECHO]
        );
        assert_eq!(
            &encode(TelnetFrame::Will(TelnetOption::Unknown(200)))[..],
            &[consts::IAC, consts::WILL, 200]
        );
    }

    #[test]
    fn test_encode_data_escapes_iac() {
        assert_eq!(&encode(TelnetFrame::Data(0xFF))[..], &[0xFF, 0xFF]);
        assert_eq!(&encode(TelnetFrame::Data(b'a'))[..], b"a");
    }

    #[test]
    fn test_encode_subnegotiation_escapes_payload() {
        let frame = TelnetFrame::Subnegotiate(TelnetArgument::NAWSWindowSize(WindowSize::new(
            255, 24,
        )));
        assert_eq!(
            &encode(frame)[..],
            &[
                consts::IAC,
                consts::SB,
                consts::option::NAWS,
                0x00,
                0xFF,
                0xFF,
                0x00,
                0x18,
                consts::IAC,
                consts::SE
            ]
        );
    }
}
