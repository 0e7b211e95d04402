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

use crate::session::ParseState;
use crate::{
    CodecError, ProtocolViolation, TelnetEvent, TelnetFrame, TelnetOption, TelnetSession, Verb,
    consts,
};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

impl TelnetSession {
    /// Consume bytes from `src` until one event is recognised or `src` is exhausted.
    ///
    /// Parser state is kept in the session, so input may be split anywhere.
    pub(crate) fn next_event(&mut self, src: &mut BytesMut) -> Option<TelnetEvent> {
        while let Some(&byte) = src.first() {
            if self.parse_state == ParseState::EscSeen && byte != consts::CSI && byte != consts::SS3
            {
                // Not a key sequence: hand ESC through and parse `byte` normally.
                self.parse_state = ParseState::Normal;
                return Some(TelnetEvent::Data(consts::ESC));
            }
            src.advance(1);
            if let Some(event) = self.step(byte) {
                return Some(event);
            }
        }
        None
    }

    fn step(&mut self, byte: u8) -> Option<TelnetEvent> {
        match self.parse_state {
            ParseState::Normal => match byte {
                consts::IAC => {
                    self.parse_state = ParseState::IacSeen;
                    None
                }
                consts::ESC if self.recognizes_keys() => {
                    self.parse_state = ParseState::EscSeen;
                    None
                }
                byte => Some(TelnetEvent::Data(byte)),
            },
            ParseState::EscSeen => {
                self.parse_state = ParseState::EscSequence(byte);
                None
            }
            ParseState::EscSequence(intro) => {
                self.parse_state = ParseState::Normal;
                Some(TelnetEvent::TerminalKey { intro, code: byte })
            }
            ParseState::IacSeen => {
                self.parse_state = ParseState::Normal;
                self.command(byte)
            }
            ParseState::CmdArg(verb) => {
                self.parse_state = ParseState::Normal;
                let option = TelnetOption::from_u8(byte);
                trace!(verb = %verb, option = %option, "received negotiation");
                self.handle_negotiation(verb, option);
                Some(TelnetEvent::Negotiation(verb, option))
            }
            ParseState::SubNegStart => {
                self.subneg_buffer.clear();
                self.subneg_buffer.put_u8(byte);
                self.parse_state = ParseState::SubNegBody;
                None
            }
            ParseState::SubNegBody => {
                if byte == consts::IAC {
                    self.parse_state = ParseState::SubNegIacInBody;
                } else {
                    self.push_subnegotiation(byte);
                }
                None
            }
            ParseState::SubNegIacInBody => match byte {
                consts::IAC => {
                    self.parse_state = ParseState::SubNegBody;
                    self.push_subnegotiation(consts::IAC);
                    None
                }
                consts::SE => {
                    self.parse_state = ParseState::Normal;
                    let payload = self.subneg_buffer.split().freeze();
                    self.handle_subnegotiation(&payload)
                }
                byte => {
                    let option = self.subnegotiation_option();
                    self.note_violation(ProtocolViolation::MalformedSubnegotiation { option, byte });
                    self.subneg_buffer.clear();
                    // The unterminated payload and `byte` are both dropped.
                    self.parse_state = ParseState::Normal;
                    None
                }
            },
        }
    }

    /// Handle the byte after `IAC` outside a subnegotiation.
    fn command(&mut self, byte: u8) -> Option<TelnetEvent> {
        if let Some(verb) = Verb::from_u8(byte) {
            self.parse_state = ParseState::CmdArg(verb);
            return None;
        }
        match byte {
            consts::IAC => Some(TelnetEvent::Data(consts::IAC)),
            consts::SB => {
                self.parse_state = ParseState::SubNegStart;
                None
            }
            consts::AYT => {
                let reply = self.config().are_you_there_reply.clone();
                self.queue_data(&reply);
                Some(TelnetEvent::AreYouThere)
            }
            consts::GA if self.go_ahead_suppressed() => None,
            consts::GA => Some(TelnetEvent::GoAhead),
            consts::NOP => Some(TelnetEvent::NoOperation),
            consts::DM => Some(TelnetEvent::DataMark),
            consts::BRK => Some(TelnetEvent::Break),
            consts::IP => Some(TelnetEvent::InterruptProcess),
            consts::AO => Some(TelnetEvent::AbortOutput),
            consts::EC => Some(TelnetEvent::EraseCharacter),
            consts::EL => Some(TelnetEvent::EraseLine),
            byte => {
                self.note_violation(ProtocolViolation::MalformedCommand(byte));
                None
            }
        }
    }

    fn push_subnegotiation(&mut self, byte: u8) {
        let limit = self.config().max_subnegotiation_len;
        if self.subneg_buffer.len() >= limit {
            let option = self.subnegotiation_option();
            self.note_violation(ProtocolViolation::SubnegotiationOverflow { option, limit });
            self.subneg_buffer.clear();
            self.parse_state = ParseState::Normal;
        } else {
            self.subneg_buffer.put_u8(byte);
        }
    }

    fn subnegotiation_option(&self) -> TelnetOption {
        TelnetOption::from_u8(self.subneg_buffer.first().copied().unwrap_or_default())
    }
}

impl Decoder for TelnetSession {
    type Item = TelnetEvent;
    type Error = CodecError;

    /// Decode the next event. Protocol faults are recovered in place, so this never fails.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.next_event(src))
    }
}

impl Encoder<TelnetFrame> for TelnetSession {
    type Error = CodecError;

    fn encode(&mut self, item: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode(dst)
    }
}

impl Encoder<u8> for TelnetSession {
    type Error = CodecError;

    fn encode(&mut self, item: u8, dst: &mut BytesMut) -> Result<(), Self::Error> {
        TelnetFrame::Data(item).encode(dst)
    }
}

impl Encoder<&[u8]> for TelnetSession {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        crate::frame::put_escaped(dst, item);
        Ok(())
    }
}

impl Encoder<&str> for TelnetSession {
    type Error = CodecError;

    /// Encode a line of text followed by the session line ending.
    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        crate::frame::put_escaped(dst, item.as_bytes());
        dst.put_slice(self.line_ending().as_bytes());
        Ok(())
    }
}
