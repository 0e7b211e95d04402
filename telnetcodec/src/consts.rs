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

//! Wire constants from RFC 854 and the option RFCs.

/// Subnegotiation End
pub const SE: u8 = 240;
/// No Operation
pub const NOP: u8 = 241;
/// Data Mark
pub const DM: u8 = 242;
/// Break
pub const BRK: u8 = 243;
/// Interrupt Process
pub const IP: u8 = 244;
/// Abort Output
pub const AO: u8 = 245;
/// Are You There
pub const AYT: u8 = 246;
/// Erase Character
pub const EC: u8 = 247;
/// Erase Line
pub const EL: u8 = 248;
/// Go Ahead
pub const GA: u8 = 249;
/// Subnegotiation Begin
pub const SB: u8 = 250;
/// Sender wants to enable an option on its own side
pub const WILL: u8 = 251;
/// Sender refuses to enable an option on its own side
pub const WONT: u8 = 252;
/// Sender asks the peer to enable an option
pub const DO: u8 = 253;
/// Sender asks the peer to disable an option
pub const DONT: u8 = 254;
/// Interpret As Command
pub const IAC: u8 = 255;

/// Escape, the lead byte of VT terminal key sequences
pub const ESC: u8 = 27;
/// Control Sequence Introducer following [`ESC`]
pub const CSI: u8 = b'[';
/// Single Shift Three following [`ESC`], used by keypad and function keys
pub const SS3: u8 = b'O';

/// Option codes
pub mod option {
    /// Binary Transmission (RFC 856)
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857)
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead (RFC 858)
    pub const SGA: u8 = 3;
    /// Terminal Type (RFC 1091)
    pub const TTYPE: u8 = 24;
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: u8 = 31;
}

/// Terminal Type subnegotiation commands (RFC 1091)
pub mod ttype {
    /// Terminal name follows
    pub const IS: u8 = 0;
    /// Request the terminal name
    pub const SEND: u8 = 1;
}
