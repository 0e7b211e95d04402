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

//! Negotiate About Window Size
//!

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, TelnetOption};
use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, BufMut};

/// Window dimensions carried by a NAWS subnegotiation (RFC 1073).
///
/// # Format
/// Four bytes, big-endian:
/// - 2 bytes for columns (width)
/// - 2 bytes for rows (height)
///
/// # Example
/// ```
/// use telnego_codec::naws::WindowSize;
///
/// let size = WindowSize::new(80, 24);
/// assert_eq!(size.cols, 80);
/// assert_eq!(size.rows, 24);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowSize {
    /// The number of columns (characters) in the terminal window
    pub cols: u16,
    /// The number of rows (lines) in the terminal window
    pub rows: u16,
}

impl WindowSize {
    /// Encoded payload length.
    pub const LEN: usize = 4;

    /// Creates a new `WindowSize` with the specified columns and rows.
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// Encodes this `WindowSize` into a byte buffer using big-endian format.
    ///
    /// The bytes are raw: doubling of any `0xFF` happens when the enclosing subnegotiation frame
    /// is encoded.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        Ok(self.write(&mut dst.writer())?)
    }

    /// Writes this `WindowSize` to a writer, columns then rows, as big-endian u16 values.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(Self::LEN)
    }

    /// Decodes a `WindowSize` from an unescaped NAWS payload.
    ///
    /// # Errors
    /// Returns `CodecError::SubnegotiationError` with `InsufficientData` if
    /// fewer than 4 bytes are available in the buffer.
    ///
    /// # Example
    /// ```
    /// use telnego_codec::naws::WindowSize;
    ///
    /// let mut buf = &[0x00, 0x50, 0x00, 0x18][..];
    /// let size = WindowSize::decode(&mut buf).unwrap();
    /// assert_eq!(size, WindowSize::new(80, 24));
    /// ```
    pub fn decode<T: Buf>(src: &mut T) -> CodecResult<WindowSize> {
        if src.remaining() >= Self::LEN {
            Ok(WindowSize {
                cols: src.get_u16(),
                rows: src.get_u16(),
            })
        } else {
            Err(CodecError::SubnegotiationError {
                option: TelnetOption::NAWS,
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: Self::LEN,
                    available: src.remaining(),
                },
            })
        }
    }
}

impl Default for WindowSize {
    /// The traditional 80x24 terminal.
    fn default() -> Self {
        WindowSize { cols: 80, rows: 24 }
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cols, self.rows)
    }
}
