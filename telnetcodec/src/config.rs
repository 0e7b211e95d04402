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

//! Per-session configuration
//!
//! ```
//! use telnego_codec::{LineEnding, SessionConfig};
//!
//! let config = SessionConfig::default()
//!     .with_terminal_name("ANSI")
//!     .with_window_size(132, 43)
//!     .with_line_ending(LineEnding::CrNul);
//! ```

use crate::WindowSize;

/// Line terminator used when encoding text lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// CR LF
    #[default]
    CrLf,
    /// CR NUL
    CrNul,
}

impl LineEnding {
    /// Wire bytes of the terminator.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineEnding::CrLf => b"\r\n",
            LineEnding::CrNul => b"\r\0",
        }
    }
}

/// Settings fixed when a session is created.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Terminal name a client reports in `TTYPE IS`.
    pub terminal_name: String,

    /// Window size a client reports through NAWS.
    pub window_size: WindowSize,

    /// Largest accepted subnegotiation, option byte included.
    pub max_subnegotiation_len: usize,

    /// Byte the terminal sends for backspace.
    pub backspace_code: u8,

    /// Byte the terminal sends for delete.
    pub delete_code: u8,

    /// Line terminator for encoded text.
    pub line_ending: LineEnding,

    /// Reply to `IAC AYT`.
    pub are_you_there_reply: Vec<u8>,

    /// Recognise `ESC [ x` and `ESC O x` as terminal keys outside binary mode.
    pub recognize_key_sequences: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            terminal_name: "VT100".to_string(),
            window_size: WindowSize::default(),
            max_subnegotiation_len: 128,
            backspace_code: 127,
            delete_code: 8,
            line_ending: LineEnding::CrLf,
            are_you_there_reply: b"YES".to_vec(),
            recognize_key_sequences: true,
        }
    }
}

impl SessionConfig {
    /// Set the reported terminal name
    pub fn with_terminal_name(mut self, name: impl Into<String>) -> Self {
        self.terminal_name = name.into();
        self
    }

    /// Set the reported window size
    pub fn with_window_size(mut self, cols: u16, rows: u16) -> Self {
        self.window_size = WindowSize::new(cols, rows);
        self
    }

    /// Set the subnegotiation bound
    pub fn with_max_subnegotiation_len(mut self, len: usize) -> Self {
        self.max_subnegotiation_len = len;
        self
    }

    /// Set the backspace and delete codes
    pub fn with_key_codes(mut self, backspace: u8, delete: u8) -> Self {
        self.backspace_code = backspace;
        self.delete_code = delete;
        self
    }

    /// Set the line terminator
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Set the `AYT` reply
    pub fn with_are_you_there_reply(mut self, reply: impl Into<Vec<u8>>) -> Self {
        self.are_you_there_reply = reply.into();
        self
    }

    /// Enable or disable terminal key recognition
    pub fn with_key_sequences(mut self, enabled: bool) -> Self {
        self.recognize_key_sequences = enabled;
        self
    }
}
