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
use thiserror::Error;

/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors returned by the codec's encode and decode entry points.
///
/// Protocol faults in received data are not errors: the parser recovers from them and records a
/// [`ProtocolViolation`] instead.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    #[error("I/O error during {operation}: {kind:?}")]
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// A subnegotiation payload could not be decoded or encoded.
    #[error("subnegotiation error for option {option}: {reason}")]
    SubnegotiationError {
        /// The telnet option being subnegotiated
        option: TelnetOption,
        /// Specific reason for the failure
        reason: SubnegotiationErrorKind,
    },
}

/// Specific kinds of subnegotiation errors with structured context.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubnegotiationErrorKind {
    /// Insufficient data available to decode the subnegotiation.
    #[error("insufficient data (required: {required}, available: {available})")]
    InsufficientData {
        /// Number of bytes required
        required: usize,
        /// Number of bytes available
        available: usize,
    },

    /// Invalid command byte in the subnegotiation data.
    #[error("invalid command: 0x{command:02X}")]
    InvalidCommand {
        /// The invalid command byte
        command: u8,
    },

    /// The payload is not valid for the option.
    #[error("unexpected data: {reason}")]
    UnexpectedData {
        /// Description of why the data is unexpected
        reason: String,
    },
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}

/// A fault in received data that the parser recovered from.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// `IAC` followed by a byte that isn't a command valid in that position.
    #[error("malformed command: IAC 0x{0:02X}")]
    MalformedCommand(u8),

    /// `IAC` followed by something other than `IAC` or `SE` inside a subnegotiation.
    #[error("malformed subnegotiation for option {option}: IAC 0x{byte:02X}")]
    MalformedSubnegotiation {
        /// The option being subnegotiated
        option: TelnetOption,
        /// The byte that followed `IAC`
        byte: u8,
    },

    /// A subnegotiation payload exceeded the configured bound and was discarded.
    #[error("subnegotiation for option {option} exceeded {limit} bytes")]
    SubnegotiationOverflow {
        /// The option being subnegotiated
        option: TelnetOption,
        /// The configured bound
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err = CodecError::from(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ));
        assert!(matches!(
            err,
            CodecError::IOError {
                kind: std::io::ErrorKind::BrokenPipe,
                ..
            }
        ));
    }

    #[test]
    fn test_violation_display() {
        assert_eq!(
            ProtocolViolation::MalformedCommand(0x10).to_string(),
            "malformed command: IAC 0x10"
        );
        assert_eq!(
            ProtocolViolation::SubnegotiationOverflow {
                option: TelnetOption::TerminalType,
                limit: 128,
            }
            .to_string(),
            "subnegotiation for option TerminalType exceeded 128 bytes"
        );
    }
}
