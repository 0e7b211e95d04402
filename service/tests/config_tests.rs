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

//! Unit tests for configuration types

use std::time::Duration;
use telnego_codec::{LineEnding, SessionConfig, WindowSize};
use telnego_service::{NegotiationConfig, ServiceConfig};

#[test]
fn test_session_config_defaults() {
    let config = SessionConfig::default();

    assert_eq!(config.terminal_name, "VT100");
    assert_eq!(config.window_size, WindowSize::new(80, 24));
    assert_eq!(config.max_subnegotiation_len, 128);
    assert_eq!(config.backspace_code, 127);
    assert_eq!(config.delete_code, 8);
    assert_eq!(config.line_ending, LineEnding::CrLf);
    assert_eq!(config.are_you_there_reply, b"YES");
    assert!(config.recognize_key_sequences);
}

#[test]
fn test_session_config_builder() {
    let config = SessionConfig::default()
        .with_terminal_name("xterm")
        .with_window_size(120, 40)
        .with_max_subnegotiation_len(512)
        .with_key_codes(8, 127)
        .with_line_ending(LineEnding::CrNul)
        .with_are_you_there_reply("[here]")
        .with_key_sequences(false);

    assert_eq!(config.terminal_name, "xterm");
    assert_eq!(config.window_size, WindowSize::new(120, 40));
    assert_eq!(config.max_subnegotiation_len, 512);
    assert_eq!(config.backspace_code, 8);
    assert_eq!(config.delete_code, 127);
    assert_eq!(config.line_ending, LineEnding::CrNul);
    assert_eq!(config.are_you_there_reply, b"[here]");
    assert!(!config.recognize_key_sequences);
}

#[test]
fn test_negotiation_config_builder() {
    let config = NegotiationConfig::default()
        .with_retry_budget(8)
        .with_poll_timeout(Duration::from_millis(50))
        .with_initial_backoff(Duration::from_millis(1))
        .with_backoff_coefficient(3)
        .with_max_backoff(Duration::from_millis(30))
        .with_recv_buffer_size(512);

    assert_eq!(config.retry_budget, 8);
    assert_eq!(config.poll_timeout, Duration::from_millis(50));
    assert_eq!(config.initial_backoff, Duration::from_millis(1));
    assert_eq!(config.backoff_coefficient, 3);
    assert_eq!(config.max_backoff, Duration::from_millis(30));
    assert_eq!(config.recv_buffer_size, 512);
    assert_eq!(config.next_backoff(Duration::from_millis(9)), Duration::from_millis(27));
    assert_eq!(config.next_backoff(Duration::from_millis(27)), Duration::from_millis(30));
}

#[test]
fn test_service_config_defaults() {
    let config = ServiceConfig::default();

    assert_eq!(config.max_sessions, 1024);
    assert_eq!(config.max_pending_bytes, 64 * 1024);
    assert_eq!(config.negotiation.retry_budget, 5);
    assert_eq!(
        config.negotiation.worst_case_wait(),
        Duration::from_millis(2000)
    );
}
