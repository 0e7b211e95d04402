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

//! Integration tests for telnego-codec
//!
//! These tests pair a client and a server session and check how they converge, and drive a
//! session through `tokio_util::codec::Framed`.

use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use proptest::prelude::*;
use telnego_codec::{
    Decoder, NegotiationTable, ParseState, Resolution, Role, SessionConfig, TelnetEvent,
    TelnetFrame, TelnetOption, TelnetSession, TerminalType, WindowSize, consts,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::codec::Framed;

// ============================================================================
// Helper Functions
// ============================================================================

/// Shuttle outbound bytes between two sessions until both are quiet. Returns the rounds taken.
fn exchange(client: &mut TelnetSession, server: &mut TelnetSession) -> usize {
    for round in 1..=16 {
        let to_server = client.take_outbound();
        let to_client = server.take_outbound();
        if to_server.is_empty() && to_client.is_empty() {
            return round;
        }
        server.receive(&to_server);
        client.receive(&to_client);
    }
    panic!("sessions never went quiet");
}

fn default_pair() -> (TelnetSession, TelnetSession) {
    let mut client = TelnetSession::new(
        Role::Client,
        SessionConfig::default()
            .with_terminal_name("xterm-256color")
            .with_window_size(132, 43),
    );
    let mut server = TelnetSession::server();
    client.install(&NegotiationTable::client_default());
    server.install(&NegotiationTable::server_default());
    (client, server)
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn default_tables_converge() {
    let (mut client, mut server) = default_pair();
    let rounds = exchange(&mut client, &mut server);
    assert!(rounds <= 6, "took {rounds} rounds");

    for option in TelnetOption::TRACKED {
        assert!(client.is_settled(option), "client {option}");
        assert!(server.is_settled(option), "server {option}");
    }

    assert_eq!(server.window_size(), WindowSize::new(132, 43));
    assert_eq!(
        server.terminal_type(),
        &TerminalType::Other("xterm-256color".to_string())
    );

    // Both directions of SGA are agreed.
    let sga = server.option(TelnetOption::SuppressGoAhead).unwrap();
    assert!(sga.enabled_local());
    assert!(sga.enabled_remote());

    // The client declined to let the server echo.
    assert!(!server.echo_enabled());
    let echo = server.option(TelnetOption::Echo).unwrap();
    assert!(echo.sent_will());
    assert!(echo.peer_dont());
    assert_eq!(echo.resolution(), Resolution::Declined);
}

#[test]
fn convergence_survives_byte_at_a_time_delivery() {
    let (mut client, mut server) = default_pair();
    for _ in 0..8 {
        let to_server = client.take_outbound();
        let to_client = server.take_outbound();
        for byte in to_server.iter() {
            server.receive(std::slice::from_ref(byte));
        }
        for byte in to_client.iter() {
            client.receive(std::slice::from_ref(byte));
        }
    }
    assert!(!client.has_outbound());
    assert!(!server.has_outbound());
    assert_eq!(server.window_size(), WindowSize::new(132, 43));
    assert!(server.is_settled(TelnetOption::TerminalType));
}

#[test]
fn echo_agreed_when_client_allows_it() {
    let mut client = TelnetSession::client();
    let mut server = TelnetSession::server();
    client.install(
        &NegotiationTable::new().with(telnego_codec::Stance::Require, TelnetOption::Echo),
    );
    server.install(&NegotiationTable::server_default());
    exchange(&mut client, &mut server);
    assert!(server.echo_enabled());
    assert!(!client.echo_enabled());
}

// ============================================================================
// Framing Properties
// ============================================================================

#[test]
fn escaped_data_round_trips() {
    let data: Vec<u8> = (0..=255u8).collect();
    let mut buffer = BytesMut::new();
    telnego_codec::put_escaped(&mut buffer, &data);

    let mut session = TelnetSession::new(
        Role::Client,
        SessionConfig::default().with_key_sequences(false),
    );
    let received: Vec<u8> = session
        .receive(&buffer)
        .iter()
        .filter_map(TelnetEvent::as_data)
        .collect();
    assert_eq!(received, data);
}

#[test]
fn malformed_subnegotiation_terminator_is_recovered() {
    let mut session = TelnetSession::server();
    let events = session.receive(&[
        consts::IAC,
        consts::SB,
        consts::option::NAWS,
        0,
        80,
        consts::IAC,
        consts::NOP,
        b'z',
    ]);
    assert_eq!(events, vec![TelnetEvent::Data(b'z')]);
    assert_eq!(session.stats().malformed_commands, 1);
    assert_eq!(session.window_size(), WindowSize::default());
    assert_eq!(session.parse_state(), ParseState::Normal);
}

proptest! {
    #[test]
    fn split_input_decodes_identically(
        input in proptest::collection::vec(any::<u8>(), 0..256),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(input.len() + 1);

        let mut whole = TelnetSession::server();
        whole.install(&NegotiationTable::server_default());
        let expected = whole.receive(&input);

        let mut parts = TelnetSession::server();
        parts.install(&NegotiationTable::server_default());
        let mut actual = parts.receive(&input[..at]);
        actual.extend(parts.receive(&input[at..]));

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(parts.parse_state(), whole.parse_state());
        prop_assert_eq!(parts.take_outbound(), whole.take_outbound());
    }

    #[test]
    fn arbitrary_input_never_answers_with_will_or_do(
        input in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut session = TelnetSession::client();
        session.receive(&input);
        let sent = session.take_outbound();
        let offers = sent
            .windows(2)
            .filter(|pair| pair[0] == consts::IAC && (pair[1] == consts::WILL || pair[1] == consts::DO))
            .count();
        prop_assert_eq!(offers, 0);
    }
}

// ============================================================================
// Framed Transport
// ============================================================================

#[tokio::test]
async fn framed_server_negotiates_over_duplex() {
    let (server_io, mut client_io) = tokio::io::duplex(1024);
    let mut framed = Framed::new(server_io, TelnetSession::server());

    framed.codec_mut().install(&NegotiationTable::server_default());
    let greeting = framed.codec_mut().take_outbound();
    framed.get_mut().write_all(&greeting).await.unwrap();

    let mut received = vec![0u8; greeting.len()];
    client_io.read_exact(&mut received).await.unwrap();
    assert_eq!(received, greeting.to_vec());

    client_io
        .write_all(&[
            consts::IAC,
            consts::WILL,
            consts::option::NAWS,
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0,
            100,
            0,
            30,
            consts::IAC,
            consts::SE,
        ])
        .await
        .unwrap();

    let first = framed.next().await.unwrap().unwrap();
    assert_eq!(
        first,
        TelnetEvent::Negotiation(telnego_codec::Verb::Will, TelnetOption::NAWS)
    );
    let second = framed.next().await.unwrap().unwrap();
    assert_eq!(
        second,
        TelnetEvent::WindowSizeChanged(WindowSize::new(100, 30))
    );

    framed.send(TelnetFrame::Data(0xFF)).await.unwrap();
    let mut escaped = [0u8; 2];
    client_io.read_exact(&mut escaped).await.unwrap();
    assert_eq!(escaped, [consts::IAC, consts::IAC]);
}

#[tokio::test]
async fn framed_stream_ends_on_close() {
    let (server_io, client_io) = tokio::io::duplex(64);
    let mut framed = Framed::new(server_io, TelnetSession::server());
    drop(client_io);
    assert!(framed.next().await.is_none());

    // A session left mid-command still reports its state.
    let mut session = TelnetSession::server();
    let mut partial = BytesMut::from(&[consts::IAC, consts::DO][..]);
    assert!(session.decode(&mut partial).unwrap().is_none());
    assert_eq!(
        session.parse_state(),
        ParseState::CmdArg(telnego_codec::Verb::Do)
    );
}
