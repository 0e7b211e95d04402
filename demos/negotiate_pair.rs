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

//! Negotiation Pair Example
//!
//! Runs a client and a server session against each other over an in-memory duplex pipe using
//! the default negotiation tables, then prints what each side ended up with.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example negotiate_pair
//! ```

use std::time::Duration;
use telnego_codec::{NegotiationTable, Role, SessionConfig};
use telnego_service::{StreamTransport, TelnetService, Transport};
use tokio::io::duplex;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let service = TelnetService::default();
    let client = service.create_session(
        Role::Client,
        SessionConfig::default()
            .with_terminal_name("xterm-256color")
            .with_window_size(120, 40),
    )?;
    let server = service.create_session(Role::Server, SessionConfig::default())?;

    let buffer_size = service.config().negotiation.recv_buffer_size;
    let (client_end, server_end) = duplex(buffer_size);
    let mut client_io = StreamTransport::new(client_end, buffer_size);
    let mut server_io = StreamTransport::new(server_end, buffer_size);

    let client_table = NegotiationTable::client_default();
    let server_table = NegotiationTable::server_default();
    let (client_outcomes, server_outcomes) = tokio::join!(
        service.negotiate(client, &mut client_io, &client_table),
        service.negotiate(server, &mut server_io, &server_table),
    );

    println!("client: {}", client_outcomes?);
    println!("server: {}", server_outcomes?);

    // The server greets the client once negotiation is over.
    service.send_line(server, &mut server_io, "Welcome!").await?;
    let seen = service
        .wait_for_pattern(client, &mut client_io, b"Welcome!", Duration::from_secs(1))
        .await?;
    println!("client saw greeting: {seen}");

    for id in [client, server] {
        let state = service.get_state(id)?;
        println!("{state}");
        for option in &state.options {
            println!(
                "  {:<18} {:?} settled={}",
                option.option.to_string(),
                option.resolution,
                option.settled
            );
        }
    }

    println!("client transport connected: {}", client_io.is_connected());
    service.destroy(client)?;
    service.destroy(server)?;
    Ok(())
}
