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

//! Telnet Negotiation Service
//!
//! The async layer over `telnego-codec`: a concurrent session store, a transport abstraction
//! and the negotiation driver that waits, with bounded retries, for each option to settle.
//!
//! # Architecture
//!
//! ```text
//! TelnetService
//!     ↓
//! Negotiator ──→ Transport (StreamTransport over TCP or a duplex pipe)
//!     ↓
//! SessionManager → TelnetSession
//! ```
//!
//! # Example
//!
//! ```no_run
//! use telnego_service::{StreamTransport, TelnetService};
//! use telnego_codec::{NegotiationTable, Role, SessionConfig};
//! use tokio::net::TcpStream;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = TelnetService::default();
//!     let id = service.create_session(Role::Client, SessionConfig::default())?;
//!     let stream = TcpStream::connect("127.0.0.1:23").await?;
//!     let mut transport = StreamTransport::new(stream, 4096);
//!     let outcomes = service
//!         .negotiate(id, &mut transport, &NegotiationTable::client_default())
//!         .await?;
//!     println!("{outcomes}");
//!     Ok(())
//! }
//! ```

mod config;
mod driver;
mod error;
mod manager;
mod service;
mod transport;
mod types;

pub use config::{NegotiationConfig, ServiceConfig};
pub use driver::Negotiator;
pub use error::{Result, TelnetError};
pub use manager::SessionManager;
pub use service::TelnetService;
pub use transport::{StreamTransport, Transport};
pub use types::{
    FeedOutput, NegotiatedOptions, OptionOutcome, OptionSnapshot, SessionId, SessionSnapshot,
};
