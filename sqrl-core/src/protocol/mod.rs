//! Protocol Engine
//!
//! The SQRL wire protocol: signed, chained `client=&server=&ids=` POST
//! exchanges against a relying-party server.
//!
//! # Architecture
//!
//! - **Transport trait**: platform-agnostic blocking HTTP POST
//! - **Connection**: link + transport + fixed headers, redirectable
//! - **Request**: client/server value construction, signing, the
//!   single-shot transient retry
//! - **Response**: grammar validation and `tif` status-flag semantics
//!
//! # Example
//!
//! ```ignore
//! use sqrl_core::link::SiteLink;
//! use sqrl_core::protocol::{Command, MockTransport, ProtocolConnection, ProtocolRequest};
//!
//! let link = SiteLink::parse("sqrl://example.com/sqrl?nut=abc")?;
//! let mut conn = ProtocolConnection::open(link, MockTransport::new())?;
//! let query = ProtocolRequest::first(Command::Query, &identity, conn.link());
//! let response = query.send(&mut conn, &identity)?;
//! ```

pub mod connection;
pub mod error;
#[cfg(feature = "network")]
pub mod http;
pub mod mock;
pub mod request;
pub mod response;
pub mod transport;

pub use connection::ProtocolConnection;
pub use error::{ProtocolError, ProtocolResult};
#[cfg(feature = "network")]
pub use http::HttpTransport;
pub use mock::{MockTransport, SentRequest};
pub use request::{Command, ProtocolRequest};
pub use response::ProtocolResponse;
pub use transport::{HttpReply, Transport};
