//! BCDB Session
//!
//! Entry point of the client.
//!
//! Responsibilities:
//! - Hold the connection to the remote store (replica set)
//! - Open sessions bound to one signing identity and fixed timeouts
//! - Create data, users and database transaction contexts
//! - Observe transaction finality through the ledger
//! - Run JSON selector queries over indexed attributes

mod config;
mod error;
mod json_query;
mod ledger;
mod session;

pub use config::{ClientConfig, ConnectionConfig, Replica, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use json_query::JsonQuery;
pub use ledger::{Ledger, DEFAULT_POLL_INTERVAL};
pub use session::{Bcdb, Session, SessionId};
