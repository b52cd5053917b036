//! BCDB Core Types
//!
//! This crate provides the foundational types shared by the BCDB client crates:
//! - Data model (AccessControl, Version, Metadata, KvWithMetadata)
//! - User records and privileges
//! - Database index definitions (IndexAttributeType)
//! - Transaction receipts and validation flags
//! - Transaction envelopes (data, users and database administration)
//! - The signing collaborator (Signer, Ed25519Signer)
//! - The remote store contract (RemoteStore, RemoteError)

mod envelope;
mod error;
mod identity;
mod receipt;
mod remote;
mod types;

pub use envelope::*;
pub use error::*;
pub use identity::*;
pub use receipt::*;
pub use remote::*;
pub use types::*;
