//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing and verifying access and refresh tokens
//! - Issuing token pairs and recording them in the refresh ledger
//! - Single-use rotation of refresh tokens with replay detection
//! - Bearer authentication of inbound requests

mod authenticator;
mod clock;
mod codec;
mod config;
mod hashing;
mod service;


pub use authenticator::{extract_bearer_token, RequestAuthenticator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::TokenCodec;
pub use config::{ReplayPolicy, TokenServiceConfig};
pub use hashing::{hash_token, hashes_match};
pub use service::TokenService;
