//! Routes for the authenticated user

pub mod me;

pub use me::me;
