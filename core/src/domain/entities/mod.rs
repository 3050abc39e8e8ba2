//! Domain entities representing core business objects.

pub mod identity;
pub mod token;

// Re-export commonly used types
pub use identity::{Account, AccountCredentials, Identity, NewAccount};
pub use token::{
    AccessClaims, NewLedgerEntry, RefreshClaims, RefreshLedgerEntry, TokenPair, TokenStatus,
    TOKEN_TYPE,
};
