pub mod token;
pub mod user;

pub use token::{InMemoryRefreshLedger, RefreshLedger};
pub use user::{IdentityRepository, InMemoryIdentityRepository};
