//! Session state and credential storage.
//!
//! This module provides:
//! - `Session`: the access/refresh token pair, shared by every `ApiClient`
//! - `TokenStore`: where tokens persist between runs (memory, file, keychain)
//!
//! The refresh token is only replaced on login; a refresh swaps the access
//! token alone.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::KeyringTokenStore;
pub use session::{Session, SessionEvent};
pub use store::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
