//! Remote parties: the trust model of the roaming network.
//!
//! ## Contents
//! - [`RemoteParty`] and its parts — identity, status, access tokens, TLS
//!   material, transport preferences, retry budget, etag
//! - [`PartyStore`] — read-mostly registry with token authentication and
//!   copy-on-write mutation

mod party;
mod store;

pub use party::{
    AccessStatus, EntityTag, LocalAccessInfo, PartyRef, PartyRole, PartyStatus, RemoteAccessInfo,
    RemoteParty, TlsPrefs, TlsVersion, TransportPrefs, TrustMode,
};
pub use store::PartyStore;
