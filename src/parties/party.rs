//! # Remote roaming partner model.
//!
//! A [`RemoteParty`] holds everything this node needs to trust one partner
//! (CPO, eMSP, or hub): the tokens accepted **from** it, the token and URL
//! used when calling **out** to it, TLS material, network preferences, and
//! the retry budget for outbound calls.
//!
//! Every mutation restamps `last_updated` and recomputes the [`EntityTag`]
//! — a content hash of the canonical JSON representation that external
//! stores use for change detection and optimistic concurrency.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::events::OcpiVersion;
use crate::policies::RetryPolicy;

/// Role a party plays in the roaming network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartyRole {
    /// Charge point operator.
    Cpo,
    /// e-Mobility service provider.
    Emsp,
    /// Roaming hub.
    Hub,
}

impl PartyRole {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PartyRole::Cpo => "cpo",
            PartyRole::Emsp => "emsp",
            PartyRole::Hub => "hub",
        }
    }
}

/// Identity of one roaming partner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartyRef {
    /// ISO 3166-1 alpha-2 country code ("DE", "NL").
    pub country_code: String,
    /// Three-character party id within the country ("GEF").
    pub party_id: String,
    /// Role of the partner.
    pub role: PartyRole,
}

impl PartyRef {
    /// Creates a party identity.
    pub fn new(country_code: impl Into<String>, party_id: impl Into<String>, role: PartyRole) -> Self {
        Self {
            country_code: country_code.into(),
            party_id: party_id.into(),
            role,
        }
    }
}

impl fmt::Display for PartyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}*{} ({})",
            self.country_code,
            self.party_id,
            self.role.as_label()
        )
    }
}

/// Lifecycle status of a party record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartyStatus {
    /// Onboarding started, credentials not yet confirmed.
    Pending,
    /// Fully operational.
    Active,
    /// Temporarily disabled by the operator.
    Suspended,
    /// Logically deleted; the record stays resident but no token matches.
    Deleted,
}

/// Whether an access token is currently usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessStatus {
    /// Token authenticates.
    Allowed,
    /// Token is known but rejected.
    Blocked,
}

/// Token this node accepts on inbound requests from the partner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccessInfo {
    /// The access token the partner presents.
    pub token: String,
    /// Usability of the token.
    pub status: AccessStatus,
}

impl LocalAccessInfo {
    /// Creates an allowed inbound token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            status: AccessStatus::Allowed,
        }
    }
}

/// Token and endpoint this node uses when calling the partner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAccessInfo {
    /// The access token sent on outbound requests.
    pub token: String,
    /// The partner's versions endpoint.
    pub versions_url: String,
    /// Protocol version negotiated with the partner.
    pub version: OcpiVersion,
    /// Usability of the token.
    pub status: AccessStatus,
}

impl RemoteAccessInfo {
    /// Creates an allowed outbound token for the given endpoint.
    pub fn new(
        token: impl Into<String>,
        versions_url: impl Into<String>,
        version: OcpiVersion,
    ) -> Self {
        Self {
            token: token.into(),
            versions_url: versions_url.into(),
            version,
            status: AccessStatus::Allowed,
        }
    }
}

/// How the partner's server certificate is validated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustMode {
    /// Validate against the system root store.
    #[default]
    SystemRoots,
    /// Validate against a pinned CA certificate (PEM).
    PinnedCa(String),
    /// Accept any certificate. Test environments only.
    AcceptAll,
}

/// Minimum TLS protocol version for outbound connections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlsVersion {
    /// TLS 1.2
    #[serde(rename = "1.2")]
    V1_2,
    /// TLS 1.3
    #[default]
    #[serde(rename = "1.3")]
    V1_3,
}

/// TLS trust material handed to the outbound transport.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsPrefs {
    /// Server certificate validation mode.
    pub trust: TrustMode,
    /// Client certificate chain (PEM), if the partner requires mTLS.
    pub client_cert_pem: Option<String>,
    /// Client private key (PEM) matching the certificate chain.
    pub client_key_pem: Option<String>,
    /// Minimum TLS version.
    pub min_version: TlsVersion,
}

/// Socket-level preferences for outbound connections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportPrefs {
    /// Prefer IPv4 addresses when the partner's host resolves to both.
    pub prefer_ipv4: bool,
    /// Allow HTTP pipelining on kept-alive connections.
    pub pipelining: bool,
    /// Receive buffer size in bytes, if overridden.
    pub recv_buffer_size: Option<u32>,
}

impl Default for TransportPrefs {
    fn default() -> Self {
        Self {
            prefer_ipv4: false,
            pipelining: true,
            recv_buffer_size: None,
        }
    }
}

/// Content hash of a party's canonical representation.
///
/// External stores compare tags to detect concurrent administrative edits;
/// the tag changes on every mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTag(String);

impl EntityTag {
    /// The tag as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn compute(party: &RemoteParty) -> Self {
        use fmt::Write;
        match serde_json::to_vec(party) {
            Ok(bytes) => {
                let digest = Sha256::digest(&bytes);
                let mut hex = String::with_capacity(digest.len() * 2);
                for byte in digest {
                    let _ = write!(hex, "{byte:02x}");
                }
                EntityTag(hex)
            }
            Err(err) => {
                tracing::warn!(error = %err, "party serialization failed, etag left empty");
                EntityTag::default()
            }
        }
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One roaming partner with its credentials and trust configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteParty {
    /// Partner identity.
    pub id: PartyRef,
    /// Lifecycle status.
    pub status: PartyStatus,
    /// Tokens accepted from the partner on inbound requests.
    pub local_tokens: Vec<LocalAccessInfo>,
    /// Tokens and endpoints used on outbound requests to the partner.
    pub remote_tokens: Vec<RemoteAccessInfo>,
    /// TLS trust material for outbound connections.
    pub tls: TlsPrefs,
    /// Socket-level preferences for outbound connections.
    pub transport: TransportPrefs,
    /// Retry budget for outbound calls.
    pub retry: RetryPolicy,
    last_updated: DateTime<Utc>,
    #[serde(skip)]
    etag: EntityTag,
}

impl RemoteParty {
    /// Creates an onboarding record in `Pending` status, stamped.
    pub fn new(
        id: PartyRef,
        local_tokens: Vec<LocalAccessInfo>,
        remote_tokens: Vec<RemoteAccessInfo>,
    ) -> Self {
        let mut party = Self {
            id,
            status: PartyStatus::Pending,
            local_tokens,
            remote_tokens,
            tls: TlsPrefs::default(),
            transport: TransportPrefs::default(),
            retry: RetryPolicy::default(),
            last_updated: Utc::now(),
            etag: EntityTag::default(),
        };
        party.restamp();
        party
    }

    /// Sets the lifecycle status (builder style), restamped.
    pub fn with_status(mut self, status: PartyStatus) -> Self {
        self.status = status;
        self.restamp();
        self
    }

    /// Sets the TLS material (builder style), restamped.
    pub fn with_tls(mut self, tls: TlsPrefs) -> Self {
        self.tls = tls;
        self.restamp();
        self
    }

    /// Sets the transport preferences (builder style), restamped.
    pub fn with_transport(mut self, transport: TransportPrefs) -> Self {
        self.transport = transport;
        self.restamp();
        self
    }

    /// Sets the retry policy (builder style), restamped.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self.restamp();
        self
    }

    /// Instant of the last mutation.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Content hash of the current record.
    pub fn etag(&self) -> &EntityTag {
        &self.etag
    }

    /// Whether an inbound request presenting `token` authenticates as this
    /// party. Deleted parties and blocked tokens never match.
    pub fn accepts_token(&self, token: &str) -> bool {
        self.status != PartyStatus::Deleted
            && self
                .local_tokens
                .iter()
                .any(|t| t.status == AccessStatus::Allowed && t.token == token)
    }

    /// Restamps `last_updated` and recomputes the etag.
    pub(crate) fn restamp(&mut self) {
        self.last_updated = Utc::now();
        self.etag = EntityTag::compute(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party() -> RemoteParty {
        RemoteParty::new(
            PartyRef::new("DE", "GEF", PartyRole::Cpo),
            vec![LocalAccessInfo::new("token-in")],
            vec![RemoteAccessInfo::new(
                "token-out",
                "https://cpo.example/ocpi/versions",
                OcpiVersion::V2_2_1,
            )],
        )
    }

    #[test]
    fn test_new_party_is_stamped() {
        let p = party();
        assert!(!p.etag().as_str().is_empty());
        assert_eq!(p.status, PartyStatus::Pending);
    }

    #[test]
    fn test_mutation_changes_etag() {
        let p = party();
        let before = p.etag().clone();
        let p = p.with_status(PartyStatus::Active);
        assert_ne!(p.etag(), &before);
    }

    #[test]
    fn test_token_matching_rules() {
        let p = party().with_status(PartyStatus::Active);
        assert!(p.accepts_token("token-in"));
        assert!(!p.accepts_token("token-out"));
        assert!(!p.accepts_token("unknown"));

        let deleted = p.clone().with_status(PartyStatus::Deleted);
        assert!(!deleted.accepts_token("token-in"));

        let mut blocked = p;
        blocked.local_tokens[0].status = AccessStatus::Blocked;
        assert!(!blocked.accepts_token("token-in"));
    }

    #[test]
    fn test_party_ref_display() {
        let id = PartyRef::new("NL", "ABC", PartyRole::Emsp);
        assert_eq!(id.to_string(), "NL*ABC (emsp)");
    }
}
