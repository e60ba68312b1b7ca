//! # Event naming and notification payloads.
//!
//! Every observable lifecycle point of a protocol operation ("PutTokenRequest",
//! "UnlockConnectorResponse") carries a process-unique [`LogEventName`].
//! Names are grouped under overlapping [`GroupTag`]s so operators can enable
//! or disable whole families of events at once.
//!
//! [`ApiHandle`] identifies the protocol API instance a notification
//! originates from; [`LogRecord`] is the opaque payload handed to log sinks.
//! The runtime never parses the payload body, it passes it through.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Protocol versions a roaming API instance can speak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OcpiVersion {
    /// OCPI 2.1.1
    #[serde(rename = "2.1.1")]
    V2_1_1,
    /// OCPI 2.2.1
    #[serde(rename = "2.2.1")]
    V2_2_1,
    /// OCPI 2.3
    #[serde(rename = "2.3")]
    V2_3,
    /// OCPI 3.0
    #[serde(rename = "3.0")]
    V3_0,
}

impl OcpiVersion {
    /// Wire representation of the version number.
    pub fn as_str(&self) -> &'static str {
        match self {
            OcpiVersion::V2_1_1 => "2.1.1",
            OcpiVersion::V2_2_1 => "2.2.1",
            OcpiVersion::V2_3 => "2.3",
            OcpiVersion::V3_0 => "3.0",
        }
    }
}

impl fmt::Display for OcpiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the protocol API instance that emitted a notification.
///
/// Cheap to clone; sinks use it to tag output lines ("cpo-2.2.1"), the
/// runtime treats it as opaque.
#[derive(Clone, Debug)]
pub struct ApiHandle {
    id: Arc<str>,
    version: OcpiVersion,
}

impl ApiHandle {
    /// Creates a handle for an API instance.
    pub fn new(id: impl Into<Arc<str>>, version: OcpiVersion) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }

    /// Instance identifier (e.g. "cpo", "emsp-fr").
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Protocol version this instance speaks.
    pub fn version(&self) -> OcpiVersion {
        self.version
    }
}

impl fmt::Display for ApiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.id, self.version)
    }
}

/// Process-unique key for one observable lifecycle point of one protocol
/// operation. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogEventName(Arc<str>);

impl LogEventName {
    /// Creates an event name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LogEventName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for LogEventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label grouping multiple event names for bulk enable/disable.
///
/// Many-to-many: a tag may span request and response events of several
/// operations, and an event may carry several tags.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupTag(Arc<str>);

impl GroupTag {
    /// Creates a group tag.
    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Self(tag.into())
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl Borrow<str> for GroupTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque request/response payload delivered to log sinks.
///
/// Carries the event name (sinks need it for routing and file naming) and
/// the raw JSON body of the logged request or response.
#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Name of the event this record belongs to.
    pub event: LogEventName,
    /// Raw payload body; never parsed by the runtime.
    pub body: Arc<str>,
}

impl LogRecord {
    /// Creates a record for the given event.
    pub fn new(event: impl Into<LogEventName>, body: impl Into<Arc<str>>) -> Self {
        Self {
            event: event.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_event_name_borrows_as_str_key() {
        let mut map: HashMap<LogEventName, u32> = HashMap::new();
        map.insert(LogEventName::new("PutTokenRequest"), 1);
        assert_eq!(map.get("PutTokenRequest"), Some(&1));
        assert_eq!(map.get("GetTokenRequest"), None);
    }

    #[test]
    fn test_api_handle_display() {
        let api = ApiHandle::new("cpo", OcpiVersion::V2_2_1);
        assert_eq!(api.to_string(), "cpo-2.2.1");
        assert_eq!(api.version().as_str(), "2.2.1");
    }
}
