//! Transport bridge contract between adapters and the dispatcher.
//!
//! A bridge is the transport-specific adapter (servlet, portlet, test
//! harness) that carries the raw request into the engine and receives the
//! eventual response. The engine never sees URLs or HTTP verbs; the bridge
//! supplies a transport kind (which implies the phase) and a flat
//! multi-valued parameter map.

mod query;

pub use query::parse_query;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::descriptor::Phase;
use crate::error::DispatchError;

/// Multi-valued request parameters, insertion-ordered.
pub type ParameterMap = indexmap::IndexMap<String, Vec<String>, ahash::RandomState>;

/// Prefix of the reserved parameter namespace. Reserved keys are consumed by
/// the engine and never reach resolution or binding.
pub const RESERVED_PREFIX: &str = "trellis.";

/// Reserved key carrying the explicit routing id.
pub const OP_PARAMETER: &str = "trellis.op";

/// The three transport kinds a bridge can present.
///
/// Kinds enter the engine as data from the transport layer; parsing an
/// unrecognized kind fails with [`DispatchError::InvalidTransport`], which
/// signals the transport layer and the phase enumeration are out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Render,
    Action,
    Resource,
}

impl TransportKind {
    /// The lifecycle phase implied by this transport kind.
    pub fn phase(self) -> Phase {
        match self {
            TransportKind::Render => Phase::Render,
            TransportKind::Action => Phase::Action,
            TransportKind::Resource => Phase::Resource,
        }
    }
}

impl FromStr for TransportKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("render") {
            Ok(TransportKind::Render)
        } else if s.eq_ignore_ascii_case("action") {
            Ok(TransportKind::Action)
        } else if s.eq_ignore_ascii_case("resource") {
            Ok(TransportKind::Resource)
        } else {
            Err(DispatchError::invalid_transport(s))
        }
    }
}

/// Outcome a handler hands back through the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// Markup produced by a render handler.
    Content { mime_type: String, body: String },
    /// Redirect produced by an action handler.
    Redirect { location: String },
    /// Raw payload produced by a resource handler.
    Payload { mime_type: String, bytes: Vec<u8> },
}

impl Response {
    pub fn content(mime_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Content {
            mime_type: mime_type.into(),
            body: body.into(),
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
        }
    }

    pub fn payload(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Payload {
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Transport adapter contract consumed by the dispatcher.
pub trait RequestBridge {
    /// Concrete transport kind, mapped to a phase by the dispatcher.
    fn kind(&self) -> TransportKind;

    /// Raw request parameters, reserved keys included.
    fn parameters(&self) -> &ParameterMap;

    /// Deliver the handler's response to the transport.
    fn deliver(&mut self, response: Response);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_maps_to_phase() {
        assert_eq!(TransportKind::Render.phase(), Phase::Render);
        assert_eq!(TransportKind::Action.phase(), Phase::Action);
        assert_eq!(TransportKind::Resource.phase(), Phase::Resource);
    }

    #[test]
    fn test_transport_kind_parses_case_insensitively() {
        assert_eq!("render".parse::<TransportKind>().unwrap(), TransportKind::Render);
        assert_eq!("ACTION".parse::<TransportKind>().unwrap(), TransportKind::Action);
    }

    #[test]
    fn test_unknown_transport_kind_is_invalid_transport() {
        let err = "event".parse::<TransportKind>().unwrap_err();
        match err {
            DispatchError::InvalidTransport { kind } => assert_eq!(kind, "event"),
            other => panic!("expected InvalidTransport, got {other:?}"),
        }
    }
}
