//! Error types for descriptor validation, resolution and dispatch.

use thiserror::Error;

use crate::bridge::ParameterMap;
use crate::descriptor::Phase;

/// Boxed error used at the handler and container boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Build-time descriptor invariant violations.
///
/// Descriptors are emitted by an offline generation stage; these errors
/// surface generator defects at construction time rather than as undefined
/// behavior during dispatch.
#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("Duplicate parameter '{name}' on method '{method}'")]
    DuplicateParameter { method: String, name: String },

    #[error("Duplicate method id '{id}' for phase {phase}")]
    DuplicateMethodId { phase: Phase, id: String },
}

impl DescriptorError {
    pub fn duplicate_parameter(method: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateParameter {
            method: method.into(),
            name: name.into(),
        }
    }

    pub fn duplicate_method_id(phase: Phase, id: impl Into<String>) -> Self {
        Self::DuplicateMethodId {
            phase,
            id: id.into(),
        }
    }
}

/// Resolution failures, before dispatch context is attached.
///
/// `NoMatch` and `Ambiguous` are distinct outcomes and are never collapsed
/// by an arbitrary tie-break.
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("No controller method matches")]
    NoMatch,

    #[error("Ambiguous resolution between [{}]", .candidates.join(", "))]
    Ambiguous { candidates: Vec<String> },
}

/// Dispatch failures reported to the transport layer.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(
        "No method could be resolved for phase={phase} and parameters={{{}}}",
        fmt_parameters(.parameters)
    )]
    UnresolvedRequest {
        phase: Phase,
        parameters: ParameterMap,
    },

    #[error(
        "Ambiguous resolution for phase={phase} between [{}] with parameters={{{}}}",
        .candidates.join(", "),
        fmt_parameters(.parameters)
    )]
    RoutingAmbiguity {
        phase: Phase,
        candidates: Vec<String>,
        parameters: ParameterMap,
    },

    #[error("Unrecognized transport kind '{kind}'")]
    InvalidTransport { kind: String },

    #[error("Controller method invocation failed")]
    InvocationFailure {
        #[source]
        source: BoxError,
    },

    #[error("Construction of bean '{name}' failed")]
    BeanResolutionFailure {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("No bean named '{name}' is registered")]
    MissingBean { name: String },
}

impl DispatchError {
    pub fn unresolved(phase: Phase, parameters: ParameterMap) -> Self {
        Self::UnresolvedRequest { phase, parameters }
    }

    pub fn ambiguity(phase: Phase, candidates: Vec<String>, parameters: ParameterMap) -> Self {
        Self::RoutingAmbiguity {
            phase,
            candidates,
            parameters,
        }
    }

    pub fn invalid_transport(kind: impl Into<String>) -> Self {
        Self::InvalidTransport { kind: kind.into() }
    }

    pub fn invocation(source: BoxError) -> Self {
        Self::InvocationFailure { source }
    }

    pub fn bean_resolution(name: impl Into<String>, source: BoxError) -> Self {
        Self::BeanResolutionFailure {
            name: name.into(),
            source,
        }
    }

    pub fn missing_bean(name: impl Into<String>) -> Self {
        Self::MissingBean { name: name.into() }
    }
}

/// Render a parameter map as `name=["v1", "v2"],other=[]` for diagnostics.
fn fmt_parameters(parameters: &ParameterMap) -> String {
    let mut out = String::new();
    for (index, (name, values)) in parameters.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(name);
        out.push('=');
        out.push_str(&format!("{values:?}"));
    }
    out
}
