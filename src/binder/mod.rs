//! Binding of raw multi-valued parameters into typed call arguments.

use serde::{Deserialize, Serialize};

use crate::bridge::ParameterMap;
use crate::descriptor::{Cardinality, ControllerMethod};

/// A call argument produced by binding, shaped by the declared cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundValue {
    /// The parameter was absent (or empty, for `Single`).
    Null,
    /// First supplied value.
    Single(String),
    /// Defensive copy of every supplied value.
    Array(Box<[String]>),
    /// Insertion-ordered sequence of every supplied value.
    List(Vec<String>),
}

impl BoundValue {
    pub fn is_null(&self) -> bool {
        matches!(self, BoundValue::Null)
    }

    /// The single bound value, if this argument bound as `Single`.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            BoundValue::Single(value) => Some(value),
            _ => None,
        }
    }
}

/// Bind request parameters into a positional argument array.
///
/// The result always has the same length and order as the method's declared
/// parameter list. Missing or empty input is never an error; the gap binds
/// as [`BoundValue::Null`].
pub fn bind(method: &ControllerMethod, parameters: &ParameterMap) -> Vec<BoundValue> {
    method
        .parameters()
        .iter()
        .map(|parameter| match parameters.get(parameter.name()) {
            None => BoundValue::Null,
            Some(values) => match parameter.cardinality() {
                Cardinality::Single => match values.first() {
                    Some(first) => BoundValue::Single(first.clone()),
                    None => BoundValue::Null,
                },
                Cardinality::Array => BoundValue::Array(values.clone().into_boxed_slice()),
                Cardinality::List => BoundValue::List(values.clone()),
            },
        })
        .collect()
}
