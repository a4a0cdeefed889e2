//! Immutable build-time descriptors for controllers and their methods.
//!
//! Descriptors are produced by an offline generation stage from annotated
//! controller declarations. This crate only consumes them: once constructed
//! they are never mutated and are shared read-only across every dispatching
//! thread. Constructors validate the invariants the generator must uphold
//! (unique parameter names per method, unique ids per phase) so a corrupt
//! table is rejected at build time instead of misrouting at runtime.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::binder::BoundValue;
use crate::bridge::Response;
use crate::error::{BoxError, DescriptorError};
use crate::inject::Bean;

/// Request lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Produce markup.
    Render,
    /// Mutate state, then redirect.
    Action,
    /// Produce a raw payload.
    Resource,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Render => "render",
            Phase::Action => "action",
            Phase::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Declared shape of a controller parameter, governing how the raw
/// multi-valued input is coerced into a call argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Array,
    List,
}

/// A declared parameter of a controller method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerParameter {
    name: String,
    cardinality: Cardinality,
}

impl ControllerParameter {
    pub fn new(name: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            cardinality,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }
}

/// Build-time-generated invocation thunk of fixed signature.
///
/// The generation stage emits one thunk per method; it receives the resolved
/// controller bean and the bound argument array. No reflection happens at
/// runtime.
pub type InvocationThunk =
    Arc<dyn Fn(Bean, &[BoundValue]) -> Result<Option<Response>, BoxError> + Send + Sync>;

/// Immutable descriptor of one handler method.
///
/// Identity is referential: the same method is always the same `Arc`.
pub struct ControllerMethod {
    id: Option<String>,
    phase: Phase,
    declaring_type: String,
    handle: InvocationThunk,
    parameters: Vec<ControllerParameter>,
}

impl ControllerMethod {
    /// Build a method descriptor, rejecting duplicate parameter names.
    pub fn new(
        id: Option<&str>,
        phase: Phase,
        declaring_type: impl Into<String>,
        parameters: Vec<ControllerParameter>,
        handle: InvocationThunk,
    ) -> Result<Self, DescriptorError> {
        let declaring_type = declaring_type.into();

        let mut seen = HashSet::new();
        for parameter in &parameters {
            if !seen.insert(parameter.name()) {
                return Err(DescriptorError::duplicate_parameter(
                    &declaring_type,
                    parameter.name(),
                ));
            }
        }

        Ok(Self {
            id: id.map(str::to_string),
            phase,
            declaring_type,
            handle,
            parameters,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn handle(&self) -> &InvocationThunk {
        &self.handle
    }

    pub fn parameters(&self) -> &[ControllerParameter] {
        &self.parameters
    }

    /// Names of the declared parameters, in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(ControllerParameter::name)
    }

    /// Human-readable name used in ambiguity diagnostics.
    pub fn display_name(&self) -> String {
        match &self.id {
            Some(id) => format!("{}#{}", self.declaring_type, id),
            None => {
                let names: Vec<&str> = self.parameter_names().collect();
                format!("{}({})", self.declaring_type, names.join(", "))
            }
        }
    }
}

impl fmt::Debug for ControllerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerMethod")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("declaring_type", &self.declaring_type)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of the methods declared by one controller type.
#[derive(Debug)]
pub struct ControllerDescriptor {
    type_name: String,
    methods: Vec<Arc<ControllerMethod>>,
}

impl ControllerDescriptor {
    /// Build a controller descriptor, rejecting duplicate ids within a phase.
    pub fn new(
        type_name: impl Into<String>,
        methods: Vec<ControllerMethod>,
    ) -> Result<Self, DescriptorError> {
        let mut seen: HashSet<(Phase, &str)> = HashSet::new();
        for method in &methods {
            if let Some(id) = method.id() {
                if !seen.insert((method.phase(), id)) {
                    return Err(DescriptorError::duplicate_method_id(method.phase(), id));
                }
            }
        }

        Ok(Self {
            type_name: type_name.into(),
            methods: methods.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn methods(&self) -> &[Arc<ControllerMethod>] {
        &self.methods
    }
}

/// A plugin participating in the application, resolved from the container at
/// dispatcher construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    name: String,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Application-level aggregate produced by the offline generation stage:
/// templates location, every controller descriptor, and the plugin list.
#[derive(Debug)]
pub struct ApplicationDescriptor {
    templates_path: String,
    controllers: Vec<ControllerDescriptor>,
    plugins: Vec<PluginDescriptor>,
}

impl ApplicationDescriptor {
    pub fn new(
        templates_path: impl Into<String>,
        controllers: Vec<ControllerDescriptor>,
        plugins: Vec<PluginDescriptor>,
    ) -> Self {
        Self {
            templates_path: templates_path.into(),
            controllers,
            plugins,
        }
    }

    pub fn templates_path(&self) -> &str {
        &self.templates_path
    }

    pub fn controllers(&self) -> &[ControllerDescriptor] {
        &self.controllers
    }

    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    /// All methods across all controllers, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &Arc<ControllerMethod>> {
        self.controllers.iter().flat_map(|c| c.methods().iter())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A thunk that ignores its inputs and produces no response.
    pub(crate) fn noop_thunk() -> InvocationThunk {
        Arc::new(|_, _| Ok(None))
    }

    pub(crate) fn method(
        id: Option<&str>,
        phase: Phase,
        names: &[&str],
    ) -> ControllerMethod {
        let parameters = names
            .iter()
            .map(|name| ControllerParameter::new(*name, Cardinality::Single))
            .collect();
        ControllerMethod::new(id, phase, "Controller", parameters, noop_thunk())
            .expect("valid method")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_parameter_rejected() {
        let parameters = vec![
            ControllerParameter::new("name", Cardinality::Single),
            ControllerParameter::new("name", Cardinality::Array),
        ];
        let err = ControllerMethod::new(
            None,
            Phase::Render,
            "Weather",
            parameters,
            test_support::noop_thunk(),
        )
        .unwrap_err();
        assert_eq!(err, DescriptorError::duplicate_parameter("Weather", "name"));
    }

    #[test]
    fn test_duplicate_id_within_phase_rejected() {
        let first = test_support::method(Some("show"), Phase::Render, &["a"]);
        let second = test_support::method(Some("show"), Phase::Render, &["b"]);
        let err = ControllerDescriptor::new("Weather", vec![first, second]).unwrap_err();
        assert_eq!(
            err,
            DescriptorError::duplicate_method_id(Phase::Render, "show")
        );
    }

    #[test]
    fn test_same_id_across_phases_allowed() {
        let render = test_support::method(Some("show"), Phase::Render, &[]);
        let action = test_support::method(Some("show"), Phase::Action, &[]);
        let descriptor = ControllerDescriptor::new("Weather", vec![render, action]).unwrap();
        assert_eq!(descriptor.methods().len(), 2);
    }

    #[test]
    fn test_display_name() {
        let with_id = test_support::method(Some("index"), Phase::Render, &[]);
        assert_eq!(with_id.display_name(), "Controller#index");

        let by_params = test_support::method(None, Phase::Render, &["city", "zip"]);
        assert_eq!(by_params.display_name(), "Controller(city, zip)");
    }

    #[test]
    fn test_application_descriptor_aggregates_methods() {
        let a = ControllerDescriptor::new(
            "A",
            vec![test_support::method(None, Phase::Render, &["x"])],
        )
        .unwrap();
        let b = ControllerDescriptor::new(
            "B",
            vec![
                test_support::method(None, Phase::Action, &["y"]),
                test_support::method(None, Phase::Resource, &["z"]),
            ],
        )
        .unwrap();
        let app = ApplicationDescriptor::new("templates", vec![a, b], vec![]);
        assert_eq!(app.methods().count(), 3);
        assert_eq!(app.templates_path(), "templates");
    }
}
