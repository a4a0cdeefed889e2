//! Trellis: implicit-routing request dispatch for phase-driven controller
//! applications.
//!
//! There is no URL-pattern table. Each inbound request carries a lifecycle
//! phase (render / action / resource) and a flat multi-valued parameter map;
//! the engine resolves the target handler from the phase plus the set of
//! parameter names present, binds the parameters into typed arguments,
//! publishes a request-scoped context on the calling thread, invokes the
//! handler, and unconditionally tears everything down.
//!
//! # Collaborators
//!
//! The method tables are immutable artifacts of an offline generation stage
//! ([`descriptor`]); transports plug in through [`bridge::RequestBridge`];
//! dependency containers through [`inject::BeanProvider`]. Template rendering
//! and transport adapters live outside this crate.

#![allow(clippy::result_large_err)]

pub mod binder;
pub mod bridge;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod inject;
pub mod request;
pub mod resolver;
pub mod scope;

pub use binder::{bind, BoundValue};
pub use bridge::{
    parse_query, ParameterMap, RequestBridge, Response, TransportKind, OP_PARAMETER,
    RESERVED_PREFIX,
};
pub use descriptor::{
    ApplicationDescriptor, Cardinality, ControllerDescriptor, ControllerMethod,
    ControllerParameter, InvocationThunk, Phase, PluginDescriptor,
};
pub use dispatch::Dispatcher;
pub use error::{BoxError, DescriptorError, DispatchError, ResolveError};
pub use inject::{current_loader, Bean, BeanProvider, LoaderContext, MapContainer};
pub use request::Request;
pub use resolver::ControllerResolver;
pub use scope::ScopeController;
