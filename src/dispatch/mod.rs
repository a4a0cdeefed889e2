//! Request dispatch: resolution, binding, scoped invocation, cleanup.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::binder::bind;
use crate::bridge::{ParameterMap, RequestBridge, OP_PARAMETER, RESERVED_PREFIX};
use crate::descriptor::ApplicationDescriptor;
use crate::error::{DispatchError, ResolveError};
use crate::inject::{Bean, BeanProvider, LoaderContext, LoaderGuard};
use crate::request::{CurrentRequestGuard, Request};
use crate::resolver::ControllerResolver;
use crate::scope::ScopeGuard;

/// Orchestrates one dispatch per calling thread against an immutable method
/// table.
///
/// The dispatcher owns no threads; concurrency is driven entirely by the
/// transport layer calling [`Dispatcher::invoke`] from however many threads
/// it chooses. The descriptor table is shared read-only across all of them.
pub struct Dispatcher {
    descriptor: Arc<ApplicationDescriptor>,
    resolver: ControllerResolver,
    container: Arc<dyn BeanProvider>,
    loader: LoaderContext,
    plugins: Vec<Bean>,
}

impl Dispatcher {
    /// Build a dispatcher, resolving the application's plugin beans up front.
    pub fn new(
        descriptor: Arc<ApplicationDescriptor>,
        container: Arc<dyn BeanProvider>,
        loader: LoaderContext,
    ) -> Result<Self, DispatchError> {
        let resolver = ControllerResolver::new(&descriptor);

        let mut plugins = Vec::with_capacity(descriptor.plugins().len());
        for plugin in descriptor.plugins() {
            let bean = container
                .resolve_bean(plugin.name())
                .map_err(|source| DispatchError::bean_resolution(plugin.name(), source))?
                .ok_or_else(|| DispatchError::missing_bean(plugin.name()))?;
            plugins.push(bean);
        }

        Ok(Self {
            descriptor,
            resolver,
            container,
            loader,
            plugins,
        })
    }

    pub fn descriptor(&self) -> &ApplicationDescriptor {
        &self.descriptor
    }

    pub fn plugins(&self) -> &[Bean] {
        &self.plugins
    }

    /// Resolve a bean from the container, wrapping construction failures.
    pub fn resolve_bean(&self, name: &str) -> Result<Option<Bean>, DispatchError> {
        self.container
            .resolve_bean(name)
            .map_err(|source| DispatchError::bean_resolution(name, source))
    }

    /// Dispatch one request.
    ///
    /// Resolves the target method from the bridge's transport kind and
    /// parameter names, binds arguments, publishes the request on the calling
    /// thread, runs the handler inside a request scope under the
    /// application's loader context, and delivers any produced response back
    /// through the bridge. The request slot, the scope and the loader context
    /// are torn down exactly once on every exit path.
    pub fn invoke(&self, bridge: &mut dyn RequestBridge) -> Result<(), DispatchError> {
        let phase = bridge.kind().phase();

        let (explicit_id, domain) = split_parameters(bridge.parameters());
        let available: HashSet<&str> = domain.keys().map(String::as_str).collect();

        let method = match self.resolver.resolve(phase, explicit_id.as_deref(), &available) {
            Ok(method) => method,
            Err(ResolveError::NoMatch) => {
                warn!(%phase, "no controller method matches the request");
                return Err(DispatchError::unresolved(phase, bridge.parameters().clone()));
            }
            Err(ResolveError::Ambiguous { candidates }) => {
                warn!(%phase, ?candidates, "ambiguous controller resolution");
                return Err(DispatchError::ambiguity(
                    phase,
                    candidates,
                    bridge.parameters().clone(),
                ));
            }
        };

        let args = bind(&method, &domain);
        let request = Request::new(phase, Arc::clone(&method), domain, args.clone());
        debug!(
            request = %request.id(),
            %phase,
            method = %method.display_name(),
            "dispatching"
        );

        // Guard declaration order fixes the teardown order: request slot
        // cleared first, then scope ended, then loader context restored.
        let _loader = LoaderGuard::enter(self.loader.clone());
        let _scope = ScopeGuard::begin(&request);
        let _current = CurrentRequestGuard::install(request);

        let bean = self
            .resolve_bean(method.declaring_type())?
            .ok_or_else(|| DispatchError::missing_bean(method.declaring_type()))?;

        match (method.handle())(bean, &args) {
            Ok(Some(response)) => {
                bridge.deliver(response);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(source) => Err(DispatchError::invocation(source)),
        }
    }
}

/// Partition raw parameters into the explicit routing id and the domain map.
///
/// Keys under the reserved prefix are consumed: `trellis.op` supplies the id,
/// any other reserved key is ignored. The rest form the domain map handed to
/// resolution and binding.
fn split_parameters(raw: &ParameterMap) -> (Option<String>, ParameterMap) {
    let mut explicit_id = None;
    let mut domain = ParameterMap::default();

    for (name, values) in raw {
        if name.starts_with(RESERVED_PREFIX) {
            if name == OP_PARAMETER {
                explicit_id = values.first().cloned();
            }
        } else {
            domain.insert(name.clone(), values.clone());
        }
    }

    (explicit_id, domain)
}
