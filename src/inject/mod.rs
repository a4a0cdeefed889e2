//! Bean resolution collaborator and the ambient loader context.

mod loader;

pub use loader::{current_loader, LoaderContext};
pub(crate) use loader::LoaderGuard;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::BoxError;
use crate::scope::ScopeController;

/// Opaque bean instance handed out by a container.
pub type Bean = Arc<dyn Any + Send + Sync>;

/// Dependency container contract consumed by the dispatcher.
///
/// `Ok(None)` means no bean of that name is registered; `Err` means the bean
/// exists but its construction failed, and the cause is preserved.
pub trait BeanProvider: Send + Sync {
    fn resolve_bean(&self, name: &str) -> Result<Option<Bean>, BoxError>;
}

type BeanFactory = Box<dyn Fn() -> Result<Bean, BoxError> + Send + Sync>;

/// Factory-backed container with request-scoped caching.
///
/// When a request scope is active, a constructed bean is cached under its
/// name for the remainder of the request, so every resolution within one
/// dispatch observes the same instance.
#[derive(Default)]
pub struct MapContainer {
    factories: HashMap<String, BeanFactory>,
}

impl MapContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory invoked on each (uncached) resolution.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Bean, BoxError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Register a shared instance resolved as-is.
    pub fn register_instance(&mut self, name: impl Into<String>, bean: Bean) {
        self.register(name, move || Ok(Arc::clone(&bean)));
    }
}

impl BeanProvider for MapContainer {
    fn resolve_bean(&self, name: &str) -> Result<Option<Bean>, BoxError> {
        let Some(factory) = self.factories.get(name) else {
            return Ok(None);
        };
        if let Some(cached) = ScopeController::get(name) {
            return Ok(Some(cached));
        }
        let bean = factory()?;
        if ScopeController::is_active() {
            ScopeController::put(name, Arc::clone(&bean));
        }
        Ok(Some(bean))
    }
}
