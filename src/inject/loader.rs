//! Ambient loader context swapped around handler invocation.
//!
//! Each application carries a loader context identifying the code and
//! resources its handlers should observe. The dispatcher installs the
//! application's context for the duration of the invocation and restores
//! whatever was ambient before, even when the handler fails.

use std::cell::RefCell;
use std::sync::Arc;

/// Opaque identity of an application's execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderContext {
    name: Arc<str>,
}

impl LoaderContext {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

thread_local! {
    static AMBIENT: RefCell<Option<LoaderContext>> = const { RefCell::new(None) };
}

/// The loader context ambient on the current thread, if any.
pub fn current_loader() -> Option<LoaderContext> {
    AMBIENT.with(|ambient| ambient.borrow().clone())
}

fn swap(context: Option<LoaderContext>) -> Option<LoaderContext> {
    AMBIENT.with(|ambient| std::mem::replace(&mut *ambient.borrow_mut(), context))
}

/// Installs a loader context and restores the prior one on drop, on every
/// exit path including unwinding.
pub(crate) struct LoaderGuard {
    prior: Option<LoaderContext>,
}

impl LoaderGuard {
    pub(crate) fn enter(context: LoaderContext) -> Self {
        Self {
            prior: swap(Some(context)),
        }
    }
}

impl Drop for LoaderGuard {
    fn drop(&mut self) {
        swap(self.prior.take());
    }
}
