//! Request-scoped lifecycle and bean cache.
//!
//! A scope is begun before the handler runs and ended after it returns,
//! always paired. While active it offers a storage region for dependencies
//! constructed during the request, keyed on the request identity so a
//! container can hand back the same instance for the whole invocation.

use std::cell::RefCell;
use std::collections::HashMap;

use uuid::Uuid;

use crate::inject::Bean;
use crate::request::Request;

struct ScopeState {
    request: Uuid,
    beans: HashMap<String, Bean>,
}

thread_local! {
    static ACTIVE: RefCell<Option<ScopeState>> = RefCell::new(None);
}

/// Static facade over the current thread's request scope.
pub struct ScopeController;

impl ScopeController {
    /// Begin a scope for the given request. An already-active scope is
    /// replaced; the dispatcher pairs begin/end so this only happens if a
    /// caller bypasses it.
    pub fn begin(request: &Request) {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active.is_some() {
                tracing::warn!(request = %request.id(), "scope begun while another was active");
            }
            *active = Some(ScopeState {
                request: request.id(),
                beans: HashMap::new(),
            });
        });
    }

    /// End the current scope, discarding its cached beans.
    pub fn end() {
        ACTIVE.with(|active| *active.borrow_mut() = None);
    }

    pub fn is_active() -> bool {
        ACTIVE.with(|active| active.borrow().is_some())
    }

    /// Identity of the request the active scope belongs to.
    pub fn request_id() -> Option<Uuid> {
        ACTIVE.with(|active| active.borrow().as_ref().map(|state| state.request))
    }

    /// Fetch a bean cached in the active scope.
    pub fn get(name: &str) -> Option<Bean> {
        ACTIVE.with(|active| {
            active
                .borrow()
                .as_ref()
                .and_then(|state| state.beans.get(name).cloned())
        })
    }

    /// Cache a bean in the active scope. A no-op when no scope is active.
    pub fn put(name: impl Into<String>, bean: Bean) {
        ACTIVE.with(|active| {
            if let Some(state) = active.borrow_mut().as_mut() {
                state.beans.insert(name.into(), bean);
            }
        });
    }
}

/// Begins a scope on construction and ends it on drop, on every exit path
/// including unwinding.
pub(crate) struct ScopeGuard;

impl ScopeGuard {
    pub(crate) fn begin(request: &Request) -> Self {
        ScopeController::begin(request);
        Self
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ScopeController::end();
    }
}
