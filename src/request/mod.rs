//! Per-invocation request record and the thread-exclusive current slot.

use std::cell::RefCell;
use std::sync::Arc;

use uuid::Uuid;

use crate::binder::BoundValue;
use crate::bridge::ParameterMap;
use crate::descriptor::{ControllerMethod, Phase};

/// The state of one dispatch: resolved method, raw domain parameters and the
/// bound argument array.
///
/// A request is created fresh per invocation, owned exclusively by the
/// dispatching thread, and discarded when the invocation completes. It is
/// never persisted and never crosses threads.
#[derive(Debug)]
pub struct Request {
    id: Uuid,
    phase: Phase,
    method: Arc<ControllerMethod>,
    parameters: ParameterMap,
    args: Vec<BoundValue>,
}

impl Request {
    pub(crate) fn new(
        phase: Phase,
        method: Arc<ControllerMethod>,
        parameters: ParameterMap,
        args: Vec<BoundValue>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase,
            method,
            parameters,
            args,
        }
    }

    /// Identity of this dispatch; scoped caches key on it.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn method(&self) -> &Arc<ControllerMethod> {
        &self.method
    }

    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    pub fn args(&self) -> &[BoundValue] {
        &self.args
    }

    /// Run `f` with the current thread's active request, if any.
    ///
    /// Access is closure-scoped by construction: no handle to the request can
    /// escape the invoking call stack, and another thread's request is never
    /// visible.
    pub fn with_current<R>(f: impl FnOnce(Option<&Request>) -> R) -> R {
        CURRENT.with(|slot| f(slot.borrow().as_ref()))
    }
}

thread_local! {
    /// The live request of the current dispatching thread, present only
    /// during the invocation window.
    static CURRENT: RefCell<Option<Request>> = const { RefCell::new(None) };
}

/// Publishes a request in the current thread's slot; clears it on drop, on
/// every exit path including unwinding.
pub(crate) struct CurrentRequestGuard;

impl CurrentRequestGuard {
    pub(crate) fn install(request: Request) -> Self {
        CURRENT.with(|slot| *slot.borrow_mut() = Some(request));
        Self
    }
}

impl Drop for CurrentRequestGuard {
    fn drop(&mut self) {
        CURRENT.with(|slot| *slot.borrow_mut() = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::test_support::method;

    fn request() -> Request {
        Request::new(
            Phase::Render,
            Arc::new(method(None, Phase::Render, &["a"])),
            ParameterMap::default(),
            vec![BoundValue::Null],
        )
    }

    #[test]
    fn test_slot_empty_outside_invocation_window() {
        assert!(Request::with_current(|current| current.is_none()));
    }

    #[test]
    fn test_guard_publishes_and_clears() {
        let req = request();
        let id = req.id();
        {
            let _guard = CurrentRequestGuard::install(req);
            let seen = Request::with_current(|current| current.map(Request::id));
            assert_eq!(seen, Some(id));
        }
        assert!(Request::with_current(|current| current.is_none()));
    }

    #[test]
    fn test_requests_have_distinct_identities() {
        assert_ne!(request().id(), request().id());
    }
}
