//! Scoped resource release
//!
//! A [`Scoped`] guard owns a resource for the duration of a run and calls its
//! [`Release::release`] action when the guard goes out of scope: on normal
//! completion, on early return, and while unwinding. Release failures are
//! logged and never escalated.

use crate::stage::StageResult;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// A resource with an explicit, idempotent release action
pub trait Release {
    /// Human-readable name used in log lines
    fn resource_name(&self) -> &'static str;

    /// Release the underlying resource. Calling twice must be harmless.
    fn release(&mut self) -> StageResult<()>;
}

/// Guard that releases its resource exactly once when dropped
pub struct Scoped<T: Release> {
    inner: T,
    released: bool,
}

impl<T: Release> Scoped<T> {
    /// Take ownership of an acquired resource
    pub fn new(inner: T) -> Self {
        debug!(resource = inner.resource_name(), "Resource acquired");
        Self {
            inner,
            released: false,
        }
    }

    /// Release now instead of waiting for drop
    ///
    /// Returns the release outcome; subsequent calls (and the eventual drop)
    /// are no-ops.
    pub fn release_now(&mut self) -> StageResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let name = self.inner.resource_name();
        match self.inner.release() {
            Ok(()) => {
                debug!(resource = name, "Resource released");
                Ok(())
            }
            Err(e) => {
                warn!(resource = name, error = %e, "Error releasing resource");
                Err(e)
            }
        }
    }
}

impl<T: Release> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Release> DerefMut for Scoped<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Release> Drop for Scoped<T> {
    fn drop(&mut self) {
        // Outcome already logged by release_now
        let _ = self.release_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageError;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Probe {
        log: Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
        fail: bool,
    }

    impl Release for Probe {
        fn resource_name(&self) -> &'static str {
            self.name
        }

        fn release(&mut self) -> StageResult<()> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                Err(StageError::Release("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn probe(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str, fail: bool) -> Probe {
        Probe {
            log: Rc::clone(log),
            name,
            fail,
        }
    }

    #[test]
    fn test_release_on_drop_in_reverse_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let _input = Scoped::new(probe(&log, "input", false));
            let _client = Scoped::new(probe(&log, "client", false));
        }
        assert_eq!(*log.borrow(), vec!["client", "input"]);
    }

    #[test]
    fn test_release_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut guard = Scoped::new(probe(&log, "input", false));
            assert!(guard.release_now().is_ok());
            assert!(guard.release_now().is_ok());
        }
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_release_failure_is_reported_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut guard = Scoped::new(probe(&log, "client", true));
            assert!(matches!(guard.release_now(), Err(StageError::Release(_))));
        }
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_release_on_early_return() {
        fn early(log: &Rc<RefCell<Vec<&'static str>>>) -> Option<()> {
            let _guard = Scoped::new(probe(log, "input", false));
            let missing: Option<()> = None;
            missing?;
            Some(())
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        assert!(early(&log).is_none());
        assert_eq!(*log.borrow(), vec!["input"]);
    }
}
