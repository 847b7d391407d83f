//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

const MAX_DEPTH: usize = 1024;

// Thread-local resolution state for circular dependency detection
thread_local! {
    static RESOLUTION_TLS: RefCell<ResolutionTls> = RefCell::new(ResolutionTls::default());
}

#[derive(Default)]
struct ResolutionTls {
    stack: Vec<&'static str>,
}

/// Guard for managing thread-local resolution stack
///
/// Entering pushes the service name; dropping pops it again, also when the
/// resolution below it failed.
pub(crate) struct StackGuard {
    name: &'static str,
}

impl StackGuard {
    pub(crate) fn enter(name: &'static str) -> DiResult<Self> {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();

            // Circular detection BEFORE pushing the new name
            if tls.stack.iter().any(|&n| n == name) {
                let mut path = tls.stack.clone();
                path.push(name);
                return Err(DiError::Circular(path));
            }

            if tls.stack.len() >= MAX_DEPTH {
                return Err(DiError::DepthExceeded(tls.stack.len()));
            }

            tls.stack.push(name);
            Ok(())
        })?;

        Ok(Self { name })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();
            if let Some(last) = tls.stack.pop() {
                debug_assert_eq!(last, self.name);
            }
        });
    }
}

/// Execute a closure with circular dependency detection
pub(crate) fn with_circular_guard<T, F>(name: &'static str, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    let _guard = StackGuard::enter(name)?;
    f()
}
