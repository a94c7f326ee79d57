//! Exclusive, time-sliced access to a profile's automation client.

use crate::error::ResourceError;
use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

/// A value that at most one caller may use at a time.
///
/// Acquisition waits up to the configured timeout; the lease releases the
/// value when dropped, including during unwinding.
pub struct ExclusiveResource<T> {
    name: String,
    value: Mutex<T>,
    holder: Mutex<Option<String>>,
    timeout: Duration,
}

impl<T> ExclusiveResource<T> {
    pub fn new(name: impl Into<String>, value: T, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            value: Mutex::new(value),
            holder: Mutex::new(None),
            timeout,
        }
    }

    pub fn acquire(&self, holder: &str) -> Result<ResourceLease<'_, T>, ResourceError> {
        let start = Instant::now();
        let Some(guard) = self.value.try_lock_for(self.timeout) else {
            return Err(ResourceError::Timeout {
                name: self.name.clone(),
                holder: self.holder().unwrap_or_else(|| "unknown".to_string()),
                waited: start.elapsed(),
            });
        };
        *self.holder.lock() = Some(holder.to_string());

        Ok(ResourceLease {
            guard,
            holder: &self.holder,
            wait_time: start.elapsed(),
        })
    }

    /// Current lease holder, if any.
    pub fn holder(&self) -> Option<String> {
        self.holder.lock().clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct ResourceLease<'a, T> {
    guard: MutexGuard<'a, T>,
    holder: &'a Mutex<Option<String>>,
    wait_time: Duration,
}

impl<T> ResourceLease<'_, T> {
    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }
}

impl<T> Deref for ResourceLease<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for ResourceLease<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for ResourceLease<'_, T> {
    fn drop(&mut self) {
        // Cleared before the guard drops, so a new holder never sees a stale name.
        *self.holder.lock() = None;
    }
}
