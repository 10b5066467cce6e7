//! Owning and non-owning references to endpoints.
//!
//! The registration manager keeps the only long-lived [Handle] to each
//! endpoint; the platform's dispatch table stores a [HandleRef]. Once the
//! manager tears an endpoint down, new opens through the platform fail
//! instead of reaching a half-destroyed device, while sessions that are
//! already open keep their own temporary [Handle] until they close.
use alloc::sync::{Arc, Weak};
use core::ops::Deref;

#[derive(Debug)]
/// Strong handle backed by [Arc<T>].
pub struct Handle<T> {
    inner: Arc<T>,
}

impl<T> Handle<T> {
    pub fn new(value: T) -> Handle<T> {
        Handle {
            inner: Arc::new(value),
        }
    }

    /// Derive a [HandleRef] that does not keep the target alive.
    pub fn create_ref(&self) -> HandleRef<T> {
        HandleRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[derive(Debug)]
/// Weak handle backed by [Weak<T>].
pub struct HandleRef<T> {
    inner: Weak<T>,
}

impl<T> Clone for HandleRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> HandleRef<T> {
    /// Upgrade to a strong [Handle], or `None` once the owner dropped the target.
    pub fn get_handle(&self) -> Option<Handle<T>> {
        Weak::upgrade(&self.inner).map(|inner| Handle { inner })
    }
}
