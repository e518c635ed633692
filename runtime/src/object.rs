//! Reference-counted runtime objects.
//!
//! Every object the runtime hands out implements [`RuntimeObject`] and is held
//! through [`Ref`] handles. A `Ref` behaves like an `Arc` with an intrusive
//! count, plus a termination hook consulted on the transition from one
//! outstanding reference to zero:
//!
//! - [`Termination::Destroy`] drops the object immediately.
//! - [`Termination::Defer`] keeps it allocated and hands ownership back as a
//!   [`Deferred`], for objects that still have asynchronous work in flight.
//!   The holder of the `Deferred` re-triggers destruction with
//!   [`Deferred::destroy`] once that work is done.
//!
//! # Example
//!
//! ```ignore
//! let sampler = context.create_sampler(settings)?;
//! let shared = Ref::retain(&sampler);
//! assert_eq!(Ref::ref_count(&sampler), 2);
//!
//! drop(shared);
//! assert!(Ref::release(sampler).is_destroyed());
//! ```

use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{self, AtomicU32, Ordering};

/// Kind of a runtime object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// A compute context.
    Context,
    /// A compute device.
    Device,
    /// A texture sampler.
    Sampler,
}

/// Result of the termination hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The object can be dropped now.
    Destroy,
    /// The object must stay allocated until it is destroyed again explicitly.
    Defer,
}

/// Behavior shared by all reference-counted runtime objects.
pub trait RuntimeObject: Send + Sync + Sized + 'static {
    /// Get the kind of this object.
    fn object_type(&self) -> ObjectType;

    /// Decide whether the object may be dropped.
    ///
    /// Called when the last reference is released, and again on every
    /// [`Deferred::destroy`].
    fn terminate(&self) -> Termination {
        Termination::Destroy
    }

    /// Take ownership of an object whose destruction was deferred while its
    /// last [`Ref`] was being dropped.
    ///
    /// Explicit [`Ref::release`] calls return the [`Deferred`] to the caller
    /// instead. The default drops it, destroying the object unconditionally.
    fn park(deferred: Deferred<Self>) {
        log::warn!(
            "{:?} deferred its destruction but has no parking hook, destroying now",
            deferred.object_type()
        );
        drop(deferred);
    }
}

/// Highest reference count a retain may start from.
///
/// Leaking handles with `mem::forget` can push the count up without bound;
/// retaining past this ceiling aborts the process instead of letting the
/// count wrap to zero.
const MAX_REF_COUNT: u32 = i32::MAX as u32;

struct RefInner<T> {
    count: AtomicU32,
    value: T,
}

/// Outcome of releasing a reference.
#[must_use = "a deferred object is destroyed when this outcome is dropped"]
pub enum Release<T: RuntimeObject> {
    /// Other references remain; carries the new count.
    Retained(u32),
    /// The object was destroyed.
    Destroyed,
    /// The termination hook declined; ownership is handed to the caller.
    Deferred(Deferred<T>),
}

impl<T: RuntimeObject> Release<T> {
    /// Get the reference count after the release.
    pub fn count(&self) -> u32 {
        match self {
            Self::Retained(count) => *count,
            Self::Destroyed | Self::Deferred(_) => 0,
        }
    }

    /// Check whether the object was destroyed by this release.
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }
}

impl<T: RuntimeObject> std::fmt::Debug for Release<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retained(count) => f.debug_tuple("Retained").field(count).finish(),
            Self::Destroyed => write!(f, "Destroyed"),
            Self::Deferred(deferred) => f.debug_tuple("Deferred").field(deferred).finish(),
        }
    }
}

/// A runtime object with no outstanding references whose destruction was
/// deferred by its termination hook.
///
/// Dropping a `Deferred` destroys the object without asking the hook again.
pub struct Deferred<T: RuntimeObject> {
    inner: Box<RefInner<T>>,
}

impl<T: RuntimeObject> Deferred<T> {
    /// Re-run the termination hook and destroy the object if it agrees.
    ///
    /// Returns [`Release::Destroyed`], or [`Release::Deferred`] with the
    /// object if the hook still declines.
    pub fn destroy(self) -> Release<T> {
        match self.inner.value.terminate() {
            Termination::Destroy => {
                log::trace!("Destroying {:?}", self.inner.value.object_type());
                drop(self);
                Release::Destroyed
            }
            Termination::Defer => {
                log::trace!("Deferring destruction of {:?}", self.inner.value.object_type());
                Release::Deferred(self)
            }
        }
    }
}

impl<T: RuntimeObject> Deref for Deferred<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T: RuntimeObject> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("object_type", &self.inner.value.object_type())
            .finish_non_exhaustive()
    }
}

/// A counted reference to a runtime object.
///
/// Cloning retains, dropping releases. The decrement and the zero check are a
/// single atomic operation, so exactly one release observes the last
/// reference going away.
pub struct Ref<T: RuntimeObject> {
    ptr: NonNull<RefInner<T>>,
    _marker: PhantomData<RefInner<T>>,
}

// SAFETY: `RuntimeObject` requires `Send + Sync`, and the count is atomic.
unsafe impl<T: RuntimeObject> Send for Ref<T> {}
// SAFETY: see above; shared access only hands out `&T`.
unsafe impl<T: RuntimeObject> Sync for Ref<T> {}

impl<T: RuntimeObject> Ref<T> {
    /// Wrap a new object with a reference count of one.
    pub fn new(value: T) -> Self {
        let inner = Box::new(RefInner {
            count: AtomicU32::new(1),
            value,
        });
        Self {
            ptr: NonNull::from(Box::leak(inner)),
            _marker: PhantomData,
        }
    }

    fn inner(&self) -> &RefInner<T> {
        // SAFETY: the allocation lives while any `Ref` to it exists.
        unsafe { self.ptr.as_ref() }
    }

    #[cfg(test)]
    fn with_count(value: T, count: u32) -> Self {
        let this = Self::new(value);
        this.inner().count.store(count, Ordering::Relaxed);
        this
    }

    /// Add a reference and return the new handle.
    pub fn retain(this: &Self) -> Self {
        Self::retain_counted(this).0
    }

    /// Add a reference and return the new handle with the count it produced.
    ///
    /// Aborts the process if the count is past its ceiling.
    pub fn retain_counted(this: &Self) -> (Self, u32) {
        let previous = this.inner().count.fetch_add(1, Ordering::Relaxed);
        if previous > MAX_REF_COUNT {
            log::error!(
                "{:?} reference count overflow, aborting",
                this.inner().value.object_type()
            );
            std::process::abort();
        }
        let handle = Self {
            ptr: this.ptr,
            _marker: PhantomData,
        };
        (handle, previous + 1)
    }

    /// Release this reference.
    ///
    /// Destroys the object if this was the last reference and the
    /// termination hook agrees.
    pub fn release(this: Self) -> Release<T> {
        let this = ManuallyDrop::new(this);
        // SAFETY: `this` is consumed and never dropped.
        unsafe { Self::release_raw(this.ptr) }
    }

    /// Get the current number of references.
    pub fn ref_count(this: &Self) -> u32 {
        this.inner().count.load(Ordering::Acquire)
    }

    /// Check whether two handles refer to the same object.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        a.ptr == b.ptr
    }

    /// Drop one reference held by a handle at `ptr`.
    ///
    /// # Safety
    ///
    /// Must be called at most once per handle, and the handle must not be
    /// used afterwards.
    unsafe fn release_raw(ptr: NonNull<RefInner<T>>) -> Release<T> {
        // SAFETY: the caller still owns one reference, so the allocation is live.
        let previous = unsafe { ptr.as_ref() }.count.fetch_sub(1, Ordering::Release);
        debug_assert!(previous != 0, "runtime object released more times than retained");

        if previous != 1 {
            return Release::Retained(previous - 1);
        }

        // Pairs with the release decrements of every other handle so their
        // writes happen before destruction.
        atomic::fence(Ordering::Acquire);

        // SAFETY: the count reached zero, no other handle exists, and the
        // allocation came from `Box::leak` in `new`.
        let inner = unsafe { Box::from_raw(ptr.as_ptr()) };
        Deferred { inner }.destroy()
    }
}

impl<T: RuntimeObject> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self::retain(self)
    }
}

impl<T: RuntimeObject> Drop for Ref<T> {
    fn drop(&mut self) {
        // SAFETY: drop runs once and the handle is gone afterwards.
        if let Release::Deferred(deferred) = unsafe { Self::release_raw(self.ptr) } {
            T::park(deferred);
        }
    }
}

impl<T: RuntimeObject> Deref for Ref<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner().value
    }
}

impl<T: RuntimeObject + std::fmt::Debug> std::fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ref")
            .field("ref_count", &Self::ref_count(self))
            .field("value", &self.inner().value)
            .finish()
    }
}
