//! A bounded single-producer single-consumer queue.
//!
//! This is the same ticketed ring as [`MpmcQueue`](crate::MpmcQueue),
//! specialized for exactly one producer and one consumer: each cursor has a
//! single writer, so no operation performs a compare-and-swap or fetch-add.
//! The handles enforce the single-writer contract in the type system — a
//! [`Producer`] and a [`Consumer`] can move to different threads, but
//! neither can be shared between threads.
//!
//! # Examples
//!
//! ```
//! use ticket_ring::spsc;
//!
//! let (p, c) = spsc::new(2);
//!
//! assert!(p.push(1).is_ok());
//! assert!(p.push(2).is_ok());
//! assert!(p.push(3).is_err());
//!
//! assert_eq!(c.pop(), Ok(1));
//! assert_eq!(c.pop(), Ok(2));
//! assert!(c.pop().is_err());
//! ```

use core::cell::{Cell, UnsafeCell};
use core::cmp;
use core::fmt;
use core::mem::{self, MaybeUninit};
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_utils::{Backoff, CachePadded};

use crate::err::{PopError, PushError};

/// A slot in a queue.
///
/// Same lifecycle as the MPMC slot: stamp `i` means empty for generation
/// `i`, stamp `i + 1` means published, releasing advances by one lap.
struct Slot<T> {
    stamp: AtomicU64,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new(stamp: u64) -> Self {
        Self {
            stamp: AtomicU64::new(stamp),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// The inner representation of a single-producer single-consumer queue.
struct Inner<T> {
    /// The head of the queue. Written only by the consumer.
    head: CachePadded<AtomicU64>,

    /// The tail of the queue. Written only by the producer.
    tail: CachePadded<AtomicU64>,

    /// The buffer holding slots. Always a power-of-two length.
    buffer: Box<[Slot<T>]>,

    /// `buffer.len() - 1`.
    mask: u64,
}

impl<T> Inner<T> {
    #[inline]
    fn slot(&self, index: u64) -> &Slot<T> {
        let i = (index & self.mask) as usize;
        debug_assert!(i < self.buffer.len());
        unsafe { self.buffer.get_unchecked(i) }
    }

    #[inline]
    fn one_lap(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        cmp::min(tail.wrapping_sub(head) as usize, self.buffer.len())
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            let head = *self.head.get_mut();
            let tail = *self.tail.get_mut();

            let mut pos = head;
            while pos != tail {
                let index = (pos & self.mask) as usize;
                unsafe {
                    debug_assert!(index < self.buffer.len());
                    let slot = self.buffer.get_unchecked_mut(index);
                    (*slot.value.get()).assume_init_drop();
                }
                pos += 1;
            }
        }
    }
}

/// Creates a bounded single-producer single-consumer queue with at least the
/// given capacity.
///
/// Returns the producer and the consumer side for the queue. The capacity is
/// rounded up to the next power of two; a requested capacity of zero yields
/// a queue of capacity 1.
///
/// # Examples
///
/// ```
/// use ticket_ring::spsc;
///
/// let (p, c) = spsc::new::<i32>(100);
/// assert_eq!(p.capacity(), 128);
/// ```
pub fn new<T>(cap: usize) -> (Producer<T>, Consumer<T>) {
    let cap = cmp::max(cap, 1).next_power_of_two();

    let buffer: Box<[Slot<T>]> = (0..cap as u64).map(Slot::new).collect();

    let inner = Arc::new(Inner {
        head: CachePadded::new(AtomicU64::new(0)),
        tail: CachePadded::new(AtomicU64::new(0)),
        buffer,
        mask: cap as u64 - 1,
    });

    let p = Producer {
        inner: inner.clone(),
        tail: Cell::new(0),
    };

    let c = Consumer {
        inner,
        head: Cell::new(0),
    };

    (p, c)
}

/// The producer side of a bounded single-producer single-consumer queue.
///
/// The producer owns the tail cursor: a cached copy lives in a [`Cell`], and
/// the shared atomic is only stored to so the consumer side can answer
/// [`len`](Consumer::len). The handle is `Send` but not `Sync`.
///
/// # Examples
///
/// ```
/// use ticket_ring::{spsc, PushError};
///
/// let (p, c) = spsc::new::<i32>(1);
///
/// assert_eq!(p.push(10), Ok(()));
/// assert_eq!(p.push(20), Err(PushError(20)));
/// ```
pub struct Producer<T> {
    /// The inner representation of the queue.
    inner: Arc<Inner<T>>,

    /// The producer's copy of `inner.tail`, always in sync with it.
    tail: Cell<u64>,
}

unsafe impl<T: Send> Send for Producer<T> {}

impl<T> Producer<T> {
    /// Attempts to push an element into the queue.
    ///
    /// If the queue is full, the element is returned back as an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticket_ring::{spsc, PushError};
    ///
    /// let (p, c) = spsc::new(1);
    ///
    /// assert_eq!(p.push(10), Ok(()));
    /// assert_eq!(p.push(20), Err(PushError(20)));
    /// ```
    pub fn push(&self, value: T) -> Result<(), PushError<T>> {
        let tail = self.tail.get();
        let slot = self.inner.slot(tail);

        // The slot carries last lap's value until the consumer releases it.
        if slot.stamp.load(Ordering::Acquire) != tail {
            return Err(PushError(value));
        }

        unsafe {
            slot.value.get().write(MaybeUninit::new(value));
        }
        slot.stamp.store(tail + 1, Ordering::Release);

        self.inner.tail.store(tail + 1, Ordering::Relaxed);
        self.tail.set(tail + 1);

        Ok(())
    }

    /// Repeatedly attempts to push until it succeeds or `deadline` passes.
    ///
    /// The element is attempted at least once even if the deadline has
    /// already passed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, Instant};
    /// use ticket_ring::{spsc, PushError};
    ///
    /// let (p, c) = spsc::new(1);
    /// p.push(10).unwrap();
    ///
    /// let deadline = Instant::now() + Duration::from_millis(50);
    /// assert_eq!(p.push_until(20, deadline), Err(PushError(20)));
    /// ```
    pub fn push_until(&self, mut value: T, deadline: Instant) -> Result<(), PushError<T>> {
        let backoff = Backoff::new();
        loop {
            match self.push(value) {
                Ok(()) => return Ok(()),
                Err(PushError(v)) => value = v,
            }
            if Instant::now() >= deadline {
                return Err(PushError(value));
            }
            backoff.snooze();
        }
    }

    /// Returns the capacity of the queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticket_ring::spsc;
    ///
    /// let (p, c) = spsc::new::<i32>(128);
    ///
    /// assert_eq!(p.capacity(), 128);
    /// ```
    pub fn capacity(&self) -> usize {
        self.inner.buffer.len()
    }

    /// Returns the number of elements in the queue.
    ///
    /// Advisory: the consumer may be draining concurrently.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Producer { .. }")
    }
}

/// The consumer side of a bounded single-producer single-consumer queue.
///
/// The consumer owns the head cursor. The handle is `Send` but not `Sync`.
///
/// # Examples
///
/// ```
/// use ticket_ring::{spsc, PopError};
///
/// let (p, c) = spsc::new(1);
/// assert_eq!(p.push(10), Ok(()));
///
/// assert_eq!(c.pop(), Ok(10));
/// assert_eq!(c.pop(), Err(PopError));
/// ```
pub struct Consumer<T> {
    /// The inner representation of the queue.
    inner: Arc<Inner<T>>,

    /// The consumer's copy of `inner.head`, always in sync with it.
    head: Cell<u64>,
}

unsafe impl<T: Send> Send for Consumer<T> {}

impl<T> Consumer<T> {
    /// Attempts to pop an element from the queue.
    ///
    /// If the queue is empty, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticket_ring::{spsc, PopError};
    ///
    /// let (p, c) = spsc::new(1);
    /// assert_eq!(p.push(10), Ok(()));
    ///
    /// assert_eq!(c.pop(), Ok(10));
    /// assert_eq!(c.pop(), Err(PopError));
    /// ```
    pub fn pop(&self) -> Result<T, PopError> {
        let head = self.head.get();
        let slot = self.inner.slot(head);

        // Nothing published for this generation yet.
        if slot.stamp.load(Ordering::Acquire) != head + 1 {
            return Err(PopError);
        }

        let value = unsafe { slot.value.get().read().assume_init() };
        slot.stamp
            .store(head.wrapping_add(self.inner.one_lap()), Ordering::Release);

        self.inner.head.store(head + 1, Ordering::Relaxed);
        self.head.set(head + 1);

        Ok(value)
    }

    /// Repeatedly attempts to pop until it succeeds or `deadline` passes.
    ///
    /// The queue is attempted at least once even if the deadline has already
    /// passed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, Instant};
    /// use ticket_ring::{spsc, PopError};
    ///
    /// let (p, c) = spsc::new(1);
    /// p.push(10).unwrap();
    ///
    /// let deadline = Instant::now() + Duration::from_millis(50);
    /// assert_eq!(c.pop_until(deadline), Ok(10));
    /// assert_eq!(c.pop_until(deadline), Err(PopError));
    /// ```
    pub fn pop_until(&self, deadline: Instant) -> Result<T, PopError> {
        let backoff = Backoff::new();
        loop {
            if let Ok(value) = self.pop() {
                return Ok(value);
            }
            if Instant::now() >= deadline {
                return Err(PopError);
            }
            backoff.snooze();
        }
    }

    /// Returns the capacity of the queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticket_ring::spsc;
    ///
    /// let (p, c) = spsc::new::<i32>(128);
    ///
    /// assert_eq!(c.capacity(), 128);
    /// ```
    pub fn capacity(&self) -> usize {
        self.inner.buffer.len()
    }

    /// Returns the number of elements in the queue.
    ///
    /// Advisory: the producer may be filling concurrently.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Consumer { .. }")
    }
}
