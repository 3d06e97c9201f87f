//! Bounded lock-free queues built on per-slot sequence tickets.
//!
//! This crate provides two flavors of a fixed-capacity ring in which every
//! slot carries a monotonic ticket, so producers and consumers synchronize
//! on the slot itself rather than on a shared lock:
//!
//! * [`MpmcQueue`], a multi-producer multi-consumer queue with single-item
//!   and batched operations.
//! * [`spsc`], a single-producer single-consumer specialization split into
//!   a [`Producer`](spsc::Producer) and a [`Consumer`](spsc::Consumer)
//!   handle, with no read-modify-write on the cursors at all.
//!
//! Capacities are rounded up to the next power of two. All operations are
//! try-based or deadline-polling; failure is reported in-band (the full
//! queue hands the value back, the empty queue returns nothing) and nothing
//! ever blocks on the OS.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod err;
mod mpmc;
pub mod spsc;

pub use self::err::{PopError, PushError};
pub use self::mpmc::{IntoIter, MpmcQueue};
