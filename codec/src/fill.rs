//! Filling a buffer from a blocking byte source.
//!
//! [`read_until`] copies exactly `count` bytes into a slice, tolerating short
//! reads. [`read_until_with`] adds a cancellation flag and a deadline, both
//! checked between reads; a single `read` that blocks forever still blocks
//! the caller.

use std::io::{self, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::trace;

/// Errors from [`read_until`] and [`read_until_with`].
#[derive(Debug, Error)]
pub enum FillError {
    #[error("range {offset}+{count} is outside a {len}-byte buffer")]
    OutOfBounds {
        offset: usize,
        count: usize,
        len: usize,
    },

    #[error("source ended after {filled} of {expected} bytes")]
    UnexpectedEof { filled: usize, expected: usize },

    #[error("fill cancelled after {filled} of {expected} bytes")]
    Cancelled { filled: usize, expected: usize },

    #[error("fill timed out after {filled} of {expected} bytes")]
    TimedOut { filled: usize, expected: usize },

    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// Cancellation and deadline for [`read_until_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FillControl<'a> {
    pub cancel: Option<&'a AtomicBool>,
    pub deadline: Option<Instant>,
}

impl<'a> FillControl<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cancel: None,
            deadline: None,
        }
    }

    /// Stops the fill once `flag` is set.
    #[must_use]
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Reads exactly `count` bytes from `input` into `target[offset..offset + count]`.
pub fn read_until<R: Read + ?Sized>(
    input: &mut R,
    target: &mut [u8],
    offset: usize,
    count: usize,
) -> Result<(), FillError> {
    read_until_with(input, target, offset, count, &FillControl::new())
}

/// Like [`read_until`], giving up when `control` is cancelled or expires.
///
/// `Interrupted` and `WouldBlock` errors are retried. Bytes read before a
/// failure stay in `target`; the error reports how many there were.
pub fn read_until_with<R: Read + ?Sized>(
    input: &mut R,
    target: &mut [u8],
    offset: usize,
    count: usize,
    control: &FillControl<'_>,
) -> Result<(), FillError> {
    let end = offset
        .checked_add(count)
        .filter(|end| *end <= target.len())
        .ok_or(FillError::OutOfBounds {
            offset,
            count,
            len: target.len(),
        })?;

    let mut filled = 0;
    while filled < count {
        if control.is_cancelled() {
            return Err(FillError::Cancelled {
                filled,
                expected: count,
            });
        }
        if control.is_expired() {
            return Err(FillError::TimedOut {
                filled,
                expected: count,
            });
        }
        match input.read(&mut target[offset + filled..end]) {
            Ok(0) => {
                return Err(FillError::UnexpectedEof {
                    filled,
                    expected: count,
                })
            }
            Ok(read) => {
                filled += read;
                if filled < count {
                    trace!(read, filled, expected = count, "partial read");
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) if err.kind() == ErrorKind::WouldBlock => std::thread::yield_now(),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
