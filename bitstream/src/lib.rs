//! Growable bit stream and buffer pool for the syncodec state codec.
//!
//! This crate provides [`BitStream`], a single buffer type used for both bit-level
//! encoding and decoding, and [`BufferPool`], which recycles streams so that
//! steady-state serialization does not allocate.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded reads** - Every read is checked against the logical length.
//! - **No domain knowledge** - This crate knows nothing about fields or values.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::BitStream;
//!
//! let mut stream = BitStream::new();
//! stream.write_bit(true);
//! stream.write_bits(42, 7).unwrap();
//!
//! let mut reader = BitStream::from_vec(stream.into_vec());
//! assert_eq!(reader.read_bit().unwrap(), true);
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! ```

mod error;
mod pool;
mod stream;

pub use error::{BitError, BitResult};
pub use pool::{BufferPool, PoolConfig, PoolStats, PooledStream};
pub use stream::BitStream;
