//! Rope-backed in-memory host.
//!
//! [`ScratchBuffer`] owns the text, the cursor, and a snapshot-based undo
//! stack, and implements the [`HostEditor`](crate::host::HostEditor)
//! boundary the coordinator drives.

mod buffer;

pub use buffer::ScratchBuffer;
