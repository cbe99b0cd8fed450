//! Builder for USB and USB-Video-Class binary descriptors.
//!
//! Descriptors are the length-prefixed records a device returns to the
//! host during enumeration. This crate compiles them from named-field
//! "short forms": each maker call validates its input, appends one packed
//! record to a caller-owned buffer, and hands back an [`Item`] describing
//! what was written. After all records are in place,
//! [`DescriptorBuilder::add_children`] folds the accumulated lengths of
//! subordinate records into the `wTotalLength`-style fields of their
//! parents, patching bytes that were emitted earlier. Bytes are never
//! moved or reordered; the layout of the finished buffer is fixed by the
//! order of the maker calls, so callers issue them top-down in the order
//! the flat result requires.
//!
//! No heap is used anywhere. A session may also run without a buffer at
//! all (a "dry run") to compute sizes ahead of allocation; the append
//! cursor then advances exactly as it would against a real buffer.
//!
//! ```
//! use usb_desc_builder::{descriptor, DescriptorBuilder};
//!
//! let mut buf = [0u8; 64];
//! let mut bldr = DescriptorBuilder::new(&mut buf);
//! let ep = bldr.endpoint(&descriptor::Endpoint {
//!     b_endpoint_address: 0x81,
//!     bm_attributes: 0x02,
//!     w_max_packet_size: 512,
//!     b_interval: 1,
//! }).unwrap();
//! assert_eq!(bldr.descriptor_bytes(&ep).unwrap()[0], 7);
//! ```

#![no_std]

pub mod builder;
pub mod descriptor;
mod endian;
pub mod item;
pub mod uvc;

pub use builder::{DescriptorBuilder, PARAM_MAX};
pub use descriptor::Guid;
pub use item::{Item, MAX_CHILDREN};

/// Errors returned by every builder call.
///
/// Capacity errors (`NoSpace`, `Oversized`, `TooMany`) are recoverable:
/// the failed call leaves the buffer, cursor and counters byte-for-byte
/// unchanged, so the caller may retry with a larger buffer or a smaller
/// descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Call issued before `init`, or after `end`.
    Uninitialized,
    /// Feature intentionally left unimplemented.
    Unsupported,
    /// Reserved: a size-only result that must not be treated as a write.
    DryRun,
    /// The attached buffer cannot hold the record.
    NoSpace,
    /// Null/missing required input, or a count disagreeing with its field.
    Invalid,
    /// The record would exceed the one-byte bLength limit.
    Oversized,
    /// A fixed bound was exhausted: child list, parameter list, or an
    /// index counter.
    TooMany,
}
