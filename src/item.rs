//! The per-descriptor ledger entry returned by every maker call.

use heapless::Vec;

/// Most children a single descriptor accumulates across `add_children`
/// calls. The configuration of the largest catalogued device stays below
/// this.
pub const MAX_CHILDREN: usize = 16;

/// Handle describing one descriptor already written into the session
/// buffer: where it starts, how long its own record is, and — for types
/// carrying a class-level total-length field — where that 16-bit field
/// sits so it can be patched later.
///
/// Items are produced fully formed by maker calls and afterwards change
/// only through [`DescriptorBuilder::add_children`], which grows the
/// backpatched total and the child list. Callers treat them as read-only.
///
/// [`DescriptorBuilder::add_children`]: crate::DescriptorBuilder::add_children
#[derive(Debug)]
pub struct Item {
    /// Byte offset of the record in the session buffer.
    pub(crate) address: usize,
    /// The record's own length; fixed at creation, never above 255.
    pub(crate) size: u16,
    /// Overloaded slot: string index, endpoint address, configuration
    /// index — whatever is natural for the descriptor type.
    pub(crate) index: u8,
    /// Offset of the 16-bit total-length field inside the record, when
    /// the descriptor type carries one.
    pub(crate) total_at: Option<usize>,
    /// Shadow of the backpatched total, kept in lockstep with the buffer
    /// so composition also works in dry-run sessions.
    pub(crate) total: u16,
    /// Start offsets of subordinate records, in the order they were
    /// adopted.
    pub(crate) children: Vec<usize, MAX_CHILDREN>,
}

impl Item {
    pub(crate) fn new(address: usize, size: u16) -> Self {
        Item {
            address,
            size,
            index: 0,
            total_at: None,
            total: 0,
            children: Vec::new(),
        }
    }

    /// Byte offset of this record in the session buffer.
    pub fn address(&self) -> usize {
        self.address
    }

    /// The record's own length in bytes.
    pub fn size(&self) -> u16 {
        self.size
    }

    /// String index, endpoint address or configuration index, depending
    /// on what made this item.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Whether the record carries a backpatchable total-length field.
    pub fn has_total_length(&self) -> bool {
        self.total_at.is_some()
    }

    /// Start offsets of the records adopted through `add_children`.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Own size, or the accumulated total when descendants have been
    /// folded in. Dry-run view; attached sessions read the live field
    /// through the builder instead.
    pub(crate) fn shadow_effective(&self) -> u16 {
        if self.total_at.is_some() && self.total != 0 {
            self.total
        } else {
            self.size
        }
    }
}
