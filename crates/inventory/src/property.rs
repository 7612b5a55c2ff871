//! Property side-channel carried by lenses.
//!
//! Parents annotate child inventories with a small closed set of facts
//! (display title, advertised capacity, slot position). Queries go through
//! [`PropertyKind`] so callers can ask for one kind without pattern matching
//! the whole set.

use serde::{Deserialize, Serialize};

/// A fact a parent lens attaches to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Property {
    /// Display title for the child inventory.
    Title(String),
    /// Advertised slot capacity.
    Capacity(usize),
    /// Position of a slot within its parent.
    SlotIndex(usize),
}

/// Discriminant used to query properties by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Matches [`Property::Title`].
    Title,
    /// Matches [`Property::Capacity`].
    Capacity,
    /// Matches [`Property::SlotIndex`].
    SlotIndex,
}

impl Property {
    /// The discriminant of this property.
    pub fn kind(&self) -> PropertyKind {
        match self {
            Property::Title(_) => PropertyKind::Title,
            Property::Capacity(_) => PropertyKind::Capacity,
            Property::SlotIndex(_) => PropertyKind::SlotIndex,
        }
    }

    /// The title payload, if this is a title property.
    pub fn title(&self) -> Option<&str> {
        match self {
            Property::Title(title) => Some(title),
            _ => None,
        }
    }
}
