//! Item stack primitives.
//!
//! An [`ItemStack`] is the value the indirection engine moves between slots:
//! a type identity, a mutable quantity, and a per-stack maximum size. The
//! engine never inspects anything beyond these three facts.

use serde::{Deserialize, Serialize};

/// Item identifier referencing an external item registry.
pub type ItemId = u16;

/// Maximum stack size for most items.
pub const DEFAULT_STACK_SIZE: u32 = 64;

/// A stack of identical items occupying one inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type identifier.
    pub item_id: ItemId,
    /// Number of items in this stack.
    pub count: u32,
    /// Maximum number of items this stack may hold.
    pub max_stack: u32,
}

impl ItemStack {
    /// Create a new item stack with the default maximum size.
    pub fn new(item_id: ItemId, count: u32) -> Self {
        Self {
            item_id,
            count,
            max_stack: DEFAULT_STACK_SIZE,
        }
    }

    /// Create an item stack with an explicit maximum size.
    pub fn with_max_stack(item_id: ItemId, count: u32, max_stack: u32) -> Self {
        Self {
            item_id,
            count,
            max_stack,
        }
    }

    /// Check whether two stacks hold the same item type, ignoring quantity.
    ///
    /// This is the match relation used by insert, append, and contains.
    pub fn matches(&self, other: &ItemStack) -> bool {
        self.item_id == other.item_id
    }

    /// Check if this stack can absorb items from another stack.
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.matches(other) && !self.is_full()
    }

    /// Maximum stack size for this item.
    pub fn max_stack_size(&self) -> u32 {
        self.max_stack
    }

    /// Check if this stack is at or above max capacity.
    pub fn is_full(&self) -> bool {
        self.count >= self.max_stack
    }

    /// Remaining space in this stack, floored at zero for stacks already
    /// above their nominal capacity.
    pub fn remaining_space(&self) -> u32 {
        self.max_stack.saturating_sub(self.count)
    }

    /// Try to add items to this stack, returning the amount that didn't fit.
    pub fn add(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.remaining_space());
        self.count += added;
        amount - added
    }

    /// Try to remove items from this stack, returning the amount actually
    /// removed.
    pub fn remove(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.count);
        self.count -= removed;
        removed
    }

    /// Split this stack, taking the specified amount into a new stack.
    pub fn split(&mut self, amount: u32) -> Option<ItemStack> {
        if amount == 0 || amount > self.count {
            return None;
        }

        self.count -= amount;
        Some(self.cloned_with_count(amount))
    }

    /// Defensive copy of this stack holding `count` items.
    ///
    /// The clone primitive used by the transfer algorithms: everything that
    /// leaves a slot or enters one is a fresh value, never a shared handle.
    pub fn cloned_with_count(&self, count: u32) -> ItemStack {
        ItemStack {
            count,
            ..self.clone()
        }
    }
}
