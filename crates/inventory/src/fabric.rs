//! Uniform flat-index access over heterogeneous backing stores.

use coffer_core::{ItemStack, DEFAULT_STACK_SIZE};
use serde::{Deserialize, Serialize};

/// Uniform accessor over one or more backing item stores.
///
/// Indices are stable for the fabric's lifetime; fabrics never resize after
/// construction. Range checking is the lens's contract: out-of-range reads
/// come back empty and out-of-range writes are refused, mirroring how the
/// rest of the engine treats absence as a value rather than an error.
pub trait Fabric {
    /// Total number of addressable slots.
    fn slot_count(&self) -> usize;

    /// Read the stack at `index`, or `None` for an empty slot.
    fn stack(&self, index: usize) -> Option<&ItemStack>;

    /// Write `value` into `index`, returning whether the write was accepted.
    ///
    /// Always true in-range for a plain fabric. This acceptance flag is the
    /// extension point filtering lenses report through.
    fn set_stack(&mut self, index: usize, value: Option<ItemStack>) -> bool;

    /// Display name of the backing store, used for title resolution.
    fn display_name(&self) -> &str;

    /// Native per-slot stack cap of this store.
    fn max_stack_size(&self) -> u32 {
        DEFAULT_STACK_SIZE
    }
}

/// A single backing store: a named, fixed-size run of slots.
///
/// The persisted-state shape for simple containers (chests, hoppers,
/// dispensers): slot contents snapshot as a plain sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotFabric {
    name: String,
    slots: Vec<Option<ItemStack>>,
    max_stack: u32,
}

impl SlotFabric {
    /// Create an empty fabric with `slot_count` slots.
    pub fn new(name: impl Into<String>, slot_count: usize) -> Self {
        Self {
            name: name.into(),
            slots: vec![None; slot_count],
            max_stack: DEFAULT_STACK_SIZE,
        }
    }

    /// Create an empty fabric with a non-default native stack cap.
    pub fn with_max_stack(name: impl Into<String>, slot_count: usize, max_stack: u32) -> Self {
        Self {
            name: name.into(),
            slots: vec![None; slot_count],
            max_stack,
        }
    }

    /// All slots in index order.
    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }
}

impl Fabric for SlotFabric {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn stack(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index)?.as_ref()
    }

    fn set_stack(&mut self, index: usize, value: Option<ItemStack>) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn max_stack_size(&self) -> u32 {
        self.max_stack
    }
}

/// Ordered concatenation of backing stores behind one flat index space.
///
/// Part boundaries are invisible to callers: index `0` is the first slot of
/// the first part, and each part's range follows the previous one. The
/// composite's display name is the first part's, which is what root title
/// resolution reads for multi-block containers.
pub struct CompositeFabric {
    parts: Vec<Box<dyn Fabric>>,
}

impl CompositeFabric {
    /// Concatenate `parts` in order.
    pub fn new(parts: Vec<Box<dyn Fabric>>) -> Self {
        Self { parts }
    }

    /// Number of concatenated parts.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

impl Fabric for CompositeFabric {
    fn slot_count(&self) -> usize {
        self.parts.iter().map(|part| part.slot_count()).sum()
    }

    fn stack(&self, mut index: usize) -> Option<&ItemStack> {
        for part in &self.parts {
            if index < part.slot_count() {
                return part.stack(index);
            }
            index -= part.slot_count();
        }
        None
    }

    fn set_stack(&mut self, mut index: usize, value: Option<ItemStack>) -> bool {
        for part in &mut self.parts {
            if index < part.slot_count() {
                return part.set_stack(index, value);
            }
            index -= part.slot_count();
        }
        false
    }

    fn display_name(&self) -> &str {
        self.parts
            .first()
            .map(|part| part.display_name())
            .unwrap_or("")
    }

    fn max_stack_size(&self) -> u32 {
        self.parts
            .iter()
            .map(|part| part.max_stack_size())
            .min()
            .unwrap_or(DEFAULT_STACK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_fabric_set_and_get() {
        let mut fabric = SlotFabric::new("Chest", 27);
        assert_eq!(fabric.slot_count(), 27);
        assert!(fabric.stack(0).is_none());

        assert!(fabric.set_stack(3, Some(ItemStack::new(1, 10))));
        assert_eq!(fabric.stack(3).map(|s| s.count), Some(10));
    }

    #[test]
    fn slot_fabric_out_of_range() {
        let mut fabric = SlotFabric::new("Chest", 3);
        assert!(fabric.stack(3).is_none());
        assert!(!fabric.set_stack(3, Some(ItemStack::new(1, 1))));
    }

    #[test]
    fn composite_offsets_across_parts() {
        let mut top = SlotFabric::new("Large Chest", 27);
        top.set_stack(0, Some(ItemStack::new(1, 5)));
        let bottom = SlotFabric::new("Chest", 27);
        let mut fabric = CompositeFabric::new(vec![Box::new(top), Box::new(bottom)]);

        assert_eq!(fabric.slot_count(), 54);
        assert_eq!(fabric.stack(0).map(|s| s.count), Some(5));
        assert!(fabric.stack(27).is_none());

        assert!(fabric.set_stack(27, Some(ItemStack::new(2, 7))));
        assert_eq!(fabric.stack(27).map(|s| s.item_id), Some(2));
        assert!(!fabric.set_stack(54, Some(ItemStack::new(2, 7))));
    }

    #[test]
    fn composite_display_name_is_first_part() {
        let top = SlotFabric::new("Large Chest", 27);
        let bottom = SlotFabric::new("Chest", 27);
        let fabric = CompositeFabric::new(vec![Box::new(top), Box::new(bottom)]);
        assert_eq!(fabric.display_name(), "Large Chest");
    }

    #[test]
    fn composite_cap_is_minimum_of_parts() {
        let a = SlotFabric::with_max_stack("A", 1, 64);
        let b = SlotFabric::with_max_stack("B", 1, 16);
        let fabric = CompositeFabric::new(vec![Box::new(a), Box::new(b)]);
        assert_eq!(fabric.max_stack_size(), 16);
    }
}
