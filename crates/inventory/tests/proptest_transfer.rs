//! Property-based tests for the transfer algorithms
//!
//! Validates the algorithm invariants:
//! - Insert accounting: items placed equals quantity minus rejected
//! - Append never pushes a slot past its max stack size
//! - Poll followed by re-insert conserves totals
//! - Contains is monotonic in the requested quantity
//! - Limited poll pulls exactly the available minimum

use coffer_core::ItemStack;
use coffer_inventory::{logic, Fabric, LensTree, SlotFabric};
use proptest::prelude::*;

/// Fill a fabric with type-1 stacks per `occupancies`, returning the total.
fn fill(fabric: &mut SlotFabric, occupancies: &[u32]) -> u32 {
    let mut total = 0;
    for (slot, &count) in occupancies.iter().enumerate() {
        if count > 0 {
            fabric.set_stack(slot, Some(ItemStack::new(1, count)));
            total += count;
        }
    }
    total
}

proptest! {
    /// Property: insert places exactly `quantity - rejected` items
    ///
    /// Inserting into an empty lens fills `min(quantity, capacity)` and
    /// rejects the rest, so the count delta always matches the result.
    #[test]
    fn insert_accounting(
        slots in 1usize..10,
        quantity in 0u32..700,
    ) {
        let (tree, root) = LensTree::indexed(slots);
        let mut fabric = SlotFabric::new("Bench", slots);

        let result = logic::insert_sequential(&mut fabric, &tree, root, &ItemStack::new(1, quantity));
        let placed = logic::count_items(&fabric, &tree, root).unwrap();
        let expected = quantity.min(slots as u32 * 64);

        prop_assert_eq!(placed, expected);
        prop_assert_eq!(result.rejected_quantity(), quantity - expected);
        prop_assert_eq!(placed + result.rejected_quantity(), quantity);
    }

    /// Property: append never leaves a slot above its max stack size
    ///
    /// Whatever the starting occupancies, merging tops slots up to the cap
    /// and conservation holds between the fabric and the caller's stack.
    #[test]
    fn append_respects_stack_cap(
        occupancies in prop::collection::vec(0u32..=64, 1..9),
        quantity in 1u32..300,
    ) {
        let slots = occupancies.len();
        let (tree, root) = LensTree::indexed(slots);
        let mut fabric = SlotFabric::new("Bench", slots);
        let total_before = fill(&mut fabric, &occupancies);

        let mut stack = ItemStack::new(1, quantity);
        let result = logic::append_sequential(&mut fabric, &tree, root, &mut stack);

        for slot in fabric.slots() {
            if let Some(occupant) = slot {
                prop_assert!(
                    occupant.count <= 64,
                    "slot holds {} after append",
                    occupant.count
                );
            }
        }

        let total_after = logic::count_items(&fabric, &tree, root).unwrap();
        if result.is_success() {
            prop_assert_eq!(total_after, total_before + quantity - stack.count);
        } else {
            prop_assert_eq!(total_after, total_before);
            prop_assert_eq!(result.rejected_quantity(), quantity);
        }
    }

    /// Property: poll followed by re-insert conserves totals
    ///
    /// Taking the first occupied slot and inserting the same stack back
    /// restores the item and stack counts.
    #[test]
    fn poll_reinsert_conserves_totals(
        occupancies in prop::collection::vec(0u32..=64, 1..9),
    ) {
        let slots = occupancies.len();
        let (tree, root) = LensTree::indexed(slots);
        let mut fabric = SlotFabric::new("Bench", slots);
        let total_before = fill(&mut fabric, &occupancies);
        let stacks_before = logic::count_stacks(&fabric, &tree, root).unwrap();

        match logic::find_stack(&mut fabric, &tree, root, true).unwrap() {
            Some(polled) => {
                let result = logic::insert_sequential(&mut fabric, &tree, root, &polled);
                prop_assert!(result.rejected.is_empty());
                prop_assert_eq!(
                    logic::count_items(&fabric, &tree, root).unwrap(),
                    total_before
                );
                prop_assert_eq!(
                    logic::count_stacks(&fabric, &tree, root).unwrap(),
                    stacks_before
                );
            }
            None => prop_assert_eq!(total_before, 0),
        }
    }

    /// Property: contains is monotonic in the requested quantity
    ///
    /// If the inventory holds `quantity` of a type, it also holds any
    /// smaller quantity of it.
    #[test]
    fn contains_is_monotonic(
        occupancies in prop::collection::vec(0u32..=64, 1..9),
        quantity in 2u32..200,
    ) {
        let slots = occupancies.len();
        let (tree, root) = LensTree::indexed(slots);
        let mut fabric = SlotFabric::new("Bench", slots);
        fill(&mut fabric, &occupancies);

        let query = ItemStack::new(1, 1);
        if logic::contains_quantity(&fabric, &tree, root, Some(&query), quantity).unwrap() {
            prop_assert!(
                logic::contains_quantity(&fabric, &tree, root, Some(&query), quantity - 1).unwrap()
            );
            prop_assert!(
                logic::contains_quantity(&fabric, &tree, root, Some(&query), 1).unwrap()
            );
        }
    }

    /// Property: limited poll pulls exactly `min(limit, available)`
    ///
    /// With a single item type present, the accumulated pull matches the
    /// available total clamped to the limit, and the remainder stays put.
    #[test]
    fn poll_limit_pulls_exactly_the_min(
        occupancies in prop::collection::vec(0u32..=64, 1..9),
        limit in 0u32..300,
    ) {
        let slots = occupancies.len();
        let (tree, root) = LensTree::indexed(slots);
        let mut fabric = SlotFabric::new("Bench", slots);
        let total = fill(&mut fabric, &occupancies);

        let pulled = logic::find_stacks(&mut fabric, &tree, root, limit, true).unwrap();
        let expected = total.min(limit);

        match pulled {
            Some(stack) => {
                prop_assert_eq!(stack.count, expected);
                prop_assert_eq!(
                    logic::count_items(&fabric, &tree, root).unwrap(),
                    total - expected
                );
            }
            None => prop_assert_eq!(total, 0),
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn seventy_into_nine_empty_slots() {
        let (tree, root) = LensTree::indexed(9);
        let mut fabric = SlotFabric::new("Bench", 9);

        let result = logic::insert_sequential(&mut fabric, &tree, root, &ItemStack::new(1, 70));
        assert!(result.is_success());
        assert!(result.rejected.is_empty());
        assert_eq!(fabric.slots()[0].as_ref().map(|s| s.count), Some(64));
        assert_eq!(fabric.slots()[1].as_ref().map(|s| s.count), Some(6));
    }

    #[test]
    fn append_ten_after_full_first_slot() {
        let (tree, root) = LensTree::indexed(9);
        let mut fabric = SlotFabric::new("Bench", 9);
        fabric.set_stack(0, Some(ItemStack::new(1, 64)));

        let mut stack = ItemStack::new(1, 10);
        let result = logic::append_sequential(&mut fabric, &tree, root, &mut stack);
        assert!(result.is_success());
        assert_eq!(stack.count, 0);
        assert_eq!(fabric.slots()[0].as_ref().map(|s| s.count), Some(64));
        assert_eq!(fabric.slots()[1].as_ref().map(|s| s.count), Some(10));
    }
}
