//! Canonical container fixtures used across the test suites.

use coffer_core::ItemStack;
use coffer_inventory::{
    CompositeFabric, Fabric, InventoryTree, LensTreeBuilder, Property, SlotFabric,
};

/// Number of slots in a single chest inventory (3 rows × 9 columns).
pub const CHEST_SLOT_COUNT: usize = 27;

/// Number of slots in a hopper inventory.
pub const HOPPER_SLOT_COUNT: usize = 5;

/// Number of slots in a player inventory.
pub const PLAYER_SLOT_COUNT: usize = 36;

/// Number of slots in the crafting-grid view over a player inventory.
pub const CRAFTING_GRID_SIZE: usize = 9;

/// An empty single-chest fabric.
pub fn chest_fabric() -> SlotFabric {
    SlotFabric::new("Chest", CHEST_SLOT_COUNT)
}

/// An empty hopper fabric.
pub fn hopper_fabric() -> SlotFabric {
    SlotFabric::new("Hopper", HOPPER_SLOT_COUNT)
}

/// A single chest wrapped under the default root-lens policy.
pub fn chest_tree() -> InventoryTree<SlotFabric> {
    InventoryTree::new(chest_fabric())
}

/// A chest with `stacks` placed into its leading slots.
pub fn stocked_chest(stacks: &[ItemStack]) -> InventoryTree<SlotFabric> {
    let mut fabric = chest_fabric();
    for (slot, stack) in stacks.iter().enumerate() {
        fabric.set_stack(slot, Some(stack.clone()));
    }
    InventoryTree::new(fabric)
}

/// A double chest: two chest stores behind one composite fabric, with a
/// titled indexed view per half (child 0 is the top half).
pub fn double_chest() -> InventoryTree<CompositeFabric> {
    let fabric = CompositeFabric::new(vec![
        Box::new(SlotFabric::new("Large Chest", CHEST_SLOT_COUNT)),
        Box::new(chest_fabric()),
    ]);

    let mut builder = LensTreeBuilder::new();
    let top = builder.indexed(0, CHEST_SLOT_COUNT);
    let bottom = builder.indexed(CHEST_SLOT_COUNT, CHEST_SLOT_COUNT);
    let root = builder.composite(vec![top, bottom]);
    builder.set_property(root, 0, Property::Title("Top".into()));
    builder.set_property(root, 1, Property::Title("Bottom".into()));

    InventoryTree::with_lens(fabric, builder.finish(), root)
}

/// A player inventory with an aliasing crafting-grid view over its first
/// nine slots. Returns the tree and the grid's child index on the root.
pub fn player_tree() -> (InventoryTree<SlotFabric>, usize) {
    let fabric = SlotFabric::new("Player", PLAYER_SLOT_COUNT);

    let mut builder = LensTreeBuilder::new();
    let root = builder.indexed(0, PLAYER_SLOT_COUNT);
    let grid = builder.indexed(0, CRAFTING_GRID_SIZE);
    let grid_index = builder.alias_child(root, grid);
    builder.set_property(root, grid_index, Property::Title("Crafting".into()));

    (
        InventoryTree::with_lens(fabric, builder.finish(), root),
        grid_index,
    )
}
