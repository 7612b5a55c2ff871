//! User-facing inventory objects.
//!
//! An [`InventoryTree`] owns a fabric, a lens tree, and an arena of adapter
//! nodes addressed by [`AdapterId`]. The arena replaces the self-referential
//! parent/child object graph: parents and children are indices, and the root
//! is simply the node whose parent index equals its own id.

use coffer_core::{InventoryError, ItemId, ItemStack, TransactionResult};
use serde::{Deserialize, Serialize};

use crate::fabric::Fabric;
use crate::lens::{LensId, LensTree};
use crate::logic;
use crate::property::{Property, PropertyKind};

/// Stable identifier of an adapter node within its [`InventoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdapterId(usize);

/// Ownership metadata attached to a root container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Registry identifier of the owning plugin or mod.
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

struct AdapterNode {
    lens: LensId,
    parent: AdapterId,
    // Lazily materialized child adapters, one slot per lens child.
    children: Vec<Option<AdapterId>>,
    // Cached leaf-slot adapter sequence.
    slots: Option<Vec<AdapterId>>,
}

/// An inventory: a fabric plus a lens topology, navigable as a tree of
/// child inventories.
///
/// Single-threaded by design: operations run to completion on the calling
/// thread and the tree performs no internal locking. Callers invoking from
/// multiple threads must serialize access.
pub struct InventoryTree<F: Fabric> {
    fabric: F,
    lenses: LensTree,
    nodes: Vec<AdapterNode>,
    root: AdapterId,
    // Shared empty inventory, materialized on first failed child query.
    empty: Option<AdapterId>,
    owner: Option<Owner>,
    root_properties: Vec<Property>,
}

impl<F: Fabric> InventoryTree<F> {
    /// Wrap `fabric` under the default root-lens policy: a zero-slot fabric
    /// gets the empty sentinel, anything else a flat indexed lens spanning
    /// every slot.
    pub fn new(fabric: F) -> Self {
        let (lenses, root) = if fabric.slot_count() == 0 {
            LensTree::empty()
        } else {
            LensTree::indexed(fabric.slot_count())
        };
        Self::with_lens(fabric, lenses, root)
    }

    /// Wrap `fabric` with a caller-supplied root lens.
    pub fn with_lens(fabric: F, lenses: LensTree, root_lens: LensId) -> Self {
        let root = AdapterId(0);
        let children = vec![None; lenses.children(root_lens).len()];
        Self {
            fabric,
            lenses,
            nodes: vec![AdapterNode {
                lens: root_lens,
                parent: root,
                children,
                slots: None,
            }],
            root,
            empty: None,
            owner: None,
            root_properties: Vec::new(),
        }
    }

    /// Attach ownership metadata to the root container.
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Attach a property to the root inventory itself (custom-inventory
    /// titles and the like).
    pub fn with_root_property(mut self, property: Property) -> Self {
        self.root_properties.push(property);
        self
    }

    /// The root adapter.
    pub fn root(&self) -> AdapterId {
        self.root
    }

    /// Whether `id` is the root (its parent is itself).
    pub fn is_root(&self, id: AdapterId) -> bool {
        self.nodes[id.0].parent == id
    }

    /// The adapter's parent; the root's parent is the root.
    pub fn parent(&self, id: AdapterId) -> AdapterId {
        self.nodes[id.0].parent
    }

    /// The lens this adapter views the fabric through.
    pub fn lens_of(&self, id: AdapterId) -> LensId {
        self.nodes[id.0].lens
    }

    /// The backing fabric.
    pub fn fabric(&self) -> &F {
        &self.fabric
    }

    /// Mutable access to the backing fabric, for setup and tests.
    pub fn fabric_mut(&mut self) -> &mut F {
        &mut self.fabric
    }

    /// The lens topology.
    pub fn lenses(&self) -> &LensTree {
        &self.lenses
    }

    /// Number of child inventories under `id`.
    pub fn child_count(&self, id: AdapterId) -> usize {
        self.lenses.children(self.nodes[id.0].lens).len()
    }

    /// The child adapter at `index`, materialized on first access and cached
    /// for the tree's lifetime.
    pub fn child(&mut self, id: AdapterId, index: usize) -> Result<AdapterId, InventoryError> {
        let lens = self.nodes[id.0].lens;
        let children = self.lenses.children(lens).len();
        if index >= children {
            return Err(InventoryError::NoSuchChild { index, children });
        }
        if let Some(existing) = self.nodes[id.0].children[index] {
            return Ok(existing);
        }
        let child_lens = self.lenses.children(lens)[index];
        let child = self.push_node(child_lens, id);
        self.nodes[id.0].children[index] = Some(child);
        Ok(child)
    }

    /// The child adapter at `index`, or the shared empty inventory when the
    /// query fails. Every failed child query resolves to the same sentinel.
    pub fn child_or_empty(&mut self, id: AdapterId, index: usize) -> AdapterId {
        match self.child(id, index) {
            Ok(child) => child,
            Err(_) => self.empty_adapter(),
        }
    }

    /// The shared zero-slot inventory, created on first need.
    pub fn empty_adapter(&mut self) -> AdapterId {
        if let Some(empty) = self.empty {
            return empty;
        }
        let lens = self.lenses.push_empty();
        let root = self.root;
        let empty = self.push_node(lens, root);
        self.empty = Some(empty);
        empty
    }

    fn push_node(&mut self, lens: LensId, parent: AdapterId) -> AdapterId {
        let children = vec![None; self.lenses.children(lens).len()];
        let id = AdapterId(self.nodes.len());
        self.nodes.push(AdapterNode {
            lens,
            parent,
            children,
            slots: None,
        });
        id
    }

    /// Adapters for every leaf slot under `id`, in ordinal order. Computed
    /// once and cached; iteration is restartable.
    pub fn slots(&mut self, id: AdapterId) -> &[AdapterId] {
        if self.nodes[id.0].slots.is_none() {
            let leaves = self.lenses.leaf_slots(self.nodes[id.0].lens);
            let mut ids = Vec::with_capacity(leaves.len());
            for leaf in leaves {
                ids.push(self.push_node(leaf, id));
            }
            self.nodes[id.0].slots = Some(ids);
        }
        match &self.nodes[id.0].slots {
            Some(slots) => slots,
            None => &[],
        }
    }

    /// Clear every leaf slot under `id`.
    pub fn clear(&mut self, id: AdapterId) -> Result<(), InventoryError> {
        let slots: Vec<AdapterId> = self.slots(id).to_vec();
        for slot in slots {
            let lens = self.nodes[slot.0].lens;
            self.lenses.set_stack(&mut self.fabric, lens, 0, None)?;
        }
        Ok(())
    }

    /// Ownership metadata resolved from the root container, if any. Child
    /// adapters share their root's owner.
    pub fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    /// Display title for the inventory: a root title property if one was
    /// attached, else the first backing store's display name.
    pub fn title(&self) -> &str {
        self.root_properties
            .iter()
            .find_map(|property| property.title())
            .unwrap_or_else(|| self.fabric.display_name())
    }

    /// Remove and return the first occupied slot's stack.
    pub fn poll(&mut self, id: AdapterId) -> Result<Option<ItemStack>, InventoryError> {
        let lens = self.nodes[id.0].lens;
        logic::find_stack(&mut self.fabric, &self.lenses, lens, true)
    }

    /// Remove and return up to `limit` items of the first matching type.
    pub fn poll_limit(
        &mut self,
        id: AdapterId,
        limit: u32,
    ) -> Result<Option<ItemStack>, InventoryError> {
        let lens = self.nodes[id.0].lens;
        logic::find_stacks(&mut self.fabric, &self.lenses, lens, limit, true)
    }

    /// Return a copy of the first occupied slot's stack without removing it.
    pub fn peek(&mut self, id: AdapterId) -> Result<Option<ItemStack>, InventoryError> {
        let lens = self.nodes[id.0].lens;
        logic::find_stack(&mut self.fabric, &self.lenses, lens, false)
    }

    /// Copy up to `limit` items of the first matching type without removing.
    pub fn peek_limit(
        &mut self,
        id: AdapterId,
        limit: u32,
    ) -> Result<Option<ItemStack>, InventoryError> {
        let lens = self.nodes[id.0].lens;
        logic::find_stacks(&mut self.fabric, &self.lenses, lens, limit, false)
    }

    /// Insert by spreading across slots. See [`logic::insert_sequential`].
    pub fn insert(&mut self, id: AdapterId, stack: &ItemStack) -> TransactionResult {
        let lens = self.nodes[id.0].lens;
        logic::insert_sequential(&mut self.fabric, &self.lenses, lens, stack)
    }

    /// Append by merging then filling. See [`logic::append_sequential`];
    /// `stack` is updated in place to the unconsumed remainder.
    pub fn append(&mut self, id: AdapterId, stack: &mut ItemStack) -> TransactionResult {
        let lens = self.nodes[id.0].lens;
        logic::append_sequential(&mut self.fabric, &self.lenses, lens, stack)
    }

    /// Whether at least `quantity` items matching `stack` are present.
    pub fn contains_stack(
        &self,
        id: AdapterId,
        stack: &ItemStack,
        quantity: u32,
    ) -> Result<bool, InventoryError> {
        let lens = self.nodes[id.0].lens;
        logic::contains_quantity(&self.fabric, &self.lenses, lens, Some(stack), quantity)
    }

    /// Whether any slot holds `kind`; `None` searches for an empty slot.
    pub fn contains_kind(
        &self,
        id: AdapterId,
        kind: Option<ItemId>,
    ) -> Result<bool, InventoryError> {
        let lens = self.nodes[id.0].lens;
        logic::contains_kind(&self.fabric, &self.lenses, lens, kind)
    }

    /// Number of occupied slots.
    pub fn count_stacks(&self, id: AdapterId) -> Result<usize, InventoryError> {
        let lens = self.nodes[id.0].lens;
        logic::count_stacks(&self.fabric, &self.lenses, lens)
    }

    /// Total item quantity across occupied slots.
    pub fn count_items(&self, id: AdapterId) -> Result<u32, InventoryError> {
        let lens = self.nodes[id.0].lens;
        logic::count_items(&self.fabric, &self.lenses, lens)
    }

    /// Number of distinct real slots addressable through `id`.
    pub fn capacity(&self, id: AdapterId) -> usize {
        logic::capacity(&self.lenses, self.nodes[id.0].lens)
    }

    /// Properties of `child` as recorded by `parent`'s lens, filtered by
    /// kind. An unrecognized child yields an empty list, never an error.
    pub fn properties_of(
        &self,
        parent: AdapterId,
        child: AdapterId,
        kind: PropertyKind,
    ) -> Vec<Property> {
        logic::properties_of(
            &self.lenses,
            self.nodes[parent.0].lens,
            self.nodes[child.0].lens,
            kind,
        )
    }
}
