//! Ordinal addressing over fabrics.
//!
//! A lens maps a contiguous ordinal range `[0, slot_count)` onto real fabric
//! indices. Lenses nest: a composite delegates its ordinals through spanning
//! children, an indexed lens covers a contiguous run, and slot lenses are the
//! one-slot leaves. Topology is immutable once built and lives in a
//! [`LensTree`] arena; parent/child links are ids, never references, so the
//! self-referential graph needs no weak pointers.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use coffer_core::{InventoryError, ItemId, ItemStack, DEFAULT_STACK_SIZE};

use crate::fabric::Fabric;
use crate::property::Property;

/// Stable identifier of a lens node within its [`LensTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LensId(pub(crate) usize);

/// Predicate over item stacks used by filtering slot lenses.
pub type StackFilter = Arc<dyn Fn(&ItemStack) -> bool + Send + Sync>;

/// Predicate over item types used by filtering slot lenses.
pub type TypeFilter = Arc<dyn Fn(ItemId) -> bool + Send + Sync>;

/// Predicates gating writes through a filtering slot lens.
///
/// A write is accepted only if the value satisfies both predicates. Clearing
/// a slot (writing `None`) is never filtered, so poll and clear always work
/// on filtered slots.
#[derive(Clone)]
pub struct SlotFilter {
    stack: StackFilter,
    kind: TypeFilter,
}

impl SlotFilter {
    /// Build a filter from explicit predicates.
    pub fn new(stack: StackFilter, kind: TypeFilter) -> Self {
        Self { stack, kind }
    }

    /// Accept only stacks whose type is one of `kinds`.
    pub fn allowing_kinds(kinds: &[ItemId]) -> Self {
        let allowed: Vec<ItemId> = kinds.to_vec();
        Self {
            stack: Arc::new(|_| true),
            kind: Arc::new(move |id| allowed.contains(&id)),
        }
    }

    /// Reject stacks whose type is one of `kinds`.
    pub fn rejecting_kinds(kinds: &[ItemId]) -> Self {
        let rejected: Vec<ItemId> = kinds.to_vec();
        Self {
            stack: Arc::new(|_| true),
            kind: Arc::new(move |id| !rejected.contains(&id)),
        }
    }

    /// Evaluate both predicates against `stack`.
    pub fn accepts(&self, stack: &ItemStack) -> bool {
        (self.kind)(stack.item_id) && (self.stack)(stack)
    }
}

impl fmt::Debug for SlotFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotFilter").finish_non_exhaustive()
    }
}

/// The closed set of lens shapes.
#[derive(Debug, Clone)]
pub enum LensKind {
    /// Contiguous run of `len` fabric slots starting at real index `base`.
    Indexed {
        /// First real index covered.
        base: usize,
        /// Number of slots covered.
        len: usize,
    },
    /// A single slot at a fixed real index.
    Slot {
        /// The covered real index.
        index: usize,
    },
    /// A single slot whose writes are gated by predicates.
    FilteringSlot {
        /// The covered real index.
        index: usize,
        /// Predicates evaluated before the fabric is touched.
        filter: SlotFilter,
    },
    /// The zero-slot sentinel: accepts no reads or writes, returns empty
    /// results for every query. A value, not an error state.
    Empty,
    /// Ordinals delegated through the spanning children in order.
    Composite {
        /// Total ordinals across the spanning children.
        slot_count: usize,
    },
}

/// One lens in a [`LensTree`].
#[derive(Debug, Clone)]
pub struct LensNode {
    kind: LensKind,
    parent: Option<LensId>,
    children: Vec<LensId>,
    spanning: Vec<LensId>,
    properties: Vec<(usize, Property)>,
}

impl LensNode {
    fn new(kind: LensKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            spanning: Vec::new(),
            properties: Vec::new(),
        }
    }
}

/// Arena of immutable lens nodes forming one addressing topology.
#[derive(Debug, Clone, Default)]
pub struct LensTree {
    nodes: Vec<LensNode>,
    // One shared slot lens per real index, reused across views so aliasing
    // children resolve to the same leaf.
    slot_lenses: Vec<Option<LensId>>,
}

impl LensTree {
    /// A tree holding a single flat indexed lens over `len` slots.
    pub fn indexed(len: usize) -> (LensTree, LensId) {
        let mut builder = LensTreeBuilder::new();
        let root = builder.indexed(0, len);
        (builder.finish(), root)
    }

    /// A tree holding only the zero-slot sentinel.
    pub fn empty() -> (LensTree, LensId) {
        let mut builder = LensTreeBuilder::new();
        let root = builder.empty();
        (builder.finish(), root)
    }

    fn node(&self, id: LensId) -> &LensNode {
        &self.nodes[id.0]
    }

    /// The shape of the lens.
    pub fn kind(&self, id: LensId) -> &LensKind {
        &self.node(id).kind
    }

    /// Number of ordinals this lens addresses.
    pub fn slot_count(&self, id: LensId) -> usize {
        match self.node(id).kind {
            LensKind::Indexed { len, .. } => len,
            LensKind::Slot { .. } | LensKind::FilteringSlot { .. } => 1,
            LensKind::Empty => 0,
            LensKind::Composite { slot_count } => slot_count,
        }
    }

    /// The lens's parent, if it has one.
    pub fn parent(&self, id: LensId) -> Option<LensId> {
        self.node(id).parent
    }

    /// All children in insertion order: spanning children first, then
    /// aliasing views.
    pub fn children(&self, id: LensId) -> &[LensId] {
        &self.node(id).children
    }

    /// Children that together cover every ordinal exactly once.
    pub fn spanning_children(&self, id: LensId) -> &[LensId] {
        &self.node(id).spanning
    }

    /// Properties attached to the child at `child_index`.
    pub fn properties(&self, id: LensId, child_index: usize) -> Vec<&Property> {
        self.node(id)
            .properties
            .iter()
            .filter(|(index, _)| *index == child_index)
            .map(|(_, property)| property)
            .collect()
    }

    /// Whether `other` is a direct child of this lens.
    pub fn has(&self, id: LensId, other: LensId) -> bool {
        self.node(id).children.contains(&other)
    }

    /// Whether every real index this lens covers is also covered by one of
    /// `others`. The zero-slot sentinel is a subset of anything.
    pub fn is_subset_of(&self, id: LensId, others: &[LensId]) -> bool {
        let mut covered = BTreeSet::new();
        for &other in others {
            self.collect_slot_indices(other, &mut covered);
        }
        self.slot_indices(id).is_subset(&covered)
    }

    /// The set of real indices this lens covers.
    pub fn slot_indices(&self, id: LensId) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        self.collect_slot_indices(id, &mut out);
        out
    }

    fn collect_slot_indices(&self, id: LensId, out: &mut BTreeSet<usize>) {
        match &self.node(id).kind {
            LensKind::Indexed { base, len } => out.extend(*base..*base + *len),
            LensKind::Slot { index } | LensKind::FilteringSlot { index, .. } => {
                out.insert(*index);
            }
            LensKind::Empty => {}
            LensKind::Composite { .. } => {
                for &child in &self.node(id).spanning {
                    self.collect_slot_indices(child, out);
                }
            }
        }
    }

    /// Leaf slot lenses reachable through spanning children, in ordinal
    /// order.
    pub fn leaf_slots(&self, id: LensId) -> Vec<LensId> {
        let mut out = Vec::new();
        self.collect_leaf_slots(id, &mut out);
        out
    }

    fn collect_leaf_slots(&self, id: LensId, out: &mut Vec<LensId>) {
        match &self.node(id).kind {
            LensKind::Slot { .. } | LensKind::FilteringSlot { .. } => out.push(id),
            LensKind::Empty => {}
            LensKind::Indexed { .. } | LensKind::Composite { .. } => {
                for &child in &self.node(id).spanning {
                    self.collect_leaf_slots(child, out);
                }
            }
        }
    }

    /// Translate an ordinal into a real fabric index.
    pub fn real_index(&self, id: LensId, ordinal: usize) -> Result<usize, InventoryError> {
        let slots = self.slot_count(id);
        if ordinal >= slots {
            return Err(InventoryError::OrdinalOutOfRange { ordinal, slots });
        }
        match &self.node(id).kind {
            LensKind::Indexed { base, .. } => Ok(base + ordinal),
            LensKind::Slot { index } | LensKind::FilteringSlot { index, .. } => Ok(*index),
            // The range check already rejects every ordinal of a zero-slot lens.
            LensKind::Empty => Err(InventoryError::OrdinalOutOfRange { ordinal, slots: 0 }),
            LensKind::Composite { .. } => {
                let mut rel = ordinal;
                for &child in &self.node(id).spanning {
                    let len = self.slot_count(child);
                    if rel < len {
                        return self.real_index(child, rel);
                    }
                    rel -= len;
                }
                Err(InventoryError::OrdinalOutOfRange { ordinal, slots })
            }
        }
    }

    /// Read the stack behind `ordinal` as a defensive copy.
    ///
    /// The zero-slot sentinel reads as empty for every ordinal.
    pub fn stack<F: Fabric + ?Sized>(
        &self,
        fabric: &F,
        id: LensId,
        ordinal: usize,
    ) -> Result<Option<ItemStack>, InventoryError> {
        if matches!(self.node(id).kind, LensKind::Empty) {
            return Ok(None);
        }
        let index = self.real_index(id, ordinal)?;
        if index >= fabric.slot_count() {
            return Err(InventoryError::IndexOutOfBounds {
                index,
                size: fabric.slot_count(),
            });
        }
        Ok(fabric.stack(index).cloned())
    }

    /// Write `value` behind `ordinal`, returning whether it was accepted.
    ///
    /// Filtering happens at the lens boundary, before any fabric mutation, so
    /// a rejected write is observably a no-op. The zero-slot sentinel refuses
    /// every write.
    pub fn set_stack<F: Fabric + ?Sized>(
        &self,
        fabric: &mut F,
        id: LensId,
        ordinal: usize,
        value: Option<ItemStack>,
    ) -> Result<bool, InventoryError> {
        let slots = self.slot_count(id);
        match &self.node(id).kind {
            LensKind::Empty => Ok(false),
            _ if ordinal >= slots => Err(InventoryError::OrdinalOutOfRange { ordinal, slots }),
            LensKind::Indexed { base, .. } => self.write(fabric, base + ordinal, value),
            LensKind::Slot { index } => self.write(fabric, *index, value),
            LensKind::FilteringSlot { index, filter } => {
                if let Some(stack) = &value {
                    if !filter.accepts(stack) {
                        tracing::debug!(index, item_id = stack.item_id, "filtered slot refused write");
                        return Ok(false);
                    }
                }
                self.write(fabric, *index, value)
            }
            LensKind::Composite { .. } => {
                let mut rel = ordinal;
                for &child in &self.node(id).spanning {
                    let len = self.slot_count(child);
                    if rel < len {
                        return self.set_stack(fabric, child, rel, value);
                    }
                    rel -= len;
                }
                Err(InventoryError::OrdinalOutOfRange { ordinal, slots })
            }
        }
    }

    fn write<F: Fabric + ?Sized>(
        &self,
        fabric: &mut F,
        index: usize,
        value: Option<ItemStack>,
    ) -> Result<bool, InventoryError> {
        if index >= fabric.slot_count() {
            return Err(InventoryError::IndexOutOfBounds {
                index,
                size: fabric.slot_count(),
            });
        }
        Ok(fabric.set_stack(index, value))
    }

    /// Effective per-slot cap for transfers through this lens: the minimum of
    /// the fabric's native cap and the engine default. Zero for lenses with
    /// no slots.
    pub fn max_stack_size<F: Fabric + ?Sized>(&self, fabric: &F, id: LensId) -> u32 {
        if self.slot_count(id) == 0 {
            return 0;
        }
        fabric.max_stack_size().min(DEFAULT_STACK_SIZE)
    }

    /// The shared slot lens for `real_index`, if one was built.
    pub fn slot_lens(&self, real_index: usize) -> Option<LensId> {
        self.slot_lenses.get(real_index).copied().flatten()
    }

    pub(crate) fn push_empty(&mut self) -> LensId {
        let id = LensId(self.nodes.len());
        self.nodes.push(LensNode::new(LensKind::Empty));
        id
    }
}

/// Builds a [`LensTree`] bottom-up.
///
/// Slot lenses are shared by real index: two views covering the same slot
/// resolve to the same leaf lens, so aliasing is visible in the topology.
#[derive(Debug, Default)]
pub struct LensTreeBuilder {
    tree: LensTree,
}

impl LensTreeBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: LensNode) -> LensId {
        let id = LensId(self.tree.nodes.len());
        self.tree.nodes.push(node);
        id
    }

    fn adopt(&mut self, parent: LensId, child: LensId) {
        // First creator wins: a slot shared with a later aliasing view keeps
        // its original parent.
        let node = &mut self.tree.nodes[child.0];
        if node.parent.is_none() {
            node.parent = Some(parent);
        }
    }

    /// The shared slot lens for `index`, created on first use.
    pub fn slot(&mut self, index: usize) -> LensId {
        if let Some(existing) = self.tree.slot_lens(index) {
            return existing;
        }
        let id = self.push(LensNode::new(LensKind::Slot { index }));
        if self.tree.slot_lenses.len() <= index {
            self.tree.slot_lenses.resize(index + 1, None);
        }
        self.tree.slot_lenses[index] = Some(id);
        id
    }

    /// A filtering slot lens over `index`. Never shared: each call builds a
    /// fresh gate.
    pub fn filtering_slot(&mut self, index: usize, filter: SlotFilter) -> LensId {
        self.push(LensNode::new(LensKind::FilteringSlot { index, filter }))
    }

    /// The zero-slot sentinel.
    pub fn empty(&mut self) -> LensId {
        self.push(LensNode::new(LensKind::Empty))
    }

    /// An indexed lens over `[base, base + len)` with one spanning slot
    /// child per covered index, each annotated with its position.
    pub fn indexed(&mut self, base: usize, len: usize) -> LensId {
        let id = self.push(LensNode::new(LensKind::Indexed { base, len }));
        for offset in 0..len {
            let slot = self.slot(base + offset);
            self.adopt(id, slot);
            let node = &mut self.tree.nodes[id.0];
            node.children.push(slot);
            node.spanning.push(slot);
            node.properties.push((offset, Property::SlotIndex(offset)));
        }
        id
    }

    /// A composite lens whose ordinals run through `parts` in order.
    pub fn composite(&mut self, parts: Vec<LensId>) -> LensId {
        let slot_count = parts.iter().map(|&part| self.tree.slot_count(part)).sum();
        let id = self.push(LensNode::new(LensKind::Composite { slot_count }));
        for part in parts {
            self.adopt(id, part);
            let node = &mut self.tree.nodes[id.0];
            node.children.push(part);
            node.spanning.push(part);
        }
        id
    }

    /// Attach `child` to `parent` as an aliasing view: it joins the child
    /// list without contributing ordinals. Returns the child's index.
    pub fn alias_child(&mut self, parent: LensId, child: LensId) -> usize {
        self.adopt(parent, child);
        let node = &mut self.tree.nodes[parent.0];
        node.children.push(child);
        node.children.len() - 1
    }

    /// Attach a property to the child at `child_index` of `parent`.
    pub fn set_property(&mut self, parent: LensId, child_index: usize, property: Property) {
        self.tree.nodes[parent.0]
            .properties
            .push((child_index, property));
    }

    /// Freeze the topology.
    pub fn finish(self) -> LensTree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::SlotFabric;

    fn fabric(slots: usize) -> SlotFabric {
        SlotFabric::new("Test", slots)
    }

    #[test]
    fn indexed_translation() {
        let (tree, root) = LensTree::indexed(9);
        assert_eq!(tree.slot_count(root), 9);
        assert_eq!(tree.real_index(root, 0).unwrap(), 0);
        assert_eq!(tree.real_index(root, 8).unwrap(), 8);
        assert_eq!(
            tree.real_index(root, 9),
            Err(InventoryError::OrdinalOutOfRange {
                ordinal: 9,
                slots: 9
            })
        );
    }

    #[test]
    fn indexed_lens_has_slot_children() {
        let (tree, root) = LensTree::indexed(3);
        assert_eq!(tree.children(root).len(), 3);
        assert_eq!(tree.spanning_children(root).len(), 3);
        for (ordinal, &child) in tree.spanning_children(root).iter().enumerate() {
            assert_eq!(tree.slot_count(child), 1);
            assert_eq!(tree.real_index(child, 0).unwrap(), ordinal);
            assert_eq!(tree.parent(child), Some(root));
        }
    }

    #[test]
    fn composite_delegates_through_spanning_children() {
        let mut builder = LensTreeBuilder::new();
        let top = builder.indexed(0, 27);
        let bottom = builder.indexed(27, 27);
        let root = builder.composite(vec![top, bottom]);
        let tree = builder.finish();

        assert_eq!(tree.slot_count(root), 54);
        assert_eq!(tree.real_index(root, 0).unwrap(), 0);
        assert_eq!(tree.real_index(root, 27).unwrap(), 27);
        assert_eq!(tree.real_index(root, 53).unwrap(), 53);
        assert!(tree.real_index(root, 54).is_err());
        assert_eq!(tree.parent(top), Some(root));
    }

    #[test]
    fn real_index_is_injective_over_spanning_coverage() {
        let mut builder = LensTreeBuilder::new();
        let left = builder.indexed(0, 5);
        let right = builder.indexed(5, 4);
        let root = builder.composite(vec![left, right]);
        let tree = builder.finish();

        let mut seen = BTreeSet::new();
        for ordinal in 0..tree.slot_count(root) {
            assert!(seen.insert(tree.real_index(root, ordinal).unwrap()));
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn aliasing_view_shares_slot_lenses() {
        let mut builder = LensTreeBuilder::new();
        let root = builder.indexed(0, 36);
        let grid = builder.indexed(0, 9);
        builder.alias_child(root, grid);
        let tree = builder.finish();

        // Both views resolve ordinal 0 to the same shared leaf.
        assert_eq!(tree.spanning_children(root)[0], tree.spanning_children(grid)[0]);
        assert_eq!(tree.children(root).len(), 37);
        assert!(tree.has(root, grid));
        assert!(tree.is_subset_of(grid, &[root]));
        assert!(!tree.is_subset_of(root, &[grid]));
    }

    #[test]
    fn lens_reads_and_writes_through_fabric() {
        let (tree, root) = LensTree::indexed(9);
        let mut fabric = fabric(9);

        assert!(tree.set_stack(&mut fabric, root, 4, Some(ItemStack::new(7, 12))).unwrap());
        assert_eq!(
            tree.stack(&fabric, root, 4).unwrap().map(|s| s.count),
            Some(12)
        );
        assert!(tree.stack(&fabric, root, 0).unwrap().is_none());
    }

    #[test]
    fn filtering_slot_rejects_before_fabric_mutation() {
        let mut builder = LensTreeBuilder::new();
        let gate = builder.filtering_slot(0, SlotFilter::rejecting_kinds(&[9]));
        let root = builder.composite(vec![gate]);
        let tree = builder.finish();
        let mut fabric = fabric(1);

        // Rejected type: silent refusal, slot untouched.
        assert!(!tree.set_stack(&mut fabric, root, 0, Some(ItemStack::new(9, 1))).unwrap());
        assert!(fabric.stack(0).is_none());

        // Accepted type passes through the same path.
        assert!(tree.set_stack(&mut fabric, root, 0, Some(ItemStack::new(1, 1))).unwrap());
        assert_eq!(fabric.stack(0).map(|s| s.item_id), Some(1));

        // Clearing is never filtered.
        assert!(tree.set_stack(&mut fabric, root, 0, None).unwrap());
        assert!(fabric.stack(0).is_none());
    }

    #[test]
    fn empty_lens_is_a_sentinel_not_an_error() {
        let (tree, root) = LensTree::empty();
        let mut fabric = fabric(0);

        assert_eq!(tree.slot_count(root), 0);
        assert_eq!(tree.stack(&fabric, root, 0).unwrap(), None);
        assert!(!tree.set_stack(&mut fabric, root, 0, Some(ItemStack::new(1, 1))).unwrap());
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.max_stack_size(&fabric, root), 0);
        assert!(tree.is_subset_of(root, &[]));
    }

    #[test]
    fn max_stack_size_is_min_of_fabric_and_default() {
        let (tree, root) = LensTree::indexed(3);
        let capped = SlotFabric::with_max_stack("Capped", 3, 16);
        assert_eq!(tree.max_stack_size(&capped, root), 16);

        let wide = SlotFabric::with_max_stack("Wide", 3, 1024);
        assert_eq!(tree.max_stack_size(&wide, root), DEFAULT_STACK_SIZE);
    }

    #[test]
    fn slot_index_properties_are_attached() {
        let (tree, root) = LensTree::indexed(2);
        let props = tree.properties(root, 1);
        assert_eq!(props, vec![&Property::SlotIndex(1)]);
    }

    #[test]
    fn malformed_lens_faults_on_fabric_bounds() {
        // A lens wider than its fabric is a contract violation, surfaced as
        // an explicit error rather than silent truncation.
        let (tree, root) = LensTree::indexed(9);
        let mut small = fabric(3);
        assert_eq!(
            tree.stack(&small, root, 5),
            Err(InventoryError::IndexOutOfBounds { index: 5, size: 3 })
        );
        assert_eq!(
            tree.set_stack(&mut small, root, 5, None),
            Err(InventoryError::IndexOutOfBounds { index: 5, size: 3 })
        );
    }
}
