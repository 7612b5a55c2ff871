//! Stateless transfer algorithms over a `(fabric, lens)` pair.
//!
//! Every operation is a single pass over lens ordinals with no carried
//! cursor; worst-case cost is linear in slot count. The algorithms never
//! touch adapter caches — concrete adapters resolve their fabric and lens,
//! then delegate here.
//!
//! Contract violations (a lens addressing outside its fabric) propagate as
//! [`InventoryError`] from the read-only operations and are converted to
//! [`TransactionKind::Error`] results by the bulk mutations. In the error
//! case the fabric may be left partially mutated by sub-steps that committed
//! before the fault; committed writes are not rolled back.

use coffer_core::{
    InventoryError, ItemId, ItemStack, TransactionKind, TransactionResult,
};

use crate::fabric::Fabric;
use crate::lens::{LensId, LensTree};
use crate::property::{Property, PropertyKind};

/// Find the first occupied slot, optionally clearing it, and return a
/// defensive copy of its stack.
///
/// `remove = true` is sequential poll, `remove = false` sequential peek.
/// Slots that refuse the clearing write are skipped.
pub fn find_stack<F: Fabric + ?Sized>(
    fabric: &mut F,
    lenses: &LensTree,
    lens: LensId,
    remove: bool,
) -> Result<Option<ItemStack>, InventoryError> {
    for ordinal in 0..lenses.slot_count(lens) {
        let stack = match lenses.stack(fabric, lens, ordinal)? {
            Some(stack) => stack,
            None => continue,
        };
        if remove && !lenses.set_stack(fabric, lens, ordinal, None)? {
            continue;
        }
        return Ok(Some(stack));
    }
    Ok(None)
}

/// Accumulate up to `limit` items across slots holding the first matching
/// type; later slots of other types are skipped.
///
/// With `remove`, consumed slots are emptied or decremented. Defines
/// poll/peek with a limit.
pub fn find_stacks<F: Fabric + ?Sized>(
    fabric: &mut F,
    lenses: &LensTree,
    lens: LensId,
    mut limit: u32,
    remove: bool,
) -> Result<Option<ItemStack>, InventoryError> {
    let mut result: Option<ItemStack> = None;

    for ordinal in 0..lenses.slot_count(lens) {
        let slot_stack = match lenses.stack(fabric, lens, ordinal)? {
            Some(stack) if stack.count > 0 => stack,
            _ => continue,
        };
        if let Some(accumulated) = &result {
            if !accumulated.matches(&slot_stack) {
                continue;
            }
        }

        let pull = slot_stack.count.min(limit);
        match &mut result {
            Some(accumulated) => accumulated.count += pull,
            None => result = Some(slot_stack.cloned_with_count(pull)),
        }
        limit -= pull;

        if remove {
            if pull >= slot_stack.count {
                lenses.set_stack(fabric, lens, ordinal, None)?;
            } else {
                let rest = slot_stack.cloned_with_count(slot_stack.count - pull);
                lenses.set_stack(fabric, lens, ordinal, Some(rest))?;
            }
        }

        if limit == 0 {
            break;
        }
    }

    Ok(result)
}

/// Insert by spreading clones across slots, bounded by the effective max
/// stack size, replacing previous occupants.
///
/// A zero-slot lens fails immediately with the whole stack rejected. A fault
/// mid-walk stops the walk and reports [`TransactionKind::Error`] with the
/// original stack rejected; slots written before the fault stay written.
pub fn insert_sequential<F: Fabric + ?Sized>(
    fabric: &mut F,
    lenses: &LensTree,
    lens: LensId,
    stack: &ItemStack,
) -> TransactionResult {
    if lenses.slot_count(lens) == 0 {
        return TransactionResult::failure_rejecting(stack.clone());
    }
    match insert_stack(fabric, lenses, lens, stack) {
        Ok(result) => result,
        Err(error) => {
            tracing::debug!(%error, "insert aborted mid-walk");
            TransactionResult::error_rejecting(stack.clone())
        }
    }
}

fn insert_stack<F: Fabric + ?Sized>(
    fabric: &mut F,
    lenses: &LensTree,
    lens: LensId,
    stack: &ItemStack,
) -> Result<TransactionResult, InventoryError> {
    let mut result = TransactionResult::success();
    let max_stack = lenses.max_stack_size(fabric, lens).min(stack.max_stack_size());
    let mut remaining = stack.count;

    for ordinal in 0..lenses.slot_count(lens) {
        if remaining == 0 {
            break;
        }
        let previous = lenses.stack(fabric, lens, ordinal)?;
        let push = remaining.min(max_stack);
        if lenses.set_stack(fabric, lens, ordinal, Some(stack.cloned_with_count(push)))? {
            if let Some(previous) = previous {
                result.replace(previous);
            }
            remaining -= push;
        }
    }

    if remaining == stack.count && stack.count > 0 {
        // Nothing accepted the stack (every slot filtered it out).
        result.kind = TransactionKind::Failure;
    }
    if remaining > 0 {
        result.reject(stack.cloned_with_count(remaining));
    }
    tracing::trace!(
        item_id = stack.item_id,
        requested = stack.count,
        rejected = remaining,
        "insert finished"
    );
    Ok(result)
}

/// Append by merging into matching, non-full stacks first, then filling
/// empty slots.
///
/// On success the caller's `stack` quantity is updated in place to the
/// unconsumed remainder — callers must re-read it after the call. If zero
/// items were consumed the result is a failure rejecting the whole input.
/// Fault handling matches [`insert_sequential`].
pub fn append_sequential<F: Fabric + ?Sized>(
    fabric: &mut F,
    lenses: &LensTree,
    lens: LensId,
    stack: &mut ItemStack,
) -> TransactionResult {
    match append_stack(fabric, lenses, lens, stack) {
        Ok(result) => result,
        Err(error) => {
            tracing::debug!(%error, "append aborted mid-walk");
            TransactionResult::error_rejecting(stack.clone())
        }
    }
}

fn append_stack<F: Fabric + ?Sized>(
    fabric: &mut F,
    lenses: &LensTree,
    lens: LensId,
    stack: &mut ItemStack,
) -> Result<TransactionResult, InventoryError> {
    let mut result = TransactionResult::success();
    let max_stack = lenses.max_stack_size(fabric, lens).min(stack.max_stack_size());
    let mut remaining = stack.count;

    // Merge pass: top up matching stacks before touching empty slots.
    for ordinal in 0..lenses.slot_count(lens) {
        if remaining == 0 {
            break;
        }
        let occupant = match lenses.stack(fabric, lens, ordinal)? {
            Some(occupant) if occupant.matches(stack) => occupant,
            _ => continue,
        };
        // saturating_sub tolerates slots already above nominal capacity.
        let push = max_stack.saturating_sub(occupant.count).min(remaining);
        if push == 0 {
            continue;
        }
        let merged = occupant.cloned_with_count(occupant.count + push);
        if lenses.set_stack(fabric, lens, ordinal, Some(merged))? {
            remaining -= push;
        }
    }

    // Fill pass: fresh clones into empty slots.
    for ordinal in 0..lenses.slot_count(lens) {
        if remaining == 0 {
            break;
        }
        if lenses.stack(fabric, lens, ordinal)?.is_some() {
            continue;
        }
        let push = remaining.min(max_stack);
        if lenses.set_stack(fabric, lens, ordinal, Some(stack.cloned_with_count(push)))? {
            remaining -= push;
        }
    }

    if remaining == stack.count && stack.count > 0 {
        result.kind = TransactionKind::Failure;
        result.reject(stack.clone());
    } else {
        stack.count = remaining;
    }
    Ok(result)
}

/// Number of occupied slots.
pub fn count_stacks<F: Fabric + ?Sized>(
    fabric: &F,
    lenses: &LensTree,
    lens: LensId,
) -> Result<usize, InventoryError> {
    let mut stacks = 0;
    for ordinal in 0..lenses.slot_count(lens) {
        if lenses.stack(fabric, lens, ordinal)?.is_some() {
            stacks += 1;
        }
    }
    Ok(stacks)
}

/// Total item quantity across occupied slots.
pub fn count_items<F: Fabric + ?Sized>(
    fabric: &F,
    lenses: &LensTree,
    lens: LensId,
) -> Result<u32, InventoryError> {
    let mut items = 0;
    for ordinal in 0..lenses.slot_count(lens) {
        if let Some(stack) = lenses.stack(fabric, lens, ordinal)? {
            items += stack.count;
        }
    }
    Ok(items)
}

/// Number of distinct real slots the lens addresses.
pub fn capacity(lenses: &LensTree, lens: LensId) -> usize {
    lenses.slot_indices(lens).len()
}

/// Whether at least `quantity` matching items are present.
///
/// A `None` query searches for empty slots, each counting once; a `Some`
/// query counts the full quantity of every type-matching slot. Short-circuits
/// as soon as the running total reaches `quantity`.
pub fn contains_quantity<F: Fabric + ?Sized>(
    fabric: &F,
    lenses: &LensTree,
    lens: LensId,
    query: Option<&ItemStack>,
    quantity: u32,
) -> Result<bool, InventoryError> {
    let mut found: u32 = 0;
    for ordinal in 0..lenses.slot_count(lens) {
        match (lenses.stack(fabric, lens, ordinal)?, query) {
            (None, None) => {
                found += 1;
                if found >= quantity {
                    return Ok(true);
                }
            }
            (Some(occupant), Some(query)) if occupant.matches(query) => {
                found += occupant.count;
                if found >= quantity {
                    return Ok(true);
                }
            }
            _ => {}
        }
    }
    Ok(false)
}

/// Whether any slot holds an item of `kind`; a `None` kind matches the first
/// empty slot. Short-circuits on the first hit.
pub fn contains_kind<F: Fabric + ?Sized>(
    fabric: &F,
    lenses: &LensTree,
    lens: LensId,
    kind: Option<ItemId>,
) -> Result<bool, InventoryError> {
    for ordinal in 0..lenses.slot_count(lens) {
        match (lenses.stack(fabric, lens, ordinal)?, kind) {
            (None, None) => return Ok(true),
            (Some(occupant), Some(kind)) if occupant.item_id == kind => return Ok(true),
            _ => {}
        }
    }
    Ok(false)
}

/// Properties recorded for `child` in `parent`'s child list, filtered by
/// kind. An unrecognized child yields an empty list — absence means the
/// inventory is simply not a child here.
pub fn properties_of(
    lenses: &LensTree,
    parent: LensId,
    child: LensId,
    kind: PropertyKind,
) -> Vec<Property> {
    let children = lenses.children(parent);
    match children.iter().position(|&candidate| candidate == child) {
        Some(index) => lenses
            .properties(parent, index)
            .into_iter()
            .filter(|property| property.kind() == kind)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}
