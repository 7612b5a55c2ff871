//! Transaction results for bulk inventory mutations.

use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

/// Classification of a bulk mutation's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// At least one item was moved.
    Success,
    /// No items were moved.
    Failure,
    /// An unexpected fault aborted the operation partway. The backing store
    /// may be partially mutated; committed sub-steps are not rolled back.
    Error,
}

/// Outcome of an insert/append style operation.
///
/// The `rejected` list is authoritative for what the caller still holds: a
/// `Failure` or `Error` result never silently drops items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Overall classification.
    pub kind: TransactionKind,
    /// Stacks that previously occupied slots written by the operation.
    pub replaced: Vec<ItemStack>,
    /// Stacks the operation could not place.
    pub rejected: Vec<ItemStack>,
}

impl TransactionResult {
    /// A successful result with no replaced or rejected stacks yet.
    pub fn success() -> Self {
        Self {
            kind: TransactionKind::Success,
            replaced: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// A failure that moved nothing and rejects the entire input.
    pub fn failure_rejecting(stack: ItemStack) -> Self {
        Self {
            kind: TransactionKind::Failure,
            replaced: Vec::new(),
            rejected: vec![stack],
        }
    }

    /// An aborted operation rejecting the entire input.
    pub fn error_rejecting(stack: ItemStack) -> Self {
        Self {
            kind: TransactionKind::Error,
            replaced: Vec::new(),
            rejected: vec![stack],
        }
    }

    /// Record a stack displaced by the operation.
    pub fn replace(&mut self, stack: ItemStack) {
        self.replaced.push(stack);
    }

    /// Record a stack the operation could not place.
    pub fn reject(&mut self, stack: ItemStack) {
        self.rejected.push(stack);
    }

    /// Whether the operation moved at least one item.
    pub fn is_success(&self) -> bool {
        self.kind == TransactionKind::Success
    }

    /// Total quantity across all rejected stacks.
    pub fn rejected_quantity(&self) -> u32 {
        self.rejected.iter().map(|stack| stack.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_starts_clean() {
        let result = TransactionResult::success();
        assert!(result.is_success());
        assert!(result.replaced.is_empty());
        assert!(result.rejected.is_empty());
        assert_eq!(result.rejected_quantity(), 0);
    }

    #[test]
    fn failure_rejects_whole_input() {
        let result = TransactionResult::failure_rejecting(ItemStack::new(1, 40));
        assert!(!result.is_success());
        assert_eq!(result.kind, TransactionKind::Failure);
        assert_eq!(result.rejected_quantity(), 40);
    }

    #[test]
    fn rejected_quantity_sums_stacks() {
        let mut result = TransactionResult::success();
        result.reject(ItemStack::new(1, 10));
        result.reject(ItemStack::new(2, 5));
        assert_eq!(result.rejected_quantity(), 15);
    }
}
