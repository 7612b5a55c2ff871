//! Error taxonomy for the indirection engine.
//!
//! Only contract violations surface as errors. Rejected writes and absent
//! results are ordinary return values (`bool` acceptance flags, `Option`,
//! empty collections), never `Err`.

use thiserror::Error;

/// Contract violations raised by fabric, lens, and adapter accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// A real index fell outside the fabric's slot range.
    #[error("slot index {index} out of bounds for fabric of size {size}")]
    IndexOutOfBounds {
        /// The offending real index.
        index: usize,
        /// The fabric's slot count.
        size: usize,
    },

    /// An ordinal fell outside a lens's slot range.
    #[error("ordinal {ordinal} out of range for lens with {slots} slots")]
    OrdinalOutOfRange {
        /// The offending ordinal.
        ordinal: usize,
        /// The lens's slot count.
        slots: usize,
    },

    /// An adapter child query used an index with no child behind it.
    #[error("no child at index {index} (lens has {children} children)")]
    NoSuchChild {
        /// The requested child index.
        index: usize,
        /// How many children the lens actually has.
        children: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_name_the_bounds() {
        let err = InventoryError::OrdinalOutOfRange {
            ordinal: 9,
            slots: 9,
        };
        assert_eq!(
            err.to_string(),
            "ordinal 9 out of range for lens with 9 slots"
        );
    }
}
