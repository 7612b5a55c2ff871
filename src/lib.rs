//! Coffer: a lens-based inventory indirection engine.
//!
//! Heterogeneous backing containers are adapted into a uniform slot space by
//! a fabric, addressed through composable lenses, and exposed as navigable
//! inventory trees with transactional bulk transfers.

pub use coffer_core::*;
pub use coffer_inventory::*;
