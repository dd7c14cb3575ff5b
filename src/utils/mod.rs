use crate::error::{Error, Result};

pub fn require(predicate: bool, err: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        Err(Error::format(err))
    }
}

/// Rounds n up to a multiple of align (which must be a power of two). Returns None on
/// overflow, which only happens with garbage sizes.
pub fn align_up(n: u64, align: u64) -> Option<u64> {
    debug_assert!(align.is_power_of_two());
    n.checked_add(align - 1).map(|n| n & !(align - 1))
}
