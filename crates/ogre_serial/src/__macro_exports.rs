//! Items used by expanded macros. Not public API.

use alloc::format;

use crate::error::SerialError;

#[cfg(feature = "auto_register")]
pub use crate::registry::AutoRegistration;
#[cfg(feature = "auto_register")]
pub use inventory;

/// Error for a stored enum variant index the type does not have.
#[cold]
pub fn unknown_variant(position: u64, variant: u32, type_name: &'static str) -> SerialError {
    SerialError::corrupt(
        position,
        format!("variant index {variant} is out of range for `{type_name}`"),
    )
}
