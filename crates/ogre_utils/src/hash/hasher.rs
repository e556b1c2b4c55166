//! `FixedHasher` and `NoOpHasher`.
//!
//! `FixedHasher` is `foldhash` with a seed baked in, so two runs of the same
//! binary hash identically. `NoOpHasher` passes a `u64` straight through and
//! is meant for keys that already are well distributed hashes, such as
//! [`TypeId`](core::any::TypeId).

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6F67_7265_5EED_1A7B);

/// Hasher produced by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// Hash state with a fixed seed.
///
/// Object addresses are aligned, so their low bits carry no information;
/// this state mixes them properly, unlike [`NoOpHashState`].
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use ogre_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one(0x1000_usize);
/// let b = FixedHashState.hash_one(0x1000_usize);
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHasher

/// A hasher returning the last `u64` written to it.
///
/// Writes of other widths fold their bytes into the state, so a single
/// `write_u32(n)` and a single `write_u64(n)` agree.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Hash state producing [`NoOpHasher`].
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use ogre_utils::hash::NoOpHashState;
///
/// assert_eq!(NoOpHashState.hash_one(7_u64), 7);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}
