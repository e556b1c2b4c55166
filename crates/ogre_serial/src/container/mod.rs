//! [`Persist`](crate::Persist) for containers.
//!
//! | container | layout |
//! |---|---|
//! | `Vec<T>`, `VecDeque<T>` | length, elements |
//! | `[T; N]` | length (checked against `N`), elements |
//! | [`Matrix<T>`] | rows, columns, elements in row-major order |
//! | `BTreeMap`, `HashMap` (std and hashbrown) | length, key/value pairs |
//! | `BTreeSet`, `HashSet` (std and hashbrown) | length, elements |
//! | tuples of 1 to 6 members | members in order |
//! | `Option<T>` | presence flag, then the value |
//! | `Box<T>` | the value |
//! | [`ByteBuf`] | one raw buffer |
//! | `()` | nothing |
//!
//! Elements are written without trace tags. Loading clears the destination
//! first and builds each element with [`Default`], so the destination's
//! previous size has no influence on the result.
//!
//! Room is reserved for at most as many elements as there are bytes left
//! in the medium, so a corrupt length cannot force a huge allocation.

// -----------------------------------------------------------------------------
// Modules

mod map;
mod matrix;
mod sequence;
mod tuple;
mod wrapper;

// -----------------------------------------------------------------------------
// Exports

pub use matrix::Matrix;
pub use wrapper::ByteBuf;

use crate::error::Result;
use crate::persist::Persist;
use crate::serializer::Serializer;

// Loads one default-constructed element.
#[inline]
fn load_element<T: Persist + Default>(s: &mut Serializer<'_>) -> Result<T> {
    let mut element = T::default();
    element.load(s)?;
    Ok(element)
}
