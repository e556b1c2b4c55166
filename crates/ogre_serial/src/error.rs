use alloc::borrow::Cow;
use alloc::string::String;

use thiserror::Error;

use crate::identity::Token;

/// Result alias used throughout the crate.
pub type Result<T, E = SerialError> = core::result::Result<T, E>;

// -----------------------------------------------------------------------------
// SerialError

/// Every way a save or load can fail.
///
/// A failure aborts the current call. The medium is left in an unspecified
/// state and the destination objects of a failed load are partially
/// written; both must be discarded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerialError {
    /// The stream is malformed or truncated.
    #[error("corrupt data at byte {position}: {reason}")]
    CorruptData {
        position: u64,
        reason: Cow<'static, str>,
    },

    /// A back-reference names a token that was never defined.
    #[error("reference to undefined object token {token}")]
    UnresolvedReference { token: Token },

    /// A polymorphic type tag is not registered in this process.
    #[error("type tag `{tag}` is not registered{}", fmt_token(.token))]
    UnknownType { tag: String, token: Option<Token> },

    /// The tag is registered, but cannot be reached through this base.
    #[error("type tag `{tag}` is not registered for base `{base}`")]
    TypeMismatch { tag: String, base: &'static str },

    /// A back-reference was loaded through a different pointer type than
    /// the one its object was created with.
    #[error("object token {token} cannot be loaded as `{expected}`")]
    PointerMismatch {
        token: Token,
        expected: &'static str,
    },

    /// A traced stream carries a different member tag than expected.
    #[error("expected tag `{expected}` but found `{found}` at byte {position}")]
    TagMismatch {
        expected: String,
        found: String,
        position: u64,
    },

    /// An identity session ran out of object tokens.
    #[error("more than {} objects in one identity session", u32::MAX)]
    TooManyObjects,

    /// The pointee is mutably borrowed elsewhere.
    #[error("object token {token} is already mutably borrowed")]
    BorrowConflict { token: Token },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn fmt_token(token: &Option<Token>) -> String {
    match token {
        Some(token) => alloc::format!(" (object token {token})"),
        None => String::new(),
    }
}

impl SerialError {
    #[inline]
    pub(crate) fn corrupt(position: u64, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::CorruptData {
            position,
            reason: reason.into(),
        }
    }

    /// Attaches `token` to an [`UnknownType`](Self::UnknownType) error.
    pub(crate) fn with_token(self, token: Token) -> Self {
        match self {
            Self::UnknownType { tag, token: None } => Self::UnknownType {
                tag,
                token: Some(token),
            },
            other => other,
        }
    }
}
