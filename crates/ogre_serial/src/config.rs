//! Serializer configuration.
//!
//! The save side and the load side of a stream must agree on the whole
//! [`SerializerConfig`]; nothing about it is recorded in the stream itself.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Format

/// Encoding used for primitive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    /// Little-endian, fixed width.
    #[default]
    Binary,
    /// Newline separated decimal tokens, readable in an editor.
    Text,
}

// -----------------------------------------------------------------------------
// TraceMode

/// How much member-tag information a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraceMode {
    /// Tags are not written. Smallest streams, no drift detection.
    #[default]
    NoTrace,
    /// Tags are written before every value and checked on load.
    TraceError,
    /// Like [`TraceError`](Self::TraceError), and every trace point is
    /// also logged at `trace` level.
    TraceAll,
}

impl TraceMode {
    /// Whether tags are part of the stream.
    #[inline]
    pub const fn writes_tags(self) -> bool {
        !matches!(self, Self::NoTrace)
    }

    /// Whether trace points are logged.
    #[inline]
    pub const fn logs(self) -> bool {
        matches!(self, Self::TraceAll)
    }
}

// -----------------------------------------------------------------------------
// SerializerConfig

/// Options of a [`Serializer`](crate::Serializer).
///
/// # Examples
///
/// ```
/// use ogre_serial::{Format, SerializerConfig, TraceMode};
///
/// let config = SerializerConfig::new()
///     .with_format(Format::Text)
///     .with_trace(TraceMode::TraceError);
///
/// assert_eq!(config.format, Format::Text);
/// assert!(config.trace.writes_tags());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerializerConfig {
    pub format: Format,
    pub trace: TraceMode,
}

impl SerializerConfig {
    /// Binary format without tags.
    #[inline]
    pub const fn new() -> Self {
        Self {
            format: Format::Binary,
            trace: TraceMode::NoTrace,
        }
    }

    #[inline]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[inline]
    pub const fn with_trace(mut self, trace: TraceMode) -> Self {
        self.trace = trace;
        self
    }
}
