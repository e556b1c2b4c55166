use alloc::boxed::Box;

use crate::config::{Format, SerializerConfig, TraceMode};
use crate::medium::{Medium, MemoryMedium};
use crate::registry::TypeRegistry;
use crate::serializer::Serializer;

/// Configures a [`Serializer`].
///
/// Unset options default to an empty [`MemoryMedium`], the default
/// [`SerializerConfig`] and [`TypeRegistry::global`].
///
/// # Examples
///
/// ```
/// use ogre_serial::{Format, Serializer, TraceMode, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// let mut s = Serializer::builder()
///     .format(Format::Text)
///     .trace(TraceMode::TraceError)
///     .registry(&registry)
///     .build();
///
/// s.save("answer", &42_u32).unwrap();
/// assert_eq!(s.buffer().unwrap(), b"6\nanswer\n42\n");
/// ```
#[must_use]
pub struct SerializerBuilder<'r> {
    medium: Option<Box<dyn Medium>>,
    config: SerializerConfig,
    registry: Option<&'r TypeRegistry>,
}

impl SerializerBuilder<'static> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            medium: None,
            config: SerializerConfig::new(),
            registry: None,
        }
    }
}

impl<'r> SerializerBuilder<'r> {
    /// Sets the byte sink and source.
    #[inline]
    pub fn medium(mut self, medium: impl Medium + 'static) -> Self {
        self.medium = Some(Box::new(medium));
        self
    }

    /// Replaces the whole configuration.
    #[inline]
    pub fn config(mut self, config: SerializerConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn format(mut self, format: Format) -> Self {
        self.config.format = format;
        self
    }

    #[inline]
    pub fn trace(mut self, trace: TraceMode) -> Self {
        self.config.trace = trace;
        self
    }

    /// Uses `registry` instead of the process-wide one.
    #[inline]
    pub fn registry<'a>(self, registry: &'a TypeRegistry) -> SerializerBuilder<'a> {
        SerializerBuilder {
            medium: self.medium,
            config: self.config,
            registry: Some(registry),
        }
    }

    pub fn build(self) -> Serializer<'r> {
        let medium = self
            .medium
            .unwrap_or_else(|| Box::new(MemoryMedium::new()));
        let registry = match self.registry {
            Some(registry) => registry,
            None => TypeRegistry::global(),
        };
        Serializer::from_parts(medium, self.config, registry)
    }
}
