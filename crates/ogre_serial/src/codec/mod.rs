//! Primitive codec: scalars, strings and raw buffers.
//!
//! Every [`Primitive`] round-trips exactly in both [`Format`]s: integers by
//! value, floats bit for bit (signed zeros, infinities and NaN payloads
//! included).
//!
//! | value | [`Format::Binary`] | [`Format::Text`] |
//! |---|---|---|
//! | integers | little-endian, `usize`/`isize` as 64 bit | decimal token |
//! | `bool` | one byte, `0` or `1` | `0` or `1` |
//! | `char` | `u32` scalar value | `u32` scalar value |
//! | floats | IEEE bits | shortest exact decimal, NaN as `NaN:<hex bits>` |
//! | strings | `u64` length, UTF-8 bytes | `<len>\n<bytes>\n` |
//! | buffers | `u64` length, bytes | `<len>\n<hex>\n` |
//!
//! Text tokens end in a newline.

// -----------------------------------------------------------------------------
// Modules

mod binary;
mod text;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::config::Format;
use crate::error::{Result, SerialError};
use crate::medium::Medium;

// -----------------------------------------------------------------------------
// Primitive

/// A fixed-width scalar the codec encodes directly.
pub trait Primitive: Copy + 'static {
    fn encode(self, format: Format, medium: &mut dyn Medium) -> Result<()>;

    fn decode(format: Format, medium: &mut dyn Medium) -> Result<Self>;
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {$(
        impl Primitive for $ty {
            #[inline]
            fn encode(self, format: Format, medium: &mut dyn Medium) -> Result<()> {
                match format {
                    Format::Binary => binary::write(medium, self.to_le_bytes()),
                    Format::Text => text::write_token(medium, self),
                }
            }

            #[inline]
            fn decode(format: Format, medium: &mut dyn Medium) -> Result<Self> {
                match format {
                    Format::Binary => binary::read(medium).map(<$ty>::from_le_bytes),
                    Format::Text => text::parse(medium),
                }
            }
        }
    )*};
}

impl_integer!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

// Pointer-sized integers travel as 64 bit so 32 and 64 bit hosts agree.
macro_rules! impl_pointer_sized {
    ($ty:ty => $wide:ty) => {
        impl Primitive for $ty {
            #[inline]
            fn encode(self, format: Format, medium: &mut dyn Medium) -> Result<()> {
                (self as $wide).encode(format, medium)
            }

            fn decode(format: Format, medium: &mut dyn Medium) -> Result<Self> {
                let position = medium.read_position();
                let wide = <$wide>::decode(format, medium)?;
                <$ty>::try_from(wide).map_err(|_| {
                    SerialError::corrupt(
                        position,
                        format!("{wide} does not fit in {}", stringify!($ty)),
                    )
                })
            }
        }
    };
}

impl_pointer_sized!(usize => u64);
impl_pointer_sized!(isize => i64);

impl Primitive for bool {
    #[inline]
    fn encode(self, format: Format, medium: &mut dyn Medium) -> Result<()> {
        u8::from(self).encode(format, medium)
    }

    fn decode(format: Format, medium: &mut dyn Medium) -> Result<Self> {
        let position = medium.read_position();
        match u8::decode(format, medium)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerialError::corrupt(
                position,
                format!("{other} is not a valid bool"),
            )),
        }
    }
}

impl Primitive for char {
    #[inline]
    fn encode(self, format: Format, medium: &mut dyn Medium) -> Result<()> {
        u32::from(self).encode(format, medium)
    }

    fn decode(format: Format, medium: &mut dyn Medium) -> Result<Self> {
        let position = medium.read_position();
        let scalar = u32::decode(format, medium)?;
        char::from_u32(scalar).ok_or_else(|| {
            SerialError::corrupt(position, format!("{scalar:#x} is not a valid char"))
        })
    }
}

impl Primitive for f32 {
    #[inline]
    fn encode(self, format: Format, medium: &mut dyn Medium) -> Result<()> {
        match format {
            Format::Binary => binary::write(medium, self.to_bits().to_le_bytes()),
            Format::Text => text::write_f32(medium, self),
        }
    }

    #[inline]
    fn decode(format: Format, medium: &mut dyn Medium) -> Result<Self> {
        match format {
            Format::Binary => binary::read(medium).map(|b| f32::from_bits(u32::from_le_bytes(b))),
            Format::Text => text::read_f32(medium),
        }
    }
}

impl Primitive for f64 {
    #[inline]
    fn encode(self, format: Format, medium: &mut dyn Medium) -> Result<()> {
        match format {
            Format::Binary => binary::write(medium, self.to_bits().to_le_bytes()),
            Format::Text => text::write_f64(medium, self),
        }
    }

    #[inline]
    fn decode(format: Format, medium: &mut dyn Medium) -> Result<Self> {
        match format {
            Format::Binary => binary::read(medium).map(|b| f64::from_bits(u64::from_le_bytes(b))),
            Format::Text => text::read_f64(medium),
        }
    }
}

// -----------------------------------------------------------------------------
// Lengths, strings and buffers

/// Fails if `len` bytes cannot possibly follow in `medium`.
pub(crate) fn check_declared(medium: &dyn Medium, position: u64, len: u64) -> Result<()> {
    match medium.remaining() {
        Some(left) if len > left => Err(SerialError::corrupt(
            position,
            format!("declared length {len} exceeds the {left} remaining bytes"),
        )),
        _ => Ok(()),
    }
}

/// Writes a container length.
pub fn write_len(format: Format, medium: &mut dyn Medium, len: usize) -> Result<()> {
    match format {
        Format::Binary => binary::write_len(medium, len),
        Format::Text => text::write_token(medium, len),
    }
}

/// Reads a container length.
pub fn read_len(format: Format, medium: &mut dyn Medium) -> Result<usize> {
    let position = medium.read_position();
    let len: u64 = match format {
        Format::Binary => binary::read_len(medium)?,
        Format::Text => text::parse(medium)?,
    };
    usize::try_from(len).map_err(|_| SerialError::corrupt(position, "length overflows usize"))
}

/// Writes a length-prefixed UTF-8 string.
pub fn write_str(format: Format, medium: &mut dyn Medium, value: &str) -> Result<()> {
    match format {
        Format::Binary => binary::write_payload(medium, value.as_bytes()),
        Format::Text => text::write_payload(medium, value.as_bytes()),
    }
}

/// Reads a string written by [`write_str`].
pub fn read_string(format: Format, medium: &mut dyn Medium) -> Result<String> {
    let position = medium.read_position();
    let bytes = match format {
        Format::Binary => binary::read_payload(medium)?,
        Format::Text => text::read_payload(medium)?,
    };
    String::from_utf8(bytes).map_err(|_| SerialError::corrupt(position, "string is not UTF-8"))
}

/// Writes a length-prefixed raw buffer.
pub fn write_bytes(format: Format, medium: &mut dyn Medium, value: &[u8]) -> Result<()> {
    match format {
        Format::Binary => binary::write_payload(medium, value),
        Format::Text => text::write_hex(medium, value),
    }
}

/// Reads a buffer written by [`write_bytes`].
pub fn read_bytes(format: Format, medium: &mut dyn Medium) -> Result<Vec<u8>> {
    match format {
        Format::Binary => binary::read_payload(medium),
        Format::Text => text::read_hex(medium),
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use core::fmt::Debug;

    use super::{Primitive, read_bytes, read_string, write_bytes, write_str};
    use crate::SerialError;
    use crate::config::Format;
    use crate::medium::{Medium, MemoryMedium};

    const FORMATS: [Format; 2] = [Format::Binary, Format::Text];

    fn round_trip<T: Primitive + PartialEq + Debug>(value: T) {
        for format in FORMATS {
            let mut medium = MemoryMedium::new();
            value.encode(format, &mut medium).unwrap();
            assert_eq!(T::decode(format, &mut medium).unwrap(), value, "{format:?}");
            assert_eq!(medium.remaining(), Some(0));
        }
    }

    fn float_bits_f64(value: f64) {
        for format in FORMATS {
            let mut medium = MemoryMedium::new();
            value.encode(format, &mut medium).unwrap();
            let back = f64::decode(format, &mut medium).unwrap();
            assert_eq!(back.to_bits(), value.to_bits(), "{format:?}");
        }
    }

    #[test]
    fn integers() {
        round_trip(true);
        round_trip(false);
        round_trip(-105_i32);
        round_trip(-1_598_456_605_i64);
        round_trip(-1_598_456_546_843_565_605_i64);
        round_trip(1_598_456_605_u64);
        round_trip(15905_u32);
        round_trip(u128::MAX);
        round_trip(i128::MIN);
        round_trip(usize::MAX);
        round_trip(isize::MIN);
        round_trip(i8::MIN);
        round_trip('ß');
    }

    #[test]
    fn floats_are_bit_exact() {
        float_bits_f64(-159_845.6605);
        float_bits_f64(-0.0);
        float_bits_f64(f64::INFINITY);
        float_bits_f64(f64::NEG_INFINITY);
        float_bits_f64(f64::MIN_POSITIVE);
        float_bits_f64(5e-324);
        float_bits_f64(f64::MAX);
        float_bits_f64(f64::from_bits(0x7FF8_0000_0000_0001));

        for format in FORMATS {
            let mut medium = MemoryMedium::new();
            let nan = f32::from_bits(0xFFC0_0042);
            nan.encode(format, &mut medium).unwrap();
            0.1_f32.encode(format, &mut medium).unwrap();
            assert_eq!(f32::decode(format, &mut medium).unwrap().to_bits(), nan.to_bits());
            assert_eq!(f32::decode(format, &mut medium).unwrap(), 0.1_f32);
        }
    }

    #[test]
    fn text_is_readable() {
        let mut medium = MemoryMedium::new();
        (-105_i32).encode(Format::Text, &mut medium).unwrap();
        1.5_f64.encode(Format::Text, &mut medium).unwrap();
        write_str(Format::Text, &mut medium, "MyStringToBeSerialized").unwrap();
        write_bytes(Format::Text, &mut medium, &[0xAB, 0x01]).unwrap();
        assert_eq!(
            medium.as_bytes(),
            b"-105\n1.5\n22\nMyStringToBeSerialized\n2\nab01\n"
        );
    }

    #[test]
    fn strings_of_any_length() {
        let long: String = "x".repeat(10_000);
        for format in FORMATS {
            for s in ["", "MyStringToBeSerialized", "line\nbreak", long.as_str()] {
                let mut medium = MemoryMedium::new();
                write_str(format, &mut medium, s).unwrap();
                assert_eq!(read_string(format, &mut medium).unwrap(), s);
            }
        }
    }

    #[test]
    fn buffers() {
        for format in FORMATS {
            let mut medium = MemoryMedium::new();
            write_bytes(format, &mut medium, &[]).unwrap();
            write_bytes(format, &mut medium, &[0, 255, 16]).unwrap();
            assert!(read_bytes(format, &mut medium).unwrap().is_empty());
            assert_eq!(read_bytes(format, &mut medium).unwrap(), vec![0, 255, 16]);
        }
    }

    #[test]
    fn declared_length_beyond_end() {
        let mut medium = MemoryMedium::new();
        1000_u64.encode(Format::Binary, &mut medium).unwrap();
        medium.write_all(b"short").unwrap();
        let err = read_string(Format::Binary, &mut medium).unwrap_err();
        assert!(matches!(err, SerialError::CorruptData { position: 0, .. }));
    }

    #[test]
    fn invalid_values() {
        let mut medium = MemoryMedium::from_bytes(vec![2]);
        assert!(matches!(
            bool::decode(Format::Binary, &mut medium),
            Err(SerialError::CorruptData { .. })
        ));

        let mut medium = MemoryMedium::from_bytes(b"12x\n".to_vec());
        assert!(matches!(
            i32::decode(Format::Text, &mut medium),
            Err(SerialError::CorruptData { .. })
        ));

        let mut medium = MemoryMedium::new();
        0xD800_u32.encode(Format::Binary, &mut medium).unwrap();
        assert!(char::decode(Format::Binary, &mut medium).is_err());

        let mut medium = MemoryMedium::new();
        write_bytes(Format::Binary, &mut medium, &[0xFF, 0xFE]).unwrap();
        assert!(read_string(Format::Binary, &mut medium).is_err());
    }

    #[test]
    fn malformed_hex_buffers() {
        for digits in ["+f", "g0", "0 "] {
            let mut medium = MemoryMedium::from_bytes(format!("1\n{digits}\n").into_bytes());
            let err = read_bytes(Format::Text, &mut medium).unwrap_err();
            assert!(
                matches!(err, SerialError::CorruptData { position: 0, .. }),
                "{digits}"
            );
        }

        let mut medium = MemoryMedium::from_bytes(b"2\n00ff\n".to_vec());
        assert_eq!(read_bytes(Format::Text, &mut medium).unwrap(), vec![0, 255]);
    }
}
