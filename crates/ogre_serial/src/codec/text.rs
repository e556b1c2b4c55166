//! Newline separated decimal tokens.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Display;
use core::str::FromStr;

use crate::error::{Result, SerialError};
use crate::medium::Medium;

// Longest token a conforming writer emits is well below this.
const MAX_TOKEN_LEN: usize = 128;

pub(super) fn write_token(medium: &mut dyn Medium, token: impl Display) -> Result<()> {
    medium.write_all(format!("{token}\n").as_bytes())
}

pub(super) fn read_token(medium: &mut dyn Medium) -> Result<String> {
    let position = medium.read_position();
    let mut token = Vec::new();
    loop {
        let mut byte = [0; 1];
        medium.read_exact(&mut byte)?;
        if byte[0] == b'\n' {
            break;
        }
        if token.len() == MAX_TOKEN_LEN {
            return Err(SerialError::corrupt(position, "unterminated text token"));
        }
        token.push(byte[0]);
    }
    String::from_utf8(token).map_err(|_| SerialError::corrupt(position, "text token is not UTF-8"))
}

pub(super) fn parse<T: FromStr>(medium: &mut dyn Medium) -> Result<T> {
    let position = medium.read_position();
    let token = read_token(medium)?;
    token.parse().map_err(|_| {
        SerialError::corrupt(
            position,
            format!("`{token}` is not a valid {}", core::any::type_name::<T>()),
        )
    })
}

// NaN keeps its payload, everything else uses the shortest exact form.
macro_rules! impl_float_text {
    ($write:ident, $read:ident, $ty:ty, $bits:ty) => {
        pub(super) fn $write(medium: &mut dyn Medium, value: $ty) -> Result<()> {
            if value.is_nan() {
                write_token(medium, format_args!("NaN:{:x}", value.to_bits()))
            } else {
                write_token(medium, format_args!("{value:?}"))
            }
        }

        pub(super) fn $read(medium: &mut dyn Medium) -> Result<$ty> {
            let position = medium.read_position();
            let token = read_token(medium)?;
            let parsed = match token.strip_prefix("NaN:") {
                Some(hex) => <$bits>::from_str_radix(hex, 16)
                    .ok()
                    .map(<$ty>::from_bits)
                    .filter(|v| v.is_nan()),
                None => token.parse::<$ty>().ok().filter(|v| !v.is_nan()),
            };
            parsed.ok_or_else(|| {
                SerialError::corrupt(position, format!("`{token}` is not a valid {}", stringify!($ty)))
            })
        }
    };
}

impl_float_text!(write_f32, read_f32, f32, u32);
impl_float_text!(write_f64, read_f64, f64, u64);

pub(super) fn write_payload(medium: &mut dyn Medium, bytes: &[u8]) -> Result<()> {
    write_token(medium, bytes.len())?;
    medium.write_all(bytes)?;
    medium.write_all(b"\n")
}

pub(super) fn read_payload(medium: &mut dyn Medium) -> Result<Vec<u8>> {
    let position = medium.read_position();
    let len: u64 = parse(medium)?;
    super::check_declared(medium, position, len)?;
    let len = usize::try_from(len)
        .map_err(|_| SerialError::corrupt(position, "payload length overflows usize"))?;
    let mut bytes = vec![0; len];
    medium.read_exact(&mut bytes)?;
    expect_newline(medium)?;
    Ok(bytes)
}

pub(super) fn write_hex(medium: &mut dyn Medium, bytes: &[u8]) -> Result<()> {
    write_token(medium, bytes.len())?;
    let mut encoded = hex::encode(bytes);
    encoded.push('\n');
    medium.write_all(encoded.as_bytes())
}

pub(super) fn read_hex(medium: &mut dyn Medium) -> Result<Vec<u8>> {
    let position = medium.read_position();
    let len: u64 = parse(medium)?;
    let hex_len = len
        .checked_mul(2)
        .ok_or_else(|| SerialError::corrupt(position, "buffer length overflows"))?;
    super::check_declared(medium, position, hex_len)?;
    let len = usize::try_from(len)
        .map_err(|_| SerialError::corrupt(position, "buffer length overflows usize"))?;

    let mut digits = vec![0; len * 2];
    medium.read_exact(&mut digits)?;
    expect_newline(medium)?;

    let mut bytes = vec![0_u8; len];
    hex::decode_to_slice(&digits, &mut bytes)
        .map_err(|err| SerialError::corrupt(position, format!("invalid hex buffer: {err}")))?;
    Ok(bytes)
}

fn expect_newline(medium: &mut dyn Medium) -> Result<()> {
    let position = medium.read_position();
    let mut byte = [0; 1];
    medium.read_exact(&mut byte)?;
    if byte[0] == b'\n' {
        Ok(())
    } else {
        Err(SerialError::corrupt(position, "missing newline after payload"))
    }
}
