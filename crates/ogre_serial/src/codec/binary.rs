//! Little-endian fixed-width encoding.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Result, SerialError};
use crate::medium::Medium;

#[inline]
pub(super) fn write<const N: usize>(medium: &mut dyn Medium, bytes: [u8; N]) -> Result<()> {
    medium.write_all(&bytes)
}

#[inline]
pub(super) fn read<const N: usize>(medium: &mut dyn Medium) -> Result<[u8; N]> {
    let mut bytes = [0; N];
    medium.read_exact(&mut bytes)?;
    Ok(bytes)
}

pub(super) fn write_len(medium: &mut dyn Medium, len: usize) -> Result<()> {
    write(medium, (len as u64).to_le_bytes())
}

pub(super) fn read_len(medium: &mut dyn Medium) -> Result<u64> {
    read(medium).map(u64::from_le_bytes)
}

pub(super) fn write_payload(medium: &mut dyn Medium, bytes: &[u8]) -> Result<()> {
    write_len(medium, bytes.len())?;
    medium.write_all(bytes)
}

pub(super) fn read_payload(medium: &mut dyn Medium) -> Result<Vec<u8>> {
    let position = medium.read_position();
    let len = read_len(medium)?;
    super::check_declared(medium, position, len)?;
    let len = usize::try_from(len)
        .map_err(|_| SerialError::corrupt(position, "payload length overflows usize"))?;
    let mut bytes = vec![0; len];
    medium.read_exact(&mut bytes)?;
    Ok(bytes)
}
