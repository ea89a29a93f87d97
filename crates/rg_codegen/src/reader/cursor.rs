use alloc::borrow::ToOwned;
use alloc::string::String;

use crate::reader::{AutoPackType, ReadError};

/// The `i32` value of a packed whole number that marks null.
pub const NULL_SENTINEL: i32 = -1;

/// Whether a packed whole number reads as [`NULL_SENTINEL`] when narrowed to `i32`.
#[inline]
pub const fn is_null_sentinel(raw: u64) -> bool {
    raw as u32 as i32 == NULL_SENTINEL
}

macro_rules! impl_read_unsigned {
    ($($(#[$meta:meta])* $name:ident -> $ty:ty;)*) => {$(
        $(#[$meta])*
        pub fn $name(&mut self, pack: AutoPackType) -> Result<$ty, ReadError> {
            match pack {
                AutoPackType::Unpacked => Ok(<$ty>::from_le_bytes(self.take_array()?)),
                AutoPackType::Packed | AutoPackType::PackedLess => {
                    let raw = self.read_packed_whole()?;
                    <$ty>::try_from(raw).map_err(|_| ReadError::OutOfRange {
                        value: raw,
                        target: stringify!($ty),
                    })
                }
            }
        }
    )*};
}

macro_rules! impl_read_signed {
    ($($(#[$meta:meta])* $name:ident -> $ty:ty as $bits:ty;)*) => {$(
        $(#[$meta])*
        pub fn $name(&mut self, pack: AutoPackType) -> Result<$ty, ReadError> {
            let out_of_range = |value| ReadError::OutOfRange {
                value,
                target: stringify!($ty),
            };
            match pack {
                AutoPackType::Unpacked => Ok(<$ty>::from_le_bytes(self.take_array()?)),
                AutoPackType::Packed => {
                    let raw = self.read_packed_whole()?;
                    let value = ((raw >> 1) as i64) ^ -((raw & 1) as i64);
                    <$ty>::try_from(value).map_err(|_| out_of_range(raw))
                }
                AutoPackType::PackedLess => {
                    let raw = self.read_packed_whole()?;
                    let bits = <$bits>::try_from(raw).map_err(|_| out_of_range(raw))?;
                    Ok(bits as $ty)
                }
            }
        }
    )*};
}

// -----------------------------------------------------------------------------
// Reader

/// A forward-only cursor over an encoded byte buffer.
///
/// # Examples
///
/// ```
/// use rg_codegen::reader::{AutoPackType, Reader};
///
/// let mut reader = Reader::new(&[1, 0x2A, 0x03, b'a', b'b', b'c']);
/// assert_eq!(reader.read_bool(), Ok(true));
/// assert_eq!(reader.read_i32(AutoPackType::Packed), Ok(21));
/// assert_eq!(reader.read_string().as_deref(), Ok("abc"));
/// assert_eq!(reader.remaining(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    #[inline]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Bytes consumed so far.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(ReadError::EndOfBuffer {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.buffer[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Fills `dst` with the next `dst.len()` bytes.
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<(), ReadError> {
        dst.copy_from_slice(self.take(dst.len())?);
        Ok(())
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take_array::<1>()?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, ReadError> {
        Ok(self.read_u8()? as i8)
    }

    /// A single byte, `0` or `1`.
    pub fn read_bool(&mut self) -> Result<bool, ReadError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(ReadError::InvalidBool(byte)),
        }
    }

    /// An unsigned LEB128 number of at most ten bytes.
    pub fn read_packed_whole(&mut self) -> Result<u64, ReadError> {
        let mut result = 0_u64;
        for index in 0..10 {
            let byte = self.read_u8()?;
            let bits = u64::from(byte & 0x7F);
            if index == 9 && bits > 1 {
                return Err(ReadError::PackedOverflow);
            }
            result |= bits << (7 * index);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(ReadError::PackedOverflow)
    }

    /// A packed whole number used as a length, `None` for the null sentinel.
    pub fn read_packed_length(&mut self) -> Result<Option<usize>, ReadError> {
        let raw = self.read_packed_whole()?;
        if is_null_sentinel(raw) {
            return Ok(None);
        }
        let len = i32::try_from(raw).map_err(|_| ReadError::OutOfRange {
            value: raw,
            target: "i32",
        })?;
        if len < 0 {
            return Err(ReadError::NegativeLength(len));
        }
        Ok(Some(len as usize))
    }

    impl_read_unsigned! {
        read_u16 -> u16;
        read_u32 -> u32;
        read_u64 -> u64;
    }

    impl_read_signed! {
        read_i16 -> i16 as u16;
        read_i32 -> i32 as u32;
        read_i64 -> i64 as u64;
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, ReadError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, ReadError> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// A unicode scalar value as a packed whole number.
    pub fn read_char(&mut self) -> Result<char, ReadError> {
        let raw = self.read_packed_whole()?;
        let scalar = u32::try_from(raw).map_err(|_| ReadError::OutOfRange {
            value: raw,
            target: "char",
        })?;
        char::from_u32(scalar).ok_or(ReadError::InvalidChar(scalar))
    }

    /// A length-prefixed UTF-8 string. The null sentinel reads as empty.
    pub fn read_string(&mut self) -> Result<String, ReadError> {
        let Some(len) = self.read_packed_length()? else {
            return Ok(String::new());
        };
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(ToOwned::to_owned)
            .map_err(|_| ReadError::InvalidUtf8)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Reader, is_null_sentinel};
    use crate::reader::{AutoPackType, ReadError};

    #[test]
    fn fixed_width() {
        let mut reader = Reader::new(&[0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(reader.read_u16(AutoPackType::Unpacked), Ok(0x1234));
        assert_eq!(reader.read_i32(AutoPackType::Unpacked), Ok(-2));
        assert!(reader.is_empty());
    }

    #[test]
    fn packed_signed_is_zigzag() {
        let mut reader = Reader::new(&[0x01, 0x02, 0x03, 0xFF, 0x01]);
        assert_eq!(reader.read_i32(AutoPackType::Packed), Ok(-1));
        assert_eq!(reader.read_i32(AutoPackType::Packed), Ok(1));
        assert_eq!(reader.read_i64(AutoPackType::Packed), Ok(-2));
        assert_eq!(reader.read_i16(AutoPackType::Packed), Ok(-128));
    }

    #[test]
    fn packed_less_keeps_raw_bits() {
        let mut reader = Reader::new(&[0xFF, 0xFF, 0x03]);
        assert_eq!(reader.read_i16(AutoPackType::PackedLess), Ok(-1));
    }

    #[test]
    fn packed_whole_bounds() {
        let max = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert_eq!(Reader::new(&max).read_packed_whole(), Ok(u64::MAX));

        let overflow = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert_eq!(
            Reader::new(&overflow).read_packed_whole(),
            Err(ReadError::PackedOverflow)
        );

        let mut reader = Reader::new(&[0x80, 0x02]);
        assert_eq!(reader.read_u16(AutoPackType::Packed), Ok(256));
    }

    #[test]
    fn narrowing_is_checked() {
        let mut reader = Reader::new(&[0x80, 0x80, 0x04]);
        assert_eq!(
            reader.read_u16(AutoPackType::Packed),
            Err(ReadError::OutOfRange {
                value: 0x10000,
                target: "u16"
            })
        );
    }

    #[test]
    fn null_sentinel() {
        assert!(is_null_sentinel(u64::MAX));
        assert!(is_null_sentinel(0xFFFF_FFFF));
        assert!(!is_null_sentinel(0x7FFF_FFFF));

        let mut reader = Reader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(reader.read_string().as_deref(), Ok(""));
        assert!(reader.is_empty());
    }

    #[test]
    fn errors_do_not_overrun() {
        let mut reader = Reader::new(&[0x02]);
        assert_eq!(reader.read_bool(), Err(ReadError::InvalidBool(2)));

        let mut reader = Reader::new(&[0x05, b'a']);
        assert_eq!(
            reader.read_string(),
            Err(ReadError::EndOfBuffer {
                needed: 5,
                remaining: 1
            })
        );
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn floats_and_chars() {
        let mut bytes = 1.5_f32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&(-0.25_f64).to_le_bytes());
        bytes.extend_from_slice(&[0xE9, 0x07]);

        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_f32(), Ok(1.5));
        assert_eq!(reader.read_f64(), Ok(-0.25));
        assert_eq!(reader.read_char(), Ok('ϩ'));
    }
}
