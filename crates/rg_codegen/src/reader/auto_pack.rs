use core::fmt;

/// Wire encoding of a variable-width numeric.
///
/// Routines that take an `AutoPackType` accept the mode as their trailing
/// argument; every other routine ignores it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum AutoPackType {
    /// Fixed width, little endian.
    Unpacked = 0,
    /// Variable width. Signed values are zigzag encoded.
    #[default]
    Packed = 1,
    /// Variable width over the raw bits, without zigzag.
    PackedLess = 2,
}

impl AutoPackType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unpacked),
            1 => Some(Self::Packed),
            2 => Some(Self::PackedLess),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Unpacked => "Unpacked",
            Self::Packed => "Packed",
            Self::PackedLess => "PackedLess",
        }
    }
}

impl fmt::Display for AutoPackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
