//! Primitive kinds and the scalar value trait.
//!
//! A [`PrimitiveKind`] names every fixed-width field kind the codec can copy
//! byte-for-byte. Values live in native byte order, both inside an instance
//! and on the wire.

/// Fixed-width primitive field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Boolean stored as one byte (0 or 1).
    Bool,
    /// Opaque octet.
    Byte,
    /// Single 8-bit character.
    Char,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 64-bit integer.
    Uint64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
}

impl PrimitiveKind {
    /// Returns the size of the primitive in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Byte | Self::Char | Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    /// Returns the natural alignment of the primitive in bytes.
    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.size()
    }

    /// Returns the lowercase kind name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Returns true if this is a signed integer kind.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns true if this is a floating point kind.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust value types that map onto a [`PrimitiveKind`].
///
/// Reads and writes use native byte order. Callers pass slices of at least
/// [`Scalar::WIDTH`] bytes.
pub trait Scalar: Copy + Sized {
    /// Width in bytes.
    const WIDTH: usize;

    /// Returns true if values of this type may be stored in a field of `kind`.
    fn accepts(kind: PrimitiveKind) -> bool;

    /// Writes the value into the first `WIDTH` bytes of `dst`.
    fn write_ne(self, dst: &mut [u8]);

    /// Reads a value from the first `WIDTH` bytes of `src`.
    fn read_ne(src: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($ty:ty, $width:expr, $($kind:ident)|+) => {
        impl Scalar for $ty {
            const WIDTH: usize = $width;

            #[inline]
            fn accepts(kind: PrimitiveKind) -> bool {
                matches!(kind, $(PrimitiveKind::$kind)|+)
            }

            #[inline]
            fn write_ne(self, dst: &mut [u8]) {
                dst[..$width].copy_from_slice(&self.to_ne_bytes());
            }

            #[inline]
            fn read_ne(src: &[u8]) -> Self {
                let mut raw = [0u8; $width];
                raw.copy_from_slice(&src[..$width]);
                <$ty>::from_ne_bytes(raw)
            }
        }
    };
}

impl_scalar!(u8, 1, Byte | Uint8 | Char);
impl_scalar!(i8, 1, Int8);
impl_scalar!(u16, 2, Uint16);
impl_scalar!(i16, 2, Int16);
impl_scalar!(u32, 4, Uint32);
impl_scalar!(i32, 4, Int32);
impl_scalar!(u64, 8, Uint64);
impl_scalar!(i64, 8, Int64);
impl_scalar!(f32, 4, Float32);
impl_scalar!(f64, 8, Float64);

impl Scalar for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn accepts(kind: PrimitiveKind) -> bool {
        kind == PrimitiveKind::Bool
    }

    #[inline]
    fn write_ne(self, dst: &mut [u8]) {
        dst[0] = u8::from(self);
    }

    #[inline]
    fn read_ne(src: &[u8]) -> Self {
        src[0] != 0
    }
}
