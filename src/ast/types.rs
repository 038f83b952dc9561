//! Primitive type descriptors.
//!
//! Every primitive type in the language is a small bit tag made of three
//! independent fields:
//!
//! - a size class (unspecified, 1, 2, 4 or 8 bytes)
//! - a sign (none, signed, unsigned), integers only
//! - a category (void, type, int-like, float-like, bool-like)
//!
//! Concrete types carry a size. The abstract types (`intlike`, `floatlike`,
//! `numberlike`, `boollike`) only carry category bits and are used as
//! constraints while checking, never as the final type of a value.

use std::fmt::Display;

const SIZE_MASK: u32 = 0xF;

const SIGNED: u32 = 1 << 4;
const UNSIGNED: u32 = 1 << 5;
const SIGN_MASK: u32 = SIGNED | UNSIGNED;

const VOID: u32 = 1 << 8;
const TYPE: u32 = 1 << 9;
const INT: u32 = 1 << 10;
const FLOAT: u32 = 1 << 11;
const BOOL: u32 = 1 << 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor(u32);

impl TypeDescriptor {
    pub const U8: Self = Self(1 | UNSIGNED | INT);
    pub const U16: Self = Self(2 | UNSIGNED | INT);
    pub const U32: Self = Self(4 | UNSIGNED | INT);
    pub const U64: Self = Self(8 | UNSIGNED | INT);
    pub const S8: Self = Self(1 | SIGNED | INT);
    pub const S16: Self = Self(2 | SIGNED | INT);
    pub const S32: Self = Self(4 | SIGNED | INT);
    pub const S64: Self = Self(8 | SIGNED | INT);
    pub const F32: Self = Self(4 | FLOAT);
    pub const F64: Self = Self(8 | FLOAT);
    pub const BOOL8: Self = Self(1 | BOOL);
    pub const BOOL16: Self = Self(2 | BOOL);
    pub const BOOL32: Self = Self(4 | BOOL);
    pub const BOOL64: Self = Self(8 | BOOL);
    pub const VOID: Self = Self(VOID);
    pub const TYPE: Self = Self(TYPE);

    pub const INTLIKE: Self = Self(INT);
    pub const FLOATLIKE: Self = Self(FLOAT);
    pub const NUMBERLIKE: Self = Self(INT | FLOAT);
    pub const BOOLLIKE: Self = Self(BOOL);

    /// Size in bytes, 0 when unspecified.
    pub fn size(self) -> u32 {
        self.0 & SIZE_MASK
    }

    pub fn is_sized(self) -> bool {
        self.size() != 0
    }

    pub fn is_signed(self) -> bool {
        self.0 & SIGNED != 0
    }

    pub fn is_unsigned(self) -> bool {
        self.0 & UNSIGNED != 0
    }

    pub fn is_void(self) -> bool {
        self.0 & VOID != 0
    }

    pub fn is_type(self) -> bool {
        self.0 & TYPE != 0
    }

    /// True for every int-like type, `numberlike` included.
    pub fn is_intlike(self) -> bool {
        self.0 & INT != 0
    }

    /// True for every float-like type, `numberlike` included.
    pub fn is_floatlike(self) -> bool {
        self.0 & FLOAT != 0
    }

    pub fn is_numberlike(self) -> bool {
        self.0 & (INT | FLOAT) != 0
    }

    pub fn is_boollike(self) -> bool {
        self.0 & BOOL != 0
    }

    /// A category without a size: one of the four "-like" placeholders.
    pub fn is_abstract(self) -> bool {
        !self.is_sized() && (self.is_numberlike() || self.is_boollike())
    }

    pub fn with_size(self, size: u32) -> Self {
        Self((self.0 & !SIZE_MASK) | (size & SIZE_MASK))
    }

    /// Integer variant with the requested signedness. Ignored for non-integers.
    pub fn with_sign(self, signed: bool) -> Self {
        if !self.is_intlike() || self.is_floatlike() {
            return self;
        }

        let sign = if signed { SIGNED } else { UNSIGNED };
        Self((self.0 & !SIGN_MASK) | sign)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::S8 => "s8",
            Self::S16 => "s16",
            Self::S32 => "s32",
            Self::S64 => "s64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::BOOL8 => "bool8",
            Self::BOOL16 => "bool16",
            Self::BOOL32 => "bool32",
            Self::BOOL64 => "bool64",
            Self::VOID => "void",
            Self::TYPE => "type",
            Self::INTLIKE => "intlike",
            Self::FLOATLIKE => "floatlike",
            Self::NUMBERLIKE => "numberlike",
            Self::BOOLLIKE => "boollike",
            _ => "<invalid>",
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
