//! Runtime value variant
//!
//! The tagged union of scalar values the interpreter computes over. Two
//! conversion surfaces with different contracts:
//!
//! - [`Value::convert_to`] is strict: it succeeds only for conversions the
//!   type system marks implicitly safe. Narrowing must go through an explicit
//!   conversion node.
//! - [`Value::cast_numeric`] is the `as`-style cast used internally by the
//!   promotion machinery (interpreter and constant folder).

use crate::codec;
use crate::payload::TypedPayload;
use crate::types::BdiType;
use std::fmt;

/// A runtime scalar value
///
/// `Void` represents "no value" (uninitialized port or error sentinel).
/// `Ptr` is the single pointer-word case; all five pointer-like type tags
/// decode into it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Void,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Ptr(u64),
}

impl Value {
    /// The type tag this value carries at runtime
    pub fn ty(&self) -> BdiType {
        match self {
            Value::Void => BdiType::Void,
            Value::Bool(_) => BdiType::Bool,
            Value::I8(_) => BdiType::I8,
            Value::U8(_) => BdiType::U8,
            Value::I16(_) => BdiType::I16,
            Value::U16(_) => BdiType::U16,
            Value::I32(_) => BdiType::I32,
            Value::U32(_) => BdiType::U32,
            Value::I64(_) => BdiType::I64,
            Value::U64(_) => BdiType::U64,
            Value::F32(_) => BdiType::F32,
            Value::F64(_) => BdiType::F64,
            Value::Ptr(_) => BdiType::Pointer,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Decode a payload into a runtime value via the binary codec
    ///
    /// Returns `Void` on a type/length mismatch. `F16` payloads widen to
    /// `F32` (the variant has no half-precision case); the pointer-like tags
    /// all decode to `Ptr`.
    pub fn from_payload(payload: &TypedPayload) -> Value {
        if !payload.is_valid() {
            return Value::Void;
        }
        let bytes = &payload.bytes;
        let mut off = 0;
        let decoded = match payload.ty {
            BdiType::Void => Some(Value::Void),
            BdiType::Bool => codec::decode_bool(bytes, &mut off).map(Value::Bool),
            BdiType::I8 => codec::decode_i8(bytes, &mut off).map(Value::I8),
            BdiType::U8 => codec::decode_u8(bytes, &mut off).map(Value::U8),
            BdiType::I16 => codec::decode_i16(bytes, &mut off).map(Value::I16),
            BdiType::U16 => codec::decode_u16(bytes, &mut off).map(Value::U16),
            BdiType::I32 => codec::decode_i32(bytes, &mut off).map(Value::I32),
            BdiType::U32 => codec::decode_u32(bytes, &mut off).map(Value::U32),
            BdiType::I64 => codec::decode_i64(bytes, &mut off).map(Value::I64),
            BdiType::U64 => codec::decode_u64(bytes, &mut off).map(Value::U64),
            BdiType::F16 => codec::decode_f16(bytes, &mut off).map(|h| Value::F32(h.to_f32())),
            BdiType::F32 => codec::decode_f32(bytes, &mut off).map(Value::F32),
            BdiType::F64 => codec::decode_f64(bytes, &mut off).map(Value::F64),
            BdiType::Pointer | BdiType::MemRef | BdiType::FuncPtr | BdiType::NodeRef | BdiType::RegionRef => {
                codec::decode_ptr(bytes, &mut off).map(Value::Ptr)
            }
            BdiType::Unknown => None,
        };
        decoded.unwrap_or(Value::Void)
    }

    /// Encode this value back into a payload via the binary codec
    pub fn to_payload(&self) -> TypedPayload {
        let mut bytes = Vec::with_capacity(self.ty().size_bytes());
        match *self {
            Value::Void => {}
            Value::Bool(v) => codec::encode_bool(&mut bytes, v),
            Value::I8(v) => codec::encode_i8(&mut bytes, v),
            Value::U8(v) => codec::encode_u8(&mut bytes, v),
            Value::I16(v) => codec::encode_i16(&mut bytes, v),
            Value::U16(v) => codec::encode_u16(&mut bytes, v),
            Value::I32(v) => codec::encode_i32(&mut bytes, v),
            Value::U32(v) => codec::encode_u32(&mut bytes, v),
            Value::I64(v) => codec::encode_i64(&mut bytes, v),
            Value::U64(v) => codec::encode_u64(&mut bytes, v),
            Value::F32(v) => codec::encode_f32(&mut bytes, v),
            Value::F64(v) => codec::encode_f64(&mut bytes, v),
            Value::Ptr(v) => codec::encode_ptr(&mut bytes, v),
        }
        TypedPayload::new(self.ty(), bytes)
    }

    /// Strict conversion to a concrete scalar type
    ///
    /// Succeeds iff the type system allows an implicit conversion from this
    /// value's tag to `T`'s tag.
    pub fn convert_to<T: FromValue>(&self) -> Option<T> {
        if !BdiType::can_implicitly_convert(self.ty(), T::BDI_TYPE) {
            return None;
        }
        T::from_value(self)
    }

    /// Pointer-word extraction for address operands (`Ptr` or `U64`)
    pub fn as_ptr_word(&self) -> Option<u64> {
        match *self {
            Value::Ptr(p) => Some(p),
            Value::U64(p) => Some(p),
            _ => None,
        }
    }

    /// `as`-style numeric cast used by the promotion machinery
    ///
    /// Unlike [`convert_to`](Self::convert_to) this follows Rust cast
    /// semantics (modular integer narrowing, saturating float-to-int) and is
    /// defined for every numeric/bool source and numeric/bool target.
    pub fn cast_numeric(&self, to: BdiType) -> Option<Value> {
        // Integers and bool keep full precision through i128
        let as_int: Option<i128> = match *self {
            Value::Bool(b) => Some(b as i128),
            Value::I8(v) => Some(v as i128),
            Value::U8(v) => Some(v as i128),
            Value::I16(v) => Some(v as i128),
            Value::U16(v) => Some(v as i128),
            Value::I32(v) => Some(v as i128),
            Value::U32(v) => Some(v as i128),
            Value::I64(v) => Some(v as i128),
            Value::U64(v) => Some(v as i128),
            _ => None,
        };
        if let Some(i) = as_int {
            return Some(match to {
                BdiType::Bool => Value::Bool(i != 0),
                BdiType::I8 => Value::I8(i as i8),
                BdiType::U8 => Value::U8(i as u8),
                BdiType::I16 => Value::I16(i as i16),
                BdiType::U16 => Value::U16(i as u16),
                BdiType::I32 => Value::I32(i as i32),
                BdiType::U32 => Value::U32(i as u32),
                BdiType::I64 => Value::I64(i as i64),
                BdiType::U64 => Value::U64(i as u64),
                BdiType::F32 => Value::F32(i as f32),
                BdiType::F64 => Value::F64(i as f64),
                _ => return None,
            });
        }
        let f: f64 = match *self {
            Value::F32(v) => v as f64,
            Value::F64(v) => v,
            _ => return None,
        };
        Some(match to {
            BdiType::F32 => Value::F32(f as f32),
            BdiType::F64 => Value::F64(f),
            BdiType::I8 => Value::I8(f as i8),
            BdiType::U8 => Value::U8(f as u8),
            BdiType::I16 => Value::I16(f as i16),
            BdiType::U16 => Value::U16(f as u16),
            BdiType::I32 => Value::I32(f as i32),
            BdiType::U32 => Value::U32(f as u32),
            BdiType::I64 => Value::I64(f as i64),
            BdiType::U64 => Value::U64(f as u64),
            _ => return None,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Bool(v) => write!(f, "bool({})", v),
            Value::I8(v) => write!(f, "i8({})", v),
            Value::U8(v) => write!(f, "u8({})", v),
            Value::I16(v) => write!(f, "i16({})", v),
            Value::U16(v) => write!(f, "u16({})", v),
            Value::I32(v) => write!(f, "i32({})", v),
            Value::U32(v) => write!(f, "u32({})", v),
            Value::I64(v) => write!(f, "i64({})", v),
            Value::U64(v) => write!(f, "u64({})", v),
            Value::F32(v) => write!(f, "f32({})", v),
            Value::F64(v) => write!(f, "f64({})", v),
            Value::Ptr(v) => write!(f, "ptr({:#x})", v),
        }
    }
}

// ================================================================================================
// Typed extraction
// ================================================================================================

/// Target types for [`Value::convert_to`]
///
/// Implementations widen per the implicit-conversion table; the caller has
/// already checked admissibility against the type system.
pub trait FromValue: Sized {
    const BDI_TYPE: BdiType;
    fn from_value(v: &Value) -> Option<Self>;
}

macro_rules! from_value_int {
    ($ty:ty, $bdi:expr, [$($src:ident),*]) => {
        impl FromValue for $ty {
            const BDI_TYPE: BdiType = $bdi;
            fn from_value(v: &Value) -> Option<$ty> {
                match *v {
                    $(Value::$src(x) => Some(x as $ty),)*
                    Value::Bool(b) => Some(b as u8 as $ty),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! from_value_float {
    ($ty:ty, $bdi:expr, [$($src:ident),*]) => {
        impl FromValue for $ty {
            const BDI_TYPE: BdiType = $bdi;
            fn from_value(v: &Value) -> Option<$ty> {
                match *v {
                    $(Value::$src(x) => Some(x as $ty),)*
                    _ => None,
                }
            }
        }
    };
}

from_value_int!(i8, BdiType::I8, [I8]);
from_value_int!(i16, BdiType::I16, [I16, I8]);
from_value_int!(i32, BdiType::I32, [I32, I16, I8]);
from_value_int!(i64, BdiType::I64, [I64, I32, I16, I8]);
from_value_int!(u8, BdiType::U8, [U8]);
from_value_int!(u16, BdiType::U16, [U16, U8]);
from_value_int!(u32, BdiType::U32, [U32, U16, U8]);
from_value_int!(u64, BdiType::U64, [U64, U32, U16, U8]);
from_value_float!(f32, BdiType::F32, [F32, I8, U8, I16, U16, I32, U32, I64, U64]);
from_value_float!(f64, BdiType::F64, [F64, F32, I8, U8, I16, U16, I32, U32, I64, U64]);

impl FromValue for bool {
    const BDI_TYPE: BdiType = BdiType::Bool;
    fn from_value(v: &Value) -> Option<bool> {
        match *v {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
