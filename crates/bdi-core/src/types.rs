//! Core scalar type tags for the BDI value model
//!
//! Every value flowing through a BDI graph carries one of these tags:
//! - Signed/unsigned integers (8-64 bit)
//! - IEEE 754 floats (16/32/64 bit)
//! - Pointer-like words (pointer, memory reference, function pointer,
//!   node reference, region reference)
//! - `Void` (no value) and `Unknown` (polymorphic port slot)

use std::fmt;

/// Scalar type tag for payloads, ports, and runtime values
///
/// Pointer-like tags are fixed at 64 bits so the wire encoding does not
/// depend on the host pointer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum BdiType {
    Void = 0,
    Bool = 1,

    // Signed integers
    I8 = 2,
    I16 = 3,
    I32 = 4,
    I64 = 5,

    // Unsigned integers
    U8 = 6,
    U16 = 7,
    U32 = 8,
    U64 = 9,

    // Floating point (IEEE 754)
    F16 = 10,
    F32 = 11,
    F64 = 12,

    // Pointer-width unsigned words
    Pointer = 13,
    MemRef = 14,
    FuncPtr = 15,
    NodeRef = 16,
    RegionRef = 17,

    #[default]
    Unknown = 255,
}

impl BdiType {
    /// Size of this type in bytes (`Void`/`Unknown` are zero-sized)
    pub const fn size_bytes(self) -> usize {
        match self {
            BdiType::Void | BdiType::Unknown => 0,
            BdiType::Bool | BdiType::I8 | BdiType::U8 => 1,
            BdiType::I16 | BdiType::U16 | BdiType::F16 => 2,
            BdiType::I32 | BdiType::U32 | BdiType::F32 => 4,
            BdiType::I64 | BdiType::U64 | BdiType::F64 => 8,
            BdiType::Pointer | BdiType::MemRef | BdiType::FuncPtr | BdiType::NodeRef | BdiType::RegionRef => 8,
        }
    }

    /// Is this an integer type (signed or unsigned)?
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            BdiType::I8
                | BdiType::I16
                | BdiType::I32
                | BdiType::I64
                | BdiType::U8
                | BdiType::U16
                | BdiType::U32
                | BdiType::U64
        )
    }

    /// Is this a floating-point type?
    pub const fn is_float(self) -> bool {
        matches!(self, BdiType::F16 | BdiType::F32 | BdiType::F64)
    }

    /// Is this numeric (integer or float)?
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Is this a signed type? Floats count as signed.
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            BdiType::I8
                | BdiType::I16
                | BdiType::I32
                | BdiType::I64
                | BdiType::F16
                | BdiType::F32
                | BdiType::F64
        )
    }

    /// Is this one of the pointer-width word tags?
    pub const fn is_pointer_like(self) -> bool {
        matches!(
            self,
            BdiType::Pointer | BdiType::MemRef | BdiType::FuncPtr | BdiType::NodeRef | BdiType::RegionRef
        )
    }

    /// Strict compatibility: types are interchangeable only when identical
    pub fn are_compatible(a: BdiType, b: BdiType) -> bool {
        a == b
    }

    /// Is an implicit (edge-level) conversion from `from` to `to` allowed?
    ///
    /// Permitted: identity, widening among same-signedness integers, widening
    /// floats, `Bool` to any integer, and any integer to any float. Narrowing
    /// always requires an explicit conversion node.
    pub fn can_implicitly_convert(from: BdiType, to: BdiType) -> bool {
        if from == to {
            return true;
        }
        // Integer widening within the same signedness
        if from.is_integer() && to.is_integer() && from.is_signed() == to.is_signed() {
            return from.size_bytes() < to.size_bytes();
        }
        // Float widening
        if from.is_float() && to.is_float() {
            return from.size_bytes() < to.size_bytes();
        }
        // Bool -> integer (true -> 1, false -> 0)
        if from == BdiType::Bool && to.is_integer() {
            return true;
        }
        // Integer -> float (may lose precision for wide integers; allowed)
        if from.is_integer() && to.is_float() {
            return true;
        }
        false
    }

    /// Binary numeric promotion: the type a two-operand numeric op computes in
    ///
    /// Float dominance by width, otherwise integer promotion to the maximum
    /// byte width; when signedness differs and the unsigned operand is at
    /// least as wide, the result is unsigned. Non-numeric operands yield
    /// `Unknown`.
    pub fn promoted(a: BdiType, b: BdiType) -> BdiType {
        if a == b && a.is_numeric() {
            return a;
        }
        if a.is_float() || b.is_float() {
            if !a.is_numeric() || !b.is_numeric() {
                return BdiType::Unknown;
            }
            if a == BdiType::F64 || b == BdiType::F64 {
                return BdiType::F64;
            }
            if a == BdiType::F32 || b == BdiType::F32 {
                return BdiType::F32;
            }
            return BdiType::F16;
        }
        if a.is_integer() && b.is_integer() {
            let (sa, sb) = (a.size_bytes(), b.size_bytes());
            let max = sa.max(sb);
            if a.is_signed() != b.is_signed() {
                if !a.is_signed() && sa >= sb {
                    return a;
                }
                if !b.is_signed() && sb >= sa {
                    return b;
                }
            }
            let signed = a.is_signed() || b.is_signed();
            return match (max, signed) {
                (8, true) => BdiType::I64,
                (8, false) => BdiType::U64,
                (4, true) => BdiType::I32,
                (4, false) => BdiType::U32,
                (2, true) => BdiType::I16,
                (2, false) => BdiType::U16,
                (1, true) => BdiType::I8,
                (1, false) => BdiType::U8,
                _ => BdiType::Unknown,
            };
        }
        BdiType::Unknown
    }

    /// Decode a wire tag byte back into a type, if it names one
    pub fn from_u8(raw: u8) -> Option<BdiType> {
        Some(match raw {
            0 => BdiType::Void,
            1 => BdiType::Bool,
            2 => BdiType::I8,
            3 => BdiType::I16,
            4 => BdiType::I32,
            5 => BdiType::I64,
            6 => BdiType::U8,
            7 => BdiType::U16,
            8 => BdiType::U32,
            9 => BdiType::U64,
            10 => BdiType::F16,
            11 => BdiType::F32,
            12 => BdiType::F64,
            13 => BdiType::Pointer,
            14 => BdiType::MemRef,
            15 => BdiType::FuncPtr,
            16 => BdiType::NodeRef,
            17 => BdiType::RegionRef,
            255 => BdiType::Unknown,
            _ => return None,
        })
    }
}

impl fmt::Display for BdiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BdiType::Void => write!(f, "void"),
            BdiType::Bool => write!(f, "bool"),
            BdiType::I8 => write!(f, "i8"),
            BdiType::I16 => write!(f, "i16"),
            BdiType::I32 => write!(f, "i32"),
            BdiType::I64 => write!(f, "i64"),
            BdiType::U8 => write!(f, "u8"),
            BdiType::U16 => write!(f, "u16"),
            BdiType::U32 => write!(f, "u32"),
            BdiType::U64 => write!(f, "u64"),
            BdiType::F16 => write!(f, "f16"),
            BdiType::F32 => write!(f, "f32"),
            BdiType::F64 => write!(f, "f64"),
            BdiType::Pointer => write!(f, "ptr"),
            BdiType::MemRef => write!(f, "memref"),
            BdiType::FuncPtr => write!(f, "funcptr"),
            BdiType::NodeRef => write!(f, "noderef"),
            BdiType::RegionRef => write!(f, "regionref"),
            BdiType::Unknown => write!(f, "unknown"),
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BdiType; 19] = [
        BdiType::Void,
        BdiType::Bool,
        BdiType::I8,
        BdiType::I16,
        BdiType::I32,
        BdiType::I64,
        BdiType::U8,
        BdiType::U16,
        BdiType::U32,
        BdiType::U64,
        BdiType::F16,
        BdiType::F32,
        BdiType::F64,
        BdiType::Pointer,
        BdiType::MemRef,
        BdiType::FuncPtr,
        BdiType::NodeRef,
        BdiType::RegionRef,
        BdiType::Unknown,
    ];

    #[test]
    fn test_sizes() {
        assert_eq!(BdiType::Void.size_bytes(), 0);
        assert_eq!(BdiType::Unknown.size_bytes(), 0);
        assert_eq!(BdiType::Bool.size_bytes(), 1);
        assert_eq!(BdiType::I32.size_bytes(), 4);
        assert_eq!(BdiType::F16.size_bytes(), 2);
        assert_eq!(BdiType::F64.size_bytes(), 8);
        assert_eq!(BdiType::Pointer.size_bytes(), 8);
        assert_eq!(BdiType::RegionRef.size_bytes(), 8);
    }

    #[test]
    fn test_predicates() {
        assert!(BdiType::I8.is_integer());
        assert!(BdiType::U64.is_integer());
        assert!(!BdiType::F32.is_integer());
        assert!(BdiType::F16.is_float());
        assert!(BdiType::I32.is_signed());
        assert!(BdiType::F64.is_signed());
        assert!(!BdiType::U32.is_signed());
        assert!(BdiType::Pointer.is_pointer_like());
        assert!(!BdiType::Pointer.is_numeric());
        assert!(!BdiType::Bool.is_numeric());
    }

    #[test]
    fn test_implicit_convert_identity() {
        // T1: identity conversion holds for every tag
        for t in ALL {
            assert!(BdiType::can_implicitly_convert(t, t), "identity failed for {t}");
        }
    }

    #[test]
    fn test_implicit_convert_widening() {
        assert!(BdiType::can_implicitly_convert(BdiType::I8, BdiType::I64));
        assert!(BdiType::can_implicitly_convert(BdiType::U16, BdiType::U32));
        assert!(BdiType::can_implicitly_convert(BdiType::F32, BdiType::F64));
        assert!(BdiType::can_implicitly_convert(BdiType::F16, BdiType::F32));
        assert!(BdiType::can_implicitly_convert(BdiType::Bool, BdiType::U8));
        assert!(BdiType::can_implicitly_convert(BdiType::I64, BdiType::F32));

        // Narrowing and cross-signedness are refused
        assert!(!BdiType::can_implicitly_convert(BdiType::I64, BdiType::I32));
        assert!(!BdiType::can_implicitly_convert(BdiType::U32, BdiType::I64));
        assert!(!BdiType::can_implicitly_convert(BdiType::F64, BdiType::F32));
        assert!(!BdiType::can_implicitly_convert(BdiType::F32, BdiType::I32));
        assert!(!BdiType::can_implicitly_convert(BdiType::I32, BdiType::Bool));
        assert!(!BdiType::can_implicitly_convert(BdiType::Pointer, BdiType::U64));
    }

    #[test]
    fn test_promotion_symmetry() {
        // T2: promoted(a, b) == promoted(b, a)
        for a in ALL {
            for b in ALL {
                assert_eq!(
                    BdiType::promoted(a, b),
                    BdiType::promoted(b, a),
                    "asymmetric promotion for {a}, {b}"
                );
            }
        }
    }

    #[test]
    fn test_promotion_integer_width() {
        // T3: integer promotion picks the max byte width
        let ints = [
            BdiType::I8,
            BdiType::I16,
            BdiType::I32,
            BdiType::I64,
            BdiType::U8,
            BdiType::U16,
            BdiType::U32,
            BdiType::U64,
        ];
        for a in ints {
            for b in ints {
                let p = BdiType::promoted(a, b);
                assert!(p.is_integer());
                assert_eq!(p.size_bytes(), a.size_bytes().max(b.size_bytes()));
            }
        }
    }

    #[test]
    fn test_promotion_rules() {
        assert_eq!(BdiType::promoted(BdiType::I32, BdiType::I32), BdiType::I32);
        assert_eq!(BdiType::promoted(BdiType::I32, BdiType::F32), BdiType::F32);
        assert_eq!(BdiType::promoted(BdiType::F32, BdiType::F64), BdiType::F64);
        assert_eq!(BdiType::promoted(BdiType::I16, BdiType::I64), BdiType::I64);
        // Unsigned wins when at least as wide
        assert_eq!(BdiType::promoted(BdiType::I32, BdiType::U32), BdiType::U32);
        assert_eq!(BdiType::promoted(BdiType::I16, BdiType::U64), BdiType::U64);
        // Signed wins when strictly wider
        assert_eq!(BdiType::promoted(BdiType::I64, BdiType::U32), BdiType::I64);
        // Non-numeric operands do not promote
        assert_eq!(BdiType::promoted(BdiType::Bool, BdiType::I32), BdiType::Unknown);
        assert_eq!(BdiType::promoted(BdiType::Pointer, BdiType::U64), BdiType::Unknown);
        assert_eq!(BdiType::promoted(BdiType::Void, BdiType::Void), BdiType::Unknown);
    }

    #[test]
    fn test_wire_tag_round_trip() {
        for t in ALL {
            assert_eq!(BdiType::from_u8(t as u8), Some(t));
        }
        assert_eq!(BdiType::from_u8(200), None);
    }
}
