//! Shared pure-op evaluator
//!
//! One scalar evaluation surface used by both the interpreter and the
//! constant-folding pass, so a folded graph computes exactly what the
//! unfolded graph would. Binary numeric operations promote their operands
//! (`BdiType::promoted`), cast both to the promoted type, and compute with
//! wrapping integer / IEEE float semantics.

use crate::error::{Result, VmError};
use bdi_core::{BdiType, OpCode, TypedPayload, Value};

/// Evaluate a binary arithmetic or bitwise operation
///
/// `Div`/`Mod` with a zero divisor error out; `Mod` and the bitwise group
/// additionally require an integer-promoted type.
pub fn apply_binary(op: OpCode, lhs: Value, rhs: Value) -> Result<Value> {
    let ty = BdiType::promoted(lhs.ty(), rhs.ty());
    if ty == BdiType::Unknown {
        return Err(VmError::InvalidPromotion {
            lhs: lhs.ty(),
            rhs: rhs.ty(),
        });
    }
    if op == OpCode::Mod && !ty.is_integer() {
        return Err(VmError::UnsupportedForType { op, ty });
    }
    let a = promote_operand(lhs, ty)?;
    let b = promote_operand(rhs, ty)?;

    macro_rules! int_binop {
        ($variant:ident, $x:expr, $y:expr) => {
            match op {
                OpCode::Add => Value::$variant($x.wrapping_add($y)),
                OpCode::Sub => Value::$variant($x.wrapping_sub($y)),
                OpCode::Mul => Value::$variant($x.wrapping_mul($y)),
                OpCode::Div => {
                    if $y == 0 {
                        return Err(VmError::DivisionByZero);
                    }
                    Value::$variant($x.wrapping_div($y))
                }
                OpCode::Mod => {
                    if $y == 0 {
                        return Err(VmError::ModuloByZero);
                    }
                    Value::$variant($x.wrapping_rem($y))
                }
                OpCode::And => Value::$variant($x & $y),
                OpCode::Or => Value::$variant($x | $y),
                OpCode::Xor => Value::$variant($x ^ $y),
                _ => return Err(VmError::UnsupportedForType { op, ty }),
            }
        };
    }
    macro_rules! float_binop {
        ($variant:ident, $x:expr, $y:expr) => {
            match op {
                OpCode::Add => Value::$variant($x + $y),
                OpCode::Sub => Value::$variant($x - $y),
                OpCode::Mul => Value::$variant($x * $y),
                OpCode::Div => {
                    if $y == 0.0 {
                        return Err(VmError::DivisionByZero);
                    }
                    Value::$variant($x / $y)
                }
                _ => return Err(VmError::UnsupportedForType { op, ty }),
            }
        };
    }

    Ok(match (a, b) {
        (Value::I8(x), Value::I8(y)) => int_binop!(I8, x, y),
        (Value::U8(x), Value::U8(y)) => int_binop!(U8, x, y),
        (Value::I16(x), Value::I16(y)) => int_binop!(I16, x, y),
        (Value::U16(x), Value::U16(y)) => int_binop!(U16, x, y),
        (Value::I32(x), Value::I32(y)) => int_binop!(I32, x, y),
        (Value::U32(x), Value::U32(y)) => int_binop!(U32, x, y),
        (Value::I64(x), Value::I64(y)) => int_binop!(I64, x, y),
        (Value::U64(x), Value::U64(y)) => int_binop!(U64, x, y),
        (Value::F32(x), Value::F32(y)) => float_binop!(F32, x, y),
        (Value::F64(x), Value::F64(y)) => float_binop!(F64, x, y),
        _ => {
            return Err(VmError::InvalidPromotion {
                lhs: lhs.ty(),
                rhs: rhs.ty(),
            })
        }
    })
}

/// Evaluate a comparison, emitting a bool
pub fn apply_compare(op: OpCode, lhs: Value, rhs: Value) -> Result<bool> {
    let ty = BdiType::promoted(lhs.ty(), rhs.ty());
    if ty == BdiType::Unknown {
        return Err(VmError::InvalidPromotion {
            lhs: lhs.ty(),
            rhs: rhs.ty(),
        });
    }
    let a = promote_operand(lhs, ty)?;
    let b = promote_operand(rhs, ty)?;

    macro_rules! cmp {
        ($x:expr, $y:expr) => {
            match op {
                OpCode::Eq => $x == $y,
                OpCode::Ne => $x != $y,
                OpCode::Lt => $x < $y,
                OpCode::Le => $x <= $y,
                OpCode::Gt => $x > $y,
                OpCode::Ge => $x >= $y,
                _ => return Err(VmError::UnsupportedForType { op, ty }),
            }
        };
    }

    Ok(match (a, b) {
        (Value::I8(x), Value::I8(y)) => cmp!(x, y),
        (Value::U8(x), Value::U8(y)) => cmp!(x, y),
        (Value::I16(x), Value::I16(y)) => cmp!(x, y),
        (Value::U16(x), Value::U16(y)) => cmp!(x, y),
        (Value::I32(x), Value::I32(y)) => cmp!(x, y),
        (Value::U32(x), Value::U32(y)) => cmp!(x, y),
        (Value::I64(x), Value::I64(y)) => cmp!(x, y),
        (Value::U64(x), Value::U64(y)) => cmp!(x, y),
        (Value::F32(x), Value::F32(y)) => cmp!(x, y),
        (Value::F64(x), Value::F64(y)) => cmp!(x, y),
        _ => {
            return Err(VmError::InvalidPromotion {
                lhs: lhs.ty(),
                rhs: rhs.ty(),
            })
        }
    })
}

/// Evaluate a boolean connective (`LAnd`/`LOr`/`LXor`)
///
/// Bool-only and not short-circuiting: both operands are already values at
/// the IR level.
pub fn apply_logical(op: OpCode, lhs: Value, rhs: Value) -> Result<bool> {
    let a = require_bool(op, lhs)?;
    let b = require_bool(op, rhs)?;
    Ok(match op {
        OpCode::LAnd => a && b,
        OpCode::LOr => a || b,
        OpCode::LXor => a ^ b,
        _ => {
            return Err(VmError::UnsupportedForType {
                op,
                ty: BdiType::Bool,
            })
        }
    })
}

/// Evaluate a unary operation at the operand's own type
pub fn apply_unary(op: OpCode, v: Value) -> Result<Value> {
    let ty = v.ty();
    let unsupported = || VmError::UnsupportedForType { op, ty };

    macro_rules! count_op {
        ($variant:ident, $x:expr, $uty:ty, $ty:ty) => {
            match op {
                OpCode::Popcount => Value::$variant((($x as $uty).count_ones()) as $ty),
                OpCode::Lzcnt => Value::$variant((($x as $uty).leading_zeros()) as $ty),
                OpCode::Tzcnt => Value::$variant((($x as $uty).trailing_zeros()) as $ty),
                _ => unreachable!("caller routed a count op"),
            }
        };
    }

    Ok(match op {
        OpCode::Neg => match v {
            Value::I8(x) => Value::I8(x.wrapping_neg()),
            Value::I16(x) => Value::I16(x.wrapping_neg()),
            Value::I32(x) => Value::I32(x.wrapping_neg()),
            Value::I64(x) => Value::I64(x.wrapping_neg()),
            Value::F32(x) => Value::F32(-x),
            Value::F64(x) => Value::F64(-x),
            _ => return Err(unsupported()),
        },
        OpCode::Abs => match v {
            Value::I8(x) => Value::I8(x.wrapping_abs()),
            Value::I16(x) => Value::I16(x.wrapping_abs()),
            Value::I32(x) => Value::I32(x.wrapping_abs()),
            Value::I64(x) => Value::I64(x.wrapping_abs()),
            Value::U8(_) | Value::U16(_) | Value::U32(_) | Value::U64(_) => v,
            Value::F32(x) => Value::F32(x.abs()),
            Value::F64(x) => Value::F64(x.abs()),
            _ => return Err(unsupported()),
        },
        OpCode::Inc | OpCode::Dec => {
            let delta: i64 = if op == OpCode::Inc { 1 } else { -1 };
            match v {
                Value::I8(x) => Value::I8(x.wrapping_add(delta as i8)),
                Value::I16(x) => Value::I16(x.wrapping_add(delta as i16)),
                Value::I32(x) => Value::I32(x.wrapping_add(delta as i32)),
                Value::I64(x) => Value::I64(x.wrapping_add(delta)),
                Value::U8(x) => Value::U8(x.wrapping_add(delta as u8)),
                Value::U16(x) => Value::U16(x.wrapping_add(delta as u16)),
                Value::U32(x) => Value::U32(x.wrapping_add(delta as u32)),
                Value::U64(x) => Value::U64(x.wrapping_add(delta as u64)),
                _ => return Err(unsupported()),
            }
        }
        OpCode::Not => match v {
            Value::I8(x) => Value::I8(!x),
            Value::I16(x) => Value::I16(!x),
            Value::I32(x) => Value::I32(!x),
            Value::I64(x) => Value::I64(!x),
            Value::U8(x) => Value::U8(!x),
            Value::U16(x) => Value::U16(!x),
            Value::U32(x) => Value::U32(!x),
            Value::U64(x) => Value::U64(!x),
            _ => return Err(unsupported()),
        },
        OpCode::LNot => match v {
            Value::Bool(b) => Value::Bool(!b),
            _ => return Err(unsupported()),
        },
        OpCode::Popcount | OpCode::Lzcnt | OpCode::Tzcnt => match v {
            Value::I8(x) => count_op!(I8, x, u8, i8),
            Value::U8(x) => count_op!(U8, x, u8, u8),
            Value::I16(x) => count_op!(I16, x, u16, i16),
            Value::U16(x) => count_op!(U16, x, u16, u16),
            Value::I32(x) => count_op!(I32, x, u32, i32),
            Value::U32(x) => count_op!(U32, x, u32, u32),
            Value::I64(x) => count_op!(I64, x, u64, i64),
            Value::U64(x) => count_op!(U64, x, u64, u64),
            _ => return Err(unsupported()),
        },
        _ => return Err(VmError::Unsupported(op)),
    })
}

/// Evaluate a shift or rotate: `(value, amount)`, amount masked mod the
/// value's bit width
pub fn apply_shift(op: OpCode, value: Value, amount: Value) -> Result<Value> {
    let amt = amount
        .cast_numeric(BdiType::U64)
        .and_then(|v| match v {
            Value::U64(a) => Some(a),
            _ => None,
        })
        .ok_or(VmError::UnsupportedForType {
            op,
            ty: amount.ty(),
        })?;

    macro_rules! shift_signed {
        ($variant:ident, $x:expr, $ty:ty, $uty:ty) => {{
            let sh = (amt % <$ty>::BITS as u64) as u32;
            match op {
                OpCode::Shl => Value::$variant($x.wrapping_shl(sh)),
                OpCode::Shr => Value::$variant((($x as $uty) >> sh) as $ty),
                OpCode::Ashr => Value::$variant($x >> sh),
                OpCode::Rol => Value::$variant($x.rotate_left(sh)),
                OpCode::Ror => Value::$variant($x.rotate_right(sh)),
                _ => return Err(VmError::UnsupportedForType { op, ty: value.ty() }),
            }
        }};
    }
    macro_rules! shift_unsigned {
        ($variant:ident, $x:expr, $ty:ty, $ity:ty) => {{
            let sh = (amt % <$ty>::BITS as u64) as u32;
            match op {
                OpCode::Shl => Value::$variant($x.wrapping_shl(sh)),
                OpCode::Shr => Value::$variant($x >> sh),
                OpCode::Ashr => Value::$variant((($x as $ity) >> sh) as $ty),
                OpCode::Rol => Value::$variant($x.rotate_left(sh)),
                OpCode::Ror => Value::$variant($x.rotate_right(sh)),
                _ => return Err(VmError::UnsupportedForType { op, ty: value.ty() }),
            }
        }};
    }

    Ok(match value {
        Value::I8(x) => shift_signed!(I8, x, i8, u8),
        Value::I16(x) => shift_signed!(I16, x, i16, u16),
        Value::I32(x) => shift_signed!(I32, x, i32, u32),
        Value::I64(x) => shift_signed!(I64, x, i64, u64),
        Value::U8(x) => shift_unsigned!(U8, x, u8, i8),
        Value::U16(x) => shift_unsigned!(U16, x, u16, i16),
        Value::U32(x) => shift_unsigned!(U32, x, u32, i32),
        Value::U64(x) => shift_unsigned!(U64, x, u64, i64),
        _ => {
            return Err(VmError::UnsupportedForType {
                op,
                ty: value.ty(),
            })
        }
    })
}

/// Fused multiply-add: `a * b + c` at the promoted type of all three
pub fn apply_fma(a: Value, b: Value, c: Value) -> Result<Value> {
    let ty = BdiType::promoted(BdiType::promoted(a.ty(), b.ty()), c.ty());
    if ty == BdiType::Unknown {
        return Err(VmError::InvalidPromotion {
            lhs: a.ty(),
            rhs: b.ty(),
        });
    }
    let a = promote_operand(a, ty)?;
    let b = promote_operand(b, ty)?;
    let c = promote_operand(c, ty)?;
    match (a, b, c) {
        // Single rounding for floats
        (Value::F32(x), Value::F32(y), Value::F32(z)) => Ok(Value::F32(x.mul_add(y, z))),
        (Value::F64(x), Value::F64(y), Value::F64(z)) => Ok(Value::F64(x.mul_add(y, z))),
        _ => apply_binary(OpCode::Add, apply_binary(OpCode::Mul, a, b)?, c),
    }
}

/// Evaluate a type-conversion operation toward the node's declared output
/// type
pub fn apply_convert(op: OpCode, v: Value, target: BdiType) -> Result<Value> {
    let src = v.ty();
    let unsupported = || VmError::UnsupportedForType { op, ty: src };
    match op {
        // Modular narrowing between integers
        OpCode::Trunc => {
            if !src.is_integer() || !target.is_integer() || target.size_bytes() > src.size_bytes() {
                return Err(unsupported());
            }
            v.cast_numeric(target).ok_or_else(unsupported)
        }
        // Integer widening
        OpCode::ExtendSign | OpCode::ExtendZero => {
            if !src.is_integer() || !target.is_integer() || target.size_bytes() < src.size_bytes() {
                return Err(unsupported());
            }
            let width = src.size_bytes() * 8;
            let mask: u64 = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
            let raw = match v.cast_numeric(BdiType::U64) {
                Some(Value::U64(bits)) => bits & mask,
                _ => return Err(unsupported()),
            };
            let extended = if op == OpCode::ExtendSign && width < 64 && (raw >> (width - 1)) & 1 == 1 {
                raw | !mask
            } else {
                raw
            };
            Value::U64(extended).cast_numeric(target).ok_or_else(unsupported)
        }
        OpCode::IntToFloat => {
            if !src.is_integer() || !target.is_float() {
                return Err(unsupported());
            }
            v.cast_numeric(target).ok_or_else(unsupported)
        }
        // Truncate toward zero; out-of-range saturates rather than crashing
        OpCode::FloatToInt => {
            if !src.is_float() || !target.is_integer() {
                return Err(unsupported());
            }
            v.cast_numeric(target).ok_or_else(unsupported)
        }
        // Reinterpret bytes between equal-sized types
        OpCode::Bitcast => {
            if src.size_bytes() == 0 || src.size_bytes() != target.size_bytes() {
                return Err(unsupported());
            }
            let payload = v.to_payload();
            let recast = Value::from_payload(&TypedPayload::new(target, payload.bytes));
            if recast.is_void() {
                return Err(unsupported());
            }
            Ok(recast)
        }
        _ => Err(VmError::Unsupported(op)),
    }
}

fn promote_operand(v: Value, ty: BdiType) -> Result<Value> {
    v.cast_numeric(ty).ok_or(VmError::InvalidPromotion {
        lhs: v.ty(),
        rhs: ty,
    })
}

fn require_bool(op: OpCode, v: Value) -> Result<bool> {
    v.convert_to::<bool>().ok_or(VmError::UnsupportedForType { op, ty: v.ty() })
}

// ================================================================================================
// Tests
// ================================================================================================
