//! Binary scalar codec
//!
//! The sole canonical route between payload bytes and in-memory scalars.
//! Wire order is fixed little-endian regardless of host endianness; decoders
//! fail on short input instead of truncating or reading past the end.

use half::f16;

/// Serialized byte order for all BDI payloads and graph streams
pub const TARGET_LITTLE_ENDIAN: bool = true;

macro_rules! scalar_codec {
    ($enc:ident, $dec:ident, $ty:ty) => {
        pub fn $enc(buf: &mut Vec<u8>, value: $ty) {
            buf.extend_from_slice(&value.to_le_bytes());
        }

        pub fn $dec(bytes: &[u8], offset: &mut usize) -> Option<$ty> {
            const N: usize = std::mem::size_of::<$ty>();
            let end = offset.checked_add(N)?;
            let slice = bytes.get(*offset..end)?;
            *offset = end;
            Some(<$ty>::from_le_bytes(slice.try_into().expect("slice length checked")))
        }
    };
}

scalar_codec!(encode_i8, decode_i8, i8);
scalar_codec!(encode_u8, decode_u8, u8);
scalar_codec!(encode_i16, decode_i16, i16);
scalar_codec!(encode_u16, decode_u16, u16);
scalar_codec!(encode_i32, decode_i32, i32);
scalar_codec!(encode_u32, decode_u32, u32);
scalar_codec!(encode_i64, decode_i64, i64);
scalar_codec!(encode_u64, decode_u64, u64);
scalar_codec!(encode_f32, decode_f32, f32);
scalar_codec!(encode_f64, decode_f64, f64);

pub fn encode_bool(buf: &mut Vec<u8>, value: bool) {
    buf.push(value as u8);
}

/// Any nonzero byte decodes to `true`
pub fn decode_bool(bytes: &[u8], offset: &mut usize) -> Option<bool> {
    decode_u8(bytes, offset).map(|b| b != 0)
}

pub fn encode_f16(buf: &mut Vec<u8>, value: f16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn decode_f16(bytes: &[u8], offset: &mut usize) -> Option<f16> {
    decode_u16(bytes, offset).map(f16::from_bits)
}

/// Pointer words travel as 64-bit regardless of host pointer width
pub fn encode_ptr(buf: &mut Vec<u8>, value: u64) {
    encode_u64(buf, value);
}

pub fn decode_ptr(bytes: &[u8], offset: &mut usize) -> Option<u64> {
    decode_u64(bytes, offset)
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_round_trip() {
        let mut buf = Vec::new();
        encode_i8(&mut buf, -5);
        encode_u16(&mut buf, 0xBEEF);
        encode_i32(&mut buf, -123456);
        encode_u64(&mut buf, u64::MAX - 1);

        let mut off = 0;
        assert_eq!(decode_i8(&buf, &mut off), Some(-5));
        assert_eq!(decode_u16(&buf, &mut off), Some(0xBEEF));
        assert_eq!(decode_i32(&buf, &mut off), Some(-123456));
        assert_eq!(decode_u64(&buf, &mut off), Some(u64::MAX - 1));
        assert_eq!(off, buf.len());
    }

    #[test]
    fn test_float_round_trip() {
        let mut buf = Vec::new();
        encode_f32(&mut buf, std::f32::consts::PI);
        encode_f64(&mut buf, -std::f64::consts::E);
        encode_f16(&mut buf, f16::from_f32(1.5));

        let mut off = 0;
        assert_eq!(decode_f32(&buf, &mut off), Some(std::f32::consts::PI));
        assert_eq!(decode_f64(&buf, &mut off), Some(-std::f64::consts::E));
        assert_eq!(decode_f16(&buf, &mut off), Some(f16::from_f32(1.5)));
    }

    #[test]
    fn test_bool_round_trip() {
        let mut buf = Vec::new();
        encode_bool(&mut buf, true);
        encode_bool(&mut buf, false);
        let mut off = 0;
        assert_eq!(decode_bool(&buf, &mut off), Some(true));
        assert_eq!(decode_bool(&buf, &mut off), Some(false));
    }

    #[test]
    fn test_wire_order_is_little_endian() {
        let mut buf = Vec::new();
        encode_u32(&mut buf, 0x0102_0304);
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_short_read_fails_without_advancing() {
        let bytes = [1u8, 2, 3];
        let mut off = 0;
        assert_eq!(decode_u32(&bytes, &mut off), None);
        assert_eq!(off, 0);

        // A partial trailing value must not decode either
        let mut off = 2;
        assert_eq!(decode_u16(&bytes, &mut off), None);
        assert_eq!(off, 2);
    }

    #[test]
    fn test_decode_consumes_exactly_size() {
        let mut buf = Vec::new();
        encode_u16(&mut buf, 7);
        encode_u16(&mut buf, 9);
        let mut off = 0;
        assert_eq!(decode_u16(&buf, &mut off), Some(7));
        assert_eq!(off, 2);
        assert_eq!(decode_u16(&buf, &mut off), Some(9));
        assert_eq!(off, 4);
        assert_eq!(decode_u16(&buf, &mut off), None);
    }
}
