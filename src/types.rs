use std::fmt;

/// A language value: one of the six value kinds of the early dialect.
/// Objects are referred to by heap id; the interpreter owns the heap.
#[derive(Clone, Debug, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(JsObject),
}

// UTF-16 code unit string
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JsString {
    pub code_units: Vec<u16>,
}

impl JsString {
    pub fn from_str(s: &str) -> Self {
        Self {
            code_units: s.encode_utf16().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.code_units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.code_units.len()
    }

    pub fn to_rust_string(&self) -> String {
        String::from_utf16_lossy(&self.code_units)
    }

    pub fn concat(&self, other: &JsString) -> JsString {
        let mut code_units = self.code_units.clone();
        code_units.extend_from_slice(&other.code_units);
        JsString { code_units }
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rust_string())
    }
}

/// Handle to a heap-allocated object. Identity is the heap id, so two handles
/// compare equal exactly when they name the same object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsObject {
    pub id: u64,
}

impl JsValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsValue::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, JsValue::String(_))
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{b}"),
            JsValue::Number(n) => write!(f, "{}", number_ops::to_string(*n)),
            JsValue::String(s) => write!(f, "{s}"),
            JsValue::Object(_) => write!(f, "[object]"),
        }
    }
}

// Number type operations
pub mod number_ops {
    const TWO_POW_32: f64 = 4294967296.0;
    const TWO_POW_31: f64 = 2147483648.0;

    pub fn to_string(x: f64) -> String {
        if x.is_nan() {
            return "NaN".to_string();
        }
        if x == 0.0 {
            return "0".to_string();
        }
        if x.is_infinite() {
            return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
        }
        // ryu-js gives the shortest representation that round-trips
        let mut buf = ryu_js::Buffer::new();
        buf.format(x).to_string()
    }

    // ToInt32: truncate, then reduce modulo 2^32 into the signed range
    pub fn to_int32(x: f64) -> i32 {
        if !x.is_finite() || x == 0.0 {
            return 0;
        }
        let m = x.trunc().rem_euclid(TWO_POW_32);
        if m >= TWO_POW_31 {
            (m - TWO_POW_32) as i32
        } else {
            m as i32
        }
    }

    // ToUint32
    pub fn to_uint32(x: f64) -> u32 {
        if !x.is_finite() || x == 0.0 {
            return 0;
        }
        x.trunc().rem_euclid(TWO_POW_32) as u32
    }

    pub fn left_shift(x: f64, y: f64) -> f64 {
        let shift = to_uint32(y) & 0x1F;
        f64::from(to_int32(x).wrapping_shl(shift))
    }

    pub fn signed_right_shift(x: f64, y: f64) -> f64 {
        let shift = to_uint32(y) & 0x1F;
        f64::from(to_int32(x).wrapping_shr(shift))
    }

    pub fn unsigned_right_shift(x: f64, y: f64) -> f64 {
        let shift = to_uint32(y) & 0x1F;
        f64::from(to_uint32(x).wrapping_shr(shift))
    }

    pub fn bitwise_and(x: f64, y: f64) -> f64 {
        f64::from(to_int32(x) & to_int32(y))
    }

    pub fn bitwise_xor(x: f64, y: f64) -> f64 {
        f64::from(to_int32(x) ^ to_int32(y))
    }

    pub fn bitwise_or(x: f64, y: f64) -> f64 {
        f64::from(to_int32(x) | to_int32(y))
    }

    pub fn bitwise_not(x: f64) -> f64 {
        f64::from(!to_int32(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_special_values() {
        assert_eq!(number_ops::to_string(f64::NAN), "NaN");
        assert_eq!(number_ops::to_string(0.0), "0");
        assert_eq!(number_ops::to_string(-0.0), "0");
        assert_eq!(number_ops::to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_ops::to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn number_round_trip_formatting() {
        assert_eq!(number_ops::to_string(42.0), "42");
        assert_eq!(number_ops::to_string(42.42), "42.42");
        assert_eq!(number_ops::to_string(0.5), "0.5");
        assert_eq!(number_ops::to_string(-1.5), "-1.5");
        assert_eq!(number_ops::to_string(60.0), "60");
    }

    #[test]
    fn to_int32_basics() {
        assert_eq!(number_ops::to_int32(f64::NAN), 0);
        assert_eq!(number_ops::to_int32(f64::INFINITY), 0);
        assert_eq!(number_ops::to_int32(0.0), 0);
        assert_eq!(number_ops::to_int32(42.9), 42);
        assert_eq!(number_ops::to_int32(-42.9), -42);
        assert_eq!(number_ops::to_int32(4294967296.0), 0);
        assert_eq!(number_ops::to_int32(4294967295.0), -1);
        assert_eq!(number_ops::to_int32(2147483648.0), -2147483648);
    }

    #[test]
    fn to_uint32_range() {
        assert_eq!(number_ops::to_uint32(-1.0), 4294967295);
        assert_eq!(number_ops::to_uint32(4294967296.0), 0);
        assert_eq!(number_ops::to_uint32(-4294967295.0), 1);
    }

    #[test]
    fn int32_uint32_agree() {
        // to_int32(to_uint32(n)) == to_int32(n) for representative values
        for n in [
            0.0,
            -0.0,
            1.5,
            -1.5,
            3e9,
            -3e9,
            2f64.powi(52),
            -(2f64.powi(52)) - 7.0,
            f64::NAN,
            f64::INFINITY,
        ] {
            assert_eq!(
                number_ops::to_int32(f64::from(number_ops::to_uint32(n))),
                number_ops::to_int32(n),
                "mismatch for {n}"
            );
        }
    }

    #[test]
    fn shift_ops() {
        assert_eq!(number_ops::left_shift(1.0, 2.0), 4.0);
        assert_eq!(number_ops::signed_right_shift(-5.0, 2.0), -2.0);
        assert_eq!(number_ops::unsigned_right_shift(-5.0, 2.0), 1073741822.0);
        // shift counts are masked to five bits
        assert_eq!(number_ops::left_shift(1.0, 33.0), 2.0);
    }

    #[test]
    fn bitwise_ops() {
        assert_eq!(number_ops::bitwise_and(255.0, 128.0), 128.0);
        assert_eq!(number_ops::bitwise_or(64.0, 128.0), 192.0);
        assert_eq!(number_ops::bitwise_xor(255.0, 128.0), 127.0);
        assert_eq!(number_ops::bitwise_not(42.0), -43.0);
    }

    #[test]
    fn string_concat_preserves_units() {
        let a = JsString::from_str("te");
        let b = JsString::from_str("st");
        assert_eq!(a.concat(&b), JsString::from_str("test"));
        assert_eq!(a.len(), 2);
        assert!(JsString::from_str("").is_empty());
    }
}
