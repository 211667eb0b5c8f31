use super::*;
use crate::types::number_ops;

/// ToBoolean. Total: every value coerces.
pub(crate) fn to_boolean(val: &JsValue) -> bool {
    match val {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
        JsValue::String(s) => !s.is_empty(),
        JsValue::Object(_) => true,
    }
}

/// ToNumber over primitives. Objects go through
/// [`Interpreter::to_number_value`], which applies ToPrimitive first.
pub(crate) fn to_number(val: &JsValue) -> f64 {
    match val {
        JsValue::Undefined => f64::NAN,
        JsValue::Null => 0.0,
        JsValue::Boolean(b) => f64::from(*b),
        JsValue::Number(n) => *n,
        JsValue::String(s) => string_to_number(s),
        JsValue::Object(_) => f64::NAN,
    }
}

/// The numeric-literal grammar of ToNumber: optional whitespace, empty means
/// +0, hex with 0x, signed Infinity, otherwise a decimal literal.
pub(crate) fn string_to_number(s: &JsString) -> f64 {
    let rust_str = s.to_rust_string();
    let trimmed = rust_str.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust's parser accepts spellings like "inf" and "NaN"; the language's
    // numeric grammar does not.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Relational comparison of two doubles.
/// `None` when either side is NaN; that maps to false under every operator.
pub(crate) fn tri_compare(l: f64, r: f64) -> Option<bool> {
    if l.is_nan() || r.is_nan() {
        return None;
    }
    if l == r || (l == 0.0 && r == 0.0) {
        return Some(false);
    }
    if l == f64::INFINITY {
        Some(false)
    } else if r == f64::INFINITY {
        Some(true)
    } else if r == f64::NEG_INFINITY {
        Some(false)
    } else if l == f64::NEG_INFINITY {
        Some(true)
    } else {
        Some(l < r)
    }
}

/// Which kind a primitive should prefer when an object converts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferredType {
    Number,
    String,
}

pub(crate) fn typeof_primitive(val: &JsValue) -> &'static str {
    match val {
        JsValue::Undefined => "undefined",
        JsValue::Null => "object",
        JsValue::Boolean(_) => "boolean",
        JsValue::Number(_) => "number",
        JsValue::String(_) => "string",
        JsValue::Object(_) => unreachable!("objects dispatch on their call thunk"),
    }
}

impl Interpreter {
    /// ToPrimitive. Primitives pass through; objects try their `valueOf` and
    /// `toString` (reversed under a string hint) and the first primitive
    /// result wins.
    pub(crate) fn to_primitive(
        &mut self,
        val: &JsValue,
        hint: Option<PreferredType>,
    ) -> Result<JsValue, EvalError> {
        let JsValue::Object(_) = val else {
            return Ok(val.clone());
        };
        let obj = self.expect_object(val)?;
        let methods: [&str; 2] = match hint {
            Some(PreferredType::String) => ["toString", "valueOf"],
            _ => ["valueOf", "toString"],
        };
        for name in methods {
            let method = obj.borrow().get(name);
            let JsValue::Object(m) = &method else {
                continue;
            };
            let Some(method_obj) = self.get_object(m.id) else {
                continue;
            };
            let thunk = method_obj.borrow().call.clone();
            if let Some(thunk) = thunk {
                let result = self.invoke(&thunk, val, &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        Err(EvalError::type_error(
            "Cannot convert object to primitive value",
            self.stack_trace(None),
        ))
    }

    /// ToNumber on any value.
    pub(crate) fn to_number_value(&mut self, val: &JsValue) -> Result<f64, EvalError> {
        match val {
            JsValue::Object(_) => {
                let prim = self.to_primitive(val, Some(PreferredType::Number))?;
                Ok(to_number(&prim))
            }
            other => Ok(to_number(other)),
        }
    }

    /// ToString on any value.
    pub(crate) fn to_string_value(&mut self, val: &JsValue) -> Result<JsString, EvalError> {
        match val {
            JsValue::Undefined => Ok(JsString::from_str("undefined")),
            JsValue::Null => Ok(JsString::from_str("null")),
            JsValue::Boolean(b) => Ok(JsString::from_str(if *b { "true" } else { "false" })),
            JsValue::Number(n) => Ok(JsString::from_str(&number_ops::to_string(*n))),
            JsValue::String(s) => Ok(s.clone()),
            JsValue::Object(_) => {
                let prim = self.to_primitive(val, Some(PreferredType::String))?;
                self.to_string_value(&prim)
            }
        }
    }

    /// The loose-equality algorithm of `==`.
    pub(crate) fn loose_equals(&mut self, l: &JsValue, r: &JsValue) -> Result<bool, EvalError> {
        match (l, r) {
            // Same type
            (JsValue::Undefined, JsValue::Undefined) | (JsValue::Null, JsValue::Null) => Ok(true),
            (JsValue::Number(ln), JsValue::Number(rn)) => {
                if ln.is_nan() || rn.is_nan() {
                    return Ok(false);
                }
                Ok((*ln == 0.0 && *rn == 0.0) || ln == rn)
            }
            (JsValue::String(ls), JsValue::String(rs)) => Ok(ls == rs),
            (JsValue::Boolean(lb), JsValue::Boolean(rb)) => Ok(lb == rb),
            (JsValue::Object(lo), JsValue::Object(ro)) => Ok(lo.id == ro.id),

            // Mixed types
            (JsValue::Null, JsValue::Undefined) | (JsValue::Undefined, JsValue::Null) => Ok(true),
            (JsValue::Number(_), JsValue::String(rs)) => {
                let rn = JsValue::Number(string_to_number(rs));
                self.loose_equals(l, &rn)
            }
            (JsValue::String(ls), JsValue::Number(_)) => {
                let ln = JsValue::Number(string_to_number(ls));
                self.loose_equals(&ln, r)
            }
            (JsValue::Boolean(lb), _) => {
                let ln = JsValue::Number(f64::from(*lb));
                self.loose_equals(&ln, r)
            }
            (_, JsValue::Boolean(rb)) => {
                let rn = JsValue::Number(f64::from(*rb));
                self.loose_equals(l, &rn)
            }
            (JsValue::String(_) | JsValue::Number(_), JsValue::Object(_)) => {
                let rp = self.to_primitive(r, None)?;
                self.loose_equals(l, &rp)
            }
            (JsValue::Object(_), JsValue::String(_) | JsValue::Number(_)) => {
                let lp = self.to_primitive(l, None)?;
                self.loose_equals(&lp, r)
            }
            _ => Ok(false),
        }
    }
}
