//! Tagged value representation for the Ember VM.

use std::fmt;

use crate::strings::{Heap, StringId};

/// Runtime values in the Ember VM.
///
/// There is no implicit promotion between `Int` and `Double`; operators that
/// accept numbers require both operands to be the same variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Double(f64),
    Obj(ObjRef),
}

/// Reference to an object living in the [`Heap`].
///
/// Strings are always interned, so comparing two `ObjRef::String` handles is
/// the same as comparing their contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjRef {
    String(StringId),
}

impl Value {
    pub fn string(id: StringId) -> Self {
        Value::Obj(ObjRef::String(id))
    }

    /// `nil` and `false` are falsey; everything else, including `0` and
    /// `""`, is truthy.
    pub fn is_falsey(&self) -> bool {
        matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    pub fn as_string(&self) -> Option<StringId> {
        match self {
            Value::Obj(ObjRef::String(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Obj(ObjRef::String(_)) => "string",
        }
    }

    /// Render the value the way `print` shows it. Strings are resolved
    /// through `heap`.
    pub fn display<'a>(&'a self, heap: &'a Heap) -> ValueDisplay<'a> {
        ValueDisplay { value: self, heap }
    }
}

pub struct ValueDisplay<'a> {
    value: &'a Value,
    heap: &'a Heap,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Double(d) => f.write_str(&format_double(*d)),
            Value::Obj(ObjRef::String(id)) => match self.heap.resolve(*id) {
                Some(s) => f.write_str(s.as_str()),
                None => write!(f, "<string #{}>", id.index()),
            },
        }
    }
}

/// Format a double like C's `%g`: six significant digits, trailing zeros
/// stripped, exponent form outside `[1e-4, 1e6)`.
pub fn format_double(d: f64) -> String {
    const PRECISION: i32 = 6;

    if d.is_nan() {
        return "nan".to_string();
    }
    if d.is_infinite() {
        return if d > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if d == 0.0 {
        return if d.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, d);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if !(-4..PRECISION).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_trailing_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, d)).to_string()
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
