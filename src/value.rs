//! Coercion and comparison rules shared by the compiler and the evaluator.
//!
//! Values are plain `serde_json::Value`s. The rules here follow the loose
//! dynamic-language conventions the template language was designed around:
//! truthiness treats `null`, `false`, `0` and `""` as false, `+` concatenates
//! as soon as a string is involved, and object keys are the string form of
//! whatever a key expression produced.

use std::cmp::Ordering;

use serde_json::Value;

pub fn value_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Build a JSON number, keeping integral results as integers.
pub fn json_f64(f: f64) -> Value {
    if f.fract() == 0.0 && f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Value::Number((f as i64).into())
    } else {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn number_string(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// String form used for concatenation and for computed object keys.
pub fn to_js_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

pub fn to_number(v: &Value) -> f64 {
    match v {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Interpret a key as an array index if it is purely numeric.
pub fn numeric_key(key: &Value) -> Option<f64> {
    match key {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Equality without type coercion. Numbers compare by value so `1` equals `1.0`.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

pub fn add(a: &Value, b: &Value) -> Value {
    let concatenates = |v: &Value| matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_));
    if concatenates(a) || concatenates(b) {
        return Value::String(to_js_string(a) + &to_js_string(b));
    }
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return Value::Number(sum.into());
        }
    }
    json_f64(to_number(a) + to_number(b))
}

/// Total order used by sorting: null < false < true < number < string < array < object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn type_order(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Number(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    let ta = type_order(a);
    let tb = type_order(b);
    if ta != tb {
        return ta.cmp(&tb);
    }

    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let af = a.as_f64().unwrap_or(0.0);
            let bf = b.as_f64().unwrap_or(0.0);
            af.total_cmp(&bf)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let c = compare_values(x, y);
                if c != Ordering::Equal {
                    return c;
                }
            }
            a.len().cmp(&b.len())
        }
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(-1), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn add_numbers() {
        assert_eq!(add(&json!(2), &json!(3)), json!(5));
        assert_eq!(add(&json!(1.5), &json!(1)), json!(2.5));
        assert_eq!(add(&json!(true), &json!(null)), json!(1));
    }

    #[test]
    fn add_past_i64_range_stays_exact() {
        let big = json!(1i64 << 62);
        assert_eq!(add(&big, &big), json!(9223372036854775808.0_f64));
        assert_eq!(json_f64(9223372036854775808.0), json!(9223372036854775808.0_f64));
        assert_eq!(json_f64(-9223372036854775808.0), json!(i64::MIN));
    }

    #[test]
    fn add_concatenates_strings() {
        assert_eq!(add(&json!("a"), &json!(1)), json!("a1"));
        assert_eq!(add(&json!(5), &json!("1")), json!("51"));
        assert_eq!(add(&json!([1, null, 2]), &json!("!")), json!("1,,2!"));
    }

    #[test]
    fn js_strings() {
        assert_eq!(to_js_string(&json!(null)), "null");
        assert_eq!(to_js_string(&json!(3.0)), "3");
        assert_eq!(to_js_string(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn numeric_keys() {
        assert_eq!(numeric_key(&json!("-1")), Some(-1.0));
        assert_eq!(numeric_key(&json!(2)), Some(2.0));
        assert_eq!(numeric_key(&json!("bar")), None);
        assert_eq!(numeric_key(&json!("")), None);
        assert_eq!(numeric_key(&json!("NaN")), None);
    }

    #[test]
    fn strict_equality() {
        assert!(strict_equals(&json!(1), &json!(1.0)));
        assert!(!strict_equals(&json!(1), &json!("1")));
        assert!(strict_equals(&json!({"a": [1]}), &json!({"a": [1]})));
    }

    #[test]
    fn ordering_by_type_then_value() {
        assert_eq!(compare_values(&json!(null), &json!(false)), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&json!(99), &json!("1")), Ordering::Less);
    }
}
