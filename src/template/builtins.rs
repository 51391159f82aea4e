//! Runtime primitives behind the template operators.

use std::borrow::Cow;

use serde_json::Value;

use crate::value::{compare_values, is_truthy, numeric_key, strict_equals, to_js_string};

/// Plain lookup: object key, or array index with negative wraparound.
pub fn lookup<'v>(val: &'v Value, key: &Value) -> Option<&'v Value> {
    match val {
        Value::Array(items) => {
            let index = numeric_key(key)?;
            if index.fract() != 0.0 {
                return None;
            }
            let index = if index < 0.0 {
                index + items.len() as f64
            } else {
                index
            };
            if index < 0.0 {
                return None;
            }
            items.get(index as usize)
        }
        Value::Object(map) => map.get(&to_js_string(key)),
        _ => None,
    }
}

fn lookup_or_null(val: &Value, key: &Value) -> Value {
    if !is_truthy(val) {
        return Value::Null;
    }
    lookup(val, key).cloned().unwrap_or(Value::Null)
}

/// Safe navigation through `base` with `key`.
///
/// A falsy base or key yields null. When `destructured` is set and the key is
/// not numeric, the key is applied to every element instead, flattening one
/// level of nested arrays.
pub fn get<'v>(base: Cow<'v, Value>, key: &Value, destructured: bool) -> Cow<'v, Value> {
    if !is_truthy(&base) || !is_truthy(key) {
        return Cow::Owned(Value::Null);
    }

    if destructured && numeric_key(key).is_none() {
        if let Value::Array(items) = base.as_ref() {
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(inner) => {
                        results.extend(inner.iter().map(|el| lookup_or_null(el, key)));
                    }
                    other => results.push(lookup_or_null(other, key)),
                }
            }
            return Cow::Owned(Value::Array(results));
        }
    }

    match base {
        Cow::Borrowed(val) => lookup(val, key).map_or(Cow::Owned(Value::Null), Cow::Borrowed),
        Cow::Owned(val) => Cow::Owned(lookup(&val, key).cloned().unwrap_or(Value::Null)),
    }
}

/// Depth-first collection of every value stored under `key`, in visitation order.
/// Collected values are not searched further.
pub fn search(val: &Value, key: &str) -> Value {
    fn walk(val: &Value, key: &str, results: &mut Vec<Value>) {
        match val {
            Value::Object(map) => {
                for (k, child) in map {
                    if k == key {
                        results.push(child.clone());
                    } else {
                        walk(child, key, results);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    walk(item, key, results);
                }
            }
            _ => {}
        }
    }

    let mut results = Vec::new();
    walk(val, key, &mut results);
    Value::Array(results)
}

/// Remove repeated values, keeping the first occurrence of each.
pub fn dedup(items: &[Value]) -> Value {
    let mut seen: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.iter().any(|s| strict_equals(s, item)) {
            seen.push(item.clone());
        }
    }
    Value::Array(seen)
}

/// Stable ascending sort of `items`, ordered by the parallel `keys`.
pub fn sort_by_keys(items: &[Value], keys: Vec<Value>) -> Value {
    let mut keyed: Vec<(Value, &Value)> = keys.into_iter().zip(items).collect();
    keyed.sort_by(|a, b| compare_values(&a.0, &b.0));
    Value::Array(keyed.into_iter().map(|(_, item)| item.clone()).collect())
}

pub fn sort(items: &[Value]) -> Value {
    let mut sorted = items.to_vec();
    sorted.sort_by(compare_values);
    Value::Array(sorted)
}

/// Parse strings that hold JSON, recursively, leaving everything else alone.
pub fn reparse(val: Value) -> Value {
    match val {
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed) => reparse(parsed),
            Err(_) => Value::String(s),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(reparse).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, reparse(v))).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get_owned(base: Value, key: Value, destructured: bool) -> Value {
        get(Cow::Owned(base), &key, destructured).into_owned()
    }

    #[test]
    fn get_object_key() {
        let val = json!({"a": {"b": 1}});
        assert_eq!(get(Cow::Borrowed(&val), &json!("a"), false).as_ref(), &json!({"b": 1}));
        assert_eq!(get_owned(val, json!("missing"), false), json!(null));
    }

    #[test]
    fn get_through_falsy_is_null() {
        assert_eq!(get_owned(json!(null), json!("a"), false), json!(null));
        assert_eq!(get_owned(json!(0), json!("a"), false), json!(null));
        assert_eq!(get_owned(json!({"": 1}), json!(""), false), json!(null));
    }

    #[test]
    fn get_array_index() {
        let val = json!([10, 20, 30]);
        assert_eq!(get_owned(val.clone(), json!("1"), false), json!(20));
        assert_eq!(get_owned(val.clone(), json!("-1"), false), json!(30));
        assert_eq!(get_owned(val.clone(), json!("-4"), false), json!(null));
        assert_eq!(get_owned(val.clone(), json!("3"), false), json!(null));
        assert_eq!(get_owned(val.clone(), json!("1.5"), false), json!(null));
        assert_eq!(get_owned(val, json!("bar"), false), json!(null));
    }

    #[test]
    fn get_destructured_maps_and_flattens() {
        let val = json!([[{"bar": 1}, {"bar": 2}], {"bar": 3}, {"baz": 4}]);
        assert_eq!(get_owned(val, json!("bar"), true), json!([1, 2, 3, null]));
    }

    #[test]
    fn get_destructured_numeric_key_indexes() {
        let val = json!([{"bar": 1}, {"bar": 2}]);
        assert_eq!(get_owned(val, json!("0"), true), json!({"bar": 1}));
    }

    #[test]
    fn search_depth_first() {
        let val = json!({"a": {"id": 1}, "b": [{"id": 2}, {"c": {"id": 3}}]});
        assert_eq!(search(&val, "id"), json!([1, 2, 3]));
    }

    #[test]
    fn search_skips_collected_values() {
        let val = json!({"id": {"id": 2}, "x": {"id": 3}});
        assert_eq!(search(&val, "id"), json!([{"id": 2}, 3]));
        assert_eq!(search(&json!("scalar"), "id"), json!([]));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        assert_eq!(dedup(&[json!("x"), json!("y"), json!("x")]), json!(["x", "y"]));
        assert_eq!(dedup(&[json!(2), json!(1), json!(2.0)]), json!([2, 1]));
    }

    #[test]
    fn sort_is_stable_on_equal_keys() {
        let items = [json!("a"), json!("b"), json!("c")];
        let sorted = sort_by_keys(&items, vec![json!(2), json!(1), json!(2)]);
        assert_eq!(sorted, json!(["b", "a", "c"]));
    }

    #[test]
    fn sort_plain_values() {
        assert_eq!(sort(&[json!(3), json!(1), json!(2)]), json!([1, 2, 3]));
        assert_eq!(sort(&[json!("b"), json!(1), json!(null)]), json!([null, 1, "b"]));
    }

    #[test]
    fn reparse_nested_strings() {
        let val = json!({"a": "{\"b\": \"[1, 2]\"}", "c": "not json", "d": ["3", 4]});
        assert_eq!(
            reparse(val),
            json!({"a": {"b": [1, 2]}, "c": "not json", "d": [3, 4]})
        );
    }
}
