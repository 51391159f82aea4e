use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;

use crate::error::JtError;
use crate::value::to_js_string;

/// Parse YAML text (a template or an input document) into a JSON value.
///
/// Mapping keys that are scalars take the same string form a computed
/// template key would (`1` becomes `"1"`, `~` becomes `"null"`).
pub fn parse(input: &str) -> Result<Value, JtError> {
    let doc: Yaml = serde_yaml::from_str(input).map_err(|e| match e.location() {
        Some(loc) => JtError::Parse(format!(
            "YAML line {} column {}: {e}",
            loc.line(),
            loc.column()
        )),
        None => JtError::Parse(e.to_string()),
    })?;
    convert(doc, "$")
}

fn convert(node: Yaml, path: &str) -> Result<Value, JtError> {
    Ok(match node {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| convert(item, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, item) in entries {
                let key = match key {
                    Yaml::Sequence(_) | Yaml::Mapping(_) | Yaml::Tagged(_) => {
                        return Err(JtError::Parse(format!(
                            "at {path}: mapping keys must be scalars"
                        )));
                    }
                    scalar => to_js_string(&convert(scalar, path)?),
                };
                let child = convert(item, &format!("{path}.{key}"))?;
                map.insert(key, child);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => convert(tagged.value, path)?,
    })
}

fn number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_template() {
        let input = "name: $x.name\n\\.raw: true\nlist:\n  - literal\n  - 1";
        let val = parse(input).unwrap();
        assert_eq!(val["name"], "$x.name");
        assert_eq!(val["\\.raw"], true);
        assert_eq!(val["list"], json!(["literal", 1]));
    }

    #[test]
    fn parse_keeps_key_order() {
        let val = parse("b: 1\na: 2").unwrap();
        let keys: Vec<&String> = val.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn scalar_keys_use_template_key_strings() {
        let val = parse("1: one\ntrue: yes\n~: nothing\n1.5: half").unwrap();
        assert_eq!(
            val,
            json!({"1": "one", "true": "yes", "null": "nothing", "1.5": "half"})
        );
    }

    #[test]
    fn nested_key_errors_name_the_path() {
        let err = parse("outer:\n  - ok\n  - ? [a, b]\n    : bad").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error: at $.outer[1]: mapping keys must be scalars"
        );
    }

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(parse("x: .nan").unwrap(), json!({"x": null}));
    }

    #[test]
    fn syntax_errors_carry_location() {
        let err = parse("key: [unterminated").unwrap_err();
        assert!(err.to_string().starts_with("parse error: YAML line"), "{err}");
    }
}
