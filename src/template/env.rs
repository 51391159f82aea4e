use serde_json::Value;

/// Name the input root is bound under. A `foreach` over `"$"` rebinds it.
pub const ROOT: &str = "$";
/// Name of the current element inside sort keys, filters and maps.
pub const ELEMENT: &str = "@";

/// Immutable chain of variable bindings.
///
/// Each binding borrows its parent, so entering a `foreach` body or a
/// predicate never copies or mutates the enclosing scope.
#[derive(Debug, Clone, Copy)]
pub struct Env<'a> {
    name: &'a str,
    value: &'a Value,
    parent: Option<&'a Env<'a>>,
}

impl<'a> Env<'a> {
    pub fn new(input: &'a Value) -> Self {
        Env {
            name: ROOT,
            value: input,
            parent: None,
        }
    }

    pub fn bind<'b>(&'b self, name: &'b str, value: &'b Value) -> Env<'b> {
        Env {
            name,
            value,
            parent: Some(self),
        }
    }

    /// Innermost binding for `name`.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let mut env = self;
        loop {
            if env.name == name {
                return Some(env.value);
            }
            env = env.parent?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_is_bound() {
        let input = json!({"a": 1});
        let env = Env::new(&input);
        assert_eq!(env.get(ROOT), Some(&input));
        assert_eq!(env.get("$x"), None);
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let input = json!(null);
        let outer_val = json!(1);
        let inner_val = json!(2);
        let env = Env::new(&input);
        let outer = env.bind("$x", &outer_val);
        {
            let inner = outer.bind("$x", &inner_val);
            assert_eq!(inner.get("$x"), Some(&json!(2)));
            assert_eq!(inner.get(ROOT), Some(&json!(null)));
        }
        assert_eq!(outer.get("$x"), Some(&json!(1)));
    }
}
