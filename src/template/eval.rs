use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::value::{add, is_truthy, strict_equals, to_js_string, value_type};

use super::ast::{Expr, Key, Plan};
use super::builtins;
use super::env::{Env, ELEMENT, ROOT};
use super::Options;

/// Result of evaluating the base of a field access.
///
/// `destructured` is set by `[].` and only lives for the one access that
/// consumes it; it is never stored in the value.
struct Evaluated<'v> {
    value: Cow<'v, Value>,
    destructured: bool,
}

pub struct Evaluator {
    debug: bool,
}

impl Evaluator {
    pub fn new(options: Options) -> Self {
        Evaluator {
            debug: options.debug,
        }
    }

    /// Build the output described by `plan`.
    pub fn plan<'v>(&self, plan: &'v Plan, env: &Env<'v>) -> Value {
        match plan {
            Plan::Literal(val) => val.clone(),

            Plan::Expr(expr) => self.expr(expr, env).into_owned(),

            Plan::ObjectBuild(entries) => {
                let mut out = Map::new();
                for (key, value) in entries {
                    let key = match key {
                        Key::Literal(name) => name.clone(),
                        Key::Dynamic(expr) => to_js_string(&self.expr(expr, env)),
                    };
                    out.insert(key, self.plan(value, env));
                }
                Value::Object(out)
            }

            Plan::ArrayLiteral(items) => {
                Value::Array(items.iter().map(|item| self.plan(item, env)).collect())
            }

            Plan::ForEach { source, var, body } => {
                let source = match source.as_ref() {
                    Plan::Expr(expr) => self.expr(expr, env),
                    other => Cow::Owned(self.plan(other, env)),
                };
                let Value::Array(items) = source.as_ref() else {
                    return self.soft_null("foreach", &source).into_owned();
                };
                Value::Array(
                    items
                        .iter()
                        .map(|item| {
                            let scope = env.bind(var, item);
                            self.plan(body, &scope)
                        })
                        .collect(),
                )
            }
        }
    }

    /// Evaluate one expression, borrowing from the input where possible.
    pub fn expr<'v>(&self, expr: &'v Expr, env: &Env<'v>) -> Cow<'v, Value> {
        match expr {
            Expr::RootRef => binding(env, ROOT),

            Expr::VarRef(name) => binding(env, name),

            Expr::ElementRef => binding(env, ELEMENT),

            Expr::Literal(val) => Cow::Borrowed(val),

            Expr::FieldAccess(base, key) => {
                let base = self.base(base, env);
                let key = self.expr(key, env);
                builtins::get(base.value, &key, base.destructured)
            }

            // Only meaningful as the base of a field access.
            Expr::ArrayMap(base) => self.expr(base, env),

            Expr::RecursiveSearch(base, key) => {
                let base = self.expr(base, env);
                let key = to_js_string(&self.expr(key, env));
                Cow::Owned(builtins::search(&base, &key))
            }

            Expr::Or(a, b) => {
                let left = self.expr(a, env);
                if is_truthy(&left) {
                    left
                } else {
                    self.expr(b, env)
                }
            }

            Expr::And(a, b) => {
                let left = self.expr(a, env);
                if is_truthy(&left) {
                    self.expr(b, env)
                } else {
                    left
                }
            }

            Expr::Equals(a, b) => {
                let equal = strict_equals(&self.expr(a, env), &self.expr(b, env));
                Cow::Owned(Value::Bool(equal))
            }

            Expr::Add(a, b) => Cow::Owned(add(&self.expr(a, env), &self.expr(b, env))),

            Expr::Not(a) => Cow::Owned(Value::Bool(!is_truthy(&self.expr(a, env)))),

            Expr::ToBool(a) => Cow::Owned(Value::Bool(is_truthy(&self.expr(a, env)))),

            Expr::SetDedup(base) => {
                let base = self.expr(base, env);
                match base.as_ref() {
                    Value::Array(items) => Cow::Owned(builtins::dedup(items)),
                    other => self.soft_null("#", other),
                }
            }

            Expr::Sort(base, key) => {
                let base = self.expr(base, env);
                let Value::Array(items) = base.as_ref() else {
                    return self.soft_null("!sort", &base);
                };
                match key {
                    None => Cow::Owned(builtins::sort(items)),
                    Some(key) => {
                        let keys = items
                            .iter()
                            .map(|item| {
                                let scope = env.bind(ELEMENT, item);
                                self.expr(key, &scope).into_owned()
                            })
                            .collect();
                        Cow::Owned(builtins::sort_by_keys(items, keys))
                    }
                }
            }

            Expr::Filter(base, predicate) => {
                let base = self.expr(base, env);
                let Value::Array(items) = base.as_ref() else {
                    return self.soft_null("!filter", &base);
                };
                let kept = items
                    .iter()
                    .filter(|item| {
                        let scope = env.bind(ELEMENT, item);
                        is_truthy(&self.expr(predicate, &scope))
                    })
                    .cloned()
                    .collect();
                Cow::Owned(Value::Array(kept))
            }

            Expr::Map(base, f) => {
                let base = self.expr(base, env);
                let Value::Array(items) = base.as_ref() else {
                    return self.soft_null("!map", &base);
                };
                let mapped = items
                    .iter()
                    .map(|item| {
                        let scope = env.bind(ELEMENT, item);
                        self.expr(f, &scope).into_owned()
                    })
                    .collect();
                Cow::Owned(Value::Array(mapped))
            }

            Expr::JsonReparse(base) => Cow::Owned(builtins::reparse(self.expr(base, env).into_owned())),
        }
    }

    fn base<'v>(&self, expr: &'v Expr, env: &Env<'v>) -> Evaluated<'v> {
        match expr {
            Expr::ArrayMap(inner) => {
                let value = self.expr(inner, env);
                let destructured = value.is_array();
                Evaluated {
                    value,
                    destructured,
                }
            }
            other => Evaluated {
                value: self.expr(other, env),
                destructured: false,
            },
        }
    }

    fn soft_null<'v>(&self, op: &str, found: &Value) -> Cow<'v, Value> {
        if self.debug {
            log::debug!("{op} expects an array, got {}; producing null", value_type(found));
        }
        Cow::Owned(Value::Null)
    }
}

fn binding<'v>(env: &Env<'v>, name: &str) -> Cow<'v, Value> {
    env.get(name).map_or(Cow::Owned(Value::Null), Cow::Borrowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::compile::Compiler;
    use serde_json::json;

    fn eval_template(template: Value, input: Value) -> Value {
        let plan = Compiler::new(Options::default()).compile(&template).unwrap();
        let env = Env::new(&input);
        Evaluator::new(Options::default()).plan(&plan, &env)
    }

    #[test]
    fn eval_safe_navigation() {
        assert_eq!(eval_template(json!(".a.b.c"), json!({})), json!(null));
        assert_eq!(eval_template(json!(".a.b"), json!({"a": {"b": 2}})), json!(2));
    }

    #[test]
    fn eval_root() {
        assert_eq!(eval_template(json!("$"), json!([1])), json!([1]));
        assert_eq!(eval_template(json!("."), json!({"x": 1})), json!({"x": 1}));
    }

    #[test]
    fn eval_array_map() {
        assert_eq!(
            eval_template(json!("$[].bar"), json!([{"bar": 1}, {"bar": 2}])),
            json!([1, 2])
        );
        assert_eq!(
            eval_template(json!("$[].bar"), json!([[{"bar": 1}], {"bar": 2}])),
            json!([1, 2])
        );
    }

    #[test]
    fn eval_array_map_chains() {
        let input = json!({"pizzas": [
            {"toppings": [{"name": "pepperoni"}, {"name": "cheese"}]},
            {"toppings": [{"name": "cheese"}]}
        ]});
        assert_eq!(
            eval_template(json!(".pizzas[].toppings[].name"), input),
            json!(["pepperoni", "cheese", "cheese"])
        );
    }

    #[test]
    fn eval_array_map_does_not_leak() {
        let input = json!({"items": [{"bar": 1}, {"bar": 2}]});
        assert_eq!(eval_template(json!(".items[].bar"), input.clone()), json!([1, 2]));
        assert_eq!(eval_template(json!(".items.bar"), input), json!(null));
    }

    #[test]
    fn eval_computed_root_lookup() {
        let input = json!({"k": "a", "a": 7});
        assert_eq!(eval_template(json!(".(.k)"), input.clone()), json!(7));
        assert_eq!(eval_template(json!("$.(.k)"), input.clone()), json!(7));
        assert_eq!(eval_template(json!(".(.missing)"), input), json!(null));
    }

    #[test]
    fn eval_negative_index() {
        assert_eq!(eval_template(json!(".items.-1"), json!({"items": [1, 2, 3]})), json!(3));
        assert_eq!(eval_template(json!(".items.7"), json!({"items": [1, 2, 3]})), json!(null));
    }

    #[test]
    fn eval_recursive_search() {
        let input = json!({"a": {"id": 1}, "b": [{"id": 2}, {"c": {"id": 3}}]});
        assert_eq!(eval_template(json!("$*.id"), input), json!([1, 2, 3]));
    }

    #[test]
    fn eval_fallback() {
        assert_eq!(
            eval_template(json!(".missing | .present"), json!({"present": 5})),
            json!(5)
        );
        assert_eq!(
            eval_template(json!(".missing | .present"), json!({"missing": 0, "present": 5})),
            json!(5)
        );
        assert_eq!(
            eval_template(json!(".missing | .present"), json!({"missing": "x", "present": 5})),
            json!("x")
        );
    }

    #[test]
    fn eval_and() {
        assert_eq!(eval_template(json!(".a & .b"), json!({"a": 1, "b": 2})), json!(2));
        assert_eq!(eval_template(json!(".a & .b"), json!({"a": "", "b": 2})), json!(""));
    }

    #[test]
    fn eval_equals_is_strict() {
        assert_eq!(eval_template(json!(".a = .b"), json!({"a": 1, "b": 1.0})), json!(true));
        assert_eq!(eval_template(json!(".a = .b"), json!({"a": 1, "b": "1"})), json!(false));
        assert_eq!(eval_template(json!(".kind = cat"), json!({"kind": "cat"})), json!(true));
    }

    #[test]
    fn eval_add() {
        assert_eq!(eval_template(json!(".a + .b"), json!({"a": 1, "b": 2})), json!(3));
        assert_eq!(
            eval_template(json!(".first + .last"), json!({"first": "Ada", "last": "Lovelace"})),
            json!("AdaLovelace")
        );
    }

    #[test]
    fn eval_not_and_to_bool() {
        assert_eq!(eval_template(json!(".a?"), json!({"a": "yes"})), json!(true));
        assert_eq!(eval_template(json!(".a?"), json!({})), json!(false));
        assert_eq!(eval_template(json!("!.a"), json!({"a": 0})), json!(true));
        assert_eq!(eval_template(json!("!.a.b"), json!({"a": {"b": 1}})), json!(false));
    }

    #[test]
    fn eval_set_dedup() {
        assert_eq!(
            eval_template(json!(".tags #"), json!({"tags": ["x", "y", "x"]})),
            json!(["x", "y"])
        );
        assert_eq!(eval_template(json!(".tags #"), json!({})), json!(null));
    }

    #[test]
    fn eval_sort() {
        assert_eq!(eval_template(json!("$ !sort"), json!([3, 1, 2])), json!([1, 2, 3]));
        assert_eq!(eval_template(json!(".nope !sort"), json!({})), json!(null));
    }

    #[test]
    fn eval_sort_by_is_stable() {
        let input = json!([
            {"name": "a", "price": 5},
            {"name": "b", "price": 1},
            {"name": "c", "price": 5},
            {"name": "d", "price": 3}
        ]);
        assert_eq!(
            eval_template(json!("$ !sortBy @.price !map @.name"), input),
            json!(["b", "d", "a", "c"])
        );
    }

    #[test]
    fn eval_filter_and_map() {
        let input = json!({"people": [
            {"name": "ann", "active": true},
            {"name": "bob", "active": false},
            {"name": "cy", "active": true}
        ]});
        assert_eq!(
            eval_template(json!(".people !filter @.active !map @.name"), input),
            json!(["ann", "cy"])
        );
        assert_eq!(eval_template(json!(".x !map @.name"), json!({"x": 1})), json!(null));
    }

    #[test]
    fn eval_nested_predicates_rebind_element() {
        let input = json!([{"tags": ["a", "b"]}, {"tags": ["c"]}]);
        assert_eq!(
            eval_template(json!("$ !map (@.tags !filter @ = b)"), input),
            json!([["b"], []])
        );
    }

    #[test]
    fn eval_json_reparse() {
        assert_eq!(
            eval_template(json!(".payload !json"), json!({"payload": "{\"a\": \"[1]\"}"})),
            json!({"a": [1]})
        );
        assert_eq!(eval_template(json!(".s !json"), json!({"s": "plain"})), json!("plain"));
    }

    #[test]
    fn eval_literal_words() {
        assert_eq!(eval_template(json!("hello world"), json!(null)), json!("hello world"));
        assert_eq!(eval_template(json!(42), json!(null)), json!(42));
    }
}
