use serde_json::Value;

use crate::error::CompileError;

use super::ast::{Expr, Key, Plan};
use super::builder;
use super::lexer::Lexer;
use super::shunting;
use super::Options;

const LITERAL_TAG: &str = "literal";
const FOREACH_TAG: &str = "foreach";

/// Walks a template value and produces its construction plan.
pub struct Compiler {
    options: Options,
    /// Variables bound by the enclosing `foreach` templates, innermost last.
    scope: Vec<String>,
}

impl Compiler {
    pub fn new(options: Options) -> Self {
        Compiler {
            options,
            scope: Vec::new(),
        }
    }

    pub fn compile(&mut self, template: &Value) -> Result<Plan, CompileError> {
        self.template(template, "$")
    }

    fn template(&mut self, template: &Value, path: &str) -> Result<Plan, CompileError> {
        match template {
            Value::Array(items) => self.tagged_array(items, path),

            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let child_path = format!("{path}.{key}");
                    let key = self.key(key, &child_path)?;
                    let plan = self.template(value, &child_path)?;
                    entries.push((key, plan));
                }
                Ok(Plan::ObjectBuild(entries))
            }

            Value::String(text) => match self.expression(text, path)? {
                Expr::Literal(val) => Ok(Plan::Literal(val)),
                expr => Ok(Plan::Expr(expr)),
            },

            scalar => Ok(Plan::Literal(scalar.clone())),
        }
    }

    fn tagged_array(&mut self, items: &[Value], path: &str) -> Result<Plan, CompileError> {
        match items.first() {
            Some(Value::String(tag)) if tag == LITERAL_TAG => {
                let mut plans = Vec::with_capacity(items.len() - 1);
                for (i, item) in items.iter().enumerate().skip(1) {
                    plans.push(self.template(item, &format!("{path}[{i}]"))?);
                }
                Ok(Plan::ArrayLiteral(plans))
            }
            Some(Value::String(tag)) if tag == FOREACH_TAG => self.foreach(items, path),
            Some(other) => Err(CompileError::UnknownTag(other.to_string()).at(path)),
            None => Err(CompileError::UnknownTag("empty array".into()).at(path)),
        }
    }

    fn foreach(&mut self, items: &[Value], path: &str) -> Result<Plan, CompileError> {
        let [_, source, var, body] = items else {
            return Err(CompileError::MalformedForeach(format!(
                "expected [\"foreach\", source, \"$var\", template], got {} elements",
                items.len()
            ))
            .at(path));
        };
        let var = match var {
            Value::String(name) if is_variable_name(name) => name.clone(),
            other => {
                return Err(CompileError::MalformedForeach(format!(
                    "variable must be a string like \"$item\", got {other}"
                ))
                .at(path));
            }
        };

        let source = self.template(source, &format!("{path}[1]"))?;

        self.scope.push(var.clone());
        let body = self.template(body, &format!("{path}[3]"));
        self.scope.pop();

        Ok(Plan::ForEach {
            source: Box::new(source),
            var,
            body: Box::new(body?),
        })
    }

    /// Keys starting with `.`, `$` or `(` are expressions; a leading `\` escapes that.
    fn key(&self, key: &str, path: &str) -> Result<Key, CompileError> {
        if key.starts_with(['.', '$', '(']) {
            return self.expression(key, path).map(Key::Dynamic);
        }
        let literal = key.strip_prefix('\\').unwrap_or(key);
        Ok(Key::Literal(literal.to_string()))
    }

    fn expression(&self, text: &str, path: &str) -> Result<Expr, CompileError> {
        let mut lexer = Lexer::new(text);
        lexer.tokenize().map_err(|e| e.at(path))?;
        if self.options.debug {
            log::debug!("{path}: tokens {:?}", lexer.tokens);
        }
        let postfix = shunting::to_postfix(&lexer.tokens).map_err(|e| e.at(path))?;
        if self.options.debug {
            log::debug!("{path}: postfix {postfix:?}");
        }
        builder::build(postfix, &self.scope).map_err(|e| e.at(path))
    }
}

fn is_variable_name(name: &str) -> bool {
    name.strip_prefix('$')
        .is_some_and(|rest| rest.chars().all(|c| c.is_alphanumeric() || c == '_'))
}
