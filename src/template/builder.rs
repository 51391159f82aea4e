use serde_json::Value;

use crate::error::CompileError;

use super::ast::Expr;
use super::ops;
use super::shunting::Postfix;

/// Fold a postfix sequence into an expression tree.
///
/// `scope` lists the `$name` variables bound by enclosing `foreach` templates;
/// any other `$name` is rejected here rather than failing at evaluation time.
pub fn build(postfix: Vec<Postfix>, scope: &[String]) -> Result<Expr, CompileError> {
    let mut stack: Vec<Expr> = Vec::new();

    for (index, item) in postfix.into_iter().enumerate() {
        match item {
            Postfix::Word(word) => stack.push(operand(word, scope)?),
            Postfix::At => stack.push(Expr::ElementRef),
            Postfix::Root => stack.push(Expr::RootRef),
            Postfix::Op(kind) => {
                let info = kind.info();
                let missing = || CompileError::Syntax {
                    token: index,
                    message: format!("'{}' is missing an operand", info.spelling),
                };
                let start = stack.len().checked_sub(info.arity).ok_or_else(missing)?;
                let operands = stack.split_off(start);
                stack.push(ops::build(kind, operands).ok_or_else(missing)?);
            }
        }
    }

    let expr = stack.pop().ok_or(CompileError::EmptyExpression)?;
    if !stack.is_empty() {
        return Err(CompileError::Syntax {
            token: 0,
            message: format!("{} operands without an operator between them", stack.len() + 1),
        });
    }
    if expr.has_free_element_ref() {
        return Err(CompileError::UnboundElement);
    }
    Ok(expr)
}

fn operand(word: String, scope: &[String]) -> Result<Expr, CompileError> {
    if word == "$" {
        return Ok(Expr::RootRef);
    }
    if word.starts_with('$') {
        if scope.iter().any(|name| *name == word) {
            return Ok(Expr::VarRef(word));
        }
        return Err(CompileError::UndefinedVariable(word));
    }
    Ok(Expr::Literal(Value::String(word)))
}
