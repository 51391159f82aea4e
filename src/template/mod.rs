pub mod ast;
pub mod builder;
pub mod builtins;
pub mod compile;
pub mod env;
pub mod eval;
pub mod lexer;
pub mod ops;
pub mod shunting;

use serde_json::Value;

use crate::error::CompileError;

use self::ast::Plan;
use self::compile::Compiler;
use self::env::Env;
use self::eval::Evaluator;

/// Knobs passed to [`compile_with`] and kept by the resulting [`Transform`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Log tokens, postfix sequences and the compiled plan at debug level, and
    /// report operators that degraded to null during evaluation.
    pub debug: bool,
}

/// A compiled template. Immutable, so one instance can serve any number of
/// inputs, from any number of threads.
#[derive(Debug, Clone)]
pub struct Transform {
    plan: Plan,
    options: Options,
}

impl Transform {
    /// Reshape `input` according to the template. Missing data yields null
    /// along the missing path; this never fails and never modifies `input`.
    pub fn apply(&self, input: &Value) -> Value {
        let env = Env::new(input);
        Evaluator::new(self.options).plan(&self.plan, &env)
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }
}

/// Compile a template with default options.
pub fn compile(template: &Value) -> Result<Transform, CompileError> {
    compile_with(template, Options::default())
}

pub fn compile_with(template: &Value, options: Options) -> Result<Transform, CompileError> {
    let plan = Compiler::new(options).compile(template)?;
    if options.debug {
        log::debug!("compiled plan: {plan:#?}");
    }
    Ok(Transform { plan, options })
}
