//! Sandboxed formula language for designer code blocks.
//!
//! Code tags such as `<piercingeval>` or `<speed>` hold small programs over a
//! fixed grammar: arithmetic, comparisons, boolean logic, ternaries, member
//! access on bound objects, a handful of `Math` helpers, and assignments to
//! local variables. There is no way to reach host state beyond the objects a
//! query binds, and no way to write through them.
//!
//! ```text
//! var bonus = Math.max(a.atk - b.def, 0) * 0.01;
//! speed += bonus       // statements end at `;` or a line break
//! ```
//!
//! Programs are compiled once when the owning note is loaded; see
//! [`Formula::compile`].

pub mod ast;
mod evaluate;
mod parse;
mod scope;
mod value;

pub use evaluate::{EvalError, evaluate, round_half_up};
pub use parse::{ParseError, parse_expression, parse_program};
pub use scope::{FormulaObject, IdList, Scope, expect_args};
pub use value::Value;

use ast::Program;

/// A compiled formula together with its source text.
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    source: String,
    program: Program,
}

impl Formula {
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        Ok(Self {
            source: source.to_string(),
            program: parse_program(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn evaluate(&self, scope: &mut Scope<'_>) -> Result<Value, EvalError> {
        evaluate(&self.program, scope)
    }
}
