//! Bindings visible to a running formula.

use std::collections::{BTreeMap, BTreeSet};

use super::{EvalError, Value};

/// Host object exposed to formulas by name (`a`, `b`, `item`, ...).
///
/// Objects are read-only: formulas can read fields and call query methods
/// but never write through a binding.
pub trait FormulaObject {
    /// Name used in error messages.
    fn type_name(&self) -> &'static str;

    fn field(&self, name: &str) -> Option<Value>;

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, EvalError> {
        let _ = args;
        Err(EvalError::UnknownMethod {
            object: self.type_name().to_string(),
            method: method.to_string(),
        })
    }
}

/// Checks the argument count of a method or builtin.
pub fn expect_args(function: &str, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::ArgCount {
            function: function.to_string(),
            expected,
            found: args.len(),
        })
    }
}

/// A set of ids, e.g. `excludelist.includes(skill.id)`.
#[derive(Clone, Copy, Debug)]
pub struct IdList<'a>(pub &'a BTreeSet<u32>);

impl FormulaObject for IdList<'_> {
    fn type_name(&self) -> &'static str {
        "list"
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "length" => Some(Value::Number(self.0.len() as f64)),
            _ => None,
        }
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, EvalError> {
        match method {
            "includes" | "contains" => {
                expect_args(method, args, 1)?;
                let needle = args[0].as_number();
                Ok(Value::Bool(
                    self.0.iter().any(|id| f64::from(*id) == needle),
                ))
            }
            _ => Err(EvalError::UnknownMethod {
                object: self.type_name().to_string(),
                method: method.to_string(),
            }),
        }
    }
}

/// Named objects plus mutable local variables.
///
/// Locals start from whatever the query seeds (e.g. `speed`) and can be
/// created or updated by assignments inside the formula.
#[derive(Default)]
pub struct Scope<'a> {
    objects: BTreeMap<&'a str, &'a dyn FormulaObject>,
    locals: BTreeMap<String, Value>,
}

impl<'a> Scope<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, name: &'a str, object: &'a dyn FormulaObject) -> Self {
        self.objects.insert(name, object);
        self
    }

    pub fn with_local(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set_local(name, value.into());
        self
    }

    pub fn object(&self, name: &str) -> Option<&'a dyn FormulaObject> {
        self.objects.get(name).copied()
    }

    pub fn local(&self, name: &str) -> Option<Value> {
        self.locals.get(name).copied()
    }

    pub fn set_local(&mut self, name: &str, value: Value) {
        self.locals.insert(name.to_string(), value);
    }

    pub fn is_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }
}
