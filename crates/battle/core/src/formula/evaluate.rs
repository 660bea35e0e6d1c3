//! Tree-walking evaluator.

use super::ast::{BinaryOp, Expr, Program, Statement, UnaryOp};
use super::scope::{FormulaObject, Scope, expect_args};
use super::Value;

/// Failure while running a formula against its bindings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("unknown binding `{0}`")]
    UnknownBinding(String),

    #[error("`{object}` has no field `{field}`")]
    UnknownField { object: String, field: String },

    #[error("`{object}` has no method `{method}`")]
    UnknownMethod { object: String, method: String },

    #[error("`{function}` expects {expected} argument(s), found {found}")]
    ArgCount {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,
}

/// Runs every statement in order and returns the value of the last one.
///
/// Assignments write locals in `scope`; an assignment's value is the value
/// assigned.
pub fn evaluate(program: &Program, scope: &mut Scope<'_>) -> Result<Value, EvalError> {
    let mut completion = None;

    for statement in &program.statements {
        let value = match statement {
            Statement::Expr(expr) => eval_expr(expr, scope)?,
            Statement::Assign { target, op, value } => {
                if scope.is_object(target) {
                    return Err(EvalError::TypeMismatch(format!(
                        "cannot assign to bound object `{target}`"
                    )));
                }
                let rhs = eval_expr(value, scope)?;
                let result = match op.binary() {
                    None => rhs,
                    Some(binary) => {
                        let current = scope
                            .local(target)
                            .ok_or_else(|| EvalError::UnknownBinding(target.clone()))?;
                        apply_binary(binary, current, rhs)?
                    }
                };
                scope.set_local(target, result);
                result
            }
        };
        completion = Some(value);
    }

    completion.ok_or_else(|| EvalError::TypeMismatch("formula produced no value".into()))
}

enum Target<'a> {
    Object(&'a dyn FormulaObject),
    Math,
}

fn target<'a>(expr: &Expr, scope: &Scope<'a>) -> Result<Target<'a>, EvalError> {
    let Expr::Ident(name) = expr else {
        return Err(EvalError::TypeMismatch(
            "only bound objects have fields and methods".into(),
        ));
    };
    if let Some(object) = scope.object(name) {
        return Ok(Target::Object(object));
    }
    if name == "Math" {
        return Ok(Target::Math);
    }
    match scope.local(name) {
        Some(value) => Err(EvalError::TypeMismatch(format!(
            "`{name}` is a {} and has no fields",
            value.type_name()
        ))),
        None => Err(EvalError::UnknownBinding(name.clone())),
    }
}

fn eval_expr(expr: &Expr, scope: &Scope<'_>) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Ident(name) => {
            if let Some(value) = scope.local(name) {
                Ok(value)
            } else if scope.is_object(name) || name == "Math" {
                Err(EvalError::TypeMismatch(format!(
                    "`{name}` is an object, not a value"
                )))
            } else {
                Err(EvalError::UnknownBinding(name.clone()))
            }
        }
        Expr::Member { object, field } => match target(object, scope)? {
            Target::Object(object) => {
                object
                    .field(field)
                    .ok_or_else(|| EvalError::UnknownField {
                        object: object.type_name().to_string(),
                        field: field.clone(),
                    })
            }
            Target::Math => math_constant(field).ok_or_else(|| EvalError::UnknownField {
                object: "Math".into(),
                field: field.clone(),
            }),
        },
        Expr::MethodCall {
            object,
            method,
            args,
        } => {
            let target = target(object, scope)?;
            let args = eval_args(args, scope)?;
            match target {
                Target::Object(object) => object.call(method, &args),
                Target::Math => builtin(method, &args).unwrap_or_else(|| {
                    Err(EvalError::UnknownMethod {
                        object: "Math".into(),
                        method: method.clone(),
                    })
                }),
            }
        }
        Expr::Call { function, args } => {
            let args = eval_args(args, scope)?;
            builtin(function, &args)
                .unwrap_or_else(|| Err(EvalError::UnknownBinding(function.clone())))
        }
        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, scope)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!value.is_truthy()),
                UnaryOp::Neg => Value::Number(-value.as_number()),
                UnaryOp::Plus => Value::Number(value.as_number()),
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let left = eval_expr(lhs, scope)?;
            // Logical operators short-circuit and yield an operand.
            match op {
                BinaryOp::And if !left.is_truthy() => Ok(left),
                BinaryOp::Or if left.is_truthy() => Ok(left),
                BinaryOp::And | BinaryOp::Or => eval_expr(rhs, scope),
                _ => apply_binary(*op, left, eval_expr(rhs, scope)?),
            }
        }
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if eval_expr(condition, scope)?.is_truthy() {
                eval_expr(then, scope)
            } else {
                eval_expr(otherwise, scope)
            }
        }
    }
}

fn eval_args(args: &[Expr], scope: &Scope<'_>) -> Result<Vec<Value>, EvalError> {
    args.iter().map(|arg| eval_expr(arg, scope)).collect()
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let (l, r) = (left.as_number(), right.as_number());
    let value = match op {
        BinaryOp::Add => Value::Number(l + r),
        BinaryOp::Sub => Value::Number(l - r),
        BinaryOp::Mul => Value::Number(l * r),
        BinaryOp::Div | BinaryOp::Rem if r == 0.0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Div => Value::Number(l / r),
        BinaryOp::Rem => Value::Number(l % r),
        BinaryOp::Lt => Value::Bool(l < r),
        BinaryOp::Le => Value::Bool(l <= r),
        BinaryOp::Gt => Value::Bool(l > r),
        BinaryOp::Ge => Value::Bool(l >= r),
        BinaryOp::LooseEq => Value::Bool(l == r),
        BinaryOp::LooseNe => Value::Bool(l != r),
        BinaryOp::StrictEq => Value::Bool(strict_eq(left, right)),
        BinaryOp::StrictNe => Value::Bool(!strict_eq(left, right)),
        BinaryOp::And | BinaryOp::Or => {
            return Err(EvalError::TypeMismatch(
                "logical operator used as arithmetic".into(),
            ));
        }
    };
    Ok(value)
}

fn strict_eq(left: Value, right: Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        _ => false,
    }
}

fn math_constant(name: &str) -> Option<Value> {
    match name {
        "PI" => Some(Value::Number(core::f64::consts::PI)),
        "E" => Some(Value::Number(core::f64::consts::E)),
        _ => None,
    }
}

/// Round half up, matching the host's `Math.round`.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Math helpers, callable as `Math.name(..)` or bare `name(..)`.
fn builtin(name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
    let unary = |f: fn(f64) -> f64| {
        expect_args(name, args, 1).map(|()| Value::Number(f(args[0].as_number())))
    };
    let result = match name {
        "max" | "min" => {
            let Some(first) = args.first() else {
                return Some(Err(EvalError::ArgCount {
                    function: name.to_string(),
                    expected: 1,
                    found: 0,
                }));
            };
            let fold: fn(f64, f64) -> f64 = if name == "max" { f64::max } else { f64::min };
            let value = args[1..]
                .iter()
                .fold(first.as_number(), |acc, arg| fold(acc, arg.as_number()));
            Ok(Value::Number(value))
        }
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "round" => unary(round_half_up),
        "abs" => unary(f64::abs),
        "sqrt" => unary(f64::sqrt),
        "trunc" => unary(f64::trunc),
        "pow" => expect_args(name, args, 2)
            .map(|()| Value::Number(args[0].as_number().powf(args[1].as_number()))),
        _ => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse::parse_program;

    struct Stub;

    impl FormulaObject for Stub {
        fn type_name(&self) -> &'static str {
            "stub"
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "atk" => Some(Value::Number(30.0)),
                "agi" => Some(Value::Number(50.0)),
                _ => None,
            }
        }

        fn call(&self, method: &str, args: &[Value]) -> Result<Value, EvalError> {
            match method {
                "hpRate" => {
                    expect_args(method, args, 0)?;
                    Ok(Value::Number(0.25))
                }
                _ => Err(EvalError::UnknownMethod {
                    object: "stub".into(),
                    method: method.into(),
                }),
            }
        }
    }

    fn run(source: &str) -> Result<Value, EvalError> {
        let stub = Stub;
        let program = parse_program(source).unwrap();
        let mut scope = Scope::new().with_object("a", &stub).with_local("speed", 50.0);
        evaluate(&program, &mut scope)
    }

    #[test]
    fn arithmetic_over_fields() {
        assert_eq!(run("(a.atk + a.agi) * 0.5"), Ok(Value::Number(40.0)));
        assert_eq!(run("7 % 4"), Ok(Value::Number(3.0)));
    }

    #[test]
    fn assignment_updates_locals() {
        assert_eq!(run("speed += a.atk;"), Ok(Value::Number(80.0)));
        assert_eq!(run("var x = 2\nx *= speed\nx"), Ok(Value::Number(100.0)));
    }

    #[test]
    fn compound_assignment_needs_an_existing_local() {
        assert_eq!(
            run("missing += 1"),
            Err(EvalError::UnknownBinding("missing".into()))
        );
    }

    #[test]
    fn bound_objects_are_read_only() {
        assert!(matches!(run("a = 3"), Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(run("0 && unknown"), Ok(Value::Number(0.0)));
        assert_eq!(run("a.hpRate() < 0.5 || unknown"), Ok(Value::Bool(true)));
        assert_eq!(
            run("1 && unknown"),
            Err(EvalError::UnknownBinding("unknown".into()))
        );
    }

    #[test]
    fn equality_flavours() {
        assert_eq!(run("true == 1"), Ok(Value::Bool(true)));
        assert_eq!(run("true === 1"), Ok(Value::Bool(false)));
        assert_eq!(run("2 !== 2"), Ok(Value::Bool(false)));
    }

    #[test]
    fn math_builtins() {
        assert_eq!(run("Math.max(1, a.atk, 4)"), Ok(Value::Number(30.0)));
        assert_eq!(run("min(3, 2)"), Ok(Value::Number(2.0)));
        assert_eq!(run("Math.round(2.5)"), Ok(Value::Number(3.0)));
        assert_eq!(run("Math.round(-2.5)"), Ok(Value::Number(-2.0)));
        assert_eq!(run("floor(a.atk / 7)"), Ok(Value::Number(4.0)));
        assert!(matches!(
            run("Math.max()"),
            Err(EvalError::ArgCount { found: 0, .. })
        ));
        assert!(matches!(
            run("Math.random()"),
            Err(EvalError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn unknown_names_fail_loudly() {
        assert_eq!(run("b.atk"), Err(EvalError::UnknownBinding("b".into())));
        assert_eq!(
            run("a.str"),
            Err(EvalError::UnknownField {
                object: "stub".into(),
                field: "str".into()
            })
        );
        assert!(matches!(run("a.hpRate(1)"), Err(EvalError::ArgCount { .. })));
        assert!(matches!(run("speed.x"), Err(EvalError::TypeMismatch(_))));
        assert!(matches!(run("a + 1"), Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(run("a.atk / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(run("speed % 0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn rounding_does_not_carry_below_half() {
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-0.50000000000000011), -1.0);
        assert_eq!(round_half_up(87.5), 88.0);
    }

    #[test]
    fn ternary_picks_a_branch() {
        assert_eq!(run("a.agi > 40 ? 1 : 2"), Ok(Value::Number(1.0)));
    }
}
