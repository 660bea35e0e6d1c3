//! Recursive-descent parser built on nom.
//!
//! Precedence, loosest first: `?:`, `||`, `&&`, equality, relational,
//! additive, multiplicative, unary, member access and calls, primaries.
//! Statements end at `;` or a line break.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, digit0, digit1};
use nom::combinator::{opt, recognize};
use nom::error::{Error, ErrorKind};
use nom::sequence::pair;
use nom::{IResult, Parser};

use super::ast::{AssignOp, BinaryOp, Expr, Program, Statement, UnaryOp};

type PResult<'a, T> = IResult<&'a str, T>;

/// Formula text outside the supported grammar.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("formula has no statements")]
    Empty,

    #[error("unexpected {found} at offset {offset}")]
    Unexpected { offset: usize, found: String },

    #[error("formula nests deeper than {max} levels at offset {offset}", max = MAX_DEPTH)]
    TooDeep { offset: usize },
}

/// Deepest nesting of parentheses, calls, ternaries and unary operators.
pub const MAX_DEPTH: usize = 64;

const EQUALITY: &[(&str, BinaryOp)] = &[
    ("===", BinaryOp::StrictEq),
    ("!==", BinaryOp::StrictNe),
    ("==", BinaryOp::LooseEq),
    ("!=", BinaryOp::LooseNe),
];

const RELATIONAL: &[(&str, BinaryOp)] = &[
    ("<=", BinaryOp::Le),
    (">=", BinaryOp::Ge),
    ("<", BinaryOp::Lt),
    (">", BinaryOp::Gt),
];

const ADDITIVE: &[(&str, BinaryOp)] = &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)];

const MULTIPLICATIVE: &[(&str, BinaryOp)] = &[
    ("*", BinaryOp::Mul),
    ("/", BinaryOp::Div),
    ("%", BinaryOp::Rem),
];

const ASSIGNMENT: &[(&str, AssignOp)] = &[
    ("+=", AssignOp::Add),
    ("-=", AssignOp::Sub),
    ("*=", AssignOp::Mul),
    ("/=", AssignOp::Div),
    ("=", AssignOp::Set),
];

/// Parses a whole formula body.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let mut statements = Vec::new();
    let mut rest = skip(source);

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(';') {
            rest = skip(after);
            continue;
        }

        let (after, statement) = statement(rest, 0).map_err(|err| unexpected(source, err))?;
        statements.push(statement);

        let next = skip(after);
        let separated = next.is_empty()
            || next.starts_with(';')
            || after[..after.len() - next.len()].contains('\n');
        if !separated {
            return Err(error_at(source, next));
        }
        rest = next;
    }

    if statements.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(Program { statements })
}

/// Parses a single expression; trailing text is an error.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let (rest, expr) = expression(source, 0).map_err(|err| unexpected(source, err))?;
    let rest = skip(rest);
    if rest.is_empty() {
        Ok(expr)
    } else {
        Err(error_at(source, rest))
    }
}

fn unexpected(source: &str, err: nom::Err<Error<&str>>) -> ParseError {
    match err {
        nom::Err::Failure(e) if e.code == ErrorKind::TooLarge => ParseError::TooDeep {
            offset: source.len() - e.input.len(),
        },
        nom::Err::Error(e) | nom::Err::Failure(e) => error_at(source, e.input),
        nom::Err::Incomplete(_) => error_at(source, ""),
    }
}

fn error_at(source: &str, remaining: &str) -> ParseError {
    let remaining = skip(remaining);
    let found = if remaining.is_empty() {
        "end of input".to_string()
    } else {
        let snippet: String = remaining.chars().take(12).collect();
        format!("`{snippet}`")
    };
    ParseError::Unexpected {
        offset: source.len() - remaining.len(),
        found,
    }
}

/// Skips whitespace plus `//` and `/* */` comments.
fn skip(mut input: &str) -> &str {
    loop {
        input = input.trim_start();
        if let Some(comment) = input.strip_prefix("//") {
            input = comment.find('\n').map_or("", |end| &comment[end..]);
        } else if let Some(comment) = input.strip_prefix("/*") {
            input = comment.find("*/").map_or("", |end| &comment[end + 2..]);
        } else {
            return input;
        }
    }
}

fn symbol<'a>(input: &'a str, expected: &'static str) -> PResult<'a, &'a str> {
    tag(expected).parse(skip(input))
}

fn fail<T>(input: &str, kind: ErrorKind) -> PResult<'_, T> {
    Err(nom::Err::Error(Error::new(input, kind)))
}

/// Matches the first operator of `table`; an operator directly followed by
/// `=` belongs to a longer token and is rejected.
fn operator<'a, T: Copy>(input: &'a str, table: &[(&str, T)]) -> Option<(&'a str, T)> {
    let input = skip(input);
    table.iter().find_map(|(text, op)| {
        let rest = input.strip_prefix(*text)?;
        (!rest.starts_with('=')).then_some((rest, *op))
    })
}

fn binary_chain<'a>(
    input: &'a str,
    depth: usize,
    table: &[(&str, BinaryOp)],
    operand: fn(&'a str, usize) -> PResult<'a, Expr>,
) -> PResult<'a, Expr> {
    let (mut rest, mut lhs) = operand(input, depth)?;
    while let Some((after, op)) = operator(rest, table) {
        let (after, rhs) = operand(after, depth)?;
        lhs = Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
        rest = after;
    }
    Ok((rest, lhs))
}

fn statement(input: &str, depth: usize) -> PResult<'_, Statement> {
    if let Some(result) = assignment(input, depth) {
        return result;
    }
    let (rest, expr) = expression(input, depth)?;
    Ok((rest, Statement::Expr(expr)))
}

/// `[var|let|const] name op expr`; `None` when the input is not an assignment.
fn assignment(input: &str, depth: usize) -> Option<PResult<'_, Statement>> {
    let (mut rest, mut target) = identifier(input).ok()?;
    if matches!(target, "var" | "let" | "const") {
        (rest, target) = identifier(rest).ok()?;
    }

    let trimmed = skip(rest);
    let (text, op) = ASSIGNMENT
        .iter()
        .find(|entry| trimmed.starts_with(entry.0))?;
    let after = &trimmed[text.len()..];
    if *op == AssignOp::Set && after.starts_with('=') {
        return None;
    }

    Some(expression(after, depth).map(|(rest, value)| {
        (
            rest,
            Statement::Assign {
                target: target.to_string(),
                op: *op,
                value,
            },
        )
    }))
}

/// Fails hard once `depth` passes [`MAX_DEPTH`].
fn nested(input: &str, depth: usize) -> Result<usize, nom::Err<Error<&str>>> {
    if depth >= MAX_DEPTH {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::TooLarge)));
    }
    Ok(depth + 1)
}

fn expression(input: &str, depth: usize) -> PResult<'_, Expr> {
    conditional(input, depth)
}

fn conditional(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (rest, condition) = logical_or(input, depth)?;
    let Ok((after, _)) = symbol(rest, "?") else {
        return Ok((rest, condition));
    };
    let inner = nested(after, depth)?;
    let (after, then) = conditional(after, inner)?;
    let (after, _) = symbol(after, ":")?;
    let (after, otherwise) = conditional(after, inner)?;
    Ok((
        after,
        Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        },
    ))
}

fn logical_or(input: &str, depth: usize) -> PResult<'_, Expr> {
    binary_chain(input, depth, &[("||", BinaryOp::Or)], logical_and)
}

fn logical_and(input: &str, depth: usize) -> PResult<'_, Expr> {
    binary_chain(input, depth, &[("&&", BinaryOp::And)], equality)
}

fn equality(input: &str, depth: usize) -> PResult<'_, Expr> {
    binary_chain(input, depth, EQUALITY, relational)
}

fn relational(input: &str, depth: usize) -> PResult<'_, Expr> {
    binary_chain(input, depth, RELATIONAL, additive)
}

fn additive(input: &str, depth: usize) -> PResult<'_, Expr> {
    binary_chain(input, depth, ADDITIVE, multiplicative)
}

fn multiplicative(input: &str, depth: usize) -> PResult<'_, Expr> {
    binary_chain(input, depth, MULTIPLICATIVE, unary)
}

fn unary(input: &str, depth: usize) -> PResult<'_, Expr> {
    let input = skip(input);
    let op = match input.chars().next() {
        Some('!') if !input.starts_with("!=") => Some(UnaryOp::Not),
        Some('-') => Some(UnaryOp::Neg),
        Some('+') => Some(UnaryOp::Plus),
        _ => None,
    };
    match op {
        Some(op) => {
            let (rest, operand) = unary(&input[1..], nested(input, depth)?)?;
            Ok((
                rest,
                Expr::Unary {
                    op,
                    operand: Box::new(operand),
                },
            ))
        }
        None => postfix(input, depth),
    }
}

fn postfix(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (mut rest, mut expr) = primary(input, depth)?;
    while let Ok((after_dot, _)) = symbol(rest, ".") {
        let (after, name) = identifier(after_dot)?;
        if skip(after).starts_with('(') {
            let (after, args) = arguments(after, depth)?;
            expr = Expr::MethodCall {
                object: Box::new(expr),
                method: name.to_string(),
                args,
            };
            rest = after;
        } else {
            expr = Expr::Member {
                object: Box::new(expr),
                field: name.to_string(),
            };
            rest = after;
        }
    }
    Ok((rest, expr))
}

fn arguments(input: &str, depth: usize) -> PResult<'_, Vec<Expr>> {
    let (mut rest, _) = symbol(input, "(")?;
    let inner = nested(rest, depth)?;
    let mut args = Vec::new();
    if let Ok((after, _)) = symbol(rest, ")") {
        return Ok((after, args));
    }
    loop {
        let (after, arg) = expression(rest, inner)?;
        args.push(arg);
        if let Ok((after, _)) = symbol(after, ",") {
            rest = after;
            continue;
        }
        let (after, _) = symbol(after, ")")?;
        return Ok((after, args));
    }
}

fn primary(input: &str, depth: usize) -> PResult<'_, Expr> {
    let input = skip(input);

    if input.starts_with('(') {
        let (rest, _) = symbol(input, "(")?;
        let (rest, expr) = expression(rest, nested(rest, depth)?)?;
        let (rest, _) = symbol(rest, ")")?;
        return Ok((rest, expr));
    }

    if let Ok((rest, number)) = number(input) {
        return Ok((rest, Expr::Number(number)));
    }

    let (rest, name) = identifier(input)?;
    match name {
        "true" => Ok((rest, Expr::Bool(true))),
        "false" => Ok((rest, Expr::Bool(false))),
        _ if skip(rest).starts_with('(') => {
            let (rest, args) = arguments(rest, depth)?;
            Ok((
                rest,
                Expr::Call {
                    function: name.to_string(),
                    args,
                },
            ))
        }
        _ => Ok((rest, Expr::Ident(name.to_string()))),
    }
}

fn number(input: &str) -> PResult<'_, f64> {
    let parsed: PResult<'_, &str> = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))
    .parse(input);
    let (rest, text) = parsed?;
    match text.parse::<f64>() {
        Ok(value) => Ok((rest, value)),
        Err(_) => fail(input, ErrorKind::Float),
    }
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
    ))
    .parse(skip(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(name.to_string()))
    }

    fn member(object: &str, field: &str) -> Expr {
        Expr::Member {
            object: ident(object),
            field: field.to_string(),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(Expr::Number(1.0)),
                rhs: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    lhs: Box::new(Expr::Number(2.0)),
                    rhs: Box::new(Expr::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = parse_expression("10 - 4 - 3").unwrap();
        let Expr::Binary { op, lhs, rhs } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Sub);
        assert_eq!(*rhs, Expr::Number(3.0));
        assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn member_access_and_method_calls() {
        assert_eq!(parse_expression("a.atk").unwrap(), member("a", "atk"));
        assert_eq!(
            parse_expression("a.isStateAffected(4)").unwrap(),
            Expr::MethodCall {
                object: ident("a"),
                method: "isStateAffected".into(),
                args: vec![Expr::Number(4.0)],
            }
        );
        assert_eq!(
            parse_expression("Math.max(1, b.def)").unwrap(),
            Expr::MethodCall {
                object: ident("Math"),
                method: "max".into(),
                args: vec![Expr::Number(1.0), member("b", "def")],
            }
        );
    }

    #[test]
    fn comparison_operators_prefer_longest_match() {
        let Expr::Binary { op, .. } = parse_expression("a.hp <= 5").unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Le);
        let Expr::Binary { op, .. } = parse_expression("x === 1").unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::StrictEq);
    }

    #[test]
    fn ternary_is_right_associative() {
        let expr = parse_expression("x ? 1 : y ? 2 : 3").unwrap();
        let Expr::Conditional { otherwise, .. } = expr else {
            panic!("expected conditional");
        };
        assert!(matches!(*otherwise, Expr::Conditional { .. }));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            parse_expression("!a.isGuard()").unwrap(),
            Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(Expr::MethodCall {
                    object: ident("a"),
                    method: "isGuard".into(),
                    args: vec![],
                }),
            }
        );
        assert!(matches!(
            parse_expression("-.5").unwrap(),
            Expr::Unary { op: UnaryOp::Neg, .. }
        ));
    }

    #[test]
    fn program_with_assignments_and_comments() {
        let program = parse_program(
            "// double it\nvar bonus = a.atk / 2;\nspeed += bonus\nspeed *= 2 /* twice */",
        )
        .unwrap();
        assert_eq!(program.statements.len(), 3);
        assert!(matches!(
            &program.statements[0],
            Statement::Assign { target, op: AssignOp::Set, .. } if target == "bonus"
        ));
        assert!(matches!(
            &program.statements[2],
            Statement::Assign { op: AssignOp::Mul, .. }
        ));
    }

    #[test]
    fn equality_is_not_an_assignment() {
        let program = parse_program("speed == 3").unwrap();
        assert!(matches!(program.statements[0], Statement::Expr(_)));
    }

    #[test]
    fn statements_on_one_line_need_a_separator() {
        assert_eq!(
            parse_program("1 2"),
            Err(ParseError::Unexpected {
                offset: 2,
                found: "`2`".into()
            })
        );
        assert!(parse_program("1; 2").is_ok());
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            parse_program("a.atk +"),
            Err(ParseError::Unexpected { .. })
        ));
        assert!(parse_program("(1 + 2").is_err());
        assert!(parse_program("a.atk ** 2").is_err());
        assert!(parse_program("\"fire\"").is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let shallow = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        assert!(parse_program(&shallow).is_ok());

        let parens = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert_eq!(
            parse_program(&parens),
            Err(ParseError::TooDeep { offset: MAX_DEPTH + 1 })
        );

        let negations = format!("{}1", "-".repeat(500));
        assert!(matches!(
            parse_program(&negations),
            Err(ParseError::TooDeep { .. })
        ));

        let calls = format!("{}1{}", "max(".repeat(200), ")".repeat(200));
        assert!(matches!(
            parse_expression(&calls),
            Err(ParseError::TooDeep { .. })
        ));
    }

    #[test]
    fn empty_bodies_are_rejected() {
        assert_eq!(parse_program(""), Err(ParseError::Empty));
        assert_eq!(parse_program("// nothing\n;;"), Err(ParseError::Empty));
    }
}
