//! Lowering from tree-sitter C++ nodes to [`Expr`].

use tree_sitter::Node;

use super::expr::{BinaryOp, Callee, Expr, ExprKind, Literal, UnaryOp};

const CAST_TEMPLATES: &[&str] = &["static_cast", "const_cast", "reinterpret_cast", "dynamic_cast"];

const EXPRESSION_KINDS: &[&str] = &[
    "alignof_expression",
    "assignment_expression",
    "binary_expression",
    "call_expression",
    "cast_expression",
    "char_literal",
    "co_await_expression",
    "comma_expression",
    "compound_literal_expression",
    "concatenated_string",
    "conditional_expression",
    "delete_expression",
    "false",
    "field_expression",
    "fold_expression",
    "identifier",
    "lambda_expression",
    "new_expression",
    "null",
    "nullptr",
    "number_literal",
    "offsetof_expression",
    "parenthesized_expression",
    "pointer_expression",
    "qualified_identifier",
    "raw_string_literal",
    "sizeof_expression",
    "string_literal",
    "subscript_expression",
    "template_function",
    "this",
    "true",
    "unary_expression",
    "update_expression",
    "user_defined_literal",
];

/// Nesting depth past which subexpressions are lowered as opaque. Keeps
/// lowering, walking and dropping of generated expressions within the
/// stack of a worker thread.
const MAX_DEPTH: usize = 200;

pub fn is_expression(kind: &str) -> bool {
    EXPRESSION_KINDS.contains(&kind)
}

pub fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// 1-based line and column of the node start.
pub fn position(node: Node) -> (usize, usize) {
    let point = node.start_position();
    (point.row + 1, point.column + 1)
}

/// Named children, comments excluded.
pub fn named_children<'tree>(node: Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}

/// First child, named or anonymous, whose kind is `kind`.
pub fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

pub fn lower_expression(node: Node, source: &[u8]) -> Expr {
    lower(node, source, 0)
}

fn lower(node: Node, source: &[u8], depth: usize) -> Expr {
    let (line, column) = position(node);
    if depth >= MAX_DEPTH {
        return Expr::opaque(line, column);
    }
    let depth = depth + 1;

    match node.kind() {
        "parenthesized_expression" => match named_children(node).first() {
            Some(inner) => lower(*inner, source, depth),
            None => Expr::opaque(line, column),
        },
        "binary_expression" => lower_binary(node, source, depth),
        "unary_expression" => lower_unary(node, source, depth),
        "pointer_expression" => {
            let op = match operator_token(node, source) {
                "&" => UnaryOp::AddressOf,
                _ => UnaryOp::Deref,
            };
            lower_prefix(node, op, source, depth)
        }
        "update_expression" => lower_update(node, source, depth),
        "assignment_expression" => lower_assignment(node, source, depth),
        "call_expression" => lower_call(node, source, depth),
        "field_expression" => {
            let object = lower_field(node, "argument", source, depth);
            let field = node
                .child_by_field_name("field")
                .map(|f| node_text(f, source).to_string())
                .unwrap_or_default();
            Expr::new(
                ExprKind::Member {
                    object: Box::new(object),
                    field,
                },
                line,
                column,
            )
        }
        "cast_expression" => {
            let to_bool = node
                .child_by_field_name("type")
                .is_some_and(|t| is_bool_type_name(node_text(t, source)));
            let operand = lower_field(node, "value", source, depth);
            Expr::new(
                ExprKind::Cast {
                    to_bool,
                    operand: Box::new(operand),
                },
                line,
                column,
            )
        }
        "conditional_expression" => {
            let condition = lower_field(node, "condition", source, depth);
            let then = node
                .child_by_field_name("consequence")
                .map(|n| Box::new(lower(n, source, depth)));
            let otherwise = lower_field(node, "alternative", source, depth);
            Expr::new(
                ExprKind::Conditional {
                    condition: Box::new(condition),
                    then,
                    otherwise: Box::new(otherwise),
                },
                line,
                column,
            )
        }
        "number_literal" => Expr::new(
            ExprKind::Literal(Literal::Number(parse_integer(node_text(node, source)))),
            line,
            column,
        ),
        "true" => Expr::new(ExprKind::Literal(Literal::Bool(true)), line, column),
        "false" => Expr::new(ExprKind::Literal(Literal::Bool(false)), line, column),
        "string_literal" | "raw_string_literal" | "concatenated_string" | "char_literal"
        | "null" | "nullptr" | "user_defined_literal" => {
            Expr::new(ExprKind::Literal(Literal::Other), line, column)
        }
        "identifier" => Expr::new(
            ExprKind::Variable(node_text(node, source).to_string()),
            line,
            column,
        ),
        "lambda_expression" | "ERROR" => Expr::opaque(line, column),
        _ => {
            let children = named_children(node)
                .into_iter()
                .map(|child| lower(child, source, depth))
                .collect();
            Expr::new(ExprKind::Opaque(children), line, column)
        }
    }
}

fn lower_field(node: Node, field: &str, source: &[u8], depth: usize) -> Expr {
    match node.child_by_field_name(field) {
        Some(child) => lower(child, source, depth),
        None => {
            let (line, column) = position(node);
            Expr::opaque(line, column)
        }
    }
}

fn operator_token<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.child_by_field_name("operator")
        .map(|op| node_text(op, source))
        .unwrap_or("")
}

fn operator_position(node: Node) -> (usize, usize) {
    node.child_by_field_name("operator")
        .map(position)
        .unwrap_or_else(|| position(node))
}

fn lower_binary(node: Node, source: &[u8], depth: usize) -> Expr {
    let (line, column) = operator_position(node);
    let op = BinaryOp::from_token(operator_token(node, source));
    let left = lower_field(node, "left", source, depth);
    let right = lower_field(node, "right", source, depth);

    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        line,
        column,
    )
}

fn lower_unary(node: Node, source: &[u8], depth: usize) -> Expr {
    let op = match operator_token(node, source) {
        "!" | "not" => UnaryOp::Not,
        "-" => UnaryOp::Negate,
        "~" | "compl" => UnaryOp::BitNot,
        _ => {
            let (line, column) = position(node);
            let operand = lower_field(node, "argument", source, depth);
            return Expr::new(ExprKind::Opaque(vec![operand]), line, column);
        }
    };
    lower_prefix(node, op, source, depth)
}

fn lower_prefix(node: Node, op: UnaryOp, source: &[u8], depth: usize) -> Expr {
    let (line, column) = position(node);
    let operand = lower_field(node, "argument", source, depth);
    Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        line,
        column,
    )
}

fn lower_update(node: Node, source: &[u8], depth: usize) -> Expr {
    let (line, column) = operator_position(node);
    let token = operator_token(node, source);
    let operator_start = node
        .child_by_field_name("operator")
        .map(|op| op.start_byte())
        .unwrap_or(0);
    let argument_start = node
        .child_by_field_name("argument")
        .map(|arg| arg.start_byte())
        .unwrap_or(0);
    let prefix = operator_start < argument_start;

    let op = match (token, prefix) {
        ("++", true) => UnaryOp::PreIncrement,
        ("++", false) => UnaryOp::PostIncrement,
        (_, true) => UnaryOp::PreDecrement,
        (_, false) => UnaryOp::PostDecrement,
    };
    let operand = lower_field(node, "argument", source, depth);

    Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        line,
        column,
    )
}

fn lower_assignment(node: Node, source: &[u8], depth: usize) -> Expr {
    let (line, column) = operator_position(node);
    let compound = operator_token(node, source) != "=";
    let target = lower_field(node, "left", source, depth);
    let value = lower_field(node, "right", source, depth);

    Expr::new(
        ExprKind::Assign {
            compound,
            target: Box::new(target),
            value: Box::new(value),
        },
        line,
        column,
    )
}

fn lower_call(node: Node, source: &[u8], depth: usize) -> Expr {
    let (line, column) = position(node);
    let mut args: Vec<Expr> = node
        .child_by_field_name("arguments")
        .map(|list| {
            named_children(list)
                .into_iter()
                .map(|arg| lower(arg, source, depth))
                .collect()
        })
        .unwrap_or_default();

    let Some(function) = node.child_by_field_name("function") else {
        return Expr::new(ExprKind::Opaque(args), line, column);
    };

    let callee = match function.kind() {
        "identifier" => Callee::Unqualified(node_text(function, source).to_string()),
        "qualified_identifier" => qualified_callee(node_text(function, source)),
        "field_expression" => {
            let object = lower_field(function, "argument", source, depth);
            let name = function
                .child_by_field_name("field")
                .map(|f| node_text(f, source).to_string())
                .unwrap_or_default();
            Callee::Member {
                object: Box::new(object),
                name,
            }
        }
        // Functional cast: `bool(x)`, `int(x)`.
        "primitive_type" | "sized_type_specifier" => {
            let to_bool = is_bool_type_name(node_text(function, source));
            return cast_of_first_argument(to_bool, args, line, column);
        }
        "template_function" => {
            let name = function
                .child_by_field_name("name")
                .map(|n| node_text(n, source))
                .unwrap_or("");
            if CAST_TEMPLATES.contains(&name) {
                let to_bool = function
                    .child_by_field_name("arguments")
                    .is_some_and(|targs| {
                        let text = node_text(targs, source);
                        is_bool_type_name(text.trim_start_matches('<').trim_end_matches('>'))
                    });
                return cast_of_first_argument(to_bool, args, line, column);
            }
            Callee::Opaque
        }
        _ => {
            args.insert(0, lower(function, source, depth));
            Callee::Opaque
        }
    };

    Expr::new(ExprKind::Call { callee, args }, line, column)
}

fn cast_of_first_argument(to_bool: bool, args: Vec<Expr>, line: usize, column: usize) -> Expr {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(operand), None) => Expr::new(
            ExprKind::Cast {
                to_bool,
                operand: Box::new(operand),
            },
            line,
            column,
        ),
        (first, second) => {
            let children = first.into_iter().chain(second).chain(args).collect();
            Expr::new(ExprKind::Opaque(children), line, column)
        }
    }
}

fn qualified_callee(text: &str) -> Callee {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains('<') {
        return Callee::Opaque;
    }

    let global = compact.starts_with("::");
    let mut segments: Vec<String> = compact
        .split("::")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    match segments.pop() {
        Some(name) => Callee::Qualified {
            global,
            path: segments,
            name,
        },
        None => Callee::Opaque,
    }
}

pub fn is_bool_type_name(text: &str) -> bool {
    matches!(text.trim(), "bool" | "_Bool")
}

/// Value of a numeric literal that denotes a whole number; `None` for
/// fractional floating point values and values that overflow `u64`.
pub fn parse_integer(text: &str) -> Option<u64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '\'')
        .collect::<String>()
        .to_ascii_lowercase();

    let (digits, radix) = if let Some(hex) = cleaned.strip_prefix("0x") {
        if hex.contains('.') || hex.contains('p') {
            return None;
        }
        (hex, 16)
    } else if let Some(bin) = cleaned.strip_prefix("0b") {
        (bin, 2)
    } else {
        if cleaned.contains('.') || cleaned.contains('e') {
            return parse_whole_float(&cleaned);
        }
        if cleaned.len() > 1 && cleaned.starts_with('0') {
            (&cleaned[1..], 8)
        } else {
            (cleaned.as_str(), 10)
        }
    };

    let digits = digits.trim_end_matches(['u', 'l', 'z']);
    if digits.is_empty() {
        return if radix == 8 { Some(0) } else { None };
    }

    u64::from_str_radix(digits, radix).ok()
}

fn parse_whole_float(text: &str) -> Option<u64> {
    let value: f64 = text.trim_end_matches(['f', 'l']).parse().ok()?;
    let whole = value.is_finite() && value.fract() == 0.0 && value >= 0.0;
    (whole && value <= u64::MAX as f64).then_some(value as u64)
}
