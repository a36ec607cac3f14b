//! Normalized expression tree consumed by the rules.
//!
//! Parentheses are dropped during lowering, explicit casts are kept as
//! [`ExprKind::Cast`] and anything the rules never look into becomes
//! [`ExprKind::Opaque`] with its lowered children.

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// 1-based. For binary, assignment and update nodes this is the
    /// position of the operator token.
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Variable(String),
    Call {
        callee: Callee,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        compound: bool,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Cast {
        to_bool: bool,
        operand: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        field: String,
    },
    Conditional {
        condition: Box<Expr>,
        then: Option<Box<Expr>>,
        otherwise: Box<Expr>,
    },
    Opaque(Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Bool(bool),
    /// `None` for floating point literals and integers that overflow `u64`.
    Number(Option<u64>),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Unqualified(String),
    /// `::f`, `N::f` or `::N::M::f`.
    Qualified {
        global: bool,
        path: Vec<String>,
        name: String,
    },
    Member {
        object: Box<Expr>,
        name: String,
    },
    /// Template instantiations, function pointers, lambdas.
    Opaque,
}

impl Callee {
    pub fn name(&self) -> Option<&str> {
        match self {
            Callee::Unqualified(name) => Some(name),
            Callee::Qualified { name, .. } | Callee::Member { name, .. } => Some(name),
            Callee::Opaque => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    AddressOf,
    Deref,
    Negate,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Arithmetic,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Self {
        match token {
            "&" | "bitand" => BinaryOp::BitAnd,
            "|" | "bitor" => BinaryOp::BitOr,
            "^" | "xor" => BinaryOp::BitXor,
            "&&" | "and" => BinaryOp::And,
            "||" | "or" => BinaryOp::Or,
            "==" => BinaryOp::Eq,
            "!=" | "not_eq" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            _ => BinaryOp::Arithmetic,
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge)
    }

    pub fn is_comparison(self) -> bool {
        self.is_equality() || self.is_relational()
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// The operator obtained by swapping the operands: `a < b` is `b > a`.
    pub fn mirrored(self) -> Self {
        match self {
            BinaryOp::Lt => BinaryOp::Gt,
            BinaryOp::Gt => BinaryOp::Lt,
            BinaryOp::Le => BinaryOp::Ge,
            BinaryOp::Ge => BinaryOp::Le,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Arithmetic => "?",
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    pub fn opaque(line: usize, column: usize) -> Self {
        Self::new(ExprKind::Opaque(Vec::new()), line, column)
    }

    pub fn variable_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn bool_literal(&self) -> Option<bool> {
        match self.kind {
            ExprKind::Literal(Literal::Bool(value)) => Some(value),
            _ => None,
        }
    }

    /// Removes a single leading `!`.
    pub fn strip_not(&self) -> &Expr {
        match &self.kind {
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => operand,
            _ => self,
        }
    }

    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Variable(_) => Vec::new(),
            ExprKind::Call { callee, args } => {
                let mut children = Vec::with_capacity(args.len() + 1);
                if let Callee::Member { object, .. } = callee {
                    children.push(object.as_ref());
                }
                children.extend(args.iter());
                children
            }
            ExprKind::Unary { operand, .. } | ExprKind::Cast { operand, .. } => vec![operand],
            ExprKind::Binary { left, right, .. } => vec![left, right],
            ExprKind::Assign { target, value, .. } => vec![target, value],
            ExprKind::Member { object, .. } => vec![object],
            ExprKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let mut children = vec![condition.as_ref()];
                if let Some(then) = then {
                    children.push(then);
                }
                children.push(otherwise);
                children
            }
            ExprKind::Opaque(children) => children.iter().collect(),
        }
    }
}
