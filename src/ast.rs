use std::fmt::Display;
use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::token::{Keyword, Token, TokenKind};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Program(pub Vec<Stmt>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunDecl {
    pub name: Token,
    pub parameters: Vec<Token>,
    pub body: Vec<Stmt>,
}

impl FunDecl {
    pub fn new(name: &str, parameters: &[&str], body: Vec<Stmt>, line: usize) -> FunDecl {
        FunDecl {
            name: Token::identifier(name, line),
            parameters: parameters
                .iter()
                .map(|parameter| Token::identifier(parameter, line))
                .collect(),
            body,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    VarDecl {
        name: Token,
        init: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        expr: Expr,
        then: Box<Stmt>,
        or_else: Option<Box<Stmt>>,
    },
    Loop {
        expr: Expr,
        body: Box<Stmt>,
    },
    Break {
        keyword: Token,
    },
    // Shared so that every closure created from the declaration points at the same body
    FunDecl(Rc<FunDecl>),
    ClassDecl {
        name: Token,
        methods: Vec<Rc<FunDecl>>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
}

// Shorthands for front ends (and tests) that assemble trees by hand
impl Stmt {
    pub fn var(name: &str, init: Option<Expr>, line: usize) -> Stmt {
        Stmt::VarDecl {
            name: Token::identifier(name, line),
            init,
        }
    }

    pub fn fun(decl: FunDecl) -> Stmt {
        Stmt::FunDecl(Rc::new(decl))
    }

    pub fn class(name: &str, methods: Vec<FunDecl>, line: usize) -> Stmt {
        Stmt::ClassDecl {
            name: Token::identifier(name, line),
            methods: methods.into_iter().map(Rc::new).collect(),
        }
    }

    pub fn ret(value: Option<Expr>, line: usize) -> Stmt {
        Stmt::Return {
            keyword: Token::new(TokenKind::Keyword(Keyword::Return), "return", None, line),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Literal(Literal),
    Group(Box<Expr>),
    Variable {
        name: Token,
    },
    Assignment {
        name: Token,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        line: usize,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        line: usize,
        expr: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        // Line of the closing paren
        line: usize,
        arguments: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    This {
        keyword: Token,
    },
}

impl Expr {
    pub fn literal(literal: impl Into<Literal>) -> Expr {
        Expr::Literal(literal.into())
    }

    pub fn nil() -> Expr {
        Expr::Literal(Literal::Nil)
    }

    pub fn group(expr: Expr) -> Expr {
        Expr::Group(Box::new(expr))
    }

    pub fn variable(name: &str, line: usize) -> Expr {
        Expr::Variable {
            name: Token::identifier(name, line),
        }
    }

    pub fn assign(name: &str, value: Expr, line: usize) -> Expr {
        Expr::Assignment {
            name: Token::identifier(name, line),
            value: Box::new(value),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr, line: usize) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            op,
            line,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr, line: usize) -> Expr {
        Expr::Unary {
            op,
            line,
            expr: Box::new(expr),
        }
    }

    pub fn logical(left: Expr, op: LogicalOp, right: Expr) -> Expr {
        Expr::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>, line: usize) -> Expr {
        Expr::Call {
            callee: Box::new(callee),
            line,
            arguments,
        }
    }

    pub fn get(object: Expr, name: &str, line: usize) -> Expr {
        Expr::Get {
            object: Box::new(object),
            name: Token::identifier(name, line),
        }
    }

    pub fn set(object: Expr, name: &str, value: Expr, line: usize) -> Expr {
        Expr::Set {
            object: Box::new(object),
            name: Token::identifier(name, line),
            value: Box::new(value),
        }
    }

    pub fn this(line: usize) -> Expr {
        Expr::This {
            keyword: Token::this(line),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Equal => f.write_str("=="),
            BinaryOp::NotEqual => f.write_str("!="),
            BinaryOp::LessThan => f.write_str("<"),
            BinaryOp::LessThanEqual => f.write_str("<="),
            BinaryOp::GreaterThan => f.write_str(">"),
            BinaryOp::GreaterThanEqual => f.write_str(">="),
            BinaryOp::Add => f.write_str("+"),
            BinaryOp::Subtract => f.write_str("-"),
            BinaryOp::Multiply => f.write_str("*"),
            BinaryOp::Divide => f.write_str("/"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negative,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
            UnaryOp::Negative => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOp::And => f.write_str("and"),
            LogicalOp::Or => f.write_str("or"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Number(OrderedFloat<f64>),
    String(String),
    Boolean(bool),
    Nil,
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(OrderedFloat(dbl)) => write!(f, "{}", dbl),
            Literal::String(s) => f.write_str(s),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Nil => f.write_str("nil"),
        }
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(OrderedFloat(value))
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}
