use std::{
    fmt::{self, Debug, Display},
    ops::{Add, Div, Mul, Neg, Sub},
    rc::Rc,
};

use super::{callable::Callable, class::Instance};
use crate::ast::Literal;

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Callable(Rc<dyn Callable>),
    Instance(Instance),
}

impl Value {
    /// `nil` and `false` are falsey, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Nil => false,
            _ => true,
        }
    }

    pub fn as_callable(&self) -> Option<&Rc<dyn Callable>> {
        match self {
            Self::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn numbers(self, rhs: Value) -> Result<(f64, f64), OperandError> {
        match (self, rhs) {
            (Value::Number(l), Value::Number(r)) => Ok((l, r)),
            _ => Err(OperandError::Numbers),
        }
    }

    /// Numeric comparison; comparing anything but two numbers is an operand error.
    pub fn less_than(self, rhs: Value) -> Result<bool, OperandError> {
        let (l, r) = self.numbers(rhs)?;
        Ok(l < r)
    }

    pub fn less_equal(self, rhs: Value) -> Result<bool, OperandError> {
        let (l, r) = self.numbers(rhs)?;
        Ok(l <= r)
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Number(n) => Value::Number(n.into_inner()),
            Literal::String(s) => Value::String(s.into()),
            Literal::Boolean(b) => Value::Bool(b),
            Literal::Nil => Value::Nil,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Value::Instance(value)
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Number(n) => write!(f, "Value::Number({})", n),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Nil => f.write_str("Value::Nil"),
            Value::Callable(func) => write!(f, "Value::Callable({})", func.name()),
            Value::Instance(instance) => write!(f, "Value::Instance({})", instance.class().name()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => f.write_str("nil"),
            Value::Callable(func) => write!(f, "{}", func),
            Value::Instance(instance) => write!(f, "{}", instance),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Nil, Self::Nil) => true,
            // Objects compare by identity
            (Self::Callable(left), Self::Callable(right)) => Rc::ptr_eq(left, right),
            (Self::Instance(left), Self::Instance(right)) => left.ptr_eq(right),
            _ => false,
        }
    }
}

/// Why an operator rejected its operands. The interpreter attaches the operator and
/// source line when turning this into a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandError {
    Numbers,
    NumbersOrStrings,
    DivideByZero,
}

impl OperandError {
    pub fn expected(self) -> &'static str {
        match self {
            OperandError::Numbers => "numbers",
            OperandError::NumbersOrStrings => "two numbers or two strings",
            OperandError::DivideByZero => "a non-zero divisor",
        }
    }
}

// Starting here are convenience implementations to make the interpret loop easier
impl Add for Value {
    type Output = Result<Value, OperandError>;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::String(l), Value::String(r)) => {
                let mut new = String::with_capacity(l.len() + r.len());
                new.push_str(&l);
                new.push_str(&r);
                Ok(Value::String(new.into()))
            }
            _ => Err(OperandError::NumbersOrStrings),
        }
    }
}

impl Sub for Value {
    type Output = Result<Value, OperandError>;

    fn sub(self, rhs: Self) -> Self::Output {
        let (l, r) = self.numbers(rhs)?;
        Ok(Value::Number(l - r))
    }
}

impl Mul for Value {
    type Output = Result<Value, OperandError>;

    fn mul(self, rhs: Self) -> Self::Output {
        let (l, r) = self.numbers(rhs)?;
        Ok(Value::Number(l * r))
    }
}

impl Div for Value {
    type Output = Result<Value, OperandError>;

    fn div(self, rhs: Self) -> Self::Output {
        let (l, r) = self.numbers(rhs)?;
        if r == 0f64 {
            Err(OperandError::DivideByZero)
        } else {
            Ok(Value::Number(l / r))
        }
    }
}

impl Neg for Value {
    type Output = Result<Value, OperandError>;

    fn neg(self) -> Self::Output {
        match self {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(OperandError::Numbers),
        }
    }
}
