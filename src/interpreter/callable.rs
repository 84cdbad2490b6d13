use std::{
    fmt::{self, Display},
    rc::Rc,
};

use super::{
    class::Instance,
    runtime::{Interpreter, RuntimeError, UnwindCause},
    Environment, Value,
};
use crate::{ast::FunDecl, token::THIS_LITERAL};

/// Anything the evaluator can invoke. The evaluator checks the argument count against
/// `arity` before calling, so implementations may assume it matches.
pub trait Callable: Display {
    fn name(&self) -> &str;
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError>;
}

#[derive(Debug, Clone)]
pub struct BuiltinFunc {
    pub name: &'static str,
    pub arity: usize,
    pub call: fn(&mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError>,
}

impl Callable for BuiltinFunc {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, interperter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
        (self.call)(interperter, args)
    }
}

impl Display for BuiltinFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<native fn>")
    }
}

/// A user function together with the scope it was declared in.
pub struct Function {
    pub declaration: Rc<FunDecl>,
    pub closure: Rc<Environment>,
}

impl Function {
    pub fn new(declaration: Rc<FunDecl>, closure: Rc<Environment>) -> Function {
        Function {
            declaration,
            closure,
        }
    }

    /// Pairs the function with a receiver. Neither side is modified.
    pub fn bind(self: &Rc<Self>, receiver: Instance) -> BoundMethod {
        BoundMethod {
            receiver,
            function: Rc::clone(self),
        }
    }

    // Parameters go into a fresh child of `scope`, which is the closure itself for a
    // plain call and the `this` scope for a bound one
    fn invoke(
        &self,
        interpreter: &mut Interpreter,
        scope: &Rc<Environment>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let env = scope.open_scope();
        for (parameter, value) in self.declaration.parameters.iter().zip(args) {
            env.define(&parameter.lexeme, value);
        }

        match interpreter.execute_block(&self.declaration.body, env) {
            Ok(()) => Ok(Value::Nil),
            Err(UnwindCause::Return { value, .. }) => Ok(value),
            Err(UnwindCause::Break { line }) => Err(RuntimeError::InvalidBreak { line }),
            Err(UnwindCause::Error(error)) => Err(error),
        }
    }
}

impl Callable for Function {
    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    fn arity(&self) -> usize {
        self.declaration.parameters.len()
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
        self.invoke(interpreter, &self.closure, args)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

/// A method looked up on an instance. Built fresh on every lookup.
pub struct BoundMethod {
    pub receiver: Instance,
    pub function: Rc<Function>,
}

impl Callable for BoundMethod {
    fn name(&self) -> &str {
        self.function.name()
    }

    fn arity(&self) -> usize {
        self.function.arity()
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let scope = self.function.closure.open_scope();
        scope.define(THIS_LITERAL, Value::Instance(self.receiver.clone()));
        self.function.invoke(interpreter, &scope, args)
    }
}

impl Display for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self.function.as_ref(), f)
    }
}
