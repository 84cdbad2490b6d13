use std::{collections::HashMap, fmt::Display, rc::Rc};

use thiserror::Error;

use super::{
    callable::Function,
    class::Class,
    environment::Environment,
    value::{OperandError, Value},
};
use crate::{
    ast::{BinaryOp, Expr, LogicalOp, Program, Stmt, UnaryOp},
    config::Config,
    stack::ensure_sufficient_stack,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("[line {line}] undefined variable '{name}'")]
    UndefinedVariable { name: String, line: usize },
    #[error("[line {line}] undefined property '{name}'")]
    UndefinedProperty { name: String, line: usize },
    #[error("[line {line}] {name} expected {expected} arguments but got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        line: usize,
    },
    #[error("[line {line}] not callable: {value}")]
    NotCallable { value: String, line: usize },
    #[error("[line {line}] only instances have properties, cannot access '{name}'")]
    NotAnInstance { name: String, line: usize },
    #[error("[line {line}] '{op}' expects {expected}")]
    TypeError {
        op: String,
        expected: &'static str,
        line: usize,
    },
    #[error("[line {line}] divide by zero")]
    DivideByZero { line: usize },
    #[error("[line {line}] break outside of a loop")]
    InvalidBreak { line: usize },
    #[error("[line {line}] return outside of a function")]
    InvalidReturn { line: usize },
    #[error("[line {line}] stack overflow: more than {depth} nested calls")]
    StackOverflow { depth: usize, line: usize },
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::UndefinedProperty { line, .. }
            | RuntimeError::ArityMismatch { line, .. }
            | RuntimeError::NotCallable { line, .. }
            | RuntimeError::NotAnInstance { line, .. }
            | RuntimeError::TypeError { line, .. }
            | RuntimeError::DivideByZero { line }
            | RuntimeError::InvalidBreak { line }
            | RuntimeError::InvalidReturn { line }
            | RuntimeError::StackOverflow { line, .. } => *line,
        }
    }

    fn operand(error: OperandError, op: impl Display, line: usize) -> RuntimeError {
        match error {
            OperandError::DivideByZero => RuntimeError::DivideByZero { line },
            _ => RuntimeError::TypeError {
                op: op.to_string(),
                expected: error.expected(),
                line,
            },
        }
    }
}

/// Everything that can cut a statement short. Only `Error` is a real failure, the
/// rest are control flow looking for the loop or call that handles them.
pub(crate) enum UnwindCause {
    Error(RuntimeError),
    Break { line: usize },
    Return { value: Value, line: usize },
}

impl UnwindCause {
    // Control flow that escaped every loop and call
    fn into_error(self) -> RuntimeError {
        match self {
            UnwindCause::Error(error) => error,
            UnwindCause::Break { line } => RuntimeError::InvalidBreak { line },
            UnwindCause::Return { line, .. } => RuntimeError::InvalidReturn { line },
        }
    }
}

impl From<RuntimeError> for UnwindCause {
    fn from(error: RuntimeError) -> Self {
        UnwindCause::Error(error)
    }
}

pub struct Interpreter {
    globals: Rc<Environment>,
    environment: Rc<Environment>,
    config: Config,
    call_depth: usize,
}

impl Interpreter {
    pub fn new(globals: Rc<Environment>, config: Config) -> Interpreter {
        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            config,
            call_depth: 0,
        }
    }

    pub fn globals(&self) -> &Rc<Environment> {
        &self.globals
    }

    pub fn current_env(&self) -> &Rc<Environment> {
        &self.environment
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for stmt in program.0.iter() {
            self.interpret_one(stmt)?;
        }
        Ok(())
    }

    /// Runs a single statement. An expression statement yields its value, which is
    /// what a REPL wants to echo; every other statement yields nil.
    pub fn interpret_one(&mut self, stmt: &Stmt) -> Result<Value, RuntimeError> {
        self.execute(stmt).map_err(|cause| {
            let error = cause.into_error();
            tracing::debug!(%error, "runtime error aborted statement");
            error
        })
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.eval(expr)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Value, UnwindCause> {
        match stmt {
            Stmt::Expr(expr) => Ok(self.eval(expr)?),
            Stmt::VarDecl { name, init } => {
                let value = match init {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
                Ok(Value::Nil)
            }
            Stmt::Block(stmts) => {
                let scope = self.environment.open_scope();
                self.execute_block(stmts, scope)?;
                Ok(Value::Nil)
            }
            Stmt::If {
                expr: test,
                then: if_true,
                or_else: if_false,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.execute(if_true)?;
                } else if let Some(false_stmt) = if_false {
                    self.execute(false_stmt)?;
                }
                Ok(Value::Nil)
            }
            Stmt::Loop { expr, body } => {
                while self.eval(expr)?.is_truthy() {
                    match self.execute(body) {
                        Err(UnwindCause::Break { .. }) => {
                            break;
                        }
                        Err(e) => return Err(e),
                        _ => {}
                    }
                }
                Ok(Value::Nil)
            }
            Stmt::Break { keyword } => Err(UnwindCause::Break { line: keyword.line }),
            Stmt::FunDecl(decl) => {
                let function = Function::new(Rc::clone(decl), Rc::clone(&self.environment));
                self.environment
                    .define(&decl.name.lexeme, Value::Callable(Rc::new(function)));
                Ok(Value::Nil)
            }
            Stmt::ClassDecl { name, methods } => {
                let methods: HashMap<String, Rc<Function>> = methods
                    .iter()
                    .map(|decl| {
                        let method = Function::new(Rc::clone(decl), Rc::clone(&self.environment));
                        (decl.name.lexeme.clone(), Rc::new(method))
                    })
                    .collect();
                let class = Class::new(&name.lexeme, methods);
                self.environment
                    .define(&name.lexeme, Value::Callable(Rc::new(class)));
                Ok(Value::Nil)
            }
            Stmt::Return { keyword, value } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                Err(UnwindCause::Return {
                    value,
                    line: keyword.line,
                })
            }
        }
    }

    /// Runs `stmts` inside `scope`, putting the current scope back afterwards even
    /// when a statement fails or unwinds.
    pub(crate) fn execute_block(
        &mut self,
        stmts: &[Stmt],
        scope: Rc<Environment>,
    ) -> Result<(), UnwindCause> {
        let previous = std::mem::replace(&mut self.environment, scope);
        let mut result = Ok(());
        for stmt in stmts {
            if let Err(cause) = self.execute(stmt) {
                result = Err(cause);
                break;
            }
        }
        self.environment = previous;
        result
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal.clone())),
            Expr::Group(expr) => self.eval(expr),
            Expr::Variable { name } => self.environment.get(name),
            Expr::This { keyword } => self.environment.get(keyword),
            Expr::Assignment { name, value } => {
                let value = self.eval(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Unary { op, line, expr } => {
                let val = self.eval(expr)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!val.is_truthy())),
                    UnaryOp::Negative => {
                        (-val).map_err(|error| RuntimeError::operand(error, op, *line))
                    }
                }
            }
            Expr::Binary {
                left,
                op,
                line,
                right,
            } => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                let result = match op {
                    BinaryOp::Equal => Ok(Value::Bool(lhs == rhs)),
                    BinaryOp::NotEqual => Ok(Value::Bool(lhs != rhs)),
                    BinaryOp::LessThan => lhs.less_than(rhs).map(Value::Bool),
                    BinaryOp::LessThanEqual => lhs.less_equal(rhs).map(Value::Bool),
                    BinaryOp::GreaterThan => rhs.less_than(lhs).map(Value::Bool),
                    BinaryOp::GreaterThanEqual => rhs.less_equal(lhs).map(Value::Bool),
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Multiply => lhs * rhs,
                    BinaryOp::Subtract => lhs - rhs,
                    BinaryOp::Divide => lhs / rhs,
                };
                result.map_err(|error| RuntimeError::operand(error, op, *line))
            }
            // We do this to support coallescing like behavior i.e. false or "a" evaluates to "a"
            Expr::Logical {
                left,
                op: LogicalOp::And,
                right,
            } => {
                let left_val = self.eval(left)?;
                if left_val.is_truthy() {
                    self.eval(right)
                } else {
                    Ok(left_val)
                }
            }
            Expr::Logical {
                left,
                op: LogicalOp::Or,
                right,
            } => {
                let left_val = self.eval(left)?;
                if left_val.is_truthy() {
                    Ok(left_val)
                } else {
                    self.eval(right)
                }
            }
            Expr::Call {
                callee,
                line,
                arguments,
            } => {
                let callee = self.eval(callee)?;
                let args = arguments
                    .iter()
                    .map(|expr| self.eval(expr))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call_value(callee, args, *line)
            }
            Expr::Get { object, name } => match self.eval(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(RuntimeError::NotAnInstance {
                    name: name.lexeme.clone(),
                    line: name.line,
                }),
            },
            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.eval(object)? else {
                    return Err(RuntimeError::NotAnInstance {
                        name: name.lexeme.clone(),
                        line: name.line,
                    });
                };
                let value = self.eval(value)?;
                instance.set(name, value.clone());
                Ok(value)
            }
        }
    }

    #[tracing::instrument(level = "trace", skip(self, callee, args), fields(callee = %callee))]
    fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        let Some(callable) = callee.as_callable() else {
            return Err(RuntimeError::NotCallable {
                value: callee.to_string(),
                line,
            });
        };

        if args.len() != callable.arity() {
            return Err(RuntimeError::ArityMismatch {
                name: callable.name().to_string(),
                expected: callable.arity(),
                got: args.len(),
                line,
            });
        }

        if self.call_depth >= self.config.max_call_depth {
            tracing::warn!(depth = self.call_depth, line, "call depth limit reached");
            return Err(RuntimeError::StackOverflow {
                depth: self.config.max_call_depth,
                line,
            });
        }

        self.call_depth += 1;
        let result = ensure_sufficient_stack(|| callable.call(self, args));
        self.call_depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::FunDecl,
        config::DEFAULT_MAX_CALL_DEPTH,
        interpreter::{populate_builtin, stock_interpreter},
        token::{Keyword, Token, TokenKind},
    };

    fn run(interpreter: &mut Interpreter, stmts: Vec<Stmt>) -> Result<(), RuntimeError> {
        interpreter.interpret(&Program(stmts))
    }

    fn lookup(interpreter: &Interpreter, name: &str) -> Value {
        interpreter
            .globals()
            .get(&Token::identifier(name, 0))
            .unwrap()
    }

    fn num(n: f64) -> Expr {
        Expr::literal(n)
    }

    fn var(name: &str) -> Expr {
        Expr::variable(name, 1)
    }

    fn call(name: &str, arguments: Vec<Expr>) -> Expr {
        Expr::call(var(name), arguments, 1)
    }

    fn break_stmt(line: usize) -> Stmt {
        Stmt::Break {
            keyword: Token::new(TokenKind::Keyword(Keyword::Break), "break", None, line),
        }
    }

    // fun makeCounter() { var i = 0; fun count() { i = i + 1; return i; } return count; }
    fn make_counter() -> Stmt {
        let count = FunDecl::new(
            "count",
            &[],
            vec![
                Stmt::Expr(Expr::assign(
                    "i",
                    Expr::binary(var("i"), BinaryOp::Add, num(1.0), 1),
                    1,
                )),
                Stmt::ret(Some(var("i")), 1),
            ],
            1,
        );
        Stmt::fun(FunDecl::new(
            "makeCounter",
            &[],
            vec![
                Stmt::var("i", Some(num(0.0)), 1),
                Stmt::fun(count),
                Stmt::ret(Some(var("count")), 1),
            ],
            1,
        ))
    }

    // class Counter { init(start) { this.n = start; } inc() { this.n = this.n + 1; return this.n; } }
    fn counter_class() -> Stmt {
        let init = FunDecl::new(
            "init",
            &["start"],
            vec![Stmt::Expr(Expr::set(Expr::this(2), "n", var("start"), 2))],
            2,
        );
        let inc = FunDecl::new(
            "inc",
            &[],
            vec![
                Stmt::Expr(Expr::set(
                    Expr::this(3),
                    "n",
                    Expr::binary(Expr::get(Expr::this(3), "n", 3), BinaryOp::Add, num(1.0), 3),
                    3,
                )),
                Stmt::ret(Some(Expr::get(Expr::this(3), "n", 3)), 3),
            ],
            3,
        );
        Stmt::class("Counter", vec![init, inc], 1)
    }

    #[test]
    fn closures_keep_their_scope_alive() {
        let mut interpreter = stock_interpreter();
        run(
            &mut interpreter,
            vec![
                make_counter(),
                Stmt::var("counter", Some(call("makeCounter", vec![])), 1),
                Stmt::Expr(call("counter", vec![])),
                Stmt::Expr(call("counter", vec![])),
            ],
        )
        .unwrap();

        let third = interpreter.evaluate(&call("counter", vec![])).unwrap();
        assert_eq!(third, Value::Number(3.0));
    }

    #[test]
    fn functions_see_defining_scope_not_calling_scope() {
        let mut interpreter = stock_interpreter();
        run(
            &mut interpreter,
            vec![
                Stmt::var("x", Some(Expr::literal("outer")), 1),
                Stmt::var("result", None, 1),
                Stmt::fun(FunDecl::new("read", &[], vec![Stmt::ret(Some(var("x")), 2)], 2)),
                Stmt::Block(vec![
                    Stmt::var("x", Some(Expr::literal("inner")), 3),
                    Stmt::Expr(Expr::assign("result", call("read", vec![]), 3)),
                ]),
            ],
        )
        .unwrap();

        assert_eq!(lookup(&interpreter, "result"), Value::from("outer"));
    }

    #[test]
    fn block_declarations_do_not_leak() {
        let mut interpreter = stock_interpreter();
        run(
            &mut interpreter,
            vec![
                Stmt::var("a", Some(num(1.0)), 1),
                Stmt::Block(vec![Stmt::var("a", Some(num(2.0)), 2)]),
            ],
        )
        .unwrap();

        assert_eq!(lookup(&interpreter, "a"), Value::Number(1.0));
    }

    #[test]
    fn failing_block_restores_scope_and_aborts_program() {
        let mut interpreter = stock_interpreter();
        let error = run(
            &mut interpreter,
            vec![
                Stmt::var("a", Some(num(1.0)), 1),
                Stmt::Block(vec![
                    Stmt::var("b", Some(num(2.0)), 2),
                    Stmt::Expr(Expr::variable("missing", 3)),
                ]),
                Stmt::Expr(Expr::assign("a", num(3.0), 4)),
            ],
        )
        .unwrap_err();

        assert_eq!(
            error,
            RuntimeError::UndefinedVariable {
                name: "missing".to_string(),
                line: 3,
            }
        );
        assert!(Rc::ptr_eq(interpreter.current_env(), interpreter.globals()));
        assert_eq!(lookup(&interpreter, "a"), Value::Number(1.0));
    }

    #[test]
    fn assignment_to_undeclared_is_an_error() {
        let mut interpreter = stock_interpreter();
        let error = interpreter
            .evaluate(&Expr::assign("ghost", num(1.0), 5))
            .unwrap_err();
        assert!(matches!(
            error,
            RuntimeError::UndefinedVariable { ref name, line: 5 } if name == "ghost"
        ));
        assert!(!interpreter.globals().contains("ghost"));
    }

    #[test]
    fn arity_is_checked_before_calling() {
        let mut interpreter = stock_interpreter();
        run(
            &mut interpreter,
            vec![Stmt::fun(FunDecl::new("f", &["a"], vec![], 1))],
        )
        .unwrap();

        let error = interpreter.evaluate(&Expr::call(var("f"), vec![], 9)).unwrap_err();
        assert_eq!(
            error,
            RuntimeError::ArityMismatch {
                name: "f".to_string(),
                expected: 1,
                got: 0,
                line: 9,
            }
        );
    }

    #[test]
    fn runaway_recursion_is_a_stack_overflow() {
        let globals = Environment::new_global();
        populate_builtin(&globals);
        let mut interpreter = Interpreter::new(globals, Config { max_call_depth: 8 });
        run(
            &mut interpreter,
            vec![Stmt::fun(FunDecl::new(
                "forever",
                &[],
                vec![Stmt::ret(Some(call("forever", vec![])), 1)],
                1,
            ))],
        )
        .unwrap();

        let error = interpreter.evaluate(&call("forever", vec![])).unwrap_err();
        assert!(matches!(error, RuntimeError::StackOverflow { depth: 8, .. }));

        // The depth counter unwinds with the error
        run(
            &mut interpreter,
            vec![Stmt::fun(FunDecl::new("one", &[], vec![Stmt::ret(Some(num(1.0)), 1)], 1))],
        )
        .unwrap();
        assert_eq!(interpreter.evaluate(&call("one", vec![])).unwrap(), Value::Number(1.0));
    }

    // fun down(n) { if (n == 0) return 0; return down(n - 1) + 1; }
    fn down() -> Stmt {
        Stmt::fun(FunDecl::new(
            "down",
            &["n"],
            vec![
                Stmt::If {
                    expr: Expr::binary(var("n"), BinaryOp::Equal, num(0.0), 1),
                    then: Box::new(Stmt::ret(Some(num(0.0)), 1)),
                    or_else: None,
                },
                Stmt::ret(
                    Some(Expr::binary(
                        call(
                            "down",
                            vec![Expr::binary(var("n"), BinaryOp::Subtract, num(1.0), 2)],
                        ),
                        BinaryOp::Add,
                        num(1.0),
                        2,
                    )),
                    2,
                ),
            ],
            1,
        ))
    }

    #[test]
    fn default_depth_limit_is_reachable() {
        let mut interpreter = stock_interpreter();
        run(&mut interpreter, vec![down()]).unwrap();

        let depth = (DEFAULT_MAX_CALL_DEPTH - 1) as f64;
        let value = interpreter.evaluate(&call("down", vec![num(depth)])).unwrap();
        assert_eq!(value, Value::Number(depth));
    }

    #[test]
    fn default_config_reports_runaway_recursion() {
        let mut interpreter = stock_interpreter();
        run(&mut interpreter, vec![down()]).unwrap();

        let error = interpreter
            .evaluate(&call("down", vec![num(100_000.0)]))
            .unwrap_err();
        assert_eq!(
            error,
            RuntimeError::StackOverflow {
                depth: DEFAULT_MAX_CALL_DEPTH,
                line: 1,
            }
        );
    }

    #[test]
    fn function_declaration_keeps_its_scope_alive() {
        let mut interpreter = stock_interpreter();
        let scope = interpreter.globals().open_scope();
        let weak = Rc::downgrade(&scope);

        assert!(interpreter.execute_block(&[down()], scope).is_ok());
        drop(interpreter);

        // scope -> down -> closure -> scope is never broken
        assert!(weak.upgrade().is_some());
    }

    #[test]
    fn calling_a_non_callable() {
        let mut interpreter = stock_interpreter();
        let error = interpreter
            .evaluate(&Expr::call(Expr::literal("text"), vec![], 2))
            .unwrap_err();
        assert_eq!(
            error,
            RuntimeError::NotCallable {
                value: "text".to_string(),
                line: 2,
            }
        );
    }

    #[test]
    fn operator_type_errors_carry_operator_and_line() {
        let mut interpreter = stock_interpreter();
        let error = interpreter
            .evaluate(&Expr::binary(num(1.0), BinaryOp::Subtract, Expr::literal("a"), 6))
            .unwrap_err();
        assert_eq!(error.to_string(), "[line 6] '-' expects numbers");
        assert_eq!(error.line(), 6);

        let error = interpreter
            .evaluate(&Expr::binary(num(1.0), BinaryOp::Divide, num(0.0), 7))
            .unwrap_err();
        assert_eq!(error, RuntimeError::DivideByZero { line: 7 });

        let error = interpreter
            .evaluate(&Expr::unary(UnaryOp::Negative, Expr::nil(), 8))
            .unwrap_err();
        assert!(matches!(error, RuntimeError::TypeError { line: 8, .. }));
    }

    #[test]
    fn comparisons_and_equality() {
        let mut interpreter = stock_interpreter();
        let cases = [
            (BinaryOp::LessThan, 1.0, 2.0, true),
            (BinaryOp::LessThanEqual, 2.0, 2.0, true),
            (BinaryOp::GreaterThan, 1.0, 2.0, false),
            (BinaryOp::GreaterThanEqual, 3.0, 2.0, true),
            (BinaryOp::Equal, 3.0, 3.0, true),
            (BinaryOp::NotEqual, 3.0, 3.0, false),
        ];
        for (op, l, r, expected) in cases {
            let value = interpreter
                .evaluate(&Expr::binary(num(l), op, num(r), 1))
                .unwrap();
            assert_eq!(value, Value::Bool(expected), "{} {} {}", l, op, r);
        }

        let value = interpreter
            .evaluate(&Expr::binary(Expr::nil(), BinaryOp::Equal, Expr::literal(false), 1))
            .unwrap();
        assert_eq!(value, Value::Bool(false));
    }

    #[test]
    fn while_loop_with_break() {
        let mut interpreter = stock_interpreter();
        run(
            &mut interpreter,
            vec![
                Stmt::var("i", Some(num(0.0)), 1),
                Stmt::Loop {
                    expr: Expr::literal(true),
                    body: Box::new(Stmt::Block(vec![
                        Stmt::Expr(Expr::assign(
                            "i",
                            Expr::binary(var("i"), BinaryOp::Add, num(1.0), 2),
                            2,
                        )),
                        Stmt::If {
                            expr: Expr::binary(var("i"), BinaryOp::Equal, num(3.0), 3),
                            then: Box::new(break_stmt(3)),
                            or_else: None,
                        },
                    ])),
                },
            ],
        )
        .unwrap();

        assert_eq!(lookup(&interpreter, "i"), Value::Number(3.0));
    }

    #[test]
    fn stray_break_and_return_are_errors() {
        let mut interpreter = stock_interpreter();
        assert_eq!(
            interpreter.interpret_one(&break_stmt(4)).unwrap_err(),
            RuntimeError::InvalidBreak { line: 4 }
        );
        assert_eq!(
            interpreter.interpret_one(&Stmt::ret(None, 5)).unwrap_err(),
            RuntimeError::InvalidReturn { line: 5 }
        );
    }

    #[test]
    fn logical_operators_short_circuit() {
        let mut interpreter = stock_interpreter();
        let or = Expr::logical(Expr::nil(), LogicalOp::Or, Expr::literal("x"));
        assert_eq!(interpreter.evaluate(&or).unwrap(), Value::from("x"));

        // The right side would fail if it were evaluated
        let and = Expr::logical(Expr::literal(false), LogicalOp::And, var("undefined"));
        assert_eq!(interpreter.evaluate(&and).unwrap(), Value::Bool(false));
    }

    #[test]
    fn interpret_one_yields_expression_value() {
        let mut interpreter = stock_interpreter();
        let value = interpreter
            .interpret_one(&Stmt::Expr(Expr::binary(
                Expr::literal("lox"),
                BinaryOp::Add,
                Expr::literal("rt"),
                1,
            )))
            .unwrap();
        assert_eq!(value, Value::from("loxrt"));
        assert_eq!(
            interpreter.interpret_one(&Stmt::var("v", None, 1)).unwrap(),
            Value::Nil
        );
        assert_eq!(lookup(&interpreter, "v"), Value::Nil);
    }

    #[test]
    fn classes_construct_and_dispatch_methods() {
        let mut interpreter = stock_interpreter();
        run(
            &mut interpreter,
            vec![
                counter_class(),
                Stmt::var("c", Some(call("Counter", vec![num(10.0)])), 4),
                Stmt::Expr(Expr::call(Expr::get(var("c"), "inc", 5), vec![], 5)),
                // A method pulled off the instance keeps its receiver
                Stmt::var("inc", Some(Expr::get(var("c"), "inc", 6)), 6),
            ],
        )
        .unwrap();

        assert_eq!(
            interpreter.evaluate(&call("inc", vec![])).unwrap(),
            Value::Number(12.0)
        );
        assert_eq!(lookup(&interpreter, "Counter").to_string(), "<class Counter>");
        assert_eq!(lookup(&interpreter, "c").to_string(), "<Counter instance>");
        assert_eq!(lookup(&interpreter, "inc").to_string(), "<fn inc>");
    }

    #[test]
    fn class_arity_follows_init() {
        let mut interpreter = stock_interpreter();
        run(&mut interpreter, vec![counter_class()]).unwrap();

        let error = interpreter
            .evaluate(&Expr::call(var("Counter"), vec![num(1.0), num(2.0)], 7))
            .unwrap_err();
        assert_eq!(
            error,
            RuntimeError::ArityMismatch {
                name: "Counter".to_string(),
                expected: 1,
                got: 2,
                line: 7,
            }
        );
    }

    #[test]
    fn property_access_on_non_instance() {
        let mut interpreter = stock_interpreter();
        let error = interpreter
            .evaluate(&Expr::get(num(1.0), "x", 3))
            .unwrap_err();
        assert_eq!(
            error,
            RuntimeError::NotAnInstance {
                name: "x".to_string(),
                line: 3,
            }
        );

        let error = interpreter
            .evaluate(&Expr::set(Expr::nil(), "x", num(1.0), 4))
            .unwrap_err();
        assert_eq!(error.line(), 4);
    }

    #[test]
    fn set_expression_yields_assigned_value() {
        let mut interpreter = stock_interpreter();
        run(
            &mut interpreter,
            vec![
                Stmt::class("Box", vec![], 1),
                Stmt::var("b", Some(call("Box", vec![])), 2),
            ],
        )
        .unwrap();

        let value = interpreter
            .evaluate(&Expr::set(var("b"), "x", num(5.0), 3))
            .unwrap();
        assert_eq!(value, Value::Number(5.0));
        assert_eq!(
            interpreter.evaluate(&Expr::get(var("b"), "x", 4)).unwrap(),
            Value::Number(5.0)
        );
    }
}
