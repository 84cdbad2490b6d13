use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::{RuntimeError, Value};
use crate::token::Token;

/// One lexical scope: the bindings declared in a block, function call or method call,
/// plus a link to the scope that encloses it.
///
/// Scopes are handed around as `Rc<Environment>`. A closure keeps its defining scope,
/// and with it every ancestor, alive for as long as the closure itself lives. Parents
/// never point at their children, but a function declared in a scope is stored in
/// that same scope while holding it as its closure. That `Rc` cycle is never broken,
/// so any scope that declares a function outlives the block or call that opened it.
#[derive(Default)]
pub struct Environment {
    values: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new_global() -> Rc<Environment> {
        Rc::new(Environment::default())
    }

    /// A fresh, empty scope whose parent is `self`.
    pub fn open_scope(self: &Rc<Self>) -> Rc<Environment> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(self)),
        })
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Number of scopes between this one and the global scope.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_ref();
        while let Some(env) = current {
            depth += 1;
            current = env.parent.as_ref();
        }
        depth
    }

    /// Whether `name` is bound in this scope, ignoring the parents.
    pub fn contains(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }

    /// Binds `name` in this scope, replacing any earlier binding in the same scope.
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        match &self.parent {
            Some(parent) => parent.get(name),
            None => Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            }),
        }
    }

    /// Overwrites the binding in the nearest scope that has one. Never declares.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.borrow_mut().get_mut(&name.lexeme) {
            *slot = value;
            return Ok(());
        }

        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            }),
        }
    }
}
