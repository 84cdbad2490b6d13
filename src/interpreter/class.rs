use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Display},
    rc::Rc,
};

use super::{
    callable::{Callable, Function},
    runtime::{Interpreter, RuntimeError},
    Value,
};
use crate::token::Token;

pub const INIT_METHOD_NAME: &str = "init";

// We split the class from ClassInner so that instances can share the method table
// while the Class itself stays cheap to clone
#[derive(Clone)]
pub struct Class {
    inner: Rc<ClassInner>,
}

struct ClassInner {
    name: String,
    methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(name: &str, methods: HashMap<String, Rc<Function>>) -> Class {
        Class {
            inner: Rc::new(ClassInner {
                name: name.to_string(),
                methods,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Looks only at this class's own methods; there is no superclass to fall back on.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.inner.methods.get(name).cloned()
    }

    pub fn ptr_eq(&self, other: &Class) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Callable for Class {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn arity(&self) -> usize {
        self.find_method(INIT_METHOD_NAME)
            .map_or(0, |init| init.arity())
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(class = %self.inner.name, args = args.len())
    )]
    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let instance = Instance::new(self.clone());

        // Whatever init returns is dropped, construction always yields the instance
        if let Some(init) = self.find_method(INIT_METHOD_NAME) {
            init.bind(instance.clone()).call(interpreter, args)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.inner.name)
    }
}

#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

struct InstanceInner {
    class: Class,
    fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Class) -> Instance {
        Instance {
            inner: Rc::new(InstanceInner {
                class,
                fields: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn class(&self) -> &Class {
        &self.inner.class
    }

    /// Own fields first, then a freshly bound class method.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.inner.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.inner.class.find_method(&name.lexeme) {
            return Ok(Value::Callable(Rc::new(method.bind(self.clone()))));
        }

        Err(RuntimeError::UndefinedProperty {
            name: name.lexeme.clone(),
            line: name.line,
        })
    }

    /// Always writes the instance's own field, never the class.
    pub fn set(&self, name: &Token, value: Value) {
        self.inner
            .fields
            .borrow_mut()
            .insert(name.lexeme.clone(), value);
    }

    pub fn field_count(&self) -> usize {
        self.inner.fields.borrow().len()
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.inner.class.name())
    }
}
