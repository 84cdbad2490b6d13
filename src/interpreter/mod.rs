mod builtin;
mod callable;
mod class;
mod environment;
mod runtime;
mod value;

use anyhow::Result;

pub use builtin::populate_builtin;
pub use callable::{BoundMethod, BuiltinFunc, Callable, Function};
pub use class::{Class, Instance, INIT_METHOD_NAME};
pub use environment::Environment;
pub use runtime::{Interpreter, RuntimeError};
pub use value::{OperandError, Value};

use crate::config::Config;

pub fn stock_interpreter() -> Interpreter {
    let global_env = Environment::new_global();
    populate_builtin(&global_env);
    Interpreter::new(global_env, Config::default())
}

/// Like [`stock_interpreter`], but honouring the `LOXRT_*` environment overrides.
pub fn configured_interpreter() -> Result<Interpreter> {
    let config = Config::from_env()?;
    let global_env = Environment::new_global();
    populate_builtin(&global_env);
    Ok(Interpreter::new(global_env, config))
}
