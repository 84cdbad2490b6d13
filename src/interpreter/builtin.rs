use std::rc::Rc;
use std::time::SystemTime;

use super::callable::BuiltinFunc;
use super::environment::Environment;
use super::runtime::{Interpreter, RuntimeError};
use super::Value;

fn clock_impl(_interperter: &mut Interpreter, _args: Vec<Value>) -> Result<Value, RuntimeError> {
    // A clock set before the epoch reads as zero
    let duration = SystemTime::UNIX_EPOCH.elapsed().unwrap_or_default();
    Ok(Value::Number(duration.as_secs_f64()))
}

pub fn populate_builtin(global_env: &Environment) {
    global_env.define(
        "clock",
        Value::Callable(Rc::new(BuiltinFunc {
            name: "clock",
            arity: 0,
            call: clock_impl,
        })),
    );
}
