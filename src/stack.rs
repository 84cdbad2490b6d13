//! Native stack growth for the recursive evaluator.
//!
//! Every Lox call nests several Rust frames (`eval`, `call_value`, `call`, `invoke`,
//! `execute_block`, `execute`), so deep user recursion would exhaust a thread's stack
//! long before `Config::max_call_depth` is reached. Dispatch goes through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated segment when the
//! current one runs low.

/// Grow when less than this much stack remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
