use std::env::{self, VarError};

use anyhow::{bail, Context, Result};

pub const MAX_CALL_DEPTH_VAR: &str = "LOXRT_MAX_CALL_DEPTH";
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Runtime knobs for an [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Calls nested deeper than this fail with a stack overflow error instead of
    /// exhausting the host stack.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Config {
    /// Defaults, overridden by `LOXRT_MAX_CALL_DEPTH` when it is set.
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|name| env::var(name))
    }

    fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        match lookup(MAX_CALL_DEPTH_VAR) {
            Ok(raw) => Ok(Config {
                max_call_depth: parse_max_call_depth(&raw)?,
            }),
            Err(VarError::NotPresent) => Ok(Config::default()),
            Err(error) => Err(error).context("reading LOXRT_MAX_CALL_DEPTH"),
        }
    }
}

fn parse_max_call_depth(raw: &str) -> Result<usize> {
    let depth = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("{} is not a call depth: {:?}", MAX_CALL_DEPTH_VAR, raw))?;
    if depth == 0 {
        bail!("{} must be at least 1", MAX_CALL_DEPTH_VAR);
    }
    Ok(depth)
}
