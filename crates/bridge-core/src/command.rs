//! Child command model.
//!
//! The bridge receives the child command line as its trailing arguments,
//! interpreted as `[program, arg1, arg2, ...]` with no flag parsing or
//! option stripping of its own.

use std::fmt;

use crate::error::{Error, Result};

/// A validated child command line: program plus verbatim arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeCommand {
    program: String,
    args: Vec<String>,
}

impl BridgeCommand {
    /// Build a command from an argv-style vector.
    ///
    /// The first element is the program, resolved via the OS executable
    /// search path at spawn time; the rest pass through unchanged, in
    /// order. An empty vector (or an empty program name) is
    /// [`Error::InvalidCommand`].
    pub fn from_argv(argv: Vec<String>) -> Result<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next().ok_or(Error::InvalidCommand)?;
        if program.is_empty() {
            return Err(Error::InvalidCommand);
        }
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    /// The program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program, verbatim.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
