//! Domain primitive types used across the nestbox workspace.

use std::fmt;

use crate::error::{NestboxError, Result};

/// The command a user wants executed inside the container.
///
/// Always holds at least one token (the program); passed unchanged from
/// the launcher to the confiner to the final `exec`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation(Vec<String>);

impl Invocation {
    /// Captures an invocation from its command-line tokens.
    ///
    /// # Errors
    ///
    /// Returns a usage error if `tokens` is empty, the program is an empty
    /// string, or any token contains a NUL byte.
    pub fn new(tokens: Vec<String>) -> Result<Self> {
        match tokens.first() {
            None => {
                return Err(NestboxError::Usage {
                    message: "no program given to run inside the container".into(),
                });
            }
            Some(program) if program.is_empty() => {
                return Err(NestboxError::Usage {
                    message: "program name is empty".into(),
                });
            }
            Some(_) => {}
        }
        if let Some(bad) = tokens.iter().find(|t| t.contains('\0')) {
            return Err(NestboxError::Usage {
                message: format!("argument contains a NUL byte: {bad:?}"),
            });
        }
        Ok(Self(tokens))
    }

    /// Returns the program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Returns the arguments following the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    /// Returns every token, program first.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}
