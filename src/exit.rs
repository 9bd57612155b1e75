use std::fmt;
use std::io;

use msgpatch::EditError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const USAGE: i32 = 2;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(FAILURE, format!("{context}: {err}"))
}

pub fn edit_error(context: &str, err: EditError) -> CliError {
    let code = match err {
        EditError::Config(_) => USAGE,
        _ => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}
