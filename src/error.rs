use std::error::Error as ErrorTrait;
use std::fmt::Display;

///
/// Contains information about an error occurence
///
#[derive(Debug)]
pub struct Error {
    /// The type of this error
    pub kind: ErrorKind,
    /// Some errors come with more context
    pub context: Option<String>,
}

impl Error {
    pub(crate) fn new_with_context(kind: ErrorKind, context: impl Display) -> Error {
        Error {
            kind,
            context: Some(context.to_string()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (context: {})",
            self.kind.description(),
            self.context.as_deref().unwrap_or("none")
        )
    }
}

impl ErrorTrait for Error {}

///
/// The type of an error
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server could not be started
    ServerFailure,
    /// The endpoint registry lock was poisoned
    Deadlock,
}

impl ErrorKind {
    fn description(&self) -> &'static str {
        match self {
            ErrorKind::ServerFailure => "the server could not be started",
            ErrorKind::Deadlock => "a lock can't be bypassed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_context() {
        let err = Error::new_with_context(ErrorKind::ServerFailure, "address in use");
        assert_eq!(
            "the server could not be started (context: address in use)",
            err.to_string()
        );
    }

    #[test]
    fn test_display_without_context() {
        let err = Error {
            kind: ErrorKind::Deadlock,
            context: None,
        };
        assert_eq!("a lock can't be bypassed (context: none)", err.to_string());
    }
}
