use std::{fmt, io};

/// Utility enum to package errors that can occur while driving a session.
pub enum Error {
    /// The session file failed to parse. Carries the file path and its text so the parse error
    /// can be rendered against its source.
    Session {
        err: frac_error::Error,
        path: String,
        src: String,
    },

    /// An I/O failure on the session file, the template or an output file.
    Io(io::Error),

    /// The command line could not be understood.
    Usage(String),
}

impl Error {
    /// Report this error to stderr.
    pub fn report_to_stderr(&self) {
        match self {
            Self::Session { err, path, src } => err.report_to_stderr(path, src),
            Self::Io(err) => eprintln!("{err}"),
            Self::Usage(msg) => eprintln!("{msg}"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session { path, .. } => write!(f, "session parse error in {path}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Usage(msg) => write!(f, "usage error: {msg}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
