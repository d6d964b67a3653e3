use std::error;
use std::fmt;
use std::io;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// An error produced by this crate.
///
/// The clustering engine itself (`ClusterGroup`, `Cluster`, `Similarity`) is
/// total and never fails; every variant here originates either from parsing
/// a [`crate::method::LinkageMethod`] name or from the convenience
/// [`crate::reader::ClusterReader`] loader.
#[derive(Debug)]
pub enum Error {
    /// Raised when parsing a method name that doesn't correspond to a valid
    /// [`crate::method::LinkageMethod`] variant.
    InvalidMethod(String),
    /// Raised when reading the underlying input stream fails.
    Io(io::Error),
    /// Raised when a row of the tab-delimited ingestion format is malformed
    /// (wrong column count, or an unparsable score field).
    Parse {
        /// The 1-based line number of the offending row.
        line: u64,
        /// A human-readable description of what went wrong.
        message: String,
    },
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::InvalidMethod(_) | Error::Parse { .. } => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::InvalidMethod(ref name) => {
                write!(f, "unrecognized linkage method name: '{}'", name)
            }
            Error::Io(ref err) => write!(f, "i/o error: {}", err),
            Error::Parse { line, ref message } => {
                write!(f, "line {}: {}", line, message)
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(err) => err,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
