use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The content region was absent when the export started.
    MissingSource(String),
    /// Rendering the content region into a surface failed.
    Render(String),
    /// Writing the PDF structure failed; nothing was persisted.
    Encoding(String),
    InvalidGeometry(String),
    /// Input data (blocks or a layout tree) could not be parsed.
    InvalidInput(String),
    Font(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingSource(msg) => write!(f, "missing content source: {msg}"),
            Error::Render(msg) => write!(f, "render failed: {msg}"),
            Error::Encoding(msg) => write!(f, "PDF encoding failed: {msg}"),
            Error::InvalidGeometry(msg) => write!(f, "invalid page geometry: {msg}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::Font(msg) => write!(f, "font error: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
