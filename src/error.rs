use std::error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    IoError(io::Error),
    IniError(ini::ParseError),
    InvalidValue { key: String, value: String },
    LoggerError(log::SetLoggerError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => write!(f, "IO error: {}", err),
            Error::IniError(ref err) => write!(f, "INI error: {}", err),
            Error::InvalidValue { ref key, ref value } => {
                write!(f, "invalid value [{}] for key [{}]", value, key)
            }
            Error::LoggerError(ref err) => write!(f, "Logger error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::IoError(ref err) => Some(err),
            Error::IniError(ref err) => Some(err),
            Error::InvalidValue { .. } => None,
            Error::LoggerError(ref err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<ini::ParseError> for Error {
    fn from(err: ini::ParseError) -> Self {
        Error::IniError(err)
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::LoggerError(err)
    }
}
