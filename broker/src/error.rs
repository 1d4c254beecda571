use std::fmt;
use std::io;
use std::sync::PoisonError;

pub type BrokerResult<T> = Result<T, BrokerError>;

#[derive(Debug)]
pub enum BrokerError {
    Io(io::Error),
    ArgumentError(String),
    PoisonedLock,
    Signal(io::Error),
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerError::Io(err) => write!(f, "I/O error: {}", err),
            BrokerError::ArgumentError(msg) => write!(f, "{}", msg),
            BrokerError::PoisonedLock => write!(f, "poisoned lock"),
            BrokerError::Signal(err) => write!(f, "unable to register signal handler: {}", err),
        }
    }
}

impl std::error::Error for BrokerError {}

impl From<io::Error> for BrokerError {
    fn from(err: io::Error) -> Self {
        BrokerError::Io(err)
    }
}

impl<T> From<PoisonError<T>> for BrokerError {
    fn from(_: PoisonError<T>) -> Self {
        BrokerError::PoisonedLock
    }
}
