use embedded_hal::digital::ErrorKind;
use thiserror::Error;

use crate::TimeSpec;

/// A convenience type with [Err] variant set to be the [enum@Error] type from this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for front-end configuration and pulse sequencing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Device I/O failure: {0}")]
    /// Communicating with or writing to the device failed
    HardwareIo(#[from] HardwareIoError),

    #[error("Timing violation: {0}")]
    /// A scheduling precondition was violated. Nothing was enqueued for the offending command.
    TimingViolation(#[from] TimingViolation),

    #[error("Insufficient initialization for the requested operation: {0}")]
    /// A required initialization step has not run in this session
    NotInit(&'static str),

    #[error("Provided parameter was out of the allowable range: {0}")]
    /// Provided parameter was out of the allowable range
    Range(Box<str>),

    #[error("Invalid DIO configuration: {0}")]
    /// The line assignment in a [DioConfig](crate::DioConfig) is unusable
    InvalidConfig(Box<str>),

    /// An arbitrary string error
    #[error("{0}")]
    Msg(Box<str>),
}

/// Failures reported by the device while talking to it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HardwareIoError {
    #[error("device is disconnected")]
    Disconnected,

    #[error("could not enqueue timed command into full queue")]
    QueueFull,

    #[error("unknown GPIO bank `{0}`")]
    UnknownBank(Box<str>),

    #[error("{0}")]
    Other(Box<str>),
}

/// Scheduling preconditions of the pulse sequencer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TimingViolation {
    #[error("pulse length must be positive")]
    NonPositivePulseLength,

    #[error("mimic delay must be a non-negative number of seconds, got {0}")]
    NegativeMimicDelay(Box<str>),

    #[error("start time {start} is not after the device time {now}")]
    LateStart { start: TimeSpec, now: TimeSpec },

    #[error("pulse {index} at {time} precedes the sequence start {start}")]
    BeforeStart {
        index: usize,
        time: TimeSpec,
        start: TimeSpec,
    },

    #[error("pulse {index} at {time} has an edge past the end of the device clock range")]
    OutOfRange { index: usize, time: TimeSpec },

    #[error("pulse {index} at {time} overlaps the previous pulse ending at {previous_end}")]
    Overlap {
        index: usize,
        time: TimeSpec,
        previous_end: TimeSpec,
    },
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Msg(value.into_boxed_str())
    }
}

impl Error {
    /// Create a new arbitrary string error
    pub fn msg(msg: impl Into<String>) -> Self {
        Error::Msg(msg.into().into())
    }

    /// Create a new [Error::Range] error
    pub fn range(msg: impl Into<String>) -> Self {
        Error::Range(msg.into().into())
    }

    /// Create a new [Error::InvalidConfig] error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into().into())
    }

    /// True for errors raised by the scheduling checks.
    pub fn is_timing_violation(&self) -> bool {
        matches!(self, Error::TimingViolation(_))
    }

    /// True for errors reported by the device.
    pub fn is_hardware_io(&self) -> bool {
        matches!(self, Error::HardwareIo(_))
    }
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        ErrorKind::Other
    }
}
