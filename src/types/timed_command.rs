use super::{DioLine, Edge, TimeSpec};

/// A masked GPIO write the device executes at `time` on its own clock.
///
/// `line` and `edge` describe the intent; `bank`, `mask` and `value` are what is written to
/// the bank's `OUT` register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimedCommand {
    pub time: TimeSpec,
    pub line: DioLine,
    pub edge: Edge,
    pub bank: String,
    pub mask: u32,
    pub value: u32,
}

impl TimedCommand {
    /// The level the command leaves the masked line at.
    pub fn is_high(&self) -> bool {
        self.value & self.mask != 0
    }
}
