use enum_map::Enum;
use strum::{Display, EnumIter};

/// Gating lines driven by the pulse sequencer.
#[derive(Copy, Clone, Debug, Enum, EnumIter, Display, PartialEq, Eq, Hash)]
pub enum DioLine {
    /// Primary transmit gate
    #[strum(serialize = "TX gate")]
    TxGate,
    /// Delayed copy of the transmit gate for an auxiliary receiver
    #[strum(serialize = "mimic")]
    Mimic,
}

/// The logic level a timed command drives a line to.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Edge {
    /// The line becomes active
    #[strum(serialize = "assert")]
    Assert,
    /// The line returns to idle
    #[strum(serialize = "deassert")]
    Deassert,
}
