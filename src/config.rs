use std::time::Duration;

use enum_map::{enum_map, EnumMap};
use strum::IntoEnumIterator;

use crate::{DioLine, Error, Result, RxfeSettings, RxfeStage};

/// Shortest lead used by [next_start_time](crate::DioController::next_start_time) between
/// reading the device clock and the first scheduled command.
pub const MIN_SCHEDULE_LEAD: Duration = Duration::from_millis(100);

/// Bank driving the transmit gate and mimic lines by default (front panel GPIO)
pub const DEFAULT_TIMING_BANK: &str = "FP0";
/// Bank driving the front-end amplifier and attenuator lines by default
pub const DEFAULT_RXFE_BANK: &str = "RXA";

/// Where a logical signal lives in a GPIO bank.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinePin {
    /// Bit of the line in the bank registers, `0..32`
    pub bit: u8,
    /// The line is driven low to activate the signal
    pub active_low: bool,
}

impl LinePin {
    pub const fn active_high(bit: u8) -> Self {
        Self {
            bit,
            active_low: false,
        }
    }

    pub const fn active_low(bit: u8) -> Self {
        Self {
            bit,
            active_low: true,
        }
    }

    pub const fn mask(&self) -> u32 {
        1 << self.bit
    }

    /// The register bits that put the line in the requested state.
    pub const fn level(&self, active: bool) -> u32 {
        if active != self.active_low {
            self.mask()
        } else {
            0
        }
    }

    /// Decode the line state from a register value.
    pub const fn is_active(&self, register: u32) -> bool {
        (register & self.mask() != 0) != self.active_low
    }
}

/// GPIO line assignment for the front end and the timing signals.
///
/// ```
/// # use usrp_rxfe::{DioConfig, DioLine, LinePin};
/// let config = DioConfig::default()
///     .with_timing_bank("FP0")
///     .with_line(DioLine::Mimic, LinePin::active_high(5));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DioConfig {
    pub(crate) timing_bank: String,
    pub(crate) rxfe_bank: String,
    pub(crate) lines: EnumMap<DioLine, LinePin>,
    pub(crate) rxfe: EnumMap<RxfeStage, LinePin>,
    pub(crate) min_lead: Duration,
}

impl Default for DioConfig {
    fn default() -> Self {
        Self {
            timing_bank: DEFAULT_TIMING_BANK.to_owned(),
            rxfe_bank: DEFAULT_RXFE_BANK.to_owned(),
            lines: enum_map! {
                DioLine::TxGate => LinePin::active_high(0),
                DioLine::Mimic => LinePin::active_high(1),
            },
            // Amplifier enables are active high, the attenuator pads are bypassed while high
            rxfe: EnumMap::from_fn(|stage: RxfeStage| {
                if stage.is_amplifier() {
                    LinePin::active_high(stage as u8)
                } else {
                    LinePin::active_low(stage as u8)
                }
            }),
            min_lead: MIN_SCHEDULE_LEAD,
        }
    }
}

impl DioConfig {
    pub fn with_timing_bank(mut self, bank: impl Into<String>) -> Self {
        self.timing_bank = bank.into();
        self
    }

    pub fn with_rxfe_bank(mut self, bank: impl Into<String>) -> Self {
        self.rxfe_bank = bank.into();
        self
    }

    pub fn with_line(mut self, line: DioLine, pin: LinePin) -> Self {
        self.lines[line] = pin;
        self
    }

    pub fn with_rxfe_stage(mut self, stage: RxfeStage, pin: LinePin) -> Self {
        self.rxfe[stage] = pin;
        self
    }

    pub fn with_min_lead(mut self, lead: Duration) -> Self {
        self.min_lead = lead;
        self
    }

    pub fn timing_bank(&self) -> &str {
        &self.timing_bank
    }

    pub fn rxfe_bank(&self) -> &str {
        &self.rxfe_bank
    }

    pub fn line(&self, line: DioLine) -> LinePin {
        self.lines[line]
    }

    pub fn rxfe_stage(&self, stage: RxfeStage) -> LinePin {
        self.rxfe[stage]
    }

    pub fn min_lead(&self) -> Duration {
        self.min_lead
    }

    /// All front-end lines of the RXFE bank.
    pub fn rxfe_mask(&self) -> u32 {
        self.rxfe.values().fold(0, |mask, pin| mask | pin.mask())
    }

    /// Encode `settings` as the value of the RXFE bank `OUT` register under
    /// [rxfe_mask](DioConfig::rxfe_mask).
    pub fn encode_rxfe(&self, settings: RxfeSettings) -> u32 {
        self.rxfe
            .iter()
            .fold(0, |value, (stage, pin)| value | pin.level(settings.contains(stage)))
    }

    /// Decode front-end settings from the RXFE bank `OUT` register.
    pub fn decode_rxfe(&self, register: u32) -> RxfeSettings {
        self.rxfe
            .iter()
            .filter(|(_, pin)| pin.is_active(register))
            .fold(RxfeSettings::empty(), |settings, (stage, _)| {
                settings.with(stage)
            })
    }

    /// Check that every line fits a 32 bit bank and no two signals share a line.
    pub fn validate(&self) -> Result<()> {
        let named_pins = DioLine::iter()
            .map(|line| (line.to_string(), &self.timing_bank, self.lines[line]))
            .chain(
                RxfeStage::iter()
                    .map(|stage| (stage.to_string(), &self.rxfe_bank, self.rxfe[stage])),
            )
            .collect::<Vec<_>>();

        for (i, (name, bank, pin)) in named_pins.iter().enumerate() {
            if pin.bit >= 32 {
                return Err(Error::invalid_config(format!(
                    "{name} is assigned to bit {} of {bank}, banks have 32 lines",
                    pin.bit
                )));
            }
            if let Some((other, _, _)) = named_pins[..i]
                .iter()
                .find(|(_, other_bank, other_pin)| other_bank == bank && other_pin.bit == pin.bit)
            {
                return Err(Error::invalid_config(format!(
                    "{name} and {other} share bit {} of {bank}",
                    pin.bit
                )));
            }
        }
        Ok(())
    }
}
