//! Transmit gating and mimic line timing.
//!
//! Pulse edges are never timed in software. Each edge becomes a [TimedCommand] in the device
//! queue, and the device executes it when its own clock reaches the command time. Once
//! enqueued, commands cannot be recalled except by clearing the whole device queue.

use std::time::Duration;

use crate::{
    dio_pin::DioPin, DioConfig, DioLine, Edge, Result, TimeSpec, TimedCommand, TimingViolation,
    Usrp,
};

/// A pulse train to be gated onto the transmit line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseSequence<'a> {
    /// Device time the sequence is scheduled from. Must be in the future when emitted.
    pub start_time: TimeSpec,
    /// Absolute device time of each pulse's rising edge, in order.
    pub pulse_times: &'a [TimeSpec],
    /// Shared length of every pulse.
    pub pulse_length: Duration,
    /// Delay of the mimic copy, `None` when the mimic line is not driven.
    pub mimic_delay: Option<Duration>,
}

impl<'a> PulseSequence<'a> {
    pub fn new(start_time: TimeSpec, pulse_times: &'a [TimeSpec], pulse_length: Duration) -> Self {
        Self {
            start_time,
            pulse_times,
            pulse_length,
            mimic_delay: None,
        }
    }

    pub fn with_mimic(mut self, delay: Duration) -> Self {
        self.mimic_delay = Some(delay);
        self
    }

    /// Number of timed commands the sequence expands into.
    pub fn command_count(&self) -> usize {
        let per_pulse = if self.mimic_delay.is_some() { 4 } else { 2 };
        self.pulse_times.len() * per_pulse
    }

    /// Check the schedule against the device time `now`.
    ///
    /// Pulses may start exactly where the previous one ends.
    pub fn validate(&self, now: TimeSpec) -> Result<()> {
        if self.pulse_length.is_zero() {
            return Err(TimingViolation::NonPositivePulseLength.into());
        }
        if self.start_time <= now {
            return Err(TimingViolation::LateStart {
                start: self.start_time,
                now,
            }
            .into());
        }

        let mut previous_end = None;
        for (index, &time) in self.pulse_times.iter().enumerate() {
            if time < self.start_time {
                return Err(TimingViolation::BeforeStart {
                    index,
                    time,
                    start: self.start_time,
                }
                .into());
            }
            if let Some(previous_end) = previous_end.filter(|end| time < *end) {
                return Err(TimingViolation::Overlap {
                    index,
                    time,
                    previous_end,
                }
                .into());
            }
            let end = self
                .checked_end(time)
                .ok_or(TimingViolation::OutOfRange { index, time })?;
            previous_end = Some(end);
        }
        Ok(())
    }

    /// End of the pulse at `time`, or `None` if any of its edges, mimic copy included,
    /// falls outside the device clock range.
    fn checked_end(&self, time: TimeSpec) -> Option<TimeSpec> {
        let end = time.checked_add(self.pulse_length)?;
        if let Some(delay) = self.mimic_delay {
            time.checked_add(delay)?.checked_add(self.pulse_length)?;
        }
        Some(end)
    }

    /// Expand the sequence into timed commands, sorted by time.
    ///
    /// Expects a sequence that passed [validate](PulseSequence::validate).
    ///
    /// Commands sharing a timestamp keep the transmit gate ahead of the mimic line, and a
    /// deassert ahead of an assert on the same line.
    pub fn commands(&self, config: &DioConfig) -> Vec<TimedCommand> {
        let command = |time: TimeSpec, line: DioLine, edge: Edge| {
            let pin = config.line(line);
            TimedCommand {
                time,
                line,
                edge,
                bank: config.timing_bank().to_owned(),
                mask: pin.mask(),
                value: pin.level(edge == Edge::Assert),
            }
        };

        let mut commands = Vec::with_capacity(self.command_count());
        for &time in self.pulse_times {
            commands.push(command(time, DioLine::TxGate, Edge::Assert));
            commands.push(command(
                time + self.pulse_length,
                DioLine::TxGate,
                Edge::Deassert,
            ));
            if let Some(delay) = self.mimic_delay {
                let mimic_time = time + delay;
                commands.push(command(mimic_time, DioLine::Mimic, Edge::Assert));
                commands.push(command(
                    mimic_time + self.pulse_length,
                    DioLine::Mimic,
                    Edge::Deassert,
                ));
            }
        }

        commands.sort_by_key(|c| {
            let edge_rank = match c.edge {
                Edge::Deassert => 0,
                Edge::Assert => 1,
            };
            (c.time, c.line as u8, edge_rank)
        });
        commands
    }
}

/// Convert a mimic delay given in seconds.
///
/// # Errors
/// [TimingViolation::NegativeMimicDelay] for negative or non-finite values.
pub fn mimic_delay_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| TimingViolation::NegativeMimicDelay(secs.to_string().into()).into())
}

/// Drive the transmit gate, and the mimic line if `mimic_active`, to idle outputs.
///
/// Must not run while a pulse sequence is still pending in the device queue.
pub fn initialize_timing_signals<D: Usrp>(
    device: &D,
    config: &DioConfig,
    mimic_active: bool,
) -> Result<()> {
    let bank = config.timing_bank();
    log::info!("Initializing timing signals on {bank}, mimic: {mimic_active}");

    DioPin::new(device, bank, config.line(DioLine::TxGate)).into_idle_output()?;
    if mimic_active {
        DioPin::new(device, bank, config.line(DioLine::Mimic)).into_idle_output()?;
    }
    Ok(())
}

/// Validate `sequence` against the current device time and expand it into timed commands.
///
/// Nothing is written to the device.
pub fn plan_pulse_sequence<D: Usrp>(
    device: &D,
    config: &DioConfig,
    sequence: &PulseSequence<'_>,
) -> Result<Vec<TimedCommand>> {
    let now = device.time_now()?;
    sequence.validate(now).inspect_err(|e| {
        log::warn!("Rejecting pulse sequence of {} pulses: {e}", sequence.pulse_times.len())
    })?;
    Ok(sequence.commands(config))
}

/// Queue the transmit gate edges, and the mimic copy if requested, of every pulse.
///
/// All checks happen before the first command is queued, so a [TimingViolation]
/// leaves the device queue untouched. A failing enqueue is reported as
/// [HardwareIo](crate::Error::HardwareIo) without retrying; commands queued before it stay queued.
pub fn emit_pulse_sequence<D: Usrp>(
    device: &D,
    config: &DioConfig,
    start_time: TimeSpec,
    pulse_times: &[TimeSpec],
    pulse_length: Duration,
    mimic_active: bool,
    mimic_delay: Duration,
) -> Result<()> {
    let mut sequence = PulseSequence::new(start_time, pulse_times, pulse_length);
    if mimic_active {
        sequence = sequence.with_mimic(mimic_delay);
    }
    let commands = plan_pulse_sequence(device, config, &sequence)?;

    log::debug!(
        "Queueing {} commands for {} pulses starting {start_time}",
        commands.len(),
        pulse_times.len()
    );
    for (i, command) in commands.iter().enumerate() {
        log::trace!("{} {} at {}", command.edge, command.line, command.time);
        device.enqueue_timed(command).inspect_err(|e| {
            log::error!("Failed to queue command {i} of {}: {e}", commands.len())
        })?;
    }
    Ok(())
}

/// The device time `lead` from now, never closer than the configured minimum lead.
pub fn next_start_time<D: Usrp>(
    device: &D,
    config: &DioConfig,
    lead: Duration,
) -> Result<TimeSpec> {
    let now = device.time_now()?;
    Ok(now + lead.max(config.min_lead()))
}
