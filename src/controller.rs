use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::{
    dio_pin::{Disabled, DioPin},
    rxfe, timing,
    timing::PulseSequence,
    DioConfig, DioLine, Error, Result, RxfeSettings, TimeSpec, TimedCommand, Usrp,
};

/// Front-end and timing line control for one device session.
///
/// The controller keeps the device handle and the line assignment together, and refuses to
/// configure the front end or emit pulses before the matching initialization step has run.
/// `D` is usually a shared handle such as `Arc<T>` or `&T`; the controller never closes it.
///
/// One controller should be the only writer to its device. The device command queue is a
/// single ordered resource and concurrent writers would interleave unpredictably.
///
/// ```
/// # use std::time::Duration;
/// # use usrp_rxfe::{sim::SimulatedUsrp, DioConfig, DioController, RxfeSettings, TimeSpec};
/// let usrp = SimulatedUsrp::new();
/// let controller = DioController::new(&usrp, DioConfig::default())?;
///
/// controller.initialize_rxfe()?;
/// controller.apply_rxfe_settings(RxfeSettings::AMP1 | RxfeSettings::ATT_4_DB)?;
/// controller.initialize_timing_signals(false)?;
///
/// let start = controller.next_start_time(Duration::from_millis(100))?;
/// let pulses = [start, start + Duration::from_millis(10)];
/// let length = Duration::from_micros(300);
/// controller.emit_pulse_sequence(start, &pulses, length, false, Duration::ZERO)?;
/// assert_eq!(usrp.pending_commands().len(), 4);
/// # Ok::<(), usrp_rxfe::Error>(())
/// ```
#[derive(Debug)]
pub struct DioController<D: Usrp> {
    device: D,
    config: DioConfig,
    rxfe_initialized: AtomicBool,
    timing_initialized: AtomicBool,
    mimic_armed: AtomicBool,
}

impl<D: Usrp> DioController<D> {
    /// Wraps `device` after checking `config` with [DioConfig::validate].
    pub fn new(device: D, config: DioConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            device,
            config,
            rxfe_initialized: AtomicBool::new(false),
            timing_initialized: AtomicBool::new(false),
            mimic_armed: AtomicBool::new(false),
        })
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn config(&self) -> &DioConfig {
        &self.config
    }

    pub fn into_inner(self) -> D {
        self.device
    }

    // Front-end configuration

    /// Put the front end in its safe baseline: no amplification, full attenuation.
    ///
    /// Must be called once per session before
    /// [apply_rxfe_settings](DioController::apply_rxfe_settings). Calling it again resets to
    /// the same state.
    pub fn initialize_rxfe(&self) -> Result<()> {
        rxfe::initialize_rxfe(&self.device, &self.config)?;
        self.rxfe_initialized.store(true, Ordering::Release);
        Ok(())
    }

    /// Set the amplifier and attenuator stages to `settings`.
    ///
    /// # Errors
    /// - [Error::NotInit] before [initialize_rxfe](DioController::initialize_rxfe)
    /// - [Error::HardwareIo] if the write fails
    pub fn apply_rxfe_settings(&self, settings: RxfeSettings) -> Result<()> {
        self.require(&self.rxfe_initialized, "initialize_rxfe has not been called")?;
        rxfe::apply_rxfe_settings(&self.device, &self.config, settings)
    }

    /// Read the current amplifier and attenuator state back from the device.
    pub fn read_rxfe_settings(&self) -> Result<RxfeSettings> {
        rxfe::read_rxfe_settings(&self.device, &self.config)
    }

    // Timing signals

    /// Drive the transmit gate, and the mimic line if `mimic_active`, to idle outputs.
    ///
    /// Runs after [initialize_rxfe](DioController::initialize_rxfe) and before any pulse
    /// sequence. Calling it while a sequence is still pending leaves the lines in an
    /// undefined state.
    pub fn initialize_timing_signals(&self, mimic_active: bool) -> Result<()> {
        self.require(&self.rxfe_initialized, "initialize_rxfe has not been called")?;
        timing::initialize_timing_signals(&self.device, &self.config, mimic_active)?;
        self.mimic_armed.store(mimic_active, Ordering::Release);
        self.timing_initialized.store(true, Ordering::Release);
        Ok(())
    }

    /// Validate and expand a pulse sequence without queueing anything.
    pub fn plan_pulse_sequence(&self, sequence: &PulseSequence<'_>) -> Result<Vec<TimedCommand>> {
        self.require(
            &self.timing_initialized,
            "initialize_timing_signals has not been called",
        )?;
        if sequence.mimic_delay.is_some() {
            self.require(&self.mimic_armed, "the mimic line was not armed")?;
        }
        timing::plan_pulse_sequence(&self.device, &self.config, sequence)
    }

    /// Queue a timed assert and deassert of the transmit gate for every pulse.
    ///
    /// With `mimic_active` the mimic line gets the same pulses delayed by `mimic_delay`.
    /// Returns as soon as the commands are queued; the device fires them on its own clock.
    ///
    /// # Errors
    /// - [Error::TimingViolation] if `start_time` is not in the future, a pulse starts before
    ///   `start_time` or before the previous pulse ended, or `pulse_length` is zero. Nothing
    ///   is queued in that case.
    /// - [Error::NotInit] if the timing lines (or the mimic line) were not initialized
    /// - [Error::HardwareIo] if queueing a command fails
    pub fn emit_pulse_sequence(
        &self,
        start_time: TimeSpec,
        pulse_times: &[TimeSpec],
        pulse_length: Duration,
        mimic_active: bool,
        mimic_delay: Duration,
    ) -> Result<()> {
        self.require(
            &self.timing_initialized,
            "initialize_timing_signals has not been called",
        )?;
        if mimic_active {
            self.require(&self.mimic_armed, "the mimic line was not armed")?;
        }
        timing::emit_pulse_sequence(
            &self.device,
            &self.config,
            start_time,
            pulse_times,
            pulse_length,
            mimic_active,
            mimic_delay,
        )
    }

    /// A start time `lead` after the current device time, at least the configured minimum lead.
    pub fn next_start_time(&self, lead: Duration) -> Result<TimeSpec> {
        timing::next_start_time(&self.device, &self.config, lead)
    }

    /// Immediate access to one of the timing lines, bypassing the timed command queue.
    pub fn line_pin(&self, line: DioLine) -> DioPin<'_, Disabled, D> {
        DioPin::new(
            &self.device,
            self.config.timing_bank(),
            self.config.line(line),
        )
    }

    fn require(&self, flag: &AtomicBool, what: &'static str) -> Result<()> {
        if flag.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::NotInit(what))
        }
    }
}
