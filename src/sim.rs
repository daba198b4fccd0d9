//! An in-memory USRP for running the front-end and timing code without hardware.
//!
//! The simulated device keeps a register file per GPIO bank and a bounded timed command
//! queue. Time only moves when the caller sets or advances the clock, at which point every
//! command that came due is executed in timestamp order, the way the FPGA does it.

use std::{collections::HashMap, time::Duration};

use enum_map::EnumMap;
use parking_lot::Mutex;

use crate::{GpioAttr, HardwareIoError, Result, TimeSpec, TimedCommand, Usrp};

/// Depth of the simulated timed command queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 512;

/// Bank names known to a [SimulatedUsrp::new] device
pub const DEFAULT_BANKS: [&str; 5] = ["FP0", "RXA", "RXB", "TXA", "TXB"];

type Registers = EnumMap<GpioAttr, u32>;

#[derive(Debug)]
struct State {
    now: TimeSpec,
    connected: bool,
    queue_capacity: usize,
    banks: HashMap<String, Registers>,
    /// Levels applied to lines configured as inputs
    inputs: HashMap<String, u32>,
    queue: Vec<TimedCommand>,
    executed: Vec<TimedCommand>,
    dropped: Vec<TimedCommand>,
}

impl State {
    fn check_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(HardwareIoError::Disconnected.into())
        }
    }

    fn bank(&self, bank: &str) -> Result<&Registers> {
        self.banks
            .get(bank)
            .ok_or_else(|| HardwareIoError::UnknownBank(bank.into()).into())
    }

    fn bank_mut(&mut self, bank: &str) -> Result<&mut Registers> {
        self.banks
            .get_mut(bank)
            .ok_or_else(|| HardwareIoError::UnknownBank(bank.into()).into())
    }

    fn readback(&self, bank: &str, regs: &Registers) -> u32 {
        let inputs = self.inputs.get(bank).copied().unwrap_or(0);
        (regs[GpioAttr::Out] & regs[GpioAttr::Ddr]) | (inputs & !regs[GpioAttr::Ddr])
    }

    fn run_until(&mut self, now: TimeSpec) {
        self.now = now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|c| c.time <= now);
        self.queue = pending;

        // Stable, so commands sharing a timestamp run in the order they were queued
        due.sort_by_key(|c| c.time);
        for command in due {
            if let Some(regs) = self.banks.get_mut(&command.bank) {
                let out = &mut regs[GpioAttr::Out];
                *out = (*out & !command.mask) | (command.value & command.mask);
            }
            log::trace!(
                "sim: {} {} fired at {}",
                command.edge,
                command.line,
                command.time
            );
            self.executed.push(command);
        }
    }
}

/// A [Usrp] backed by memory instead of hardware.
///
/// ```
/// # use std::time::Duration;
/// # use usrp_rxfe::{sim::SimulatedUsrp, GpioAttr, TimeSpec, Usrp};
/// let usrp = SimulatedUsrp::new();
/// usrp.gpio_masked_write("FP0", 0b1, 0b1)?;
/// assert_eq!(usrp.gpio_read("FP0", GpioAttr::Out)?, 0b1);
///
/// usrp.advance(Duration::from_secs(1));
/// assert_eq!(usrp.time_now()?, TimeSpec::from_secs_f64(1.0));
/// # Ok::<(), usrp_rxfe::Error>(())
/// ```
#[derive(Debug)]
pub struct SimulatedUsrp {
    state: Mutex<State>,
}

impl Default for SimulatedUsrp {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedUsrp {
    /// A device at time zero with the [DEFAULT_BANKS].
    pub fn new() -> Self {
        Self::with_banks(DEFAULT_BANKS)
    }

    /// A device at time zero exposing only `banks`.
    pub fn with_banks<I, S>(banks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let banks = banks
            .into_iter()
            .map(|bank| (bank.into(), Registers::default()))
            .collect();
        Self {
            state: Mutex::new(State {
                now: TimeSpec::ZERO,
                connected: true,
                queue_capacity: DEFAULT_QUEUE_CAPACITY,
                banks,
                inputs: HashMap::new(),
                queue: Vec::new(),
                executed: Vec::new(),
                dropped: Vec::new(),
            }),
        }
    }

    /// Limit the timed command queue to `capacity` pending commands.
    pub fn with_queue_capacity(self, capacity: usize) -> Self {
        self.state.lock().queue_capacity = capacity;
        self
    }

    /// Move the clock to `time`, running every command that came due.
    ///
    /// Moving the clock backwards is allowed and runs nothing.
    pub fn set_time(&self, time: TimeSpec) {
        self.state.lock().run_until(time);
    }

    /// Move the clock forward by `by`, running every command that came due.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock();
        let now = state.now + by;
        state.run_until(now);
    }

    /// Make every following call fail with [HardwareIoError::Disconnected].
    pub fn disconnect(&self) {
        self.state.lock().connected = false;
    }

    pub fn reconnect(&self) {
        self.state.lock().connected = true;
    }

    /// Drive the levels seen on input lines of `bank`.
    pub fn set_input_levels(&self, bank: &str, mask: u32, value: u32) {
        let mut state = self.state.lock();
        let inputs = state.inputs.entry(bank.to_owned()).or_default();
        *inputs = (*inputs & !mask) | (value & mask);
    }

    /// Register contents without going through the [Usrp] error paths.
    pub fn register(&self, bank: &str, attr: GpioAttr) -> Option<u32> {
        let state = self.state.lock();
        let regs = state.banks.get(bank)?;
        Some(match attr {
            GpioAttr::Readback => state.readback(bank, regs),
            attr => regs[attr],
        })
    }

    /// Commands waiting for their time, in the order they were queued.
    pub fn pending_commands(&self) -> Vec<TimedCommand> {
        self.state.lock().queue.clone()
    }

    /// Commands that fired, in the order they fired.
    pub fn executed_commands(&self) -> Vec<TimedCommand> {
        self.state.lock().executed.clone()
    }

    /// Commands that reached the queue after their time had passed and were discarded.
    pub fn dropped_commands(&self) -> Vec<TimedCommand> {
        self.state.lock().dropped.clone()
    }
}

impl Usrp for SimulatedUsrp {
    fn time_now(&self) -> Result<TimeSpec> {
        let state = self.state.lock();
        state.check_connected()?;
        Ok(state.now)
    }

    fn gpio_write(&self, bank: &str, attr: GpioAttr, mask: u32, value: u32) -> Result<()> {
        let mut state = self.state.lock();
        state.check_connected()?;
        if !attr.is_writable() {
            return Err(HardwareIoError::Other(format!("{attr} is read only").into()).into());
        }
        let reg = &mut state.bank_mut(bank)?[attr];
        *reg = (*reg & !mask) | (value & mask);
        Ok(())
    }

    fn gpio_read(&self, bank: &str, attr: GpioAttr) -> Result<u32> {
        let state = self.state.lock();
        state.check_connected()?;
        let regs = state.bank(bank)?;
        Ok(match attr {
            GpioAttr::Readback => state.readback(bank, regs),
            attr => regs[attr],
        })
    }

    fn enqueue_timed(&self, command: &TimedCommand) -> Result<()> {
        let mut state = self.state.lock();
        state.check_connected()?;
        state.bank(&command.bank)?;
        if state.queue.len() >= state.queue_capacity {
            return Err(HardwareIoError::QueueFull.into());
        }
        if command.time <= state.now {
            log::warn!(
                "sim: dropping late command for {} at {}, device time is {}",
                command.line,
                command.time,
                state.now
            );
            state.dropped.push(command.clone());
            return Ok(());
        }
        state.queue.push(command.clone());
        Ok(())
    }

    fn clear_command_queue(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.check_connected()?;
        state.queue.clear();
        Ok(())
    }
}
