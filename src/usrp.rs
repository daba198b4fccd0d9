use std::sync::Arc;

use crate::{error::*, types::*};

/// Capabilities of a USRP needed to drive the front end and timing lines.
///
/// Implemented by the radio driver binding, and by [SimulatedUsrp](crate::sim::SimulatedUsrp)
/// for running without hardware. Implementations are expected to report every communication
/// failure as [Error::HardwareIo].
///
/// The device owns a timed command queue which it executes on its own clock. Methods on this
/// trait never wait for a command to fire.
pub trait Usrp {
    /// Read the current device clock.
    ///
    /// Equivalent to `multi_usrp::get_time_now`.
    fn time_now(&self) -> Result<TimeSpec>;

    /// Immediately write `value` to the lines of `bank` selected by `mask`.
    ///
    /// Equivalent to `multi_usrp::set_gpio_attr(bank, attr, value, mask)`.
    fn gpio_write(&self, bank: &str, attr: GpioAttr, mask: u32, value: u32) -> Result<()>;

    /// Read a whole register of `bank`.
    fn gpio_read(&self, bank: &str, attr: GpioAttr) -> Result<u32>;

    /// Queue a masked `OUT` write to be executed at `command.time` on the device clock.
    ///
    /// Equivalent to `set_command_time`, `set_gpio_attr`, `clear_command_time`.
    ///
    /// <div class="warning">
    /// Hardware drops or misfires commands whose time has already passed when they reach the
    /// queue. Callers are expected to check the time against [time_now](Usrp::time_now) first.
    /// </div>
    fn enqueue_timed(&self, command: &TimedCommand) -> Result<()>;

    /// Drop every pending timed command.
    fn clear_command_queue(&self) -> Result<()>;

    /// Write only the lines in `mask` of the `OUT` register.
    fn gpio_masked_write(&self, bank: &str, mask: u32, value: u32) -> Result<()> {
        self.gpio_write(bank, GpioAttr::Out, mask, value)
    }

    /// Set the direction of the lines in `mask`, 1 bits become outputs.
    fn gpio_dir_masked_write(&self, bank: &str, mask: u32, outputs: u32) -> Result<()> {
        self.gpio_write(bank, GpioAttr::Ddr, mask, outputs)
    }
}

impl<T: Usrp + ?Sized> Usrp for &T {
    fn time_now(&self) -> Result<TimeSpec> {
        (**self).time_now()
    }

    fn gpio_write(&self, bank: &str, attr: GpioAttr, mask: u32, value: u32) -> Result<()> {
        (**self).gpio_write(bank, attr, mask, value)
    }

    fn gpio_read(&self, bank: &str, attr: GpioAttr) -> Result<u32> {
        (**self).gpio_read(bank, attr)
    }

    fn enqueue_timed(&self, command: &TimedCommand) -> Result<()> {
        (**self).enqueue_timed(command)
    }

    fn clear_command_queue(&self) -> Result<()> {
        (**self).clear_command_queue()
    }
}

impl<T: Usrp + ?Sized> Usrp for Arc<T> {
    fn time_now(&self) -> Result<TimeSpec> {
        (**self).time_now()
    }

    fn gpio_write(&self, bank: &str, attr: GpioAttr, mask: u32, value: u32) -> Result<()> {
        (**self).gpio_write(bank, attr, mask, value)
    }

    fn gpio_read(&self, bank: &str, attr: GpioAttr) -> Result<u32> {
        (**self).gpio_read(bank, attr)
    }

    fn enqueue_timed(&self, command: &TimedCommand) -> Result<()> {
        (**self).enqueue_timed(command)
    }

    fn clear_command_queue(&self) -> Result<()> {
        (**self).clear_command_queue()
    }
}
