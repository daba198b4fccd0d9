use std::marker::PhantomData;

use crate::{config::LinePin, Error, GpioAttr, Result, Usrp};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

pub struct Disabled;
pub struct Input;
pub struct Output;

/// A single GPIO line of a USRP bank, written immediately rather than on the device clock.
///
/// The `embedded_hal` traits work on electrical levels. [DioPin::set_active] and
/// [DioPin::is_active] apply the line polarity from [LinePin].
pub struct DioPin<'a, T, D: Usrp> {
    bank: &'a str,
    pin: LinePin,
    device: &'a D,
    _direction: PhantomData<T>,
}

impl<'a, D: Usrp> DioPin<'a, Disabled, D> {
    pub fn new(device: &'a D, bank: &'a str, pin: LinePin) -> Self {
        DioPin {
            bank,
            pin,
            device,
            _direction: PhantomData,
        }
    }
}

impl<'a, T, D: Usrp> DioPin<'a, T, D> {
    pub fn into_input(self) -> Result<DioPin<'a, Input, D>> {
        self.take_manual_control()?;
        self.device
            .gpio_dir_masked_write(self.bank, self.pin.mask(), 0)?;
        Ok(self.retype())
    }

    /// Configure the line as an output. The current `OUT` value is left untouched.
    pub fn into_output(self) -> Result<DioPin<'a, Output, D>> {
        self.take_manual_control()?;
        self.device
            .gpio_dir_masked_write(self.bank, self.pin.mask(), u32::MAX)?;
        Ok(self.retype())
    }

    /// Configure the line as an output already driven to its inactive level.
    pub fn into_idle_output(self) -> Result<DioPin<'a, Output, D>> {
        // Set the level first so the line never glitches active while switching direction
        self.device
            .gpio_masked_write(self.bank, self.pin.mask(), self.pin.level(false))?;
        self.into_output()
    }

    pub fn pin(&self) -> LinePin {
        self.pin
    }

    fn take_manual_control(&self) -> Result<()> {
        self.device
            .gpio_write(self.bank, GpioAttr::Ctrl, self.pin.mask(), 0)
    }

    fn retype<U>(self) -> DioPin<'a, U, D> {
        DioPin {
            bank: self.bank,
            pin: self.pin,
            device: self.device,
            _direction: PhantomData,
        }
    }
}

impl<D: Usrp> DioPin<'_, Input, D> {
    pub fn read(&self) -> Result<PinState> {
        let state_raw = self.device.gpio_read(self.bank, GpioAttr::Readback)?;
        Ok(PinState::from(state_raw & self.pin.mask() != 0))
    }

    pub fn is_active(&self) -> Result<bool> {
        let state_raw = self.device.gpio_read(self.bank, GpioAttr::Readback)?;
        Ok(self.pin.is_active(state_raw))
    }
}

impl<D: Usrp> DioPin<'_, Output, D> {
    pub fn write(&self, state: PinState) -> Result<()> {
        let mask = self.pin.mask();
        match state {
            PinState::High => self.device.gpio_masked_write(self.bank, mask, u32::MAX),
            PinState::Low => self.device.gpio_masked_write(self.bank, mask, 0),
        }
    }

    pub fn set_active(&self, active: bool) -> Result<()> {
        self.device
            .gpio_masked_write(self.bank, self.pin.mask(), self.pin.level(active))
    }

    /// The level last written to `OUT` for this line.
    pub fn is_set_active(&self) -> Result<bool> {
        let out = self.device.gpio_read(self.bank, GpioAttr::Out)?;
        Ok(self.pin.is_active(out))
    }
}

impl<T, D: Usrp> ErrorType for DioPin<'_, T, D> {
    type Error = Error;
}

impl<D: Usrp> InputPin for DioPin<'_, Input, D> {
    fn is_high(&mut self) -> std::result::Result<bool, Self::Error> {
        match self.read()? {
            PinState::High => Ok(true),
            PinState::Low => Ok(false),
        }
    }

    fn is_low(&mut self) -> std::result::Result<bool, Self::Error> {
        match self.read()? {
            PinState::High => Ok(false),
            PinState::Low => Ok(true),
        }
    }
}

impl<D: Usrp> OutputPin for DioPin<'_, Output, D> {
    fn set_low(&mut self) -> std::result::Result<(), Self::Error> {
        self.write(PinState::Low)
    }

    fn set_high(&mut self) -> std::result::Result<(), Self::Error> {
        self.write(PinState::High)
    }
}
