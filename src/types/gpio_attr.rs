use enum_map::Enum;
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

/// Registers of a USRP GPIO bank.
///
/// Naming follows `multi_usrp::set_gpio_attr`. Every register is a 32 bit word with one bit
/// per line of the bank.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Enum,
    FromRepr,
    EnumIter,
    AsRefStr,
    Display,
    EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum GpioAttr {
    /// 0 = manual GPIO control, 1 = driven by the automatic transmit/receive logic
    Ctrl,
    /// Data direction, 1 = output
    Ddr,
    /// Output value for lines under manual control
    Out,
    /// Current line levels (read only)
    Readback,
    /// ATR output while idle
    #[strum(serialize = "ATR_0X")]
    Atr0x,
    /// ATR output while receiving
    #[strum(serialize = "ATR_RX")]
    AtrRx,
    /// ATR output while transmitting
    #[strum(serialize = "ATR_TX")]
    AtrTx,
    /// ATR output during full duplex
    #[strum(serialize = "ATR_XX")]
    AtrXx,
}

impl GpioAttr {
    /// Whether a write to this register is accepted by the device.
    pub fn is_writable(&self) -> bool {
        !matches!(self, GpioAttr::Readback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn uhd_names() {
        assert_eq!(GpioAttr::Ctrl.as_ref(), "CTRL");
        assert_eq!(GpioAttr::Readback.to_string(), "READBACK");
        assert_eq!(GpioAttr::from_str("ATR_XX").unwrap(), GpioAttr::AtrXx);
        assert!(!GpioAttr::Readback.is_writable());
    }
}
