//! Receive front-end amplifier and attenuator control.
//!
//! Every stage of the front end hangs off one line of the RXFE GPIO bank, see
//! [DioConfig](crate::DioConfig) for the assignment and polarity of each line.

use crate::{DioConfig, GpioAttr, Result, RxfeSettings, Usrp};

/// Take manual control of the front-end lines and put the chain in [RxfeSettings::SAFE_DEFAULT].
///
/// Calling this again resets the front end to the same baseline.
pub fn initialize_rxfe<D: Usrp>(device: &D, config: &DioConfig) -> Result<()> {
    let bank = config.rxfe_bank();
    let mask = config.rxfe_mask();
    log::info!("Initializing RXFE lines {mask:#010x} on {bank}");

    device.gpio_write(bank, GpioAttr::Ctrl, mask, 0)?;
    // Drive the safe levels before the lines become outputs
    apply_rxfe_settings(device, config, RxfeSettings::SAFE_DEFAULT)?;
    device.gpio_dir_masked_write(bank, mask, u32::MAX)?;
    Ok(())
}

/// Write every stage flag of `settings` to its front-end line in one masked write.
///
/// The analog chain takes a while to settle after the write, callers should not expect the
/// new gain within the same microsecond.
pub fn apply_rxfe_settings<D: Usrp>(
    device: &D,
    config: &DioConfig,
    settings: RxfeSettings,
) -> Result<()> {
    let value = config.encode_rxfe(settings);
    log::debug!(
        "Setting RXFE to {settings} ({value:#010x} under {:#010x})",
        config.rxfe_mask()
    );
    device.gpio_masked_write(config.rxfe_bank(), config.rxfe_mask(), value)
}

/// Read the front-end state back from the `OUT` register of the RXFE bank.
pub fn read_rxfe_settings<D: Usrp>(device: &D, config: &DioConfig) -> Result<RxfeSettings> {
    let register = device.gpio_read(config.rxfe_bank(), GpioAttr::Out)?;
    Ok(config.decode_rxfe(register))
}
