use embedded_hal::digital::{InputPin, OutputPin, PinState};
use usrp_rxfe::{
    dio_pin::DioPin, sim::SimulatedUsrp, DioConfig, DioController, DioLine, GpioAttr, LinePin,
    Result,
};

#[test]
fn output_pin_drives_the_line() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let controller = DioController::new(&usrp, DioConfig::default())?;

    let mut gate = controller.line_pin(DioLine::TxGate).into_output()?;
    assert_eq!(usrp.register("FP0", GpioAttr::Ddr), Some(0b1));

    gate.set_high()?;
    assert_eq!(usrp.register("FP0", GpioAttr::Readback), Some(0b1));
    assert!(gate.is_set_active()?);

    gate.set_low()?;
    assert_eq!(usrp.register("FP0", GpioAttr::Readback), Some(0b0));
    Ok(())
}

#[test]
fn polarity_is_applied_by_set_active() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let pin = DioPin::new(&usrp, "TXA", LinePin::active_low(7)).into_idle_output()?;

    assert_eq!(usrp.register("TXA", GpioAttr::Out), Some(0x80));
    pin.set_active(true)?;
    assert_eq!(usrp.register("TXA", GpioAttr::Out), Some(0x00));
    pin.write(PinState::High)?;
    assert!(!pin.is_set_active()?);
    Ok(())
}

#[test]
fn input_pin_reads_external_levels() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let mut input = DioPin::new(&usrp, "FP0", LinePin::active_high(3)).into_input()?;

    assert!(input.is_low()?);
    usrp.set_input_levels("FP0", 0b1000, 0b1000);
    assert!(input.is_high()?);
    assert_eq!(input.read()?, PinState::High);
    assert!(input.is_active()?);
    Ok(())
}

#[test]
fn disconnected_pin_setup_fails() {
    let usrp = SimulatedUsrp::new();
    let pin = DioPin::new(&usrp, "FP0", LinePin::active_high(0));
    usrp.disconnect();
    assert!(pin.into_output().is_err());
}
