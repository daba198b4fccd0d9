use usrp_rxfe::{
    sim::SimulatedUsrp, DioConfig, DioController, Error, GpioAttr, HardwareIoError, LinePin,
    Result, RxfeSettings, RxfeStage, Usrp,
};

fn controller(usrp: &SimulatedUsrp) -> Result<DioController<&SimulatedUsrp>> {
    DioController::new(usrp, DioConfig::default())
}

#[test]
fn init_puts_chain_in_safe_default() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let controller = controller(&usrp)?;

    controller.initialize_rxfe()?;

    assert_eq!(controller.read_rxfe_settings()?, RxfeSettings::SAFE_DEFAULT);
    assert_eq!(usrp.register("RXA", GpioAttr::Ctrl), Some(0));
    assert_eq!(usrp.register("RXA", GpioAttr::Ddr), Some(0xFF));
    // Every pad enabled, amplifiers off: all lines low with the default polarity
    assert_eq!(usrp.register("RXA", GpioAttr::Readback), Some(0x00));
    Ok(())
}

#[test]
fn apply_then_read_round_trips() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let controller = controller(&usrp)?;
    controller.initialize_rxfe()?;

    for bits in 0..=u8::MAX {
        let settings = RxfeSettings::from_bits(bits);
        controller.apply_rxfe_settings(settings)?;
        assert_eq!(controller.read_rxfe_settings()?, settings);
    }
    Ok(())
}

#[test]
fn repeated_application_is_idempotent() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let controller = controller(&usrp)?;
    let settings = RxfeSettings::AMP2 | RxfeSettings::ATT_2_DB | RxfeSettings::ATT_16_DB;

    controller.initialize_rxfe()?;
    controller.apply_rxfe_settings(settings)?;
    let first = usrp.register("RXA", GpioAttr::Out);
    controller.apply_rxfe_settings(settings)?;
    assert_eq!(usrp.register("RXA", GpioAttr::Out), first);

    // Re-initializing returns to the same baseline
    controller.initialize_rxfe()?;
    assert_eq!(controller.read_rxfe_settings()?, RxfeSettings::SAFE_DEFAULT);
    controller.initialize_rxfe()?;
    assert_eq!(controller.read_rxfe_settings()?, RxfeSettings::SAFE_DEFAULT);
    Ok(())
}

#[test]
fn apply_requires_init() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let controller = controller(&usrp)?;

    let err = controller.apply_rxfe_settings(RxfeSettings::AMP1).unwrap_err();
    assert!(matches!(err, Error::NotInit(_)));
    assert_eq!(usrp.register("RXA", GpioAttr::Out), Some(0));
    Ok(())
}

#[test]
fn other_lines_of_the_bank_are_untouched() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let config = DioConfig::default()
        .with_rxfe_stage(RxfeStage::Amp1, LinePin::active_high(12))
        .with_rxfe_stage(RxfeStage::Att16dB, LinePin::active_low(15));
    let controller = DioController::new(&usrp, config)?;

    usrp.gpio_masked_write("RXA", 1 << 20, u32::MAX)?;
    controller.initialize_rxfe()?;
    controller.apply_rxfe_settings(RxfeSettings::AMP1)?;

    let out = usrp.register("RXA", GpioAttr::Out).unwrap_or_default();
    assert_eq!(out & (1 << 20), 1 << 20);
    assert_eq!(out & (1 << 12), 1 << 12);
    // 16 dB pad disabled, active low line driven high
    assert_eq!(out & (1 << 15), 1 << 15);
    assert_eq!(controller.read_rxfe_settings()?, RxfeSettings::AMP1);
    Ok(())
}

#[test]
fn write_failure_is_hardware_io() -> Result<()> {
    let usrp = SimulatedUsrp::new();
    let controller = controller(&usrp)?;
    controller.initialize_rxfe()?;

    usrp.disconnect();
    let err = controller
        .apply_rxfe_settings(RxfeSettings::empty())
        .unwrap_err();
    assert_eq!(err, Error::HardwareIo(HardwareIoError::Disconnected));
    assert!(err.is_hardware_io());
    Ok(())
}

#[test]
fn unknown_bank_is_hardware_io() -> Result<()> {
    let usrp = SimulatedUsrp::with_banks(["FP0"]);
    let controller = controller(&usrp)?;

    let err = controller.initialize_rxfe().unwrap_err();
    assert!(matches!(
        err,
        Error::HardwareIo(HardwareIoError::UnknownBank(_))
    ));
    Ok(())
}

#[test]
fn invalid_config_is_rejected() {
    let usrp = SimulatedUsrp::new();
    let config = DioConfig::default().with_rxfe_stage(RxfeStage::Amp2, LinePin::active_high(0));
    let err = DioController::new(&usrp, config).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}
