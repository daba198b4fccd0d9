//! Receive front-end (RXFE) and digital I/O timing control for USRP based radars.
//!
//! The crate covers three jobs on a USRP that gates a pulsed transmitter:
//!
//! - Front-end configuration: switching the two +20 dB amplifiers and six binary weighted
//!   attenuator pads of the receive chain ([RxfeSettings], [DioController::apply_rxfe_settings]).
//! - Timing signal initialization: parking the transmit gate and optional mimic line in
//!   their idle state ([DioController::initialize_timing_signals]).
//! - Pulse sequencing: turning a list of pulse times into timed GPIO commands executed by the
//!   device clock ([DioController::emit_pulse_sequence]).
//!
//! The radio driver is reached through the [Usrp] trait. [sim::SimulatedUsrp] implements it
//! in memory for tests and dry runs.
//!
//! ```
//! # use std::time::Duration;
//! use usrp_rxfe::{sim::SimulatedUsrp, DioConfig, DioController, RxfeSettings};
//!
//! let usrp = SimulatedUsrp::new();
//! let controller = DioController::new(&usrp, DioConfig::default())?;
//! controller.initialize_rxfe()?;
//! controller.apply_rxfe_settings(RxfeSettings::from_attenuation_db(10.0)?)?;
//! controller.initialize_timing_signals(true)?;
//!
//! let start = controller.next_start_time(Duration::ZERO)?;
//! let pulses = [start, start + Duration::from_millis(2), start + Duration::from_millis(5)];
//! controller.emit_pulse_sequence(
//!     start,
//!     &pulses,
//!     Duration::from_micros(300),
//!     true,
//!     Duration::from_micros(50),
//! )?;
//! assert_eq!(usrp.pending_commands().len(), 12);
//! # Ok::<(), usrp_rxfe::Error>(())
//! ```
//!
//! ## Logging
//! Everything is reported through the [log] crate facade. Initialization steps log at `info`,
//! individual writes at `debug` and every queued command at `trace`.

mod error;
pub use error::{Error, HardwareIoError, Result, TimingViolation};

mod types;
pub use types::*;

mod usrp;
pub use usrp::Usrp;

mod config;
pub use config::{
    DioConfig, LinePin, DEFAULT_RXFE_BANK, DEFAULT_TIMING_BANK, MIN_SCHEDULE_LEAD,
};

pub mod dio_pin;

pub mod rxfe;

pub mod timing;
pub use timing::{mimic_delay_from_secs, PulseSequence};

mod controller;
pub use controller::DioController;

pub mod sim;
