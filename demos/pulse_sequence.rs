use anyhow::Context;
use std::{sync::Arc, time::Duration};
use usrp_rxfe::{
    mimic_delay_from_secs, sim::SimulatedUsrp, DioConfig, DioController, RxfeSettings, TimeSpec,
};

use clap::Parser;

/// Dry run of a radar pulse sequence against a simulated USRP.
///
/// The receive front end is configured with the requested attenuation, the timing lines
/// are parked, and a train of evenly spaced pulses is queued. The simulated clock is then
/// run past the last pulse and every GPIO transition that fired is printed.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Number of pulses in the sequence.
    #[arg(short = 'n', long, default_value_t = 8)]
    pulses: usize,

    /// Length of each pulse in microseconds.
    #[arg(short, long, default_value_t = 300)]
    length_us: u64,

    /// Spacing between pulse starts in microseconds.
    #[arg(short, long, default_value_t = 2400)]
    spacing_us: u64,

    /// Drive the mimic line, delayed by this many seconds.
    #[arg(short, long)]
    mimic_delay: Option<f64>,

    /// Receive chain attenuation in dB, in 0.5 dB steps up to 31.5 dB.
    #[arg(short, long, default_value_t = 0.0)]
    attenuation: f32,

    /// Enable both front end amplifiers.
    #[arg(long)]
    amplifiers: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    pretty_env_logger::init();

    log::debug!("Args: {:#?}", args);

    let usrp = Arc::new(SimulatedUsrp::new());
    let controller = DioController::new(usrp.clone(), DioConfig::default())
        .with_context(|| "Cannot Create Controller")?;

    let mut settings = RxfeSettings::from_attenuation_db(args.attenuation)
        .with_context(|| format!("Invalid attenuation ({} dB)", args.attenuation))?;
    if args.amplifiers {
        settings |= RxfeSettings::AMP1 | RxfeSettings::AMP2;
    }

    controller
        .initialize_rxfe()
        .with_context(|| "Cannot Initialize RXFE")?;
    controller
        .apply_rxfe_settings(settings)
        .with_context(|| format!("Cannot Apply RXFE Settings ({settings})"))?;

    log::info!(
        "Front end set to {settings}, net gain {} dB",
        settings.net_gain_db()
    );

    let mimic_delay = args
        .mimic_delay
        .map(mimic_delay_from_secs)
        .transpose()
        .with_context(|| "Invalid Mimic Delay")?;

    controller
        .initialize_timing_signals(mimic_delay.is_some())
        .with_context(|| "Cannot Initialize Timing Signals")?;

    let start = controller
        .next_start_time(Duration::ZERO)
        .with_context(|| "Cannot Read Device Time")?;
    let spacing = Duration::from_micros(args.spacing_us);
    let pulse_times = (0..args.pulses)
        .map(|i| {
            u32::try_from(i)
                .ok()
                .and_then(|n| spacing.checked_mul(n))
                .and_then(|offset| start.checked_add(offset))
                .with_context(|| format!("Pulse {i} lies beyond the device clock range"))
        })
        .collect::<anyhow::Result<Vec<TimeSpec>>>()?;
    let length = Duration::from_micros(args.length_us);

    controller
        .emit_pulse_sequence(
            start,
            &pulse_times,
            length,
            mimic_delay.is_some(),
            mimic_delay.unwrap_or_default(),
        )
        .with_context(|| "Cannot Queue Pulse Sequence")?;

    log::info!(
        "Queued {} commands, first pulse at {start}",
        usrp.pending_commands().len()
    );

    let end = pulse_times.last().copied().unwrap_or(start) + length;
    usrp.set_time(end + mimic_delay.unwrap_or_default() + Duration::from_millis(1));

    for command in usrp.executed_commands() {
        println!("{} {:>8} {}", command.time, command.line, command.edge);
    }

    let dropped = usrp.dropped_commands();
    if !dropped.is_empty() {
        anyhow::bail!("{} commands arrived late and were dropped", dropped.len());
    }

    Ok(())
}
