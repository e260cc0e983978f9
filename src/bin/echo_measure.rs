use clap::Parser;
use echoprop::acquisition::synthetic::{Pulse, SyntheticEcho};
use echoprop::calibration::fluids::fluid_properties;
use echoprop::engine::common::structs::MeasurementParams;
use echoprop::engine::common::waveform::Waveform;
use echoprop::engine::pipeline::measure;
use echoprop::utils::config::EngineConfig;
use echoprop::utils::constants::{MHZ_TO_HZ, US_TO_S};
use echoprop::utils::logging::init_logging;
use std::path::{Path, PathBuf};

pub type BinResult<T, E = Box<dyn std::error::Error + Send + Sync>> = Result<T, E>;

fn main() {
    if let Err(e) = bin_main() {
        eprintln!("error: {e}");
        if let Some(e) = e.source() {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Measure speed of sound and attenuation from a pulse-echo waveform", long_about = None)]
struct Args {
    /// Two-column `time, amplitude` text file
    #[arg(required_unless_present = "synthetic")]
    infile: Option<PathBuf>,

    /// Measure a generated two-echo waveform instead of a file
    #[arg(long, conflicts_with = "infile")]
    synthetic: bool,

    /// TOML rig configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Carrier frequency (MHz)
    #[arg(short, long, default_value_t = 2.0)]
    frequency: f64,

    /// Cycles in the tone burst
    #[arg(long, default_value_t = 5)]
    cycles: u32,

    /// Start of the first-echo search window (us)
    #[arg(long, default_value_t = 110.0)]
    cutoff: f64,

    /// Skip the band-pass filter
    #[arg(long)]
    no_filter: bool,

    /// Skip upsampling
    #[arg(long)]
    no_upsample: bool,

    /// Reference fluid to report density and viscosity for
    #[arg(long, requires = "temperature")]
    fluid: Option<String>,

    /// Sample temperature (degrees C)
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

/// Reads `time, amplitude` rows separated by commas or whitespace. `#` starts a comment.
fn read_waveform(path: &Path) -> BinResult<Waveform> {
    let content = std::fs::read_to_string(path)?;
    let mut time = vec![];
    let mut amplitude = vec![];
    for (n, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let columns: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        match columns.as_slice() {
            [t, y] => {
                time.push(t.parse::<f64>()?);
                amplitude.push(y.parse::<f64>()?);
            }
            _ => Err(format!(
                "{}:{}: expected 2 columns, found {}",
                path.display(),
                n + 1,
                columns.len()
            ))?,
        }
    }
    Ok(Waveform::new(time, amplitude)?)
}

fn synthetic_waveform(params: &MeasurementParams, config: &EngineConfig) -> BinResult<Waveform> {
    let first = params.cutoff_time + 5.0e-6;
    let second = first + config.second_window_offset + config.second_window_width / 2.0;
    let waveform = SyntheticEcho::new(50.0e6, 8192, params.carrier_frequency, params.cycles)
        .with_pulse(Pulse::new(first, 1.0))
        .with_pulse(Pulse::new(second, 0.6))
        .waveform()?;
    Ok(waveform)
}

fn bin_main() -> BinResult<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    init_logging(args.log_level.as_deref().or(config.log_level.as_deref()));

    let params = MeasurementParams {
        carrier_frequency: args.frequency * MHZ_TO_HZ,
        cycles: args.cycles,
        filter: !args.no_filter,
        upsample: !args.no_upsample,
        cutoff_time: args.cutoff * US_TO_S,
    };

    let waveform = match &args.infile {
        Some(path) => read_waveform(path)?,
        None => synthetic_waveform(&params, &config)?,
    };

    let r = measure(&waveform, &params, &config)?.result;
    println!("arrival time 1:  {:.6} us", r.arrival_time_1 / US_TO_S);
    println!("arrival time 2:  {:.6} us", r.arrival_time_2 / US_TO_S);
    println!("amplitude 1:     {:.6}", r.amplitude_1);
    println!("amplitude 2:     {:.6}", r.amplitude_2);
    println!("velocity:        {:.3} m/s", r.velocity);
    println!("attenuation:     {:.4} 1/m", r.attenuation);

    if let (Some(fluid), Some(temperature)) = (&args.fluid, args.temperature) {
        let props = fluid_properties(temperature, fluid)?;
        println!("{fluid} at {temperature} C:");
        println!("density:         {:.3} kg/m3", props.density);
        println!("viscosity:       {:.4} cSt", props.kinematic_viscosity);
    }
    Ok(())
}
