use echoprop::acquisition::recorder::{record_once, RecordSettings};
use echoprop::acquisition::synthetic::{Pulse, SyntheticEcho, TemperatureRamp};
use echoprop::acquisition::worker::{spawn_worker, StopCondition, WorkerPlan};
use echoprop::acquisition::{TemperatureSensor, WaveformSource};
use echoprop::calibration::fluids::fluid_properties;
use echoprop::engine::common::error::EngineError;
use echoprop::engine::common::structs::{EchoEvent, MeasurementParams};
use echoprop::engine::common::waveform::Waveform;
use echoprop::engine::pipeline::{measure, par_measure};
use echoprop::engine::properties::acoustic_properties;
use echoprop::utils::config::EngineConfig;

const SAMPLE_RATE: f64 = 50.0e6;
const LEN: usize = 8192;

fn two_echoes(t1: f64, a1: f64, t2: f64, a2: f64) -> SyntheticEcho {
    SyntheticEcho::new(SAMPLE_RATE, LEN, 2.0e6, 5)
        .with_pulse(Pulse::new(t1, a1))
        .with_pulse(Pulse::new(t2, a2))
}

#[test]
fn recovers_off_grid_echoes() {
    let (t1, t2) = (115.0037e-6, 125.0071e-6);
    let wf = two_echoes(t1, 1.0, t2, 0.6).waveform().unwrap();
    let params = MeasurementParams {
        filter: false,
        ..Default::default()
    };
    let m = measure(&wf, &params, &EngineConfig::default()).unwrap();

    let dt = 1.0 / SAMPLE_RATE;
    assert!((m.result.arrival_time_1 - t1).abs() < dt);
    assert!((m.result.arrival_time_2 - t2).abs() < dt);
    assert!((m.result.amplitude_1 - 1.0).abs() < 0.01);
    assert!((m.result.amplitude_2 - 0.6).abs() < 0.01 * 0.6);
    // displayed waveform is the upsampled one
    assert_eq!(m.waveform.len(), 20 * LEN);
}

#[test]
fn velocity_and_attenuation_with_filtering() {
    let wf = two_echoes(115.0e-6, 1.0, 125.0e-6, 0.6).waveform().unwrap();
    let config = EngineConfig::default();
    let m = measure(&wf, &MeasurementParams::default(), &config).unwrap();

    // the filter delays both echoes equally
    let expected_velocity = 2.0 * config.path_length / 10.0e-6;
    let expected_attenuation = -(1.0_f64 / 0.6).ln() / (2.0 * config.path_length);
    assert!((m.result.velocity - expected_velocity).abs() < 3.0);
    assert!((m.result.attenuation - expected_attenuation).abs() < 0.5);
    assert!(m.result.arrival_time_1 > 115.0e-6);
}

#[test]
fn repeated_measurement_is_bit_identical() {
    let wf = two_echoes(115.0e-6, 1.0, 125.0e-6, 0.6)
        .with_noise(0.01, 11)
        .acquire(16)
        .unwrap()
        .waveform;
    let params = MeasurementParams::default();
    let config = EngineConfig::default();
    let a = measure(&wf, &params, &config).unwrap();
    let b = measure(&wf, &params, &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn silent_record_has_no_echo() {
    let wf = Waveform::from_sample_rate(vec![0.0; LEN], SAMPLE_RATE, 0.0).unwrap();
    let err = measure(&wf, &MeasurementParams::default(), &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::NoPeakFound { .. }));
}

#[test]
fn reversed_echoes_are_not_physical() {
    let first = EchoEvent {
        index: 10,
        arrival_time: 125.0e-6,
        amplitude: 1.0,
    };
    let second = EchoEvent {
        index: 20,
        arrival_time: 115.0e-6,
        amplitude: 0.5,
    };
    assert!(matches!(
        acoustic_properties(&first, &second, 0.015),
        Err(EngineError::InvalidMeasurement(_))
    ));
    assert!(matches!(
        acoustic_properties(&first, &first, 0.015),
        Err(EngineError::InvalidMeasurement(_))
    ));
}

#[test]
fn batch_preserves_input_order() {
    let params = MeasurementParams {
        filter: false,
        upsample: false,
        ..Default::default()
    };
    let waveforms: Vec<Waveform> = [9.0e-6, 10.0e-6, 10.5e-6]
        .iter()
        .map(|tof| {
            two_echoes(115.0e-6, 1.0, 115.0e-6 + tof, 0.5)
                .waveform()
                .unwrap()
        })
        .collect();
    let measurements = par_measure(&waveforms, &params, &EngineConfig::default()).unwrap();
    assert_eq!(measurements.len(), 3);
    assert!(measurements[0].result.velocity > measurements[1].result.velocity);
    assert!(measurements[1].result.velocity > measurements[2].result.velocity);
}

#[test]
fn batch_reports_failure() {
    let good = two_echoes(115.0e-6, 1.0, 125.0e-6, 0.6).waveform().unwrap();
    let silent = Waveform::from_sample_rate(vec![0.0; LEN], SAMPLE_RATE, 0.0).unwrap();
    let params = MeasurementParams {
        upsample: false,
        ..Default::default()
    };
    assert!(par_measure(&[good, silent], &params, &EngineConfig::default()).is_err());
}

#[test]
fn boxed_collaborators_record() {
    let mut source: Box<dyn WaveformSource> =
        Box::new(two_echoes(115.0e-6, 1.0, 125.0e-6, 0.6).with_auxiliary_voltage(1.25));
    let mut sensor: Box<dyn TemperatureSensor> = Box::new(TemperatureRamp::new(40.0, 0.0));
    let settings = RecordSettings {
        fluid: Some("S60".to_string()),
        ..Default::default()
    };
    let record = record_once(&mut source, &mut sensor, &settings).unwrap();
    assert_eq!(record.temperature, 40.0);
    assert_eq!(record.auxiliary_voltage, 1.25);
    assert_eq!(record.fluid, Some(fluid_properties(40.0, "S60").unwrap()));
    assert!((record.result.velocity - 3000.0).abs() < 3.0);
}

#[test]
fn cooling_sweep_end_to_end() {
    let plan = WorkerPlan {
        settings: RecordSettings {
            fluid: Some("S3S".to_string()),
            params: MeasurementParams {
                upsample: false,
                ..Default::default()
            },
            ..Default::default()
        },
        stop: StopCondition::BelowTemperature(35.0),
        pause: None,
    };
    let (handle, rx) = spawn_worker(
        two_echoes(115.0e-6, 1.0, 125.0e-6, 0.6),
        TemperatureRamp::new(40.0, -2.0),
        plan,
    );
    let records: Vec<_> = rx.iter().map(|r| r.unwrap()).collect();
    handle.join().unwrap();

    // 39, 35, 31
    assert_eq!(records.len(), 3);
    assert!(records.windows(2).all(|w| w[1].timestamp >= w[0].timestamp));
    let densities: Vec<f64> = records.iter().map(|r| r.fluid.unwrap().density).collect();
    assert!(densities.windows(2).all(|w| w[1] > w[0]));
}
