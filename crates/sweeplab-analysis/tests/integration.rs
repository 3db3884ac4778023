//! Integration tests for sweeplab-analysis crate.
//!
//! Tests exercise sweep synthesis, sweep deconvolution and noise
//! deconvolution end to end, using synthetic systems with known impulse
//! responses.

use sweeplab_analysis::fft::{Fft, convolve};
use sweeplab_analysis::{
    AnalysisError, SweepParams, SweepSpectrum, SynthesizedSweep, WhiteNoise, deconvolve_noise,
    deconvolve_sweep, synthesize,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sweep used by the deconvolution tests: `N = 8192`, upper band edge close
/// to Nyquist so the band-limit ringing stays short.
fn test_sweep() -> SynthesizedSweep {
    SweepParams::new(0.512, 16000.0, 20.0, 7500.0)
        .synthesize()
        .unwrap()
}

/// Sparse 64-tap FIR standing in for the device under test.
fn test_system() -> Vec<f64> {
    let mut h = vec![0.0; 64];
    h[0] = 1.0;
    h[5] = -0.5;
    h[12] = 0.25;
    h[30] = 0.1;
    h
}

/// Error energy relative to the reference energy.
fn relative_error(estimate: &[f64], reference: &[f64]) -> f64 {
    let err: f64 = estimate
        .iter()
        .zip(reference)
        .map(|(e, r)| (e - r).powi(2))
        .sum();
    let energy: f64 = reference.iter().map(|r| r * r).sum();
    err / energy
}

/// Energy outside `[0.9·f1, 1.1·f2]` relative to the energy inside.
fn out_of_band_ratio(sweep: &SynthesizedSweep) -> f64 {
    let layout = &sweep.layout;
    let fft = Fft::new(layout.fft_size());
    let spectrum = fft.forward(&sweep.samples);
    let bin_hz = layout.sample_rate / layout.fft_size() as f64;

    let (mut inside, mut outside) = (0.0, 0.0);
    for (k, bin) in spectrum.iter().take(layout.num_samples + 1).enumerate() {
        let freq = k as f64 * bin_hz;
        if freq >= 0.9 * layout.start_freq && freq <= 1.1 * layout.end_freq {
            inside += bin.norm_sqr();
        } else {
            outside += bin.norm_sqr();
        }
    }
    outside / inside
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

// ===========================================================================
// 1. Synthesis
// ===========================================================================

#[test]
fn sweep_energy_stays_in_band() {
    let cases = [
        SweepParams::new(0.512, 16000.0, 50.0, 7000.0),
        SweepParams::new(0.512, 16000.0, 20.0, 7500.0),
        SweepParams::new(0.512, 16000.0, 100.0, 6000.0).with_spectrum(SweepSpectrum::LinearRamp),
    ];

    for params in cases {
        let sweep = params.synthesize().unwrap();
        let ratio = out_of_band_ratio(&sweep);
        assert!(ratio < 0.05, "{params:?}: out-of-band ratio {ratio}");
    }
}

#[test]
fn sweep_is_peak_normalized() {
    for (duration, rate, f1, f2) in [
        (0.25, 8000.0, 50.0, 3500.0),
        (1.0, 44100.0, 20.0, 20000.0),
        (0.3, 48000.0, 200.0, 2000.0),
    ] {
        let sweep = synthesize(&SweepParams::new(duration, rate, f1, f2)).unwrap();
        let peak = sweep.samples.iter().fold(0.0f64, |m, x| m.max(x.abs()));
        assert!((peak - 1.0).abs() < 1e-12, "peak {peak}");
        assert!(sweep.samples.iter().all(|x| x.is_finite()));
    }
}

#[test]
fn reference_sweep_rate() {
    let sweep = synthesize(&SweepParams::new(5.0, 44100.0, 20.0, 20000.0)).unwrap();
    let layout = sweep.layout;

    assert_eq!(sweep.samples.len(), 220_500);
    assert_eq!(sweep.inverse.len(), 441_000);

    let duration = layout.sweep_duration_secs();
    assert!(duration < 5.0, "sweep duration {duration}");
    assert!(duration > 4.5, "sweep duration {duration}");

    let expected = 1000.0f64.log2() / duration;
    assert!(
        (sweep.sweep_rate - expected).abs() < 1e-12,
        "rate {} vs {expected}",
        sweep.sweep_rate
    );
}

// ===========================================================================
// 2. Sweep deconvolution
// ===========================================================================

#[test]
fn self_deconvolution_is_an_impulse() {
    let sweep = test_sweep();
    let result = deconvolve_sweep(&sweep.samples, &sweep.inverse).unwrap();

    assert_eq!(result.linear.len(), sweep.samples.len());
    assert_eq!(result.nonlinear.len(), sweep.samples.len());

    let (index, peak) = result.linear_peak().unwrap();
    assert_eq!(index, 0);
    assert!(peak > 0.9, "linear peak {peak}");

    let total: f64 = result.linear.iter().map(|x| x * x).sum();
    let near: f64 = result.linear[..4].iter().map(|x| x * x).sum();
    assert!(near / total > 0.9, "concentration {}", near / total);

    let nonlinear_peak = result.nonlinear.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    assert!(
        nonlinear_peak * 10.0 < peak,
        "non-linear peak {nonlinear_peak} vs linear {peak}"
    );
}

#[test]
fn deconvolution_is_linear_and_time_invariant() {
    let sweep = test_sweep();
    let h = test_system();
    let n = sweep.samples.len();

    // Band-limited impulse seen through this sweep, with its negative lags
    let delta = deconvolve_sweep(&sweep.samples, &sweep.inverse).unwrap();
    let band_impulse = |lag: isize| -> f64 {
        if lag >= 0 {
            delta.linear[lag as usize]
        } else {
            delta.nonlinear[(n as isize + lag) as usize]
        }
    };

    let response = convolve(&sweep.samples, &h);
    let result = deconvolve_sweep(&response, &sweep.inverse).unwrap();

    for i in 0..h.len() {
        let expected: f64 = h
            .iter()
            .enumerate()
            .map(|(j, &tap)| tap * band_impulse(i as isize - j as isize))
            .sum();
        assert!(
            (result.linear[i] - expected).abs() < 1e-9,
            "sample {i}: {} vs {expected}",
            result.linear[i]
        );
    }

    // Taps stand out where the system has them
    for tap in [0, 5, 12, 30] {
        let got = result.linear[tap];
        assert!((got - h[tap]).abs() < 0.25 * h[tap].abs(), "tap {tap}: {got}");
    }
}

#[test]
fn harmonic_distortion_lands_before_lag_zero() {
    let sweep = test_sweep();
    let n = sweep.samples.len();
    let clean = deconvolve_sweep(&sweep.samples, &sweep.inverse).unwrap();
    // Lags within a few samples of the block end hold the band-limit ringing
    let region = n - 64;
    let clean_floor = clean.nonlinear[..region]
        .iter()
        .fold(0.0f64, |m, x| m.max(x.abs()));

    // Order k arrives sample_rate * log2(k) / sweep_rate samples early
    for power in [2, 3] {
        let order = f64::from(power);
        let response: Vec<f64> = sweep
            .samples
            .iter()
            .map(|&x| x + 0.2 * x.powi(power))
            .collect();
        let result = deconvolve_sweep(&response, &sweep.inverse).unwrap();
        assert_eq!(result.linear_peak().map(|(i, _)| i), Some(0), "order {order}");

        let (index, peak) = result.nonlinear[..region]
            .iter()
            .enumerate()
            .map(|(i, x)| (i, x.abs()))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        let expected = sweep.layout.sample_rate * order.log2() / sweep.sweep_rate;
        let offset = (n - index) as f64;
        assert!(
            (offset - expected).abs() < 0.01 * expected + 2.0,
            "order {order}: offset {offset} vs {expected}"
        );
        assert!(
            peak > 10.0 * clean_floor,
            "order {order}: peak {peak} vs clean {clean_floor}"
        );
    }
}

#[test]
fn longer_response_than_inverse_is_rejected() {
    let sweep = SweepParams::new(0.25, 8000.0, 50.0, 3500.0)
        .synthesize()
        .unwrap();
    let response = vec![0.0; sweep.inverse.len() + 1];
    let err = deconvolve_sweep(&response, &sweep.inverse).unwrap_err();
    assert!(matches!(err, AnalysisError::DimensionMismatch { .. }));
}

// ===========================================================================
// 3. Noise deconvolution
// ===========================================================================

#[test]
fn noise_deconvolution_round_trip() {
    let h = test_system();
    let x = sweeplab_analysis::white_noise(4096, 1.0, 99);
    let y = convolve(&x, &h);

    let ir = deconvolve_noise(&x, &y, x.len() + h.len() - 1).unwrap();
    assert_eq!(ir.len(), y.len());
    for (i, (&got, &want)) in ir.iter().zip(&h).enumerate() {
        assert!((got - want).abs() < 1e-9, "tap {i}: {got} vs {want}");
    }
}

#[test]
fn sweep_beats_noise_under_measurement_noise() {
    let sweep = test_sweep();
    let h = test_system();
    let sigma = 0.01;
    let mut rng = WhiteNoise::new(0x2545_F491);

    // Noise excitation, padded so the transform covers the full convolution
    let fft_size = 16384;
    let x = rng.take_scaled(fft_size - h.len() + 1, 1.0);
    let clean_x = convolve(&x, &h);
    let noisy_x = add(&clean_x, &rng.take_scaled(clean_x.len(), sigma));
    let noise_ir = deconvolve_noise(&x, &noisy_x, fft_size).unwrap();

    // Sweep excitation with the same measurement noise level
    let clean_s = convolve(&sweep.samples, &h);
    let noisy_s = add(&clean_s, &rng.take_scaled(clean_s.len(), sigma));
    let reference = deconvolve_sweep(&clean_s, &sweep.inverse).unwrap();
    let measured = deconvolve_sweep(&noisy_s, &sweep.inverse).unwrap();

    let sweep_err = relative_error(&measured.linear[..h.len()], &reference.linear[..h.len()]);
    let noise_err = relative_error(&noise_ir[..h.len()], &h);

    assert!(
        sweep_err * 2.0 < noise_err,
        "sweep error {sweep_err:e} vs noise error {noise_err:e}"
    );
}

// ===========================================================================
// 4. Error scenarios
// ===========================================================================

#[test]
fn negative_duration_is_invalid() {
    let err = synthesize(&SweepParams::new(-1.0, 44100.0, 20.0, 20000.0)).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidParameter { .. }), "{err}");
}

#[test]
fn inverted_band_is_invalid() {
    let err = synthesize(&SweepParams::new(5.0, 44100.0, 20000.0, 20.0)).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidParameter { .. }), "{err}");
}

#[test]
fn zero_excitation_bin_is_flagged() {
    // Period-4 excitation: only DC and the quarter-rate bins are non-zero
    let excitation: Vec<f64> = (0..64).map(|i| [1.0, 0.0, 0.0, 0.0][i % 4]).collect();
    let response = convolve(&excitation, &[1.0, 0.5]);

    let err = deconvolve_noise(&excitation, &response[..64], 64).unwrap_err();
    match err {
        AnalysisError::NumericalInstability { reason } => {
            assert!(reason.contains("bin 1 "), "{reason}");
        }
        other => panic!("expected NumericalInstability, got {other:?}"),
    }
}
