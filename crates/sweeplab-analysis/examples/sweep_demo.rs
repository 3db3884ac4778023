//! Sweep demo: measure a simulated distorting device with an exponential sweep.
//!
//! Run with: cargo run -p sweeplab-analysis --example sweep_demo

use sweeplab_analysis::channel::{ChannelParams, channel_response};
use sweeplab_analysis::compare::{best_shift, normalize_rms, windowed_alignment};
use sweeplab_analysis::fft::convolve;
use sweeplab_analysis::{SweepParams, deconvolve_noise, deconvolve_sweep, white_noise};

/// Device under test: a short resonant IR followed by a soft clipper.
fn device(input: &[f64]) -> Vec<f64> {
    let ir: Vec<f64> = (0..256)
        .map(|i| (-(i as f64) / 40.0).exp() * (i as f64 * 0.3).cos())
        .collect();
    convolve(input, &ir)
        .iter()
        .map(|x| (0.4 * x).tanh() / 0.4)
        .collect()
}

fn main() {
    let sample_rate = 48000.0;

    // --- Sweep synthesis ---
    println!("=== Exponential Sine Sweep ===\n");

    let sweep = SweepParams::new(2.0, sample_rate, 20.0, 20000.0)
        .with_tail(4800)
        .synthesize()
        .expect("valid sweep parameters");
    let layout = sweep.layout;

    println!("Samples:        {}", layout.num_samples);
    println!("Fade-in:        {} samples", layout.start_delay);
    println!("Swept region:   {} samples", layout.sweep_samples);
    println!("Fade-out:       {} samples", layout.fade_out);
    println!("Sweep rate:     {:.3} octaves/s", sweep.sweep_rate);

    // --- Deconvolution ---
    println!("\n=== Deconvolution ===\n");

    let recording = device(&sweep.samples);
    let result = deconvolve_sweep(&recording[..layout.num_samples], &sweep.inverse)
        .expect("recording fits the inverse spectrum");

    let (index, peak) = result.linear_peak().unwrap_or((0, 0.0));
    let nonlinear_peak = result
        .nonlinear
        .iter()
        .fold(0.0f64, |m, x| m.max(x.abs()));
    println!("Linear IR peak:      {peak:.4} at sample {index}");
    println!(
        "Non-linear peak:     {nonlinear_peak:.4} ({:.1} dB below linear)",
        20.0 * (peak.abs() / nonlinear_peak).log10()
    );

    // --- Noise excitation for comparison ---
    println!("\n=== White Noise Excitation ===\n");

    let noise = white_noise(layout.num_samples, 0.5, 42);
    let noise_recording = device(&noise);
    match deconvolve_noise(&noise, &noise_recording, noise_recording.len()) {
        Ok(ir) => {
            let peak = ir.iter().fold(0.0f64, |m, x| m.max(x.abs()));
            println!("Noise IR peak:       {peak:.4}");
        }
        Err(e) => println!("Noise deconvolution failed: {e}"),
    }

    // --- Validation ---
    println!("\n=== Re-synthesis Check ===\n");

    // RMS of 0.1
    let source = normalize_rms(&white_noise(sample_rate as usize, 1.0, 7), -10.0);
    let measured = device(&source);
    let reconstructed = convolve(&source, &result.linear[..4096]);

    match best_shift(&reconstructed, &measured[..source.len()], 50) {
        Some(found) => println!(
            "Best alignment: shift {} samples, NMSE {:.1} dB",
            found.shift, found.nmse_db
        ),
        None => println!("Signals too short to align"),
    }

    match windowed_alignment(&reconstructed, &measured[..source.len()], 12000, 200) {
        Some(alignment) => {
            for (w, found) in alignment.matches.iter().enumerate() {
                if let Some(found) = found {
                    println!("  window {w}: shift {:4}, NMSE {:.1} dB", found.shift, found.nmse_db);
                }
            }
            println!("Drift:          {:.2} samples per window", alignment.slope);
        }
        None => println!("Signals too short for windowed alignment"),
    }

    // --- Channel response ---
    println!("\n=== Channel Response ===\n");

    let params = ChannelParams::new(sample_rate).with_segments(0.5, 0.05);
    match channel_response(&measured, &params) {
        Ok(response) => {
            for window in &response.windows {
                let known = window.levels_db.iter().flatten().count();
                println!(
                    "  window at {:6}: {known}/{} bins under {:.0} dB",
                    window.start,
                    window.levels_db.len(),
                    params.threshold_db
                );
            }
        }
        Err(e) => println!("Channel response failed: {e}"),
    }
}
