//! Group delay to phase integration

use std::f64::consts::PI;

/// Integrate a group delay curve into a phase curve
///
/// Group delay is the negative derivative of phase with respect to angular
/// frequency, so the phase is the negative running sum of the delay scaled
/// by the bin spacing `2π/M` (`M` = number of bins):
///
/// ```text
/// phase[k] = -(2π/M) * Σ_{j <= k} group_delay[j]
/// ```
///
/// # Arguments
/// * `group_delay` - Delay per bin on a uniform frequency grid
///
/// # Returns
/// Phase in radians, same length as the input
pub fn integrate_group_delay(group_delay: &[f64]) -> Vec<f64> {
    let scale = 2.0 * PI / group_delay.len() as f64;
    let mut acc = 0.0;
    group_delay
        .iter()
        .map(|&gd| {
            acc += gd;
            -acc * scale
        })
        .collect()
}
