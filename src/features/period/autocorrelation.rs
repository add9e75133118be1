//! FFT-accelerated autocorrelation
//!
//! Uses the identity `ACF = IFFT(|FFT(signal)|²)` with zero padding to at least
//! twice the signal length, so the result equals the linear (not circular)
//! autocorrelation `ACF[lag] = Σ x[i]·x[i + lag]`.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Autocorrelation at non-negative lags `0..signal.len()`
///
/// Unnormalized and unclipped: a centered signal yields negative values at
/// anti-correlated lags.
///
/// # Example
///
/// ```
/// use chordsketch::features::period::autocorrelation::autocorrelation;
///
/// let acf = autocorrelation(&[1.0, -1.0, 1.0, -1.0]);
/// assert!((acf[0] - 4.0).abs() < 1e-4);
/// assert!((acf[1] + 3.0).abs() < 1e-4);
/// ```
pub fn autocorrelation(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return vec![];
    }

    // FFT size: next power of 2 >= 2*n (for zero-padding)
    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    // |FFT|²
    for x in &mut buffer {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    // rustfft does not normalize the inverse transform
    let scale = 1.0 / (fft_size as f32);
    buffer[..n].iter().map(|x| x.re * scale).collect()
}
