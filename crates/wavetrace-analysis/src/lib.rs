//! Wavetrace Analysis - FFT-based waveform tools
//!
//! Builds on the record layout of [`wavetrace_core`] with spectral kernels:
//!
//! - [`fft`] - Cached FFT plans, paired real/imaginary transforms, per-record FFT
//! - [`xcorr`] - Circular cross-correlation and peak-lag folding
//! - [`align`](mod@align) - Rotate records into alignment with a seed waveform
//! - [`hilbert`] - Hilbert transform and analytic-signal envelope
//! - [`spectrum`] - Power spectra and the spectral maximum of each record
//!
//! Every transform pads records to the next power of two and truncates the
//! result back, so any record length is accepted except where a transform is
//! applied to the record itself ([`fft::fft_records`]).
//!
//! ## Example Workflow
//!
//! ```rust
//! use wavetrace_analysis::{align, envelope};
//!
//! // Two pulse-echo records, the second one sample late
//! let seed = [0.0, 1.0, 4.0, -3.0, 1.0, 0.0, 0.0, 0.0];
//! let mut data = vec![0.0, 1.0, 4.0, -3.0, 1.0, 0.0, 0.0, 0.0,
//!                     0.0, 0.0, 1.0, 4.0, -3.0, 1.0, 0.0, 0.0];
//!
//! let lags = align(&mut data, 8, &seed, 1..5).unwrap();
//! assert_eq!(lags, vec![0, -1]);
//!
//! envelope(&mut data, 8, true).unwrap();
//! assert_eq!(data[..8], data[8..]);
//! ```

pub mod align;
pub mod fft;
pub mod hilbert;
pub mod spectrum;
pub mod xcorr;

pub use align::align;
pub use fft::{Fft, FftDirection, amount_to_pad, fft_forward, fft_inverse, fft_records};
pub use hilbert::{HilbertDirection, HilbertTransform, envelope, hilbert_transform};
pub use spectrum::{power_spectrum, spectral_maximum};
pub use xcorr::{peak_lag, xcorr_direct, xcorr_fft};
