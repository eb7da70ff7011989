//! In-place operations a pipeline can run, with their parameters.
//!
//! Every variant maps onto one kernel of `wavetrace-core` or
//! `wavetrace-analysis`. In a pipeline file the variant is selected by the
//! `op` key:
//!
//! ```toml
//! [[operations]]
//! op = "moving_average"
//! radius = 8
//! window = { type = "tukey", alpha = 0.5 }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wavetrace_analysis::{HilbertDirection, align, envelope, hilbert_transform};
use wavetrace_core::spline::check_smoothing_parameters;
use wavetrace_core::{
    BandLimitedPower, Baseline, CombineOp, MIN_SPLINE_KNOTS, RecordLayout, WaveformError, Window,
    band_limited_power, binomial_filter, combine, repair_clipped, sliding, smooth_with_spline,
    subtract_baseline,
};

use crate::error::ConfigError;
use crate::params::ParamReader;

/// An auxiliary waveform: a record of the buffer being processed, or explicit values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    /// Copy of the record at this index, taken before the operation runs.
    Record(usize),
    /// Literal samples; must hold one value per sample of a record.
    Values(Vec<f64>),
}

impl Default for Reference {
    fn default() -> Self {
        Reference::Record(0)
    }
}

impl Reference {
    /// Parses `3` as a record index and `0.1,0.5,...` as literal values.
    pub fn parse(text: &str) -> Option<Self> {
        if text.contains(',') {
            text.split(',')
                .map(|v| v.trim().parse::<f64>().ok())
                .collect::<Option<Vec<_>>>()
                .map(Reference::Values)
        } else {
            text.trim().parse().ok().map(Reference::Record)
        }
    }

    fn check(&self, record_length: usize, what: &'static str) -> Result<(), WaveformError> {
        match self {
            Reference::Values(values) if values.len() != record_length => {
                Err(WaveformError::LengthMismatch {
                    what,
                    expected: record_length,
                    actual: values.len(),
                })
            }
            _ => Ok(()),
        }
    }

    fn resolve(
        &self,
        op: &str,
        buffer: &[f64],
        layout: RecordLayout,
    ) -> Result<Vec<f64>, ConfigError> {
        match self {
            Reference::Values(values) => Ok(values.clone()),
            Reference::Record(index) if *index < layout.num_records() => {
                Ok(buffer[layout.record_range(*index)].to_vec())
            }
            Reference::Record(index) => Err(ConfigError::invalid_parameter(
                op,
                "reference",
                format!(
                    "record {index} does not exist ({} records)",
                    layout.num_records()
                ),
            )),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f64 {
    1.0
}

/// One in-place step of a [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Remove each record's mean, median, or least-squares line.
    SubtractBaseline {
        /// Baseline estimate.
        #[serde(default)]
        baseline: Baseline,
    },
    /// Combine every record element-wise with a reference waveform.
    Combine {
        /// Element-wise operation.
        operation: CombineOp,
        /// Right-hand operand.
        #[serde(default)]
        reference: Reference,
    },
    /// Repeated `[1, 2, 1] / 4` smoothing.
    BinomialFilter {
        /// Number of passes.
        passes: usize,
    },
    /// Weighted moving average.
    MovingAverage {
        /// Window radius in samples.
        radius: usize,
        /// Taper of the window.
        #[serde(default)]
        window: Window,
    },
    /// Weighted moving sum of squares.
    MovingPower {
        /// Window radius in samples.
        radius: usize,
        /// Taper of the window.
        #[serde(default)]
        window: Window,
        /// Write `log10` of the sum.
        #[serde(default)]
        log_output: bool,
    },
    /// Moving variance.
    MovingVariance {
        /// Window radius in samples.
        radius: usize,
        /// Divide by `2r` rather than `2r + 1`.
        #[serde(default = "default_true")]
        unbiased: bool,
    },
    /// Moving median.
    MovingMedian {
        /// Window radius in samples.
        radius: usize,
    },
    /// Moving `max - min`.
    MovingRange {
        /// Window radius in samples.
        radius: usize,
    },
    /// Moving count of sign changes.
    MovingZeroCrossings {
        /// Window radius in samples.
        radius: usize,
    },
    /// Moving-window DFT power over a bin range, in dB.
    BandLimitedPower(BandLimitedPower),
    /// Band-limited power with the band given in physical units.
    ///
    /// Bins and radius are resolved against the record length when the
    /// operation runs (see [`BandLimitedPower::from_physical`]).
    BandLimitedPowerPhysical {
        /// Sample period.
        delta_t: f64,
        /// Lower band edge, in the reciprocal unit of `delta_t`.
        lo_freq: f64,
        /// Upper band edge.
        hi_freq: f64,
        /// Full window length, in the unit of `delta_t`.
        window_time: f64,
        /// Taper of the window.
        #[serde(default)]
        window: Window,
    },
    /// Replace samples with `|x| >= threshold` from a spline through the rest.
    RepairClipped {
        /// Clipping level.
        threshold: f64,
    },
    /// Reinsch smoothing spline.
    SmoothWithSpline {
        /// Residual bound.
        smoothing: f64,
        /// Per-sample noise estimate.
        stdev: f64,
    },
    /// Rotate records into alignment with a seed waveform.
    Align {
        /// Seed waveform.
        #[serde(default)]
        seed: Reference,
        /// First sample of the seed segment.
        from: usize,
        /// One past the last sample of the seed segment.
        to: usize,
    },
    /// Hilbert transform.
    Hilbert {
        /// Sign of the spectral multiplier.
        #[serde(default)]
        direction: HilbertDirection,
    },
    /// Analytic-signal envelope.
    Envelope {
        /// Remove each record's mean first.
        #[serde(default)]
        subtract_mean: bool,
    },
    /// `scale * log10(x)`; `scale = 20` turns an amplitude into dB.
    Log10 {
        /// Multiplier applied after the logarithm.
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

impl Operation {
    /// Operation names with a one-line description, as accepted by [`Operation::from_params`].
    pub const CATALOG: &'static [(&'static str, &'static str)] = &[
        ("subtract_baseline", "remove mean, median, or linear fit (baseline=mean|median|linear_fit)"),
        ("combine", "element-wise add/subtract/multiply/divide with a reference (operation, reference)"),
        ("binomial_filter", "repeated [1,2,1]/4 smoothing (passes)"),
        ("moving_average", "weighted moving average (radius, window, window_param)"),
        ("moving_power", "weighted moving sum of squares (radius, window, window_param, log_output)"),
        ("moving_variance", "moving variance (radius, unbiased)"),
        ("moving_median", "moving median (radius)"),
        ("moving_range", "moving max - min (radius)"),
        ("moving_zero_crossings", "moving sign-change count (radius)"),
        ("band_limited_power", "moving-window band power in dB (radius, lo_bin, hi_bin | delta_t, lo_freq, hi_freq, window_time; window)"),
        ("band_limited_power_physical", "band power with the band in physical units (delta_t, lo_freq, hi_freq, window_time, window)"),
        ("repair_clipped", "spline repair of clipped samples (threshold)"),
        ("smooth_with_spline", "Reinsch smoothing spline (smoothing, stdev)"),
        ("align", "rotate records onto a seed segment (seed, from, to)"),
        ("hilbert", "Hilbert transform (direction=forward|inverse)"),
        ("envelope", "analytic-signal envelope (subtract_mean)"),
        ("log10", "scale * log10(x) (scale)"),
    ];

    /// Name used in pipeline files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SubtractBaseline { .. } => "subtract_baseline",
            Operation::Combine { .. } => "combine",
            Operation::BinomialFilter { .. } => "binomial_filter",
            Operation::MovingAverage { .. } => "moving_average",
            Operation::MovingPower { .. } => "moving_power",
            Operation::MovingVariance { .. } => "moving_variance",
            Operation::MovingMedian { .. } => "moving_median",
            Operation::MovingRange { .. } => "moving_range",
            Operation::MovingZeroCrossings { .. } => "moving_zero_crossings",
            Operation::BandLimitedPower(_) => "band_limited_power",
            Operation::BandLimitedPowerPhysical { .. } => "band_limited_power_physical",
            Operation::RepairClipped { .. } => "repair_clipped",
            Operation::SmoothWithSpline { .. } => "smooth_with_spline",
            Operation::Align { .. } => "align",
            Operation::Hilbert { .. } => "hilbert",
            Operation::Envelope { .. } => "envelope",
            Operation::Log10 { .. } => "log10",
        }
    }

    /// Builds an operation from its name and `key=value` parameters.
    ///
    /// # Example
    /// ```rust
    /// use std::collections::HashMap;
    /// use wavetrace_config::Operation;
    /// use wavetrace_core::Window;
    ///
    /// let params = HashMap::from([
    ///     ("radius".to_string(), "3".to_string()),
    ///     ("window".to_string(), "hanning".to_string()),
    /// ]);
    /// let op = Operation::from_params("moving_average", &params).unwrap();
    /// assert_eq!(op, Operation::MovingAverage { radius: 3, window: Window::Hanning });
    /// ```
    pub fn from_params(name: &str, params: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut p = ParamReader::new(name, params);
        let op = match name {
            "subtract_baseline" => Operation::SubtractBaseline {
                baseline: match p.str("baseline") {
                    None | Some("mean") => Baseline::Mean,
                    Some("median") => Baseline::Median,
                    Some("linear_fit" | "linear") => Baseline::LinearFit,
                    Some(other) => {
                        return Err(ConfigError::invalid_parameter(
                            name,
                            "baseline",
                            format!("'{other}' is not mean, median, or linear_fit"),
                        ));
                    }
                },
            },
            "combine" => Operation::Combine {
                operation: match p.str("operation") {
                    Some("add") => CombineOp::Add,
                    Some("subtract") => CombineOp::Subtract,
                    Some("multiply") => CombineOp::Multiply,
                    Some("divide") => CombineOp::Divide,
                    _ => {
                        return Err(ConfigError::invalid_parameter(
                            name,
                            "operation",
                            "expected add, subtract, multiply, or divide",
                        ));
                    }
                },
                reference: reference(name, "reference", p.str("reference"))?,
            },
            "binomial_filter" => Operation::BinomialFilter {
                passes: p.usize("passes")?,
            },
            "moving_average" => Operation::MovingAverage {
                radius: p.usize("radius")?,
                window: p.window_or(Window::Rectangle)?,
            },
            "moving_power" => Operation::MovingPower {
                radius: p.usize("radius")?,
                window: p.window_or(Window::Rectangle)?,
                log_output: p.bool_or("log_output", false)?,
            },
            "moving_variance" => Operation::MovingVariance {
                radius: p.usize("radius")?,
                unbiased: p.bool_or("unbiased", true)?,
            },
            "moving_median" => Operation::MovingMedian {
                radius: p.usize("radius")?,
            },
            "moving_range" => Operation::MovingRange {
                radius: p.usize("radius")?,
            },
            "moving_zero_crossings" => Operation::MovingZeroCrossings {
                radius: p.usize("radius")?,
            },
            "band_limited_power" | "band_limited_power_physical"
                if name.ends_with("_physical") || params.contains_key("delta_t") =>
            {
                Operation::BandLimitedPowerPhysical {
                    delta_t: p.f64("delta_t")?,
                    lo_freq: p.f64("lo_freq")?,
                    hi_freq: p.f64("hi_freq")?,
                    window_time: p.f64("window_time")?,
                    window: p.window_or(Window::Rectangle)?,
                }
            }
            "band_limited_power" => Operation::BandLimitedPower(BandLimitedPower {
                radius: p.usize("radius")?,
                window: p.window_or(Window::Rectangle)?,
                lo_bin: p.usize("lo_bin")?,
                hi_bin: p.usize("hi_bin")?,
            }),
            "repair_clipped" => Operation::RepairClipped {
                threshold: p.f64("threshold")?,
            },
            "smooth_with_spline" => Operation::SmoothWithSpline {
                smoothing: p.f64("smoothing")?,
                stdev: p.f64_or("stdev", 1.0)?,
            },
            "align" => Operation::Align {
                seed: reference(name, "seed", p.str("seed"))?,
                from: p.usize("from")?,
                to: p.usize("to")?,
            },
            "hilbert" => Operation::Hilbert {
                direction: match p.str("direction") {
                    None | Some("forward") => HilbertDirection::Forward,
                    Some("inverse") => HilbertDirection::Inverse,
                    Some(other) => {
                        return Err(ConfigError::invalid_parameter(
                            name,
                            "direction",
                            format!("'{other}' is not forward or inverse"),
                        ));
                    }
                },
            },
            "envelope" => Operation::Envelope {
                subtract_mean: p.bool_or("subtract_mean", false)?,
            },
            "log10" => Operation::Log10 {
                scale: p.f64_or("scale", 1.0)?,
            },
            _ => return Err(ConfigError::UnknownOperation(name.to_string())),
        };
        p.finish()?;
        Ok(op)
    }

    /// Checks the parameters against a record length without touching data.
    ///
    /// Record indices in a [`Reference`] depend on the buffer and are checked
    /// when the operation runs.
    pub fn validate(&self, record_length: usize) -> Result<(), WaveformError> {
        let layout = RecordLayout::new(record_length, record_length)?;
        match self {
            Operation::SubtractBaseline { .. }
            | Operation::Hilbert { .. }
            | Operation::Envelope { .. } => {}
            Operation::Combine { reference, .. } => reference.check(record_length, "reference")?,
            Operation::BinomialFilter { .. } => {
                layout.require_min_length("binomial filter", 3)?;
            }
            Operation::MovingAverage { radius, window }
            | Operation::MovingPower { radius, window, .. } => {
                layout.require_radius(*radius)?;
                window.validate()?;
            }
            Operation::MovingVariance { radius, .. }
            | Operation::MovingMedian { radius }
            | Operation::MovingRange { radius }
            | Operation::MovingZeroCrossings { radius } => {
                layout.require_radius(*radius)?;
            }
            Operation::BandLimitedPower(band) => {
                layout.require_radius(band.radius)?;
                band.validate(record_length)?;
            }
            Operation::BandLimitedPowerPhysical { .. } => {
                let band = self.physical_band(record_length)?;
                layout.require_radius(band.radius)?;
            }
            Operation::RepairClipped { threshold } => {
                layout.require_min_length("clip repair", MIN_SPLINE_KNOTS)?;
                if !(threshold.is_finite() && *threshold >= 0.0) {
                    return Err(WaveformError::invalid_parameter(
                        "threshold",
                        "must be finite and non-negative",
                    ));
                }
            }
            Operation::SmoothWithSpline { smoothing, stdev } => {
                layout.require_min_length("spline smoothing", MIN_SPLINE_KNOTS)?;
                check_smoothing_parameters(*stdev, 1.0, *smoothing)?;
            }
            Operation::Align { seed, from, to } => {
                seed.check(record_length, "seed waveform")?;
                if from >= to || *to > record_length {
                    return Err(WaveformError::invalid_parameter(
                        "range",
                        format!("{from}..{to} must be non-empty and within 0..{record_length}"),
                    ));
                }
            }
            Operation::Log10 { scale } => {
                if !scale.is_finite() {
                    return Err(WaveformError::invalid_parameter("scale", "must be finite"));
                }
            }
        }
        Ok(())
    }

    fn physical_band(&self, record_length: usize) -> Result<BandLimitedPower, WaveformError> {
        match *self {
            Operation::BandLimitedPowerPhysical {
                delta_t,
                lo_freq,
                hi_freq,
                window_time,
                window,
            } => BandLimitedPower::from_physical(
                delta_t,
                lo_freq,
                hi_freq,
                window_time,
                record_length,
                window,
            ),
            Operation::BandLimitedPower(band) => Ok(band),
            _ => Err(WaveformError::invalid_parameter(
                "band",
                "operation has no frequency band",
            )),
        }
    }

    /// Runs the operation on every record of `buffer`.
    pub fn apply(&self, buffer: &mut [f64], record_length: usize) -> Result<(), ConfigError> {
        self.apply_with_abort(buffer, record_length, || false)
    }

    /// Runs the operation, polling `abort` between records where the kernel supports it.
    pub fn apply_with_abort(
        &self,
        buffer: &mut [f64],
        record_length: usize,
        abort: impl FnMut() -> bool,
    ) -> Result<(), ConfigError> {
        match self {
            Operation::SubtractBaseline { baseline } => {
                subtract_baseline(buffer, record_length, *baseline)?;
            }
            Operation::Combine {
                operation,
                reference,
            } => {
                let layout = RecordLayout::of(buffer, record_length)?;
                let reference = reference.resolve(self.name(), buffer, layout)?;
                combine(buffer, record_length, &reference, *operation)?;
            }
            Operation::BinomialFilter { passes } => {
                binomial_filter(buffer, record_length, *passes)?;
            }
            Operation::MovingAverage { radius, window } => {
                sliding::weighted_average(buffer, record_length, *radius, *window)?;
            }
            Operation::MovingPower {
                radius,
                window,
                log_output,
            } => {
                sliding::sum_of_squares(buffer, record_length, *radius, *window, *log_output)?;
            }
            Operation::MovingVariance { radius, unbiased } => {
                sliding::variance(buffer, record_length, *radius, *unbiased)?;
            }
            Operation::MovingMedian { radius } => {
                sliding::median(buffer, record_length, *radius)?;
            }
            Operation::MovingRange { radius } => {
                sliding::range(buffer, record_length, *radius)?;
            }
            Operation::MovingZeroCrossings { radius } => {
                sliding::zero_crossing_count(buffer, record_length, *radius)?;
            }
            Operation::BandLimitedPower(_) | Operation::BandLimitedPowerPhysical { .. } => {
                let band = self.physical_band(record_length)?;
                band_limited_power(buffer, record_length, &band, abort)?;
            }
            Operation::RepairClipped { threshold } => {
                repair_clipped(buffer, record_length, *threshold)?;
            }
            Operation::SmoothWithSpline { smoothing, stdev } => {
                smooth_with_spline(buffer, record_length, *smoothing, *stdev)?;
            }
            Operation::Align { seed, from, to } => {
                let layout = RecordLayout::of(buffer, record_length)?;
                let seed = seed.resolve(self.name(), buffer, layout)?;
                let _lags = align(buffer, record_length, &seed, *from..*to)?;
                #[cfg(feature = "tracing")]
                tracing::debug!("align: lags {:?}", _lags);
            }
            Operation::Hilbert { direction } => {
                hilbert_transform(buffer, record_length, *direction)?;
            }
            Operation::Envelope { subtract_mean } => {
                envelope(buffer, record_length, *subtract_mean)?;
            }
            Operation::Log10 { scale } => {
                self.validate(record_length)?;
                RecordLayout::of(buffer, record_length)?;
                for x in buffer.iter_mut() {
                    *x = scale * x.log10();
                }
            }
        }
        Ok(())
    }
}

fn reference(op: &str, key: &str, text: Option<&str>) -> Result<Reference, ConfigError> {
    match text {
        None => Ok(Reference::default()),
        Some(text) => Reference::parse(text).ok_or_else(|| {
            ConfigError::invalid_parameter(
                op,
                key,
                format!("'{text}' is neither a record index nor a comma-separated list"),
            )
        }),
    }
}
