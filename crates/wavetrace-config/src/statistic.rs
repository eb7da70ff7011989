//! Per-record statistics, selectable by name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wavetrace_analysis::spectral_maximum;
use wavetrace_core::{Interpolation, Window, reducers, zero_crossing_locations};

use crate::error::ConfigError;
use crate::params::ParamReader;

/// A reduction of each record (or of the whole buffer) to numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stat", rename_all = "snake_case")]
pub enum Statistic {
    /// Record mean.
    Mean,
    /// Record median.
    Median,
    /// Smallest sample.
    Min,
    /// Largest sample.
    Max,
    /// `max - min`.
    Range,
    /// Index of the first largest sample.
    MaxIndex,
    /// Sum of squared samples.
    SumOfSquares,
    /// Number of sign changes.
    ZeroCrossingCount,
    /// Excess kurtosis.
    Kurtosis,
    /// Skewness.
    Skewness {
        /// Plain sample skewness `g1` instead of the bias-adjusted `G1`.
        #[serde(default)]
        sample: bool,
    },
    /// Frequency of the strongest spectral component.
    SpectralMaximum {
        /// Sample period.
        delta_t: f64,
        /// Taper applied before the transform.
        #[serde(default)]
        window: Window,
    },
    /// Sub-sample positions of every zero crossing.
    ZeroCrossingLocations {
        /// Interpolation between samples.
        #[serde(default)]
        interpolation: Interpolation,
    },
    /// Sample-wise average over all records.
    AverageRecord,
}

impl Statistic {
    /// Statistic names with a one-line description, as accepted by [`Statistic::from_params`].
    pub const CATALOG: &'static [(&'static str, &'static str)] = &[
        ("mean", "record mean"),
        ("median", "record median"),
        ("min", "smallest sample"),
        ("max", "largest sample"),
        ("range", "max - min"),
        ("max_index", "index of the first largest sample"),
        ("sum_of_squares", "sum of squared samples"),
        ("zero_crossing_count", "number of sign changes"),
        ("kurtosis", "excess kurtosis"),
        ("skewness", "skewness (sample)"),
        ("spectral_maximum", "peak frequency (delta_t, window, window_param)"),
        ("zero_crossing_locations", "crossing positions (interpolation=linear|cubic_spline)"),
        ("average_record", "sample-wise average of all records"),
    ];

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Range => "range",
            Statistic::MaxIndex => "max_index",
            Statistic::SumOfSquares => "sum_of_squares",
            Statistic::ZeroCrossingCount => "zero_crossing_count",
            Statistic::Kurtosis => "kurtosis",
            Statistic::Skewness { .. } => "skewness",
            Statistic::SpectralMaximum { .. } => "spectral_maximum",
            Statistic::ZeroCrossingLocations { .. } => "zero_crossing_locations",
            Statistic::AverageRecord => "average_record",
        }
    }

    /// Builds a statistic from its name and `key=value` parameters.
    pub fn from_params(name: &str, params: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut p = ParamReader::new(name, params);
        let stat = match name {
            "mean" => Statistic::Mean,
            "median" => Statistic::Median,
            "min" => Statistic::Min,
            "max" => Statistic::Max,
            "range" => Statistic::Range,
            "max_index" => Statistic::MaxIndex,
            "sum_of_squares" => Statistic::SumOfSquares,
            "zero_crossing_count" => Statistic::ZeroCrossingCount,
            "kurtosis" => Statistic::Kurtosis,
            "skewness" => Statistic::Skewness {
                sample: p.bool_or("sample", false)?,
            },
            "spectral_maximum" => Statistic::SpectralMaximum {
                delta_t: p.f64_or("delta_t", 1.0)?,
                window: p.window_or(Window::Rectangle)?,
            },
            "zero_crossing_locations" => Statistic::ZeroCrossingLocations {
                interpolation: match p.str("interpolation") {
                    None | Some("linear") => Interpolation::Linear,
                    Some("cubic_spline" | "spline") => Interpolation::CubicSpline,
                    Some(other) => {
                        return Err(ConfigError::invalid_parameter(
                            name,
                            "interpolation",
                            format!("'{other}' is not linear or cubic_spline"),
                        ));
                    }
                },
            },
            "average_record" => Statistic::AverageRecord,
            _ => return Err(ConfigError::UnknownStatistic(name.to_string())),
        };
        p.finish()?;
        Ok(stat)
    }

    /// Whether [`compute`](Self::compute) yields one row per record.
    ///
    /// [`Statistic::AverageRecord`] yields a single row for the whole buffer.
    pub fn per_record(&self) -> bool {
        !matches!(self, Statistic::AverageRecord)
    }

    /// Evaluates the statistic.
    ///
    /// Rows hold one value per record for scalar statistics, the crossing
    /// positions for [`Statistic::ZeroCrossingLocations`], and a single
    /// averaged record for [`Statistic::AverageRecord`].
    ///
    /// # Example
    /// ```rust
    /// use wavetrace_config::Statistic;
    ///
    /// let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    /// assert_eq!(Statistic::Mean.compute(&data, 4).unwrap(), vec![vec![2.5], vec![6.5]]);
    /// assert_eq!(
    ///     Statistic::AverageRecord.compute(&data, 4).unwrap(),
    ///     vec![vec![3.0, 4.0, 5.0, 6.0]]
    /// );
    /// ```
    pub fn compute(&self, buffer: &[f64], record_length: usize) -> Result<Vec<Vec<f64>>, ConfigError> {
        let scalars = match self {
            Statistic::Mean => reducers::mean(buffer, record_length)?,
            Statistic::Median => reducers::median(buffer, record_length)?,
            Statistic::Min => reducers::min(buffer, record_length)?,
            Statistic::Max => reducers::max(buffer, record_length)?,
            Statistic::Range => reducers::range(buffer, record_length)?,
            Statistic::MaxIndex => counts(reducers::max_index(buffer, record_length)?),
            Statistic::SumOfSquares => reducers::sum_of_squares(buffer, record_length)?,
            Statistic::ZeroCrossingCount => {
                counts(reducers::zero_crossing_count(buffer, record_length)?)
            }
            Statistic::Kurtosis => reducers::kurtosis(buffer, record_length)?,
            Statistic::Skewness { sample } => reducers::skewness(buffer, record_length, *sample)?,
            Statistic::SpectralMaximum { delta_t, window } => {
                spectral_maximum(buffer, record_length, *delta_t, *window)?
            }
            Statistic::ZeroCrossingLocations { interpolation } => {
                return Ok(zero_crossing_locations(buffer, record_length, *interpolation)?
                    .into_iter()
                    .map(|record| record.iter().map(|c| c.position()).collect())
                    .collect());
            }
            Statistic::AverageRecord => {
                return Ok(vec![reducers::average_records(buffer, record_length)?]);
            }
        };
        Ok(scalars.into_iter().map(|v| vec![v]).collect())
    }
}

fn counts(values: Vec<usize>) -> Vec<f64> {
    values.into_iter().map(|v| v as f64).collect()
}
