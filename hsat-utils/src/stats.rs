use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Descriptive statistics of a sample. All fields are `0.0` for an empty
/// sample; `std_dev` is the population standard deviation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            count: values.len(),
            mean: values.mean(),
            std_dev: values.population_std_dev(),
            min: Statistics::min(values),
            max: Statistics::max(values),
        }
    }
}

/// `part / whole` as a percentage, `0.0` when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Rounds to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
