//! Common error statistics for comparing predictions with actuals
//!
//! Every function takes caller-owned slices, validates their shape and
//! returns a scalar. Undefined statistics (zero variance, zero weights) are
//! reported as [`SsError::DegenerateData`] instead of leaking NaN or inf.

use serde::{Deserialize, Serialize};

use crate::{Result, SsError};

/// Validate that two series are non-empty, equally long and finite
fn check_pair(predictions: &[f64], actuals: &[f64]) -> Result<()> {
    if predictions.len() != actuals.len() {
        return Err(SsError::InvalidInput(format!(
            "predictions has {} values but actuals has {}",
            predictions.len(),
            actuals.len()
        )));
    }
    if actuals.is_empty() {
        return Err(SsError::InvalidInput("series are empty".to_string()));
    }
    check_finite("predictions", predictions)?;
    check_finite("actuals", actuals)
}

fn check_finite(name: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(SsError::InvalidInput(format!(
            "{} contains a non-finite value at index {}",
            name, idx
        ))),
        None => Ok(()),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Reject intermediate sums that overflowed on very large inputs
fn check_sum(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SsError::InvalidInput(format!(
            "{} overflows, values are too large to compare",
            name
        )))
    }
}

/// Coefficient of determination (R²)
///
/// R² = 1 - SS_res / SS_tot
///
/// # Examples
/// ```
/// use ss_utilities::stats::r_squared;
///
/// assert_eq!(r_squared(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap(), 1.0);
/// assert_eq!(r_squared(&[1.0, 2.0, 4.0], &[1.0, 2.0, 3.0]).unwrap(), 0.5);
/// ```
pub fn r_squared(predictions: &[f64], actuals: &[f64]) -> Result<f64> {
    check_pair(predictions, actuals)?;

    let mean_actual = check_sum("mean of actuals", mean(actuals))?;
    let ss_tot = check_sum(
        "total sum of squares",
        actuals.iter().map(|&a| (a - mean_actual).powi(2)).sum(),
    )?;
    let ss_res = check_sum(
        "residual sum of squares",
        actuals
            .iter()
            .zip(predictions.iter())
            .map(|(&a, &p)| (a - p).powi(2))
            .sum(),
    )?;

    if ss_tot == 0.0 {
        return Err(SsError::DegenerateData(
            "actuals are constant, R² is undefined".to_string(),
        ));
    }

    let r2 = 1.0 - ss_res / ss_tot;
    log::debug!("r_squared over {} points: {}", actuals.len(), r2);
    Ok(r2)
}

/// Pearson correlation coefficient between predictions and actuals
///
/// # Examples
/// ```
/// use ss_utilities::stats::pearson_coefficient;
///
/// let r = pearson_coefficient(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
/// assert!((r - 1.0).abs() < 1e-12);
/// ```
pub fn pearson_coefficient(predictions: &[f64], actuals: &[f64]) -> Result<f64> {
    check_pair(predictions, actuals)?;

    let mean_p = check_sum("mean of predictions", mean(predictions))?;
    let mean_a = check_sum("mean of actuals", mean(actuals))?;

    let mut cov = 0.0;
    let mut var_p = 0.0;
    let mut var_a = 0.0;

    for (p, a) in predictions.iter().zip(actuals.iter()) {
        let dp = p - mean_p;
        let da = a - mean_a;
        cov += dp * da;
        var_p += dp * dp;
        var_a += da * da;
    }

    check_sum("covariance", cov)?;
    check_sum("variance of predictions", var_p)?;
    check_sum("variance of actuals", var_a)?;

    if var_p == 0.0 || var_a == 0.0 {
        return Err(SsError::DegenerateData(
            "a series has zero variance, correlation is undefined".to_string(),
        ));
    }

    let r = check_sum("correlation", cov / (var_p.sqrt() * var_a.sqrt()))?;
    // Rounding can push |r| a hair past 1 for perfectly collinear input.
    let r = r.clamp(-1.0, 1.0);
    log::debug!("pearson_coefficient over {} points: {}", actuals.len(), r);
    Ok(r)
}

/// Weighted mean absolute percentage error
///
/// Each point's absolute percentage error is taken relative to its `norm`,
/// then the errors are averaged using the actuals as weights. The result is
/// in percent. Points whose actual is zero carry no weight and are left
/// out, so their norm may be zero too.
///
/// # Examples
/// ```
/// use ss_utilities::stats::wmape;
///
/// let err = wmape(&[110.0, 90.0], &[100.0, 100.0], &[100.0, 100.0]).unwrap();
/// assert!((err - 10.0).abs() < 1e-9);
/// ```
pub fn wmape(predictions: &[f64], actuals: &[f64], norms: &[f64]) -> Result<f64> {
    check_pair(predictions, actuals)?;
    if norms.len() != actuals.len() {
        return Err(SsError::InvalidInput(format!(
            "norms has {} values but actuals has {}",
            norms.len(),
            actuals.len()
        )));
    }
    check_finite("norms", norms)?;
    if let Some(idx) = actuals
        .iter()
        .zip(norms.iter())
        .position(|(&a, &n)| a != 0.0 && n == 0.0)
    {
        return Err(SsError::InvalidInput(format!("norm at index {} is zero", idx)));
    }

    let total_actual = check_sum("sum of actuals", actuals.iter().sum())?;
    if total_actual == 0.0 {
        return Err(SsError::DegenerateData(
            "actuals sum to zero, weights are undefined".to_string(),
        ));
    }

    let weighted = check_sum(
        "weighted error",
        predictions
            .iter()
            .zip(actuals.iter())
            .zip(norms.iter())
            .filter(|&((_, &a), _)| a != 0.0)
            .map(|((&p, &a), &n)| a * ((p - a) / n).abs() * 100.0)
            .sum(),
    )?;

    let result = check_sum("wMAPE", weighted / total_actual)?;
    log::debug!("wmape over {} points: {}%", actuals.len(), result);
    Ok(result)
}

/// All error statistics for one forecast, as reported by the `stats` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Number of paired observations
    pub count: usize,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Pearson correlation coefficient
    pub pearson: f64,
    /// Weighted MAPE in percent
    pub wmape: f64,
}

impl ErrorSummary {
    /// Compute every statistic; `norms` falls back to the actuals when absent
    pub fn compute(predictions: &[f64], actuals: &[f64], norms: Option<&[f64]>) -> Result<Self> {
        Ok(Self {
            count: actuals.len(),
            r_squared: r_squared(predictions, actuals)?,
            pearson: pearson_coefficient(predictions, actuals)?,
            wmape: wmape(predictions, actuals, norms.unwrap_or(actuals))?,
        })
    }
}
