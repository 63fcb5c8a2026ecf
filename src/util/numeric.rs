//! Numeric helpers: rounding to a base and great-circle distances

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, SsError};

/// Mean earth radius in kilometres (IUGG)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Round `number` to the nearest multiple of `base`
///
/// Halfway cases go to the even multiple, so with base 5, 12.5 rounds
/// down to 10 and 17.5 rounds up to 20. Callers without a preference use
/// [`crate::DEFAULT_ROUND_BASE`].
///
/// # Examples
/// ```
/// use ss_utilities::util::numeric::round_to_base;
///
/// assert_eq!(round_to_base(7.0, 5).unwrap(), 5);
/// assert_eq!(round_to_base(8.0, 5).unwrap(), 10);
/// assert_eq!(round_to_base(12.5, 5).unwrap(), 10);
/// ```
pub fn round_to_base(number: f64, base: u32) -> Result<i64> {
    if base == 0 {
        return Err(SsError::InvalidInput("base must be greater than 0".to_string()));
    }
    if !number.is_finite() {
        return Err(SsError::InvalidInput(format!("cannot round {}", number)));
    }

    let base = base as f64;
    let rounded = base * (number / base).round_ties_even();
    // i64::MAX as f64 is 2^63, which is already out of range.
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(SsError::InvalidInput(format!(
            "{} is out of range after rounding",
            number
        )));
    }
    Ok(rounded as i64)
}

/// Unit for distances returned by [`haversine`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    Kilometres,
    Metres,
    Miles,
}

impl DistanceUnit {
    /// Multiplier converting kilometres into this unit
    pub fn per_kilometre(&self) -> f64 {
        match self {
            DistanceUnit::Kilometres => 1.0,
            DistanceUnit::Metres => 1000.0,
            DistanceUnit::Miles => 0.621371192,
        }
    }

    /// Short unit symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometres => "km",
            DistanceUnit::Metres => "m",
            DistanceUnit::Miles => "mi",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = SsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "km" => Ok(DistanceUnit::Kilometres),
            "m" => Ok(DistanceUnit::Metres),
            "mi" => Ok(DistanceUnit::Miles),
            other => Err(SsError::InvalidInput(format!(
                "Unknown distance unit: {} (expected km, m or mi)",
                other
            ))),
        }
    }
}

/// Great-circle distance between two points given in decimal degrees
///
/// # Examples
/// ```
/// use ss_utilities::util::numeric::{haversine, DistanceUnit};
///
/// let d = haversine(0.0, 0.0, 0.0, 1.0, DistanceUnit::Kilometres);
/// assert!((d - 111.195).abs() < 0.001);
/// ```
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64, unit: DistanceUnit) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards asin against a > 1 from rounding at antipodes.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * unit.per_kilometre() * c
}

/// Element-wise [`haversine`] over equally long coordinate slices
pub fn haversine_many(
    lat1: &[f64],
    lon1: &[f64],
    lat2: &[f64],
    lon2: &[f64],
    unit: DistanceUnit,
) -> Result<Vec<f64>> {
    let n = lat1.len();
    if lon1.len() != n || lat2.len() != n || lon2.len() != n {
        return Err(SsError::InvalidInput(format!(
            "coordinate slices differ in length: {}, {}, {}, {}",
            n,
            lon1.len(),
            lat2.len(),
            lon2.len()
        )));
    }

    Ok((0..n)
        .map(|i| haversine(lat1[i], lon1[i], lat2[i], lon2[i], unit))
        .collect())
}
