//! Monthly production profiles
//!
//! A hyperbolic liquid-rate decline counted from the peak month and a
//! Corey-type desaturation characteristic are stepped forward one calendar
//! month at a time. Each month's oil volume raises the recovery factor that
//! sets the next month's water cut.
//!
//! Rates are daily; volumes are monthly, in the history's mass units.
//! Initial recoverable reserves are given in thousands of those units.

use crate::data::WellHistory;
use crate::error::{ReservesError, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest recovery factor a forecast may reach
pub const MAX_RECOVERY_FACTOR: f64 = 0.999_999_999_99;

/// Scale between initial recoverable reserves and production volumes
const RESERVES_SCALE: f64 = 1000.0;

/// Number of days in the calendar month of `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (NaiveDate::from_ymd_opt(year, month, 1), next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 30,
    }
}

/// Which history months a model is tied to at the forecast start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnchorPoint {
    /// The last month
    #[default]
    LastMonth,
    /// Mean of the two months before the last one
    PrecedingMonths,
}

impl AnchorPoint {
    /// Reference value of a history for this anchor
    pub fn reference(&self, values: &[f64]) -> Option<f64> {
        let last = *values.last()?;
        match self {
            AnchorPoint::LastMonth => Some(last),
            AnchorPoint::PrecedingMonths => {
                let n = values.len();
                let preceding = match n {
                    1 => return Some(last),
                    2 => &values[..1],
                    _ => &values[n - 3..n - 1],
                };
                Some(preceding.iter().sum::<f64>() / preceding.len() as f64)
            }
        }
    }
}

/// Hyperbolic decline `q(n) = q0 * (1 + k1 * k2 * n)^(-1 / k2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidDecline {
    pub k1: f64,
    pub k2: f64,
}

impl LiquidDecline {
    pub fn new(k1: f64, k2: f64) -> Result<Self> {
        if !k1.is_finite() || k1 < 0.0 {
            return Err(ReservesError::InvalidParameter(format!(
                "Decline rate k1 must be finite and non-negative, got {}",
                k1
            )));
        }
        if !k2.is_finite() || k2 <= 0.0 {
            return Err(ReservesError::InvalidParameter(format!(
                "Decline exponent k2 must be finite and positive, got {}",
                k2
            )));
        }
        Ok(Self { k1, k2 })
    }

    /// Rate `months` after the peak month
    pub fn rate(&self, peak_rate: f64, months: f64) -> f64 {
        peak_rate * (1.0 + self.k1 * self.k2 * months).powf(-1.0 / self.k2)
    }
}

/// Peak month a liquid decline is counted from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakMonth {
    pub index: usize,
    pub rate: f64,
}

/// Daily liquid rates of a history, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidRateHistory {
    daily_rates: Vec<f64>,
    peak: PeakMonth,
}

impl LiquidRateHistory {
    /// Rates must be finite and non-negative, with at least one month
    pub fn new(daily_rates: Vec<f64>) -> Result<Self> {
        if daily_rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(ReservesError::DataError(
                "Liquid rates must be finite and non-negative".to_string(),
            ));
        }
        let peak = find_peak(&daily_rates)
            .ok_or_else(|| ReservesError::DataError("Empty liquid rate history".to_string()))?;
        Ok(Self { daily_rates, peak })
    }

    /// Monthly liquid volumes divided by each month's length
    pub fn from_well(history: &WellHistory) -> Result<Self> {
        let rates = history
            .records()
            .iter()
            .map(|r| r.liquid / days_in_month(r.date) as f64)
            .collect();
        Self::new(rates)
    }

    pub fn daily_rates(&self) -> &[f64] {
        &self.daily_rates
    }

    pub fn peak(&self) -> PeakMonth {
        self.peak
    }

    /// Sum of squared misfits from the peak month on
    pub fn deviation(&self, decline: &LiquidDecline) -> f64 {
        self.daily_rates[self.peak.index..]
            .iter()
            .enumerate()
            .map(|(n, &rate)| (rate - decline.rate(self.peak.rate, n as f64)).powi(2))
            .sum()
    }

    /// Anchor reference minus the modelled rate of the last month; zero
    /// when the decline passes through the anchor
    pub fn anchor_offset(&self, decline: &LiquidDecline, anchor: AnchorPoint) -> f64 {
        let months = (self.daily_rates.len() - 1 - self.peak.index) as f64;
        let reference = anchor
            .reference(&self.daily_rates)
            .unwrap_or(self.peak.rate);
        reference - decline.rate(self.peak.rate, months)
    }

    /// Forecast continuing the decline the month after the history ends
    pub fn forecast(&self, decline: LiquidDecline) -> LiquidForecast {
        LiquidForecast {
            decline,
            first_month: (self.daily_rates.len() - self.peak.index + 1) as u32,
            peak_rate: self.peak.rate,
        }
    }
}

/// Highest month, looked for before the last three months when it falls
/// inside them
pub fn find_peak(rates: &[f64]) -> Option<PeakMonth> {
    let argmax = |values: &[f64]| -> Option<PeakMonth> {
        values
            .iter()
            .enumerate()
            .fold(None, |best: Option<PeakMonth>, (index, &rate)| match best {
                Some(b) if b.rate >= rate => Some(b),
                _ => Some(PeakMonth { index, rate }),
            })
    };

    let n = rates.len();
    let peak = argmax(rates)?;
    if n > 3 && peak.index + 4 > n {
        argmax(&rates[..n - 3])
    } else {
        Some(peak)
    }
}

/// Liquid decline positioned for a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidForecast {
    pub decline: LiquidDecline,
    /// One-based month count since the peak of the first forecast month
    pub first_month: u32,
    pub peak_rate: f64,
}

impl LiquidForecast {
    /// Daily liquid rate of the `step`-th forecast month, from zero
    pub fn rate(&self, step: usize) -> f64 {
        let months = (self.first_month as usize + step).saturating_sub(1);
        self.decline.rate(self.peak_rate, months as f64)
    }
}

/// Corey-type desaturation characteristic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesaturationCharacteristic {
    pub corey_oil: f64,
    pub corey_water: f64,
    /// Mobility ratio of water to oil
    pub mobility_ratio: f64,
}

impl DesaturationCharacteristic {
    pub fn new(corey_oil: f64, corey_water: f64, mobility_ratio: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(corey_oil) || !valid(corey_water) || !valid(mobility_ratio) {
            return Err(ReservesError::InvalidParameter(format!(
                "Corey exponents and mobility ratio must be finite and non-negative, got ({}, {}, {})",
                corey_oil, corey_water, mobility_ratio
            )));
        }
        Ok(Self {
            corey_oil,
            corey_water,
            mobility_ratio,
        })
    }

    /// Water cut at a recovery factor
    pub fn water_cut(&self, recovery_factor: f64) -> f64 {
        let water = self.mobility_ratio * recovery_factor.powf(self.corey_water);
        water / ((1.0 - recovery_factor).powf(self.corey_oil) + water)
    }

    /// Oil share of the liquid at a recovery factor
    pub fn oil_fraction(&self, recovery_factor: f64) -> f64 {
        let oil = (1.0 - recovery_factor).powf(self.corey_oil);
        oil / (oil + self.mobility_ratio * recovery_factor.powf(self.corey_water))
    }

    /// Modelled monthly oil volumes for historical liquid volumes.
    ///
    /// Each month starts from the oil recovered before it and takes four
    /// oil-fraction stages, each advanced by half of that month's liquid.
    /// Non-finite months count as zero.
    pub fn modelled_oil(&self, oil: &[f64], liquid: &[f64], initial_reserves: f64) -> Vec<f64> {
        let scale = initial_reserves * RESERVES_SCALE;
        let mut recovered = 0.0;

        oil.iter()
            .zip(liquid)
            .map(|(&month_oil, &month_liquid)| {
                let start = recovered / scale;
                recovered += month_oil;

                let half_step = month_liquid / 2.0 / scale;
                let k1 = self.oil_fraction(start);
                let k2 = self.oil_fraction(start + half_step * k1);
                let k3 = self.oil_fraction(start + half_step * k2);
                let k4 = self.oil_fraction(start + half_step * k3);

                let modelled = month_liquid / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
                if modelled.is_finite() {
                    modelled
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Sum of squared misfits between modelled and historical oil
    pub fn deviation(&self, oil: &[f64], liquid: &[f64], initial_reserves: f64) -> f64 {
        self.modelled_oil(oil, liquid, initial_reserves)
            .iter()
            .zip(oil)
            .map(|(model, fact)| (model - fact).powi(2))
            .sum()
    }

    /// Modelled water cut at the current recovery factor minus the anchor
    /// reference of the historical water cuts
    pub fn anchor_offset(&self, recovery_factor: f64, water_cuts: &[f64], anchor: AnchorPoint) -> f64 {
        let reference = anchor.reference(water_cuts).unwrap_or(0.0);
        self.water_cut(recovery_factor) - reference
    }
}

/// One forecast month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMonth {
    pub date: NaiveDate,
    /// Recovery factor at the start of the month
    pub recovery_factor: f64,
    pub water_cut: f64,
    pub liquid_rate: f64,
    pub oil_rate: f64,
    /// Oil rate times the days of the month
    pub oil_volume: f64,
}

/// Month-by-month oil and liquid forecast
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionProfile {
    pub months: Vec<ProfileMonth>,
}

impl ProductionProfile {
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Daily oil rates per month
    pub fn oil_rates(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.oil_rate).collect()
    }

    /// Daily liquid rates per month
    pub fn liquid_rates(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.liquid_rate).collect()
    }

    /// Oil produced over the forecast
    pub fn total_oil(&self) -> f64 {
        self.months.iter().map(|m| m.oil_volume).sum()
    }
}

/// Forecast `period` months from `start`.
///
/// `recovery_factor` is the share of `initial_reserves` (in thousands)
/// already produced. It grows by each month's oil volume and never exceeds
/// [`MAX_RECOVERY_FACTOR`].
pub fn fluid_production_profile(
    period: usize,
    characteristic: &DesaturationCharacteristic,
    liquid: &LiquidForecast,
    start: NaiveDate,
    recovery_factor: f64,
    initial_reserves: f64,
) -> Result<ProductionProfile> {
    if !(0.0..1.0).contains(&recovery_factor) {
        return Err(ReservesError::InvalidParameter(format!(
            "Recovery factor must lie in [0, 1), got {}",
            recovery_factor
        )));
    }
    if !initial_reserves.is_finite() || initial_reserves <= 0.0 {
        return Err(ReservesError::InvalidParameter(format!(
            "Initial recoverable reserves must be positive, got {}",
            initial_reserves
        )));
    }

    let scale = initial_reserves * RESERVES_SCALE;
    let mut months = Vec::with_capacity(period);
    let mut date = start;
    let mut recovery_factor = recovery_factor;
    let mut previous_volume = 0.0;

    for step in 0..period {
        recovery_factor = (recovery_factor + previous_volume / scale).min(MAX_RECOVERY_FACTOR);

        let water_cut = characteristic.water_cut(recovery_factor);
        let liquid_rate = liquid.rate(step);
        let oil_rate = liquid_rate * (1.0 - water_cut);
        let days = days_in_month(date);
        previous_volume = oil_rate * days as f64;

        months.push(ProfileMonth {
            date,
            recovery_factor,
            water_cut,
            liquid_rate,
            oil_rate,
            oil_volume: previous_volume,
        });

        date = date.checked_add_days(Days::new(days as u64)).ok_or_else(|| {
            ReservesError::InvalidParameter(format!("Forecast runs past the calendar at {}", date))
        })?;
    }

    let profile = ProductionProfile { months };
    debug!(
        months = profile.len(),
        total_oil = profile.total_oil(),
        final_recovery_factor = recovery_factor,
        "Production profile built"
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2023, 2, 1)), 28);
        assert_eq!(days_in_month(date(2023, 12, 31)), 31);
        assert_eq!(days_in_month(date(2023, 4, 1)), 30);
    }

    #[test]
    fn test_water_cut_and_oil_fraction_sum_to_one() {
        let c = DesaturationCharacteristic::new(2.0, 3.0, 1.5).unwrap();
        for rf in [0.0, 0.2, 0.5, 0.9] {
            assert!((c.water_cut(rf) + c.oil_fraction(rf) - 1.0).abs() < 1e-12);
        }
        assert_eq!(c.water_cut(0.0), 0.0);
    }

    #[test]
    fn test_peak_inside_last_three_months_is_skipped() {
        assert_eq!(find_peak(&[10.0, 50.0, 40.0, 30.0, 20.0]), Some(PeakMonth { index: 1, rate: 50.0 }));
        assert_eq!(find_peak(&[10.0, 20.0, 30.0, 60.0, 50.0]), Some(PeakMonth { index: 1, rate: 20.0 }));
        // Short histories keep their own maximum
        assert_eq!(find_peak(&[10.0, 30.0, 20.0]), Some(PeakMonth { index: 1, rate: 30.0 }));
        assert_eq!(find_peak(&[]), None);
    }
}
