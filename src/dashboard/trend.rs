// src/dashboard/trend.rs

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use super::long::LongRow;

/// Fraction of points used for each local fit.
pub const LOESS_BANDWIDTH: f64 = 0.3;

/// Locally weighted linear regression with a tricube kernel, evaluated at
/// each distinct x. Each fit uses the `bandwidth * n` nearest points (at
/// least two). Output is sorted by x.
pub fn loess(points: &[(f64, f64)], bandwidth: f64) -> Vec<(f64, f64)> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }
    let span = ((n as f64 * bandwidth).floor() as usize).clamp(2.min(n), n);

    let mut xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();

    xs.into_iter()
        .map(|x0| (x0, local_fit(points, x0, span)))
        .collect()
}

fn local_fit(points: &[(f64, f64)], x0: f64, span: usize) -> f64 {
    let mut dists: Vec<f64> = points.iter().map(|(x, _)| (x - x0).abs()).collect();
    dists.sort_by(f64::total_cmp);
    let radius = dists[span - 1];

    // The span-th neighbour keeps a small non-zero weight.
    let scale = if radius > 0.0 { radius * 1.000_001 } else { 1.0 };
    let weighted: Vec<(f64, f64, f64)> = points
        .iter()
        .filter(|(x, _)| (x - x0).abs() <= radius)
        .map(|(x, y)| {
            let u = (x - x0).abs() / scale;
            let w = (1.0 - u.powi(3)).powi(3);
            (x - x0, *y, w)
        })
        .collect();

    let (mut sw, mut swx, mut swy, mut swxx, mut swxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (dx, y, w) in &weighted {
        sw += w;
        swx += w * dx;
        swy += w * y;
        swxx += w * dx * dx;
        swxy += w * dx * y;
    }
    if sw <= 0.0 {
        return weighted.iter().map(|(_, y, _)| y).sum::<f64>() / weighted.len() as f64;
    }

    // x is centred on x0, so the intercept is the fitted value.
    let denom = sw * swxx - swx * swx;
    if denom.abs() <= f64::EPSILON * sw * swxx.max(1.0) {
        return swy / sw;
    }
    let slope = (sw * swxy - swx * swy) / denom;
    (swy - slope * swx) / sw
}

/// Smoothed trend line of one party.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub party: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Per-party LOESS over poll dates, in order of first appearance.
pub fn trend_lines(rows: &[LongRow], bandwidth: f64) -> Vec<TrendLine> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_party: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for row in rows {
        let pts = by_party.entry(row.party.as_str()).or_insert_with(|| {
            order.push(row.party.as_str());
            Vec::new()
        });
        pts.push((day_number(row.date), row.value));
    }

    order
        .into_iter()
        .map(|party| {
            let points = loess(&by_party[party], bandwidth)
                .into_iter()
                .filter_map(|(x, y)| from_day_number(x).map(|d| (d, y)))
                .collect();
            TrendLine {
                party: party.to_string(),
                points,
            }
        })
        .collect()
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn from_day_number(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x as i32)
}
