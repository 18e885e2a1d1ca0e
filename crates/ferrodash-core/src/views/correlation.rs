//! Cross-ticker close-price correlation.

use std::collections::HashMap;

use serde::Serialize;
use time::Date;

use crate::filter::filter_window;
use crate::views::chart::{Axis, ChartSpec, Layout, Trace};
use crate::{format_date, Catalog, DateWindow, SeriesStore};

/// Minimum number of common dates for a defined coefficient.
const MIN_OBSERVATIONS: usize = 2;

/// Square name × name matrix of Pearson coefficients.
///
/// Cells are `None` where two tickers share fewer than two dates in the window
/// or one of them has constant closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
    /// Off-diagonal pairs left undefined for lack of overlapping data.
    pub insufficient_pairs: Vec<(String, String)>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }

    pub fn value_for(&self, a: &str, b: &str) -> Option<f64> {
        let row = self.labels.iter().position(|label| label == a)?;
        let col = self.labels.iter().position(|label| label == b)?;
        self.get(row, col)
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.size();
        (0..n).all(|i| (0..n).all(|j| self.values[i][j] == self.values[j][i]))
    }

    pub fn has_insufficient_overlap(&self) -> bool {
        !self.insufficient_pairs.is_empty()
    }
}

/// Correlation matrix together with its heatmap rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub matrix: CorrelationMatrix,
    pub chart: ChartSpec,
}

/// Correlate the close prices of every catalog ticker over `window`.
///
/// Each pair is aligned on the dates both tickers traded, so tickers with
/// different calendars never get their rows mismatched.
pub fn build_correlation_heatmap(
    store: &SeriesStore,
    catalog: &Catalog,
    window: DateWindow,
) -> Heatmap {
    let columns = catalog
        .entries()
        .iter()
        .map(|entry| {
            let closes = store
                .get(&entry.symbol)
                .map(|series| {
                    filter_window(series, window)
                        .bars()
                        .iter()
                        .map(|bar| (bar.date, bar.close))
                        .collect::<HashMap<Date, f64>>()
                })
                .unwrap_or_default();
            (entry.name.clone(), closes)
        })
        .collect::<Vec<_>>();

    let matrix = correlate(&columns);
    let chart = heatmap_chart(&matrix, window);
    Heatmap { matrix, chart }
}

fn correlate(columns: &[(String, HashMap<Date, f64>)]) -> CorrelationMatrix {
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    let mut insufficient_pairs = Vec::new();

    for i in 0..n {
        let (_, own) = &columns[i];
        let own_values = own.values().copied().collect::<Vec<_>>();
        values[i][i] = pearson(&own_values, &own_values).map(|_| 1.0);

        for j in (i + 1)..n {
            let (_, other) = &columns[j];
            let (xs, ys) = align(own, other);
            let r = pearson(&xs, &ys);
            if r.is_none() {
                insufficient_pairs.push((columns[i].0.clone(), columns[j].0.clone()));
            }
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        labels: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
        insufficient_pairs,
    }
}

/// Pair up closes on the dates present in both columns, in date order.
fn align(a: &HashMap<Date, f64>, b: &HashMap<Date, f64>) -> (Vec<f64>, Vec<f64>) {
    let mut common = a
        .iter()
        .filter_map(|(date, x)| b.get(date).map(|y| (*date, *x, *y)))
        .collect::<Vec<_>>();
    common.sort_by_key(|(date, _, _)| *date);
    common.into_iter().map(|(_, x, y)| (x, y)).unzip()
}

/// Sample Pearson correlation, `None` when undefined.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < MIN_OBSERVATIONS {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

fn heatmap_chart(matrix: &CorrelationMatrix, window: DateWindow) -> ChartSpec {
    let trace = Trace::Heatmap {
        z: matrix.values.clone(),
        x: matrix.labels.clone(),
        y: matrix.labels.clone(),
        colorscale: String::from("Plasma"),
        zmin: -1.0,
        zmax: 1.0,
    };

    ChartSpec {
        data: vec![trace],
        layout: Layout::centered(
            format!(
                "Correlation Heatmap of Commodities using data from <br>{} to {}",
                format_date(window.start),
                format_date(window.end)
            ),
            Axis::plain("Commodity"),
            Axis::plain("Commodity"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_of_linear_series_is_one() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        let r = pearson(&xs, &ys).expect("defined");
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_of_mirrored_series_is_minus_one() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [3.0, 2.0, 1.0];
        let r = pearson(&xs, &ys).expect("defined");
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_is_undefined_for_constant_or_short_input() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }
}
