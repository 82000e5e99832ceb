use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient of paired samples.
///
/// Returns `NaN` when it is undefined: fewer than two pairs, or zero
/// variance in either series.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    let nf = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Round to two decimals for display.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Per-source and pooled salary/points correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationReport {
    /// Sorted by source name; `NaN` for degenerate groups.
    pub by_source: BTreeMap<String, f64>,
    /// Computed from all pooled pairs, not averaged.
    pub overall: f64,
    /// Rows that had both values.
    pub paired_rows: usize,
}

impl CorrelationReport {
    /// Group `(source, x, y)` triples by source and correlate.
    pub fn compute<'a>(rows: impl IntoIterator<Item = (&'a str, f64, f64)>) -> Self {
        let mut groups: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
        let mut pooled = Vec::new();
        for (source, x, y) in rows {
            groups.entry(source.to_string()).or_default().push((x, y));
            pooled.push((x, y));
        }
        CorrelationReport {
            by_source: groups
                .into_iter()
                .map(|(source, pairs)| (source, pearson(&pairs)))
                .collect(),
            overall: pearson(&pooled),
            paired_rows: pooled.len(),
        }
    }

    /// Overall coefficient rounded to two decimals.
    pub fn overall_rounded(&self) -> f64 {
        round2(self.overall)
    }
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Linear-interpolated percentile (`q` in 0..=100) of sorted data.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q / 100.0;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Upper bound on the number of histogram bins, explicit or automatic.
pub const MAX_BINS: usize = 1000;

/// Evenly spaced bin edges covering `values`.
///
/// With `bins = None` the width is the smaller of the Freedman–Diaconis and
/// Sturges estimates (Sturges alone when the IQR is zero). Either way the
/// count is capped at [`MAX_BINS`], so one far outlier cannot blow up the
/// allocation.
pub fn bin_edges(values: &[f64], bins: Option<usize>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let range = hi - lo;

    let n_bins = match bins {
        Some(b) => b.clamp(1, MAX_BINS),
        None if max <= min => 1,
        None => {
            let n = sorted.len() as f64;
            let sturges = range / (n.log2() + 1.0);
            let iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
            let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);
            let width = if fd > 0.0 { fd.min(sturges) } else { sturges };
            ((range / width).ceil() as usize).clamp(1, MAX_BINS)
        }
    };

    let step = range / n_bins as f64;
    (0..=n_bins)
        .map(|i| if i == n_bins { hi } else { lo + step * i as f64 })
        .collect()
}

/// Bin index for `v`; the last bin is closed on the right.
fn bin_of(edges: &[f64], v: f64) -> Option<usize> {
    let n_bins = edges.len().checked_sub(1)?;
    if n_bins == 0 || !(edges[0]..=edges[n_bins]).contains(&v) {
        return None;
    }
    let idx = edges.partition_point(|&e| e <= v);
    Some(idx.saturating_sub(1).min(n_bins - 1))
}

fn width_of(edges: &[f64]) -> f64 {
    match edges.len() {
        0 | 1 => 0.0,
        n => (edges[n - 1] - edges[0]) / (n - 1) as f64,
    }
}

/// Counts of `values` per bin.
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let mut counts = vec![0; edges.len().saturating_sub(1)];
    for &v in values {
        if let Some(i) = bin_of(edges, v) {
            counts[i] += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Gaussian KDE bandwidth by Scott's rule: `n^(-1/5) · σ` (sample σ).
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (nf - 1.0);
    let bw = nf.powf(-0.2) * var.sqrt();
    (bw > 0.0 && bw.is_finite()).then_some(bw)
}

/// Gaussian density of `values` evaluated at each `grid` point.
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Option<Vec<f64>> {
    let bw = scott_bandwidth(values)?;
    let norm = 1.0 / (values.len() as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());
    Some(
        grid.iter()
            .map(|&g| {
                values
                    .iter()
                    .map(|&v| (-0.5 * ((g - v) / bw).powi(2)).exp())
                    .sum::<f64>()
                    * norm
            })
            .collect(),
    )
}

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| lo + step * i as f64).collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Stacked histogram by source
// ---------------------------------------------------------------------------

/// One source's layer of a stacked histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramLayer {
    pub source: String,
    pub counts: Vec<usize>,
    /// Height of the layers below, per bin.
    pub base: Vec<f64>,
    /// KDE scaled to counts, stacked on the layers below.
    /// `None` for fewer than two values or no spread.
    pub kde: Option<Vec<f64>>,
}

/// Histogram of one column with a layer per source on shared edges.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedHistogram {
    pub edges: Vec<f64>,
    pub layers: Vec<HistogramLayer>,
    pub kde_grid: Vec<f64>,
}

impl StackedHistogram {
    /// Build from per-source value lists, stacked in the given order.
    pub fn build(series: &[(String, Vec<f64>)], bins: Option<usize>, kde_points: usize) -> Self {
        let pooled: Vec<f64> = series.iter().flat_map(|(_, v)| v.iter().copied()).collect();
        let edges = bin_edges(&pooled, bins);
        let bin_width = width_of(&edges);

        let kde_grid = match pooled.iter().copied().fold(None, |acc: Option<(f64, f64)>, v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        }) {
            Some((lo, hi)) if hi > lo => linspace(lo, hi, kde_points),
            _ => Vec::new(),
        };

        let mut base = vec![0.0; edges.len().saturating_sub(1)];
        let mut kde_base = vec![0.0; kde_grid.len()];
        let mut layers = Vec::with_capacity(series.len());
        for (source, values) in series {
            let counts = histogram(values, &edges);
            let kde = if kde_grid.is_empty() {
                None
            } else {
                gaussian_kde(values, &kde_grid)
            }
            .map(|density| {
                let scale = values.len() as f64 * bin_width;
                density
                    .iter()
                    .zip(&kde_base)
                    .map(|(d, b)| b + d * scale)
                    .collect::<Vec<f64>>()
            });

            let next_base: Vec<f64> = base.iter().zip(&counts).map(|(b, &c)| b + c as f64).collect();
            // A layer without a curve still lifts the ones above it by its bar heights.
            kde_base = match &kde {
                Some(k) => k.clone(),
                None => kde_grid
                    .iter()
                    .zip(&kde_base)
                    .map(|(&x, b)| b + bin_of(&edges, x).map_or(0.0, |i| counts[i] as f64))
                    .collect(),
            };
            layers.push(HistogramLayer {
                source: source.clone(),
                counts,
                base: std::mem::replace(&mut base, next_base),
                kde,
            });
        }

        StackedHistogram {
            edges,
            layers,
            kde_grid,
        }
    }

    pub fn bin_width(&self) -> f64 {
        width_of(&self.edges)
    }

    /// Centre of each bin.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }
}
