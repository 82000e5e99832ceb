use crate::config::AppConfig;

use super::model::{RowRecord, UnifiedTable};
use super::stats::{CorrelationReport, StackedHistogram};

/// Points of one source for the scatter plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub source: String,
    /// `[Final_Salary, Total_Points]` pairs.
    pub points: Vec<[f64; 2]>,
}

/// Everything the charts and the correlation panel need.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub correlation: CorrelationReport,
    pub scatter: Vec<ScatterSeries>,
    pub salary_hist: StackedHistogram,
    pub points_hist: StackedHistogram,
}

impl Analysis {
    /// Recompute every statistic from the selected rows.
    pub fn compute(table: &UnifiedTable, config: &AppConfig) -> Self {
        let correlation = CorrelationReport::compute(table.paired());

        let scatter = table
            .sources
            .iter()
            .map(|source| ScatterSeries {
                source: source.clone(),
                points: table
                    .paired()
                    .filter(|(s, _, _)| *s == source.as_str())
                    .map(|(_, x, y)| [x, y])
                    .collect(),
            })
            .collect();

        // Histograms use every present value, paired or not.
        let column = |get: fn(&RowRecord) -> Option<f64>| -> Vec<(String, Vec<f64>)> {
            table
                .sources
                .iter()
                .map(|source| {
                    let values = table
                        .rows
                        .iter()
                        .filter(|r| &r.source == source)
                        .filter_map(get)
                        .filter(|v| v.is_finite())
                        .collect();
                    (source.clone(), values)
                })
                .collect()
        };
        let kde_points = if config.show_kde { config.kde_grid_points } else { 0 };
        let salary_hist =
            StackedHistogram::build(&column(|r| r.final_salary), config.histogram_bins, kde_points);
        let points_hist =
            StackedHistogram::build(&column(|r| r.total_points), config.histogram_bins, kde_points);

        log::info!(
            "Analysed {} rows ({} paired) from {} files; overall r = {:.2}",
            table.len(),
            correlation.paired_rows,
            table.sources.len(),
            correlation.overall
        );

        Analysis {
            correlation,
            scatter,
            salary_hist,
            points_hist,
        }
    }
}
