use crate::report::{AuditResult, Metric};
use crate::stats;
use console::{Alignment, measure_text_width, pad_str};

const COLUMN_SPLITTER: &str = " | ";

/// One line of the summary table
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub values: [f64; Metric::COUNT],
}

impl SummaryRow {
    fn from_fn(label: impl Into<String>, f: impl Fn(Metric) -> f64) -> Self {
        Self {
            label: label.into(),
            values: Metric::ALL.map(f),
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        let idx = Metric::ALL
            .iter()
            .position(|m| *m == metric)
            .unwrap_or_default();
        self.values[idx]
    }

    pub fn formatted(&self) -> Vec<String> {
        self.values.iter().map(|v| format_number(*v)).collect()
    }
}

/// Per-trial and aggregate rows for one sequence of trials
#[derive(Debug, Clone)]
pub struct Summary {
    pub trials: Vec<SummaryRow>,
    pub aggregates: Vec<SummaryRow>,
    pub total_trials: usize,
}

impl Summary {
    pub fn rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.trials.iter().chain(self.aggregates.iter())
    }

    pub fn aggregate(&self, label: &str) -> Option<&SummaryRow> {
        self.aggregates.iter().find(|row| row.label == label)
    }

    /// Number of trials that produced a result
    pub fn successful_trials(&self) -> usize {
        self.trials.len()
    }

    /// Render as an aligned text table
    pub fn render(&self) -> String {
        let mut headings = vec!["LABEL".to_string()];
        headings.extend(Metric::ALL.iter().map(|m| m.header().to_uppercase()));

        let body: Vec<Vec<String>> = self
            .rows()
            .map(|row| {
                let mut cells = vec![row.label.clone()];
                cells.extend(row.formatted());
                cells
            })
            .collect();

        let widths: Vec<usize> = (0..headings.len())
            .map(|col| {
                std::iter::once(&headings)
                    .chain(body.iter())
                    .map(|cells| measure_text_width(&cells[col]))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        std::iter::once(&headings)
            .chain(body.iter())
            .map(|cells| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(col, cell)| {
                        let align = if col == 0 {
                            Alignment::Left
                        } else {
                            Alignment::Right
                        };
                        pad_str(cell, widths[col], align, None).into_owned()
                    })
                    .collect::<Vec<_>>()
                    .join(COLUMN_SPLITTER)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Build the summary for a trial sequence.
///
/// Failed trials (`None`) get no row but keep their position in the trial
/// numbering, and still count towards the mean's denominator. Aggregate rows
/// are omitted when no trial succeeded.
pub fn summarize(results: &[Option<AuditResult>]) -> Summary {
    let trials: Vec<SummaryRow> = results
        .iter()
        .enumerate()
        .filter_map(|(idx, result)| {
            result
                .as_ref()
                .map(|r| SummaryRow::from_fn(format!("trial {}", idx + 1), |m| r.metric(m)))
        })
        .collect();

    let present: Vec<&AuditResult> = results.iter().flatten().collect();
    let total = results.len();

    let aggregates = if present.is_empty() {
        tracing::warn!("No successful trials out of {}, skipping aggregates", total);
        vec![]
    } else {
        let column = |metric: Metric| -> Vec<f64> {
            present.iter().map(|r| r.metric(metric)).collect()
        };

        vec![
            SummaryRow::from_fn("min", |m| stats::min(&column(m)).unwrap_or_default()),
            SummaryRow::from_fn("max", |m| stats::max(&column(m)).unwrap_or_default()),
            SummaryRow::from_fn("mean", |m| {
                stats::sum(&column(m)).unwrap_or_default() / total as f64
            }),
            SummaryRow::from_fn("median", |m| stats::median(&column(m))),
        ]
    };

    tracing::debug!("Summarized {} of {} trials", present.len(), total);

    Summary {
        trials,
        aggregates,
        total_trials: total,
    }
}

/// Format like `en-US` locale output with no minimum fraction digits:
/// thousands separators, at most three fraction digits, no trailing zeros.
///
/// Ties round away from zero (`1.0625` gives `1.063`).
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // integer count of thousandths, at least four digits
    let thousandths = format!("{:04.0}", (value.abs() * 1000.0).round());
    let (int_part, frac_part) = thousandths.split_at(thousandths.len() - 3);
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(performance: f64, lcp: f64) -> AuditResult {
        AuditResult::new(json!({
            "categories": {
                "performance": {"score": performance},
                "accessibility": {"score": 1},
                "best-practices": {"score": 0.93},
                "seo": {"score": 0.8}
            },
            "audits": {
                "largest-contentful-paint": {"numericValue": lcp}
            }
        }))
    }

    #[test]
    fn test_summary_aggregates_performance() {
        let results = vec![
            Some(result(0.5, 1200.0)),
            Some(result(0.7, 1000.0)),
            Some(result(0.9, 1100.0)),
        ];

        let summary = summarize(&results);
        assert_eq!(summary.trials.len(), 3);
        assert_eq!(summary.aggregates.len(), 4);

        let perf = |label: &str| summary.aggregate(label).unwrap().value(Metric::Performance);
        assert_eq!(perf("min"), 50.0);
        assert_eq!(perf("max"), 90.0);
        assert_eq!(perf("mean"), 70.0);
        // c = 1 is odd, so the two lower values are averaged
        assert_eq!(perf("median"), 60.0);

        let lcp = summary.aggregate("median").unwrap().value(Metric::LargestContentfulPaint);
        assert_eq!(lcp, 1050.0);
    }

    #[test]
    fn test_seo_aggregates_are_scaled() {
        let summary = summarize(&[Some(result(0.5, 0.0))]);
        assert_eq!(summary.aggregate("max").unwrap().value(Metric::Seo), 80.0);
    }

    #[test]
    fn test_failed_trials_keep_numbering_and_denominator() {
        let results = vec![Some(result(0.6, 1000.0)), None, Some(result(0.9, 1000.0))];

        let summary = summarize(&results);
        let labels: Vec<_> = summary.trials.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["trial 1", "trial 3"]);
        assert_eq!(summary.total_trials, 3);
        assert_eq!(summary.successful_trials(), 2);

        let mean = summary.aggregate("mean").unwrap().value(Metric::Performance);
        assert_eq!(mean, 50.0);
        let min = summary.aggregate("min").unwrap().value(Metric::Performance);
        assert_eq!(min, 60.0);
    }

    #[test]
    fn test_all_failed_trials_have_no_aggregates() {
        let summary = summarize(&[None, None]);
        assert!(summary.trials.is_empty());
        assert!(summary.aggregates.is_empty());
        assert_eq!(summary.render().lines().count(), 1);
    }

    #[test]
    fn test_render_aligns_columns() {
        let summary = summarize(&[Some(result(0.5, 1234.5678)), Some(result(0.7, 1000.0))]);
        let table = summary.render();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 1 + 2 + 4);
        assert!(lines[0].starts_with("LABEL "));
        assert!(lines[0].contains(" | PERFORMANCE | "));
        assert!(lines[0].contains("BEST PRACTICE"));
        assert!(lines[1].starts_with("trial 1"));
        assert!(lines[6].starts_with("median "));
        assert!(table.contains("1,234.568"));

        let width = measure_text_width(lines[0]);
        assert!(lines.iter().all(|line| measure_text_width(line) == width));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(87.0), "87");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1234.5678), "1,234.568");
        assert_eq!(format_number(1_000_000.0), "1,000,000");
        assert_eq!(format_number(0.0125), "0.013");
        assert_eq!(format_number(62.5), "62.5");
        assert_eq!(format_number(-1500.25), "-1,500.25");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn test_format_number_rounds_ties_away_from_zero() {
        assert_eq!(format_number(1.0625), "1.063");
        assert_eq!(format_number(0.0625), "0.063");
        assert_eq!(format_number(-1.0625), "-1.063");
        assert_eq!(format_number(1000.0625), "1,000.063");
        assert_eq!(format_number(0.0005), "0.001");
    }

    #[test]
    fn test_mean_over_eight_trials_rounds_tie_up() {
        let mut results: Vec<Option<AuditResult>> =
            (0..7).map(|_| Some(result(0.5, 1000.0))).collect();
        results.push(Some(result(0.5, 1000.5)));

        let summary = summarize(&results);
        let mean = summary.aggregate("mean").unwrap();
        assert_eq!(mean.value(Metric::LargestContentfulPaint), 1000.0625);
        assert!(mean.formatted().contains(&"1,000.063".to_string()));
    }
}
