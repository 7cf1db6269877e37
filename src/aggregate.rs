//! Dashboard aggregation: count mappings → chart series, percentage bands,
//! and the summary model the dashboard renders.
//!
//! Everything here is pure. Ordering always follows the input: the backend
//! decides the order of `enrollments_by_status`, and the client never
//! re-sorts it.

use serde::Serialize;

use crate::models::{CountMap, DashboardStats, Enrollment, ProgramPerformance};

/// Slice colours for categorical charts, cycled by slice index.
pub const CHART_PALETTE: [&str; 5] = ["#dc143c", "#ff6b6b", "#b22222", "#c0392b", "#e74c3c"];

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// One `{name, value}` point of a chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub name: String,
    pub value: u64,
}

/// Turn a label → count mapping into an ordered series, one point per
/// label, in the mapping's order.
pub fn to_series(counts: &CountMap) -> Vec<SeriesPoint> {
    counts
        .iter()
        .map(|(name, value)| SeriesPoint {
            name: name.to_string(),
            value,
        })
        .collect()
}

pub fn series_total(series: &[SeriesPoint]) -> u64 {
    series.iter().map(|p| p.value).sum()
}

/// Group `items` by `key`, counting occurrences in first-seen order.
pub fn count_by<T, F, K>(items: &[T], key: F) -> CountMap
where
    F: Fn(&T) -> K,
    K: AsRef<str>,
{
    let mut counts = CountMap::new();
    for item in items {
        counts.increment(key(item).as_ref(), 1);
    }
    counts
}

// ---------------------------------------------------------------------------
// Pie / bar shaping
// ---------------------------------------------------------------------------

/// A pie slice with its share of the whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: u64,
    /// Share of the total in percent (0–100). Zero when the total is zero.
    pub percent: f64,
    pub color: &'static str,
}

impl PieSlice {
    /// Slice label as drawn on the chart, e.g. `Active (60%)`.
    pub fn label(&self) -> String {
        format!("{} ({:.0}%)", self.name, self.percent)
    }
}

pub fn slice_color(index: usize) -> &'static str {
    CHART_PALETTE[index % CHART_PALETTE.len()]
}

pub fn pie_slices(series: &[SeriesPoint]) -> Vec<PieSlice> {
    let total = series_total(series);
    series
        .iter()
        .enumerate()
        .map(|(i, point)| PieSlice {
            name: point.name.clone(),
            value: point.value,
            percent: if total == 0 {
                0.0
            } else {
                point.value as f64 / total as f64 * 100.0
            },
            color: slice_color(i),
        })
        .collect()
}

/// Bar lengths (in cells) proportional to the largest value, so the
/// longest bar spans `max_width`. Non-zero values always get at least one
/// cell.
pub fn bar_widths(series: &[SeriesPoint], max_width: usize) -> Vec<usize> {
    let max = series.iter().map(|p| p.value).max().unwrap_or(0);
    series
        .iter()
        .map(|p| {
            if max == 0 || p.value == 0 {
                0
            } else {
                let scaled = (p.value as f64 / max as f64 * max_width as f64).round() as usize;
                scaled.max(1)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

/// Qualitative band for a progress or attendance percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Medium,
    High,
}

/// High for `p >= 75`, Medium for `50 <= p < 75`, Low below 50.
///
/// Values are not clamped; anything that is not `>= 50` (including NaN)
/// is Low.
pub fn band(p: f64) -> Band {
    if p >= 75.0 {
        Band::High
    } else if p >= 50.0 {
        Band::Medium
    } else {
        Band::Low
    }
}

// ---------------------------------------------------------------------------
// Dashboard model
// ---------------------------------------------------------------------------

/// A headline counter on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

/// A program-performance row with its progress band resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    #[serde(flatten)]
    pub program: ProgramPerformance,
    pub progress_band: Band,
}

/// Everything the dashboard renders, derived from the two aggregate
/// endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub cards: Vec<StatCard>,
    pub status_series: Vec<SeriesPoint>,
    pub status_slices: Vec<PieSlice>,
    pub program_type_series: Vec<SeriesPoint>,
    pub performance: Vec<PerformanceRow>,
    pub recent_enrollments: Vec<Enrollment>,
}

impl Dashboard {
    pub fn build(stats: &DashboardStats, performance: &[ProgramPerformance]) -> Self {
        let status_series = to_series(&stats.enrollments_by_status);
        let status_slices = pie_slices(&status_series);

        Self {
            cards: stat_cards(stats),
            status_series,
            status_slices,
            program_type_series: to_series(&stats.enrollments_by_program_type),
            performance: performance
                .iter()
                .map(|p| PerformanceRow {
                    program: p.clone(),
                    progress_band: band(p.avg_progress),
                })
                .collect(),
            recent_enrollments: stats.recent_enrollments.clone(),
        }
    }
}

fn stat_cards(stats: &DashboardStats) -> Vec<StatCard> {
    vec![
        StatCard {
            title: "Active Participants",
            value: format_count(stats.total_participants),
        },
        StatCard {
            title: "Active Programs",
            value: stats.active_programs.to_string(),
        },
        StatCard {
            title: "Total Enrollments",
            value: format_count(stats.total_enrollments),
        },
        StatCard {
            title: "Completion Rate",
            value: format!("{}%", format_percent(stats.completion_rate)),
        },
    ]
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Format a count with comma separators: `12345` → `12,345`.
pub fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Format a percentage with at most two decimals and no trailing zeros:
/// `75.0` → `75`, `66.666` → `66.67`.
pub fn format_percent(p: f64) -> String {
    let s = format!("{p:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> CountMap {
        pairs.iter().map(|(l, c)| (*l, *c)).collect()
    }

    #[test]
    fn to_series_preserves_order_and_values() {
        let series = to_series(&counts(&[("Active", 3), ("Completed", 2)]));
        assert_eq!(
            series,
            vec![
                SeriesPoint { name: "Active".into(), value: 3 },
                SeriesPoint { name: "Completed".into(), value: 2 },
            ]
        );
        assert_eq!(series_total(&series), 5);
    }

    #[test]
    fn to_series_of_empty_mapping_is_empty() {
        assert!(to_series(&CountMap::new()).is_empty());
    }

    #[test]
    fn band_boundaries_are_exact() {
        assert_eq!(band(49.0), Band::Low);
        assert_eq!(band(49.99), Band::Low);
        assert_eq!(band(50.0), Band::Medium);
        assert_eq!(band(74.0), Band::Medium);
        assert_eq!(band(74.99), Band::Medium);
        assert_eq!(band(75.0), Band::High);
        assert_eq!(band(0.0), Band::Low);
        assert_eq!(band(100.0), Band::High);
    }

    #[test]
    fn band_nan_is_low() {
        assert_eq!(band(f64::NAN), Band::Low);
    }

    #[test]
    fn pie_slices_share_the_total() {
        let series = to_series(&counts(&[("Active", 3), ("Completed", 2)]));
        let slices = pie_slices(&series);
        assert_eq!(slices.len(), 2);
        assert!((slices[0].percent - 60.0).abs() < 1e-9);
        assert_eq!(slices[0].label(), "Active (60%)");
        assert_eq!(slices[1].label(), "Completed (40%)");
        assert_eq!(slices[0].color, "#dc143c");
        assert_eq!(slices[1].color, "#ff6b6b");
    }

    #[test]
    fn pie_slices_with_zero_total() {
        let series = to_series(&counts(&[("Dropped", 0)]));
        let slices = pie_slices(&series);
        assert_eq!(slices[0].percent, 0.0);
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(slice_color(5), slice_color(0));
        assert_eq!(slice_color(7), "#b22222");
    }

    #[test]
    fn bar_widths_scale_to_largest() {
        let series = to_series(&counts(&[("Workshop", 10), ("Masterclass", 5), ("x", 0), ("y", 1)]));
        assert_eq!(bar_widths(&series, 20), vec![20, 10, 0, 2]);
        assert_eq!(bar_widths(&[], 20), Vec::<usize>::new());
    }

    #[test]
    fn count_by_keeps_first_seen_order() {
        let statuses = ["Completed", "Active", "Completed", "In Progress"];
        let counts = count_by(&statuses, |s| *s);
        assert_eq!(
            counts.iter().collect::<Vec<_>>(),
            vec![("Completed", 2), ("Active", 1), ("In Progress", 1)]
        );
    }

    #[test]
    fn dashboard_build_example() {
        let stats = DashboardStats {
            total_participants: 12345,
            active_programs: 4,
            total_enrollments: 5,
            completion_rate: 40.0,
            enrollments_by_status: counts(&[("Active", 3), ("Completed", 2)]),
            enrollments_by_program_type: counts(&[("Workshop", 5)]),
            recent_enrollments: Vec::new(),
        };
        let perf = vec![ProgramPerformance {
            program_name: "Leadership Essentials".into(),
            avg_progress: 75.0,
            ..Default::default()
        }];
        let dash = Dashboard::build(&stats, &perf);

        assert_eq!(dash.cards[0].value, "12,345");
        assert_eq!(dash.cards[3].value, "40%");
        assert_eq!(dash.status_slices.len(), 2);
        assert_eq!(dash.status_slices.iter().map(|s| s.value).sum::<u64>(), 5);
        assert_eq!(dash.performance[0].progress_band, Band::High);
    }

    #[test]
    fn format_helpers() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_percent(75.0), "75");
        assert_eq!(format_percent(66.666), "66.67");
        assert_eq!(format_percent(62.5), "62.5");
        assert_eq!(format_percent(0.0), "0");
    }
}
