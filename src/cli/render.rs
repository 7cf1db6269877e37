//! Terminal rendering: colored tables, stat cards, bar charts, CSV.
use colored::{ColoredString, Colorize};
use serde_json::Value;

use crate::aggregate::{
    Band, PerformanceRow, PieSlice, SeriesPoint, StatCard, band, bar_widths, count_by,
    format_percent,
};
use crate::display::{self, Tone};
use crate::models::{
    CountMap, Enrollment, Milestone, Participant, Program, TransformationStory, non_blank,
};

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Bold,
    Dim,
    Tone(Tone),
    /// A percentage colored by its band.
    Progress(Band),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub style: Style,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::Plain,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::Bold,
        }
    }

    pub fn dim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::Dim,
        }
    }

    pub fn tone(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            style: Style::Tone(tone),
        }
    }

    pub fn percent(p: f64) -> Self {
        Self {
            text: format!("{}%", format_percent(p)),
            style: Style::Progress(band(p)),
        }
    }

    fn paint(&self, padded: String) -> ColoredString {
        match self.style {
            Style::Plain => padded.normal(),
            Style::Bold => padded.bold(),
            Style::Dim => padded.dimmed(),
            Style::Tone(tone) => paint_tone(&padded, tone),
            Style::Progress(band) => paint_hex(&padded, display::progress_color(band)),
        }
    }
}

fn paint_tone(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Positive => text.green(),
        Tone::Progress => text.blue(),
        Tone::Pending => text.yellow(),
        Tone::Negative => text.red(),
        Tone::Neutral => text.normal(),
    }
}

/// Color text with a `#rrggbb` code; malformed codes leave it plain.
pub fn paint_hex(text: &str, hex: &str) -> ColoredString {
    match parse_hex(hex) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

// ---------------------------------------------------------------------------
// Tabular entities
// ---------------------------------------------------------------------------

/// A record that renders as one table row.
pub trait Tabular {
    /// Plural heading, e.g. `Participants`.
    const TITLE: &'static str;

    fn headers() -> Vec<&'static str>;
    fn cells(&self) -> Vec<Cell>;

    /// Per-category counts printed under the table.
    fn summary(_rows: &[Self]) -> Option<CountMap>
    where
        Self: Sized,
    {
        None
    }
}

impl Tabular for Participant {
    const TITLE: &'static str = "Participants";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "Code", "Name", "Email", "Role", "Company", "Exp", "Status"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::dim(self.id.to_string()),
            Cell::plain(&self.participant_id),
            Cell::bold(&self.full_name),
            Cell::plain(&self.email),
            Cell::plain(display::or_dash(self.current_role.as_deref())),
            Cell::plain(display::or_dash(self.current_company.as_deref())),
            Cell::plain(
                self.years_of_experience
                    .map(|y| format!("{y} yrs"))
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::tone(self.status.label(), display::participant_tone(&self.status)),
        ]
    }
}

impl Tabular for Program {
    const TITLE: &'static str = "Programs";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "Program", "Type", "Weeks", "Modules", "Price", "Start", "Status"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::dim(self.id.to_string()),
            Cell::bold(&self.program_name),
            Cell::plain(self.program_type.label()),
            Cell::plain(opt_num(self.duration_weeks)),
            Cell::plain(opt_num(self.total_modules)),
            Cell::plain(display::format_currency(self.price)),
            Cell::plain(display::format_date(self.start_date.as_deref())),
            Cell::tone(self.status.label(), display::program_tone(&self.status)),
        ]
    }
}

impl Tabular for Enrollment {
    const TITLE: &'static str = "Enrollments";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "Participant", "Program", "Enrolled", "Status", "Progress", "Attendance", "Modules"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::dim(self.id.to_string()),
            Cell::bold(&self.full_name),
            Cell::plain(&self.program_name),
            Cell::plain(display::format_date(self.enrollment_date.as_deref())),
            Cell::tone(self.status.label(), display::enrollment_tone(&self.status)),
            Cell::percent(self.overall_progress_percentage),
            Cell::plain(format!("{}%", format_percent(self.attendance_percentage))),
            Cell::plain(self.modules_completed.to_string()),
        ]
    }

    fn summary(rows: &[Self]) -> Option<CountMap> {
        Some(count_by(rows, |e| e.status.label().to_string()))
    }
}

impl Tabular for Milestone {
    const TITLE: &'static str = "Career Milestones";

    fn headers() -> Vec<&'static str> {
        vec!["", "Title", "Participant", "Type", "Change", "Increase", "Date"]
    }

    fn cells(&self) -> Vec<Cell> {
        let change = self
            .value_change()
            .map(|(prev, new)| format!("{prev} → {new}"))
            .unwrap_or_else(|| "-".into());
        vec![
            Cell::plain(display::milestone_icon(&self.milestone_type)),
            Cell::bold(&self.milestone_title),
            Cell::plain(&self.full_name),
            Cell::plain(self.milestone_type.label()),
            Cell::plain(change),
            match self.percentage_increase {
                Some(p) => Cell::tone(format!("+{}%", format_percent(p)), Tone::Positive),
                None => Cell::dim("-"),
            },
            Cell::plain(display::format_date(self.achievement_date.as_deref())),
        ]
    }
}

impl Tabular for TransformationStory {
    const TITLE: &'static str = "Success Stories";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "Title", "Participant", "Program", "Featured", "Published"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::dim(self.id.to_string()),
            Cell::bold(&self.story_title),
            Cell::plain(&self.full_name),
            Cell::plain(&self.program_name),
            if self.featured {
                Cell::tone("⭐ Featured", Tone::Pending)
            } else {
                Cell::dim("-")
            },
            Cell::plain(display::format_date(self.published_date.as_deref())),
        ]
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Records with long-form text that a table row cannot hold.
pub trait Card {
    /// Heading line.
    fn heading(&self) -> String;
    /// Body lines under the heading, blank sections omitted.
    fn body(&self) -> Vec<String>;
}

impl Card for Milestone {
    fn heading(&self) -> String {
        format!("{} {}", display::milestone_icon(&self.milestone_type), self.milestone_title)
    }

    fn body(&self) -> Vec<String> {
        let mut lines = vec![byline(&[
            &self.full_name,
            self.milestone_type.label(),
            &display::format_date(self.achievement_date.as_deref()),
        ])];
        if let Some(description) = non_blank(&self.description) {
            lines.push(description.to_string());
        }
        if let Some((prev, new)) = self.value_change() {
            let increase = self
                .percentage_increase
                .map(|p| format!(" (+{}%)", format_percent(p)))
                .unwrap_or_default();
            lines.push(format!("{prev} → {new}{increase}"));
        }
        lines
    }
}

impl Card for TransformationStory {
    fn heading(&self) -> String {
        if self.featured {
            format!("{} ⭐", self.story_title)
        } else {
            self.story_title.clone()
        }
    }

    fn body(&self) -> Vec<String> {
        let mut lines = vec![byline(&[
            &self.full_name,
            &self.program_name,
            &display::format_date(self.published_date.as_deref()),
        ])];
        if !self.story_content.trim().is_empty() {
            lines.push(self.story_content.trim().to_string());
        }
        if let Some((before, after)) = self.snapshot_pair() {
            lines.push(format!("Before: {before}"));
            lines.push(format!("After: {after}"));
        }
        if let Some(learnings) = non_blank(&self.key_learnings) {
            lines.push(format!("Key learnings: {learnings}"));
        }
        lines
    }
}

fn byline(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && *p != "-")
        .collect::<Vec<_>>()
        .join(" · ")
}

pub fn print_card<T: Card>(record: &T) {
    println!("{}", record.heading().bold());
    for (i, line) in record.body().iter().enumerate() {
        if i == 0 {
            println!("  {}", line.dimmed());
        } else {
            println!("  {line}");
        }
    }
}

pub fn print_card_list<T: Card + Tabular>(records: &[T]) {
    println!("{}", T::TITLE.bold().cyan());
    println!("{}", "=".repeat(50));
    for record in records {
        print_card(record);
        println!();
    }
}

impl Tabular for PerformanceRow {
    const TITLE: &'static str = "Program Performance";

    fn headers() -> Vec<&'static str> {
        vec!["Program", "Type", "Enrollments", "Avg Progress", "Attendance", "Completions"]
    }

    fn cells(&self) -> Vec<Cell> {
        let p = &self.program;
        vec![
            Cell::bold(&p.program_name),
            Cell::plain(p.program_type.label()),
            Cell::plain(p.total_enrollments.to_string()),
            Cell {
                text: format!("{}%", format_percent(p.avg_progress)),
                style: Style::Progress(self.progress_band),
            },
            Cell::plain(format!("{}%", format_percent(p.avg_attendance))),
            Cell::plain(p.completions.to_string()),
        ]
    }
}

fn opt_num(n: Option<u32>) -> String {
    n.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Print a titled, column-aligned table.
pub fn print_table(title: &str, headers: &[&str], rows: &[Vec<Cell>]) {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(60));

    let widths = column_widths(headers, rows);
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    println!("  {}", header_line.join("  ").bold());
    println!("  {}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| cell.paint(pad(&truncate(&cell.text, MAX_COLUMN), *w)).to_string())
            .collect();
        println!("  {}", line.join("  "));
    }
}

pub fn print_tabular<T: Tabular>(rows: &[T]) {
    let cells: Vec<Vec<Cell>> = rows.iter().map(T::cells).collect();
    print_table(
        &format!("{} ({})", T::TITLE, rows.len()),
        &T::headers(),
        &cells,
    );

    if let Some(summary) = T::summary(rows)
        && !summary.is_empty()
    {
        let parts: Vec<String> = summary
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect();
        println!();
        println!("  {}", parts.join("  ·  ").dimmed());
    }
}

pub fn print_csv<T: Tabular>(rows: &[T]) {
    println!("{}", T::headers().iter().map(|h| csv_escape(h)).collect::<Vec<_>>().join(","));
    for row in rows {
        let line: Vec<String> = row.cells().iter().map(|c| csv_escape(&c.text)).collect();
        println!("{}", line.join(","));
    }
}

/// Key/value listing of one record, in field order.
pub fn print_record(title: &str, value: &Value) {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(50));
    let Value::Object(fields) = value else {
        println!("  {value}");
        return;
    };
    let width = fields.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    for (key, value) in fields {
        let text = match value {
            Value::Null => "-".to_string(),
            Value::String(s) if s.is_empty() => "-".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("  {} {}", format!("{}:", pad(key, width)).bold(), text);
    }
}

const MAX_COLUMN: usize = 32;

fn column_widths(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.text.chars().count().min(MAX_COLUMN);
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(len);
            }
        }
    }
    widths
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

/// Truncate to `max_len` characters, appending "…" if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

pub fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ---------------------------------------------------------------------------
// Dashboard pieces
// ---------------------------------------------------------------------------

pub fn print_cards(cards: &[StatCard]) {
    let line: Vec<String> = cards
        .iter()
        .map(|c| format!("{} {}", format!("{}:", c.title).dimmed(), c.value.bold()))
        .collect();
    println!("  {}", line.join("   "));
}

/// Pie chart as a legend: swatch, label with share, count.
pub fn print_slices(slices: &[PieSlice]) {
    if slices.is_empty() {
        println!("  {}", "No enrollments yet.".dimmed());
        return;
    }
    for slice in slices {
        println!(
            "  {} {:<28} {:>6}",
            paint_hex("●", slice.color),
            slice.label(),
            slice.value
        );
    }
}

/// Horizontal bar chart scaled so the largest value spans `width` cells.
pub fn print_bars(series: &[SeriesPoint], width: usize) {
    if series.is_empty() {
        println!("  {}", "No data.".dimmed());
        return;
    }
    let label_width = series
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN);
    for (point, cells) in series.iter().zip(bar_widths(series, width)) {
        println!(
            "  {} {} {}",
            pad(&truncate(&point.name, MAX_COLUMN), label_width),
            paint_hex(&"█".repeat(cells), crate::aggregate::CHART_PALETTE[0]),
            point.value
        );
    }
}

/// Average progress per program, each bar shaded by its band.
pub fn print_progress_bars(rows: &[PerformanceRow], width: usize) {
    let label_width = rows
        .iter()
        .map(|r| r.program.program_name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN);
    for row in rows {
        let p = &row.program;
        let cells = ((p.avg_progress.max(0.0) / 100.0) * width as f64).round() as usize;
        println!(
            "  {} {} {}%",
            pad(&truncate(&p.program_name, MAX_COLUMN), label_width),
            paint_hex(&"█".repeat(cells), display::performance_color(row.progress_band)),
            format_percent(p.avg_progress)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_card_shows_content_snapshots_and_learnings() {
        let story = TransformationStory {
            id: 1,
            full_name: "Asha Rao".into(),
            program_name: "100 Board Members".into(),
            story_title: "From manager to director".into(),
            story_content: "I stopped waiting to be noticed.".into(),
            before_snapshot: Some("Senior Manager".into()),
            after_snapshot: Some("Director".into()),
            key_learnings: Some("Ask for the role".into()),
            featured: true,
            ..Default::default()
        };
        assert_eq!(story.heading(), "From manager to director ⭐");
        assert_eq!(
            story.body(),
            vec![
                "Asha Rao · 100 Board Members",
                "I stopped waiting to be noticed.",
                "Before: Senior Manager",
                "After: Director",
                "Key learnings: Ask for the role",
            ]
        );
    }

    #[test]
    fn story_card_skips_half_snapshot() {
        let story = TransformationStory {
            story_title: "Story".into(),
            before_snapshot: Some("Analyst".into()),
            ..Default::default()
        };
        assert!(story.body().iter().all(|l| !l.starts_with("Before")));
    }

    #[test]
    fn milestone_card_shows_description_and_change() {
        let milestone = Milestone {
            id: 2,
            full_name: "Meera Iyer".into(),
            milestone_title: "Promoted to VP".into(),
            description: Some("Leads a 40-person org".into()),
            previous_value: Some("Director".into()),
            new_value: Some("VP".into()),
            percentage_increase: Some(35.0),
            achievement_date: Some("2024-03-05".into()),
            ..Default::default()
        };
        let body = milestone.body();
        assert!(body[0].starts_with("Meera Iyer · "));
        assert!(body[0].ends_with("3/5/2024"));
        assert_eq!(body[1], "Leads a 40-person org");
        assert_eq!(body[2], "Director → VP (+35%)");
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("₹45,000", 7), "₹45,000");
    }

    #[test]
    fn csv_escaping() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex("#dc143c"), Some((0xdc, 0x14, 0x3c)));
        assert_eq!(parse_hex("dc143c"), None);
        assert_eq!(parse_hex("#fff"), None);
    }

    #[test]
    fn enrollment_cells_band_progress() {
        let e = Enrollment {
            overall_progress_percentage: 74.0,
            ..Default::default()
        };
        let cells = e.cells();
        assert_eq!(cells.len(), Enrollment::headers().len());
        assert_eq!(cells[5].text, "74%");
        assert_eq!(cells[5].style, Style::Progress(Band::Medium));
    }

    #[test]
    fn column_widths_cover_headers_and_cells() {
        let rows = vec![vec![Cell::plain("abc"), Cell::plain("x".repeat(50))]];
        assert_eq!(column_widths(&["ID", "Name"], &rows), vec![3, MAX_COLUMN]);
    }
}
