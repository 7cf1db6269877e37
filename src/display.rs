//! Presentation lookups: status badges, milestone icons, band colours and
//! value formatting.
//!
//! All lookups are exhaustive matches over the closed label types; unknown
//! labels land on a neutral default instead of failing.

use chrono::NaiveDate;

use crate::aggregate::Band;
use crate::models::{EnrollmentStatus, MilestoneType, ParticipantStatus, ProgramStatus};

/// Colour family of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Progress,
    Pending,
    Negative,
    Neutral,
}

pub fn participant_tone(status: &ParticipantStatus) -> Tone {
    match status {
        ParticipantStatus::Active => Tone::Positive,
        ParticipantStatus::Completed => Tone::Progress,
        ParticipantStatus::Inactive => Tone::Negative,
        ParticipantStatus::Other(_) => Tone::Neutral,
    }
}

pub fn program_tone(status: &ProgramStatus) -> Tone {
    match status {
        ProgramStatus::Active => Tone::Positive,
        ProgramStatus::Upcoming => Tone::Pending,
        ProgramStatus::Completed => Tone::Progress,
        ProgramStatus::Cancelled => Tone::Negative,
        ProgramStatus::Other(_) => Tone::Neutral,
    }
}

pub fn enrollment_tone(status: &EnrollmentStatus) -> Tone {
    match status {
        EnrollmentStatus::Active | EnrollmentStatus::InProgress => Tone::Progress,
        EnrollmentStatus::Enrolled => Tone::Pending,
        EnrollmentStatus::Completed => Tone::Positive,
        EnrollmentStatus::Dropped => Tone::Negative,
        EnrollmentStatus::Other(_) => Tone::Neutral,
    }
}

/// Icon shown next to a milestone.
pub fn milestone_icon(kind: &MilestoneType) -> &'static str {
    match kind {
        MilestoneType::Promotion => "🚀",
        MilestoneType::SalaryIncrease => "💰",
        MilestoneType::JobChange => "🔄",
        MilestoneType::LeadershipRole => "👑",
        MilestoneType::BoardPosition => "🏆",
        MilestoneType::BusinessGrowth => "📈",
        MilestoneType::Award => "🏅",
        MilestoneType::Other | MilestoneType::Unknown(_) => "⭐",
    }
}

/// Fill colour of an enrollment progress bar.
pub fn progress_color(band: Band) -> &'static str {
    match band {
        Band::High => "#27ae60",
        Band::Medium => "#f39c12",
        Band::Low => "#e74c3c",
    }
}

/// Fill colour of a program-performance progress bar.
pub fn performance_color(band: Band) -> &'static str {
    match band {
        Band::High => "#8b0000",
        Band::Medium => "#dc143c",
        Band::Low => "#ff6b6b",
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render an ISO date (or datetime) as `M/D/YYYY`. Anything unparseable is
/// returned verbatim; a missing date renders as `-`.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "-".to_string();
    };
    let day = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => date.format("%-m/%-d/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Price in rupees with thousands separators: `45000.0` → `₹45,000`.
pub fn format_currency(amount: Option<f64>) -> String {
    let Some(amount) = amount else {
        return "-".to_string();
    };
    let whole = amount.trunc().abs() as u64;
    let cents = ((amount.abs() - amount.abs().trunc()) * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    let grouped = crate::aggregate::format_count(whole);
    if cents == 0 {
        format!("{sign}₹{grouped}")
    } else {
        format!("{sign}₹{grouped}.{cents:02}")
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("-")
}
