//! Records exchanged with the participant-tracking backend.
//!
//! All records are server-owned: the client only ever holds a transient copy
//! inside a view. Optional columns are `Option`, and numeric columns accept
//! either JSON numbers or numeric strings (SQL `DECIMAL` / `AVG` results are
//! frequently serialized as strings).

pub mod counts;
pub mod kinds;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub use counts::CountMap;
pub use kinds::{EnrollmentStatus, MilestoneType, ParticipantStatus, ProgramStatus, ProgramType};

/// A server-owned record type with its own REST collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send {
    /// Collection path segment, e.g. `"participants"`.
    const RESOURCE: &'static str;
    /// Singular human label used in alerts, e.g. `"participant"`.
    const LABEL: &'static str;
    /// Confirmation question asked before a delete.
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this record?";

    /// Server-assigned identity.
    fn id(&self) -> i64;
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    /// External human-readable code, e.g. `IL-2024-001`. Immutable once set.
    #[serde(default)]
    pub participant_id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub current_role: Option<String>,
    #[serde(default)]
    pub current_company: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_count")]
    pub years_of_experience: Option<u32>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub career_goal: Option<String>,
    #[serde(default)]
    pub enrollment_date: Option<String>,
    #[serde(default)]
    pub status: ParticipantStatus,
}

impl Entity for Participant {
    const RESOURCE: &'static str = "participants";
    const LABEL: &'static str = "participant";
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this participant?";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    #[serde(default)]
    pub program_name: String,
    #[serde(default)]
    pub program_type: ProgramType,
    #[serde(default, deserialize_with = "lenient::opt_count")]
    pub duration_weeks: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_count")]
    pub total_modules: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_count")]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProgramStatus,
}

impl Entity for Program {
    const RESOURCE: &'static str = "programs";
    const LABEL: &'static str = "program";
    const DELETE_PROMPT: &'static str = "Are you sure? This will delete all enrollments!";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    #[serde(default)]
    pub participant_id: Option<i64>,
    #[serde(default)]
    pub program_id: Option<i64>,
    /// Participant name, denormalized by the backend.
    #[serde(default)]
    pub full_name: String,
    /// Program name, denormalized by the backend.
    #[serde(default)]
    pub program_name: String,
    #[serde(default)]
    pub enrollment_date: Option<String>,
    #[serde(default)]
    pub status: EnrollmentStatus,
    #[serde(default, deserialize_with = "lenient::number")]
    pub overall_progress_percentage: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub attendance_percentage: f64,
    #[serde(default, deserialize_with = "lenient::small_count")]
    pub modules_completed: u32,
}

impl Entity for Enrollment {
    const RESOURCE: &'static str = "enrollments";
    const LABEL: &'static str = "enrollment";
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this enrollment?";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    #[serde(default)]
    pub participant_id: Option<i64>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub milestone_type: MilestoneType,
    #[serde(default)]
    pub milestone_title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub previous_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub percentage_increase: Option<f64>,
    #[serde(default)]
    pub achievement_date: Option<String>,
}

impl Entity for Milestone {
    const RESOURCE: &'static str = "milestones";
    const LABEL: &'static str = "milestone";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationStory {
    pub id: i64,
    #[serde(default)]
    pub participant_id: Option<i64>,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub program_name: String,
    #[serde(default)]
    pub story_title: String,
    #[serde(default)]
    pub story_content: String,
    #[serde(default)]
    pub before_snapshot: Option<String>,
    #[serde(default)]
    pub after_snapshot: Option<String>,
    #[serde(default)]
    pub key_learnings: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub featured: bool,
    #[serde(default)]
    pub published_date: Option<String>,
}

impl TransformationStory {
    /// Both halves of the before/after snapshot, only when both are present.
    pub fn snapshot_pair(&self) -> Option<(&str, &str)> {
        match (non_blank(&self.before_snapshot), non_blank(&self.after_snapshot)) {
            (Some(before), Some(after)) => Some((before, after)),
            _ => None,
        }
    }
}

impl Entity for TransformationStory {
    const RESOURCE: &'static str = "transformation-stories";
    const LABEL: &'static str = "story";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Milestone {
    /// The previous → new value pair, only when both are present.
    pub fn value_change(&self) -> Option<(&str, &str)> {
        match (non_blank(&self.previous_value), non_blank(&self.new_value)) {
            (Some(prev), Some(new)) => Some((prev, new)),
            _ => None,
        }
    }
}

/// Treat `None` and whitespace-only strings alike.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Server-computed aggregates
// ---------------------------------------------------------------------------

/// `GET /dashboard/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_participants: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub active_programs: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_enrollments: u64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub completion_rate: f64,
    #[serde(default)]
    pub enrollments_by_status: CountMap,
    #[serde(default)]
    pub enrollments_by_program_type: CountMap,
    #[serde(default)]
    pub recent_enrollments: Vec<Enrollment>,
}

/// One row of `GET /dashboard/program-performance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramPerformance {
    #[serde(default)]
    pub program_name: String,
    #[serde(default)]
    pub program_type: ProgramType,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_enrollments: u64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub avg_progress: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub avg_attendance: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub completions: u64,
}

// ---------------------------------------------------------------------------
// Lenient numeric decoding
// ---------------------------------------------------------------------------

pub(crate) mod lenient {
    use super::*;
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Bool(bool),
        Text(String),
    }

    fn read<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Number(n)) => Ok(Some(n)),
            Some(Raw::Bool(b)) => Ok(Some(if b { 1.0 } else { 0.0 })),
            Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Raw::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(read(d)?.unwrap_or(0.0))
    }

    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        read(d)
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(read(d)?.map(|n| n.max(0.0).round() as u64).unwrap_or(0))
    }

    pub fn small_count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(read(d)?.map(|n| n.max(0.0).round() as u32).unwrap_or(0))
    }

    pub fn opt_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(read(d)?.map(|n| n.max(0.0).round() as u32))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(read(d)?.is_some_and(|n| n != 0.0))
    }

    /// A count read the same way as [`count`], for use inside collections.
    #[derive(Deserialize)]
    pub struct Count(#[serde(deserialize_with = "count")] pub u64);
}
