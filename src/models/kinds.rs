//! Closed label types for the backend's enum-valued fields.
//!
//! The backend sends these as free strings. Each type parses known labels
//! case-insensitively and keeps anything else in an `Other` arm, so an
//! unexpected value renders with a default style instead of failing the
//! whole response. Serialization writes the canonical label back.
use std::fmt;

use serde::{Deserialize, Serialize};

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Participant status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ParticipantStatus {
    #[default]
    Active,
    Inactive,
    Completed,
    Other(String),
}

impl ParticipantStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Completed => "Completed",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ParticipantStatus {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            "completed" => Self::Completed,
            _ => Self::Other(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Program type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ProgramType {
    LeadershipEssentials,
    BoardMembers,
    BusinessWarfare,
    Masterclass,
    Workshop,
    Other(String),
}

impl ProgramType {
    /// Known program types, in the order the program form offers them.
    pub const OPTIONS: [&'static str; 5] = [
        "Leadership Essentials",
        "100 Board Members",
        "Master of Business Warfare",
        "Masterclass",
        "Workshop",
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::LeadershipEssentials => Self::OPTIONS[0],
            Self::BoardMembers => Self::OPTIONS[1],
            Self::BusinessWarfare => Self::OPTIONS[2],
            Self::Masterclass => Self::OPTIONS[3],
            Self::Workshop => Self::OPTIONS[4],
            Self::Other(raw) => raw,
        }
    }
}

impl Default for ProgramType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ProgramType {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "leadership essentials" => Self::LeadershipEssentials,
            "100 board members" => Self::BoardMembers,
            "master of business warfare" => Self::BusinessWarfare,
            "masterclass" => Self::Masterclass,
            "workshop" => Self::Workshop,
            _ => Self::Other(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Program status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ProgramStatus {
    #[default]
    Upcoming,
    Active,
    Completed,
    Cancelled,
    Other(String),
}

impl ProgramStatus {
    pub const OPTIONS: [&'static str; 4] = ["Upcoming", "Active", "Completed", "Cancelled"];

    pub fn label(&self) -> &str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ProgramStatus {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "upcoming" => Self::Upcoming,
            "active" => Self::Active,
            "completed" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Enrollment status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum EnrollmentStatus {
    #[default]
    Enrolled,
    Active,
    InProgress,
    Completed,
    Dropped,
    Other(String),
}

impl EnrollmentStatus {
    pub const OPTIONS: [&'static str; 5] =
        ["Enrolled", "Active", "In Progress", "Completed", "Dropped"];

    pub fn label(&self) -> &str {
        match self {
            Self::Enrolled => "Enrolled",
            Self::Active => "Active",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Dropped => "Dropped",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for EnrollmentStatus {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "enrolled" => Self::Enrolled,
            "active" => Self::Active,
            "in progress" | "in-progress" | "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "dropped" => Self::Dropped,
            _ => Self::Other(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Milestone type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum MilestoneType {
    Promotion,
    SalaryIncrease,
    JobChange,
    LeadershipRole,
    BoardPosition,
    BusinessGrowth,
    Award,
    #[default]
    Other,
    Unknown(String),
}

impl MilestoneType {
    pub const OPTIONS: [&'static str; 8] = [
        "Promotion",
        "Salary Increase",
        "Job Change",
        "Leadership Role",
        "Board Position",
        "Business Growth",
        "Award",
        "Other",
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::Promotion => "Promotion",
            Self::SalaryIncrease => "Salary Increase",
            Self::JobChange => "Job Change",
            Self::LeadershipRole => "Leadership Role",
            Self::BoardPosition => "Board Position",
            Self::BusinessGrowth => "Business Growth",
            Self::Award => "Award",
            Self::Other => "Other",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for MilestoneType {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "promotion" => Self::Promotion,
            "salary increase" => Self::SalaryIncrease,
            "job change" => Self::JobChange,
            "leadership role" => Self::LeadershipRole,
            "board position" => Self::BoardPosition,
            "business growth" => Self::BusinessGrowth,
            "award" => Self::Award,
            "other" => Self::Other,
            _ => Self::Unknown(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared conversions
// ---------------------------------------------------------------------------

macro_rules! label_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<Option<String>> for $ty {
                fn from(raw: Option<String>) -> Self {
                    raw.map(Self::from).unwrap_or_default()
                }
            }

            impl From<$ty> for String {
                fn from(kind: $ty) -> String {
                    kind.label().to_string()
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

label_conversions!(
    ParticipantStatus,
    ProgramType,
    ProgramStatus,
    EnrollmentStatus,
    MilestoneType,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(ParticipantStatus::from("ACTIVE".to_string()), ParticipantStatus::Active);
        assert_eq!(
            EnrollmentStatus::from("in progress".to_string()),
            EnrollmentStatus::InProgress
        );
        assert_eq!(
            ProgramType::from("master of business warfare".to_string()),
            ProgramType::BusinessWarfare
        );
    }

    #[test]
    fn unknown_labels_are_preserved() {
        let status = ProgramStatus::from("Paused".to_string());
        assert_eq!(status, ProgramStatus::Other("Paused".to_string()));
        assert_eq!(status.label(), "Paused");

        let kind = MilestoneType::from("Keynote".to_string());
        assert_eq!(kind.label(), "Keynote");
    }

    #[test]
    fn serde_round_trips_through_labels() {
        let status: EnrollmentStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(status, EnrollmentStatus::InProgress);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"In Progress\"");
    }

    #[test]
    fn null_falls_back_to_default() {
        let status: ParticipantStatus = serde_json::from_str("null").unwrap();
        assert_eq!(status, ParticipantStatus::Active);
        let kind: MilestoneType = serde_json::from_str("null").unwrap();
        assert_eq!(kind, MilestoneType::Other);
    }

    #[test]
    fn options_parse_to_known_variants() {
        for label in ProgramType::OPTIONS {
            assert!(!matches!(ProgramType::from(label.to_string()), ProgramType::Other(_)));
        }
        for label in MilestoneType::OPTIONS {
            assert!(!matches!(
                MilestoneType::from(label.to_string()),
                MilestoneType::Unknown(_)
            ));
        }
    }
}
