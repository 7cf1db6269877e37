//! Entity forms: static field specs, prefill, validation and submission.
//!
//! A [`FormSession`] is either unbound (create) or bound to one entity
//! (edit). Submitting collects the form's fields from flat `key=value`
//! input, validates them, and sends a create or an update through the
//! list view, which then refreshes itself. Invalid input never reaches
//! the backend.

use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;
use crate::models::{
    Enrollment, EnrollmentStatus, Entity, Milestone, MilestoneType, Participant, Program,
    ProgramStatus, ProgramType, TransformationStory,
};
use crate::view::{ListView, MutationOutcome};

// ---------------------------------------------------------------------------
// Form data
// ---------------------------------------------------------------------------

/// Ordered field → JSON value payload. Serializes as a JSON object in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormData {
    entries: IndexMap<String, Value>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Free-form payload: numbers and booleans are sent typed, everything
    /// else as the string given.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut data = Self::new();
        for (key, raw) in pairs {
            data.insert(key.clone(), loose_value(raw));
        }
        data
    }
}

fn loose_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = trimmed.parse::<f64>()
        && f.is_finite()
    {
        return Value::from(f);
    }
    match trimmed {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Field specs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    /// Whole number.
    Number,
    Decimal,
    /// `YYYY-MM-DD`.
    Date,
    TextArea,
    Select(&'static [&'static str]),
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    None,
    Today,
    Value(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Shown but not editable once the entity exists.
    pub immutable_on_edit: bool,
    /// Only part of the create form.
    pub create_only: bool,
    pub default: FieldDefault,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            immutable_on_edit: false,
            create_only: false,
            default: FieldDefault::None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn immutable(mut self) -> Self {
        self.immutable_on_edit = true;
        self
    }

    const fn create_only(mut self) -> Self {
        self.create_only = true;
        self
    }

    const fn default_to(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }

    pub fn default_value(&self) -> String {
        match self.default {
            FieldDefault::None => String::new(),
            FieldDefault::Today => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            FieldDefault::Value(v) => v.to_string(),
        }
    }

    /// Whether the field is part of the form in the given mode.
    pub fn visible(&self, editing: bool) -> bool {
        !(editing && self.create_only)
    }

    /// Whether the field's value is sent in the given mode.
    pub fn submitted(&self, editing: bool) -> bool {
        self.visible(editing) && !(editing && self.immutable_on_edit)
    }
}

/// The fields of one entity's form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSpec {
    /// Singular entity label used in alerts.
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An entity with a create/edit form.
pub trait HasForm: Entity {
    const FORM: FormSpec;
}

use FieldKind::*;

impl HasForm for Participant {
    const FORM: FormSpec = FormSpec {
        entity: Participant::LABEL,
        fields: &[
            FieldSpec::new("participant_id", "Participant ID", Text).required().immutable(),
            FieldSpec::new("full_name", "Full Name", Text).required(),
            FieldSpec::new("email", "Email", Email).required(),
            FieldSpec::new("phone", "Phone", Text),
            FieldSpec::new("current_role", "Current Role", Text),
            FieldSpec::new("current_company", "Current Company", Text),
            FieldSpec::new("years_of_experience", "Years of Experience", Number),
            FieldSpec::new("industry", "Industry", Text),
            FieldSpec::new("career_goal", "Career Goal", TextArea),
            FieldSpec::new("enrollment_date", "Enrollment Date", Date)
                .required()
                .create_only()
                .default_to(FieldDefault::Today),
        ],
    };
}

impl HasForm for Program {
    const FORM: FormSpec = FormSpec {
        entity: Program::LABEL,
        fields: &[
            FieldSpec::new("program_name", "Program Name", Text).required(),
            FieldSpec::new("program_type", "Program Type", Select(&ProgramType::OPTIONS)).required(),
            FieldSpec::new("status", "Status", Select(&ProgramStatus::OPTIONS))
                .required()
                .default_to(FieldDefault::Value("Upcoming")),
            FieldSpec::new("duration_weeks", "Duration (Weeks)", Number).required(),
            FieldSpec::new("total_modules", "Total Modules", Number).required(),
            FieldSpec::new("price", "Price (₹)", Decimal),
            FieldSpec::new("max_participants", "Max Participants", Number),
            FieldSpec::new("start_date", "Start Date", Date).required(),
            FieldSpec::new("end_date", "End Date", Date),
            FieldSpec::new("description", "Description", TextArea),
        ],
    };
}

impl HasForm for Enrollment {
    const FORM: FormSpec = FormSpec {
        entity: Enrollment::LABEL,
        fields: &[
            FieldSpec::new("participant_id", "Participant", Number).required().immutable(),
            FieldSpec::new("program_id", "Program", Number).required().immutable(),
            FieldSpec::new("enrollment_date", "Enrollment Date", Date)
                .required()
                .default_to(FieldDefault::Today),
            FieldSpec::new("status", "Status", Select(&EnrollmentStatus::OPTIONS))
                .default_to(FieldDefault::Value("Enrolled")),
            FieldSpec::new("overall_progress_percentage", "Progress (%)", Decimal),
            FieldSpec::new("attendance_percentage", "Attendance (%)", Decimal),
            FieldSpec::new("modules_completed", "Modules Completed", Number),
        ],
    };
}

impl HasForm for Milestone {
    const FORM: FormSpec = FormSpec {
        entity: Milestone::LABEL,
        fields: &[
            FieldSpec::new("participant_id", "Participant", Number).required().immutable(),
            FieldSpec::new("milestone_type", "Milestone Type", Select(&MilestoneType::OPTIONS))
                .required()
                .default_to(FieldDefault::Value("Other")),
            FieldSpec::new("milestone_title", "Title", Text).required(),
            FieldSpec::new("description", "Description", TextArea),
            FieldSpec::new("previous_value", "Previous Value", Text),
            FieldSpec::new("new_value", "New Value", Text),
            FieldSpec::new("percentage_increase", "Increase (%)", Decimal),
            FieldSpec::new("achievement_date", "Achievement Date", Date)
                .required()
                .default_to(FieldDefault::Today),
        ],
    };
}

impl HasForm for TransformationStory {
    const FORM: FormSpec = FormSpec {
        entity: TransformationStory::LABEL,
        fields: &[
            FieldSpec::new("participant_id", "Participant", Number).required().immutable(),
            FieldSpec::new("program_id", "Program", Number).immutable(),
            FieldSpec::new("story_title", "Story Title", Text).required(),
            FieldSpec::new("story_content", "Story", TextArea).required(),
            FieldSpec::new("before_snapshot", "Before", TextArea),
            FieldSpec::new("after_snapshot", "After", TextArea),
            FieldSpec::new("key_learnings", "Key Learnings", TextArea),
            FieldSpec::new("featured", "Featured", Checkbox),
            FieldSpec::new("published_date", "Published", Date).default_to(FieldDefault::Today),
        ],
    };
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{label} is required")]
    Missing { label: &'static str },

    #[error("{label}: {reason} (got {value:?})")]
    Invalid {
        label: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("unknown field '{name}' for {entity}")]
    UnknownField { entity: &'static str, name: String },

    #[error("Failed to save {entity}")]
    Save {
        entity: &'static str,
        #[source]
        source: ApiError,
    },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(MutationOutcome),
    Updated(MutationOutcome),
}

/// An open create or edit form.
#[derive(Debug, Clone)]
pub struct FormSession<T: HasForm> {
    editing: Option<T>,
    open: bool,
}

impl<T: HasForm> FormSession<T> {
    pub fn open_create() -> Self {
        Self {
            editing: None,
            open: true,
        }
    }

    pub fn open_edit(entity: T) -> Self {
        Self {
            editing: Some(entity),
            open: true,
        }
    }

    pub fn spec(&self) -> FormSpec {
        T::FORM
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Fields shown in the current mode.
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> + use<T> {
        let editing = self.is_editing();
        T::FORM.fields.iter().filter(move |f| f.visible(editing))
    }

    /// Initial value of every visible field: the bound entity's values when
    /// editing, the field defaults when creating.
    pub fn prefill(&self) -> Vec<(&'static str, String)> {
        let current = self
            .editing
            .as_ref()
            .and_then(|entity| serde_json::to_value(entity).ok());

        self.fields()
            .map(|field| {
                let value = match &current {
                    Some(Value::Object(obj)) => obj
                        .get(field.name)
                        .map(|v| render(field, v))
                        .unwrap_or_default(),
                    _ => field.default_value(),
                };
                (field.name, value)
            })
            .collect()
    }

    /// Build the payload from `input` laid over the prefill. Only values
    /// present in `input` (and create defaults) are validated.
    ///
    /// Read-only and hidden fields in `input` are dropped; names outside
    /// the form are rejected.
    pub fn collect(&self, input: &[(String, String)]) -> Result<FormData, FormError> {
        let editing = self.is_editing();
        for (name, _) in input {
            if T::FORM.field(name).is_none() {
                return Err(FormError::UnknownField {
                    entity: T::FORM.entity,
                    name: name.clone(),
                });
            }
        }

        // On edit, values not in `input` are sent back exactly as stored.
        let current = match &self.editing {
            Some(entity) => match serde_json::to_value(entity) {
                Ok(Value::Object(obj)) => Some(obj),
                _ => None,
            },
            None => None,
        };

        let mut data = FormData::new();
        for field in self.fields() {
            if !field.submitted(editing) {
                continue;
            }
            let supplied = input
                .iter()
                .rev()
                .find(|(k, _)| k == field.name)
                .map(|(_, v)| v.as_str());

            let value = match (supplied, &current) {
                (Some(raw), _) => parse_field(field, raw)?,
                (None, Some(obj)) => obj.get(field.name).cloned().unwrap_or(Value::Null),
                (None, None) => parse_field(field, &field.default_value())?,
            };
            data.insert(field.name, value);
        }
        Ok(data)
    }

    /// Validate and send. Success closes the form and refreshes `view`;
    /// any error leaves the form open.
    pub fn submit(
        &mut self,
        view: &mut ListView<'_, T>,
        input: &[(String, String)],
    ) -> Result<SubmitOutcome, FormError> {
        let data = self.collect(input)?;

        let result = match &self.editing {
            Some(entity) => view.update(entity.id(), &data).map(SubmitOutcome::Updated),
            None => view.create(&data).map(SubmitOutcome::Created),
        };

        let outcome = result.map_err(|source| FormError::Save {
            entity: T::FORM.entity,
            source,
        })?;
        self.close();
        Ok(outcome)
    }
}

/// A stored value as the form shows it.
fn render(field: &FieldSpec, value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) if field.kind == Date => s.get(..10).unwrap_or(s).to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if field.kind == Number && f.fract() == 0.0 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Validate one raw value against its field and convert it to JSON.
fn parse_field(field: &FieldSpec, raw: &str) -> Result<Value, FormError> {
    let trimmed = raw.trim();
    let invalid = |reason| FormError::Invalid {
        label: field.label,
        value: raw.to_string(),
        reason,
    };

    if trimmed.is_empty() && field.kind != Checkbox {
        return if field.required {
            Err(FormError::Missing { label: field.label })
        } else {
            Ok(Value::Null)
        };
    }

    match field.kind {
        Text | TextArea => Ok(Value::String(raw.to_string())),
        Email => {
            match trimmed.split_once('@') {
                Some((user, domain)) if !user.is_empty() && !domain.is_empty() => {
                    Ok(Value::String(trimmed.to_string()))
                }
                _ => Err(invalid("expected an email address")),
            }
        }
        Number => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("expected a whole number")),
        Decimal => match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::from(f)),
            _ => Err(invalid("expected a number")),
        },
        Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| invalid("expected a date as YYYY-MM-DD")),
        Select(options) => options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(trimmed))
            .map(|o| Value::String(o.to_string()))
            .ok_or_else(|| invalid("not one of the listed options")),
        Checkbox => match trimmed.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
            "" | "0" | "false" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(invalid("expected yes or no")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn form_data_serializes_in_order() {
        let mut data = FormData::new();
        data.insert("b", 1);
        data.insert("a", "x");
        data.insert("b", 2);
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"b":2,"a":"x"}"#);
    }

    #[test]
    fn from_pairs_types_loosely() {
        let data = FormData::from_pairs(&pairs(&[
            ("enrollment_id", "4"),
            ("score", "8.5"),
            ("done", "true"),
            ("note", "good"),
        ]));
        assert_eq!(data.get("enrollment_id"), Some(&Value::from(4)));
        assert_eq!(data.get("score"), Some(&Value::from(8.5)));
        assert_eq!(data.get("done"), Some(&Value::Bool(true)));
        assert_eq!(data.get("note"), Some(&Value::from("good")));
    }

    #[test]
    fn create_form_shows_create_only_fields_with_defaults() {
        let session = FormSession::<Program>::open_create();
        let prefill = session.prefill();
        let status = prefill.iter().find(|(k, _)| *k == "status").unwrap();
        assert_eq!(status.1, "Upcoming");

        let session = FormSession::<Participant>::open_create();
        assert!(session.fields().any(|f| f.name == "enrollment_date"));
        let date = session
            .prefill()
            .into_iter()
            .find(|(k, _)| *k == "enrollment_date")
            .unwrap()
            .1;
        assert!(NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn edit_form_hides_create_only_and_drops_immutable() {
        let participant = Participant {
            id: 3,
            participant_id: "IL-003".into(),
            full_name: "Meera Iyer".into(),
            email: "meera@example.com".into(),
            years_of_experience: Some(9),
            ..Default::default()
        };
        let session = FormSession::open_edit(participant);
        assert!(!session.fields().any(|f| f.name == "enrollment_date"));

        let prefill = session.prefill();
        assert!(prefill.contains(&("participant_id", "IL-003".to_string())));
        assert!(prefill.contains(&("years_of_experience", "9".to_string())));

        let data = session
            .collect(&pairs(&[("participant_id", "HACKED"), ("industry", "Fintech")]))
            .unwrap();
        assert!(!data.contains("participant_id"));
        assert!(!data.contains("enrollment_date"));
        assert_eq!(data.get("full_name"), Some(&Value::from("Meera Iyer")));
        assert_eq!(data.get("industry"), Some(&Value::from("Fintech")));
        assert_eq!(data.get("years_of_experience"), Some(&Value::from(9)));
    }

    #[test]
    fn edit_keeps_unlisted_labels_untouched() {
        let program: Program = serde_json::from_value(serde_json::json!({
            "id": 5,
            "program_name": "Offsite",
            "program_type": "Retreat",
            "status": "Paused",
            "duration_weeks": 1,
            "total_modules": 2,
            "start_date": "2024-05-01"
        }))
        .unwrap();
        let session = FormSession::open_edit(program);

        let data = session
            .collect(&pairs(&[("program_name", "Leadership Offsite")]))
            .unwrap();
        assert_eq!(data.get("program_name"), Some(&Value::from("Leadership Offsite")));
        assert_eq!(data.get("program_type"), Some(&Value::from("Retreat")));
        assert_eq!(data.get("status"), Some(&Value::from("Paused")));

        // A value the user does supply is still checked.
        assert!(session.collect(&pairs(&[("program_type", "Bootcamp")])).is_err());
    }

    #[test]
    fn edit_with_missing_label_does_not_fail() {
        let program: Program =
            serde_json::from_value(serde_json::json!({ "id": 6, "program_type": null })).unwrap();
        let session = FormSession::open_edit(program);
        assert!(session.collect(&pairs(&[("price", "45000")])).is_ok());
    }

    #[test]
    fn required_fields_are_enforced() {
        let session = FormSession::<Participant>::open_create();
        let err = session
            .collect(&pairs(&[("participant_id", "P1"), ("email", "a@b.c")]))
            .unwrap_err();
        assert!(matches!(err, FormError::Missing { label: "Full Name" }));
    }

    #[test]
    fn kinds_are_validated() {
        let session = FormSession::<Program>::open_create();
        let base = [
            ("program_name", "Masterclass Q3"),
            ("program_type", "masterclass"),
            ("duration_weeks", "4"),
            ("total_modules", "8"),
            ("start_date", "2024-07-01"),
        ];
        let data = session.collect(&pairs(&base)).unwrap();
        assert_eq!(data.get("program_type"), Some(&Value::from("Masterclass")));
        assert_eq!(data.get("price"), Some(&Value::Null));

        let mut bad = base.to_vec();
        bad.push(("duration_weeks", "four"));
        assert!(matches!(
            session.collect(&pairs(&bad)),
            Err(FormError::Invalid { label: "Duration (Weeks)", .. })
        ));

        let mut bad = base.to_vec();
        bad.push(("start_date", "07/01/2024"));
        assert!(session.collect(&pairs(&bad)).is_err());

        let mut bad = base.to_vec();
        bad.push(("program_type", "Bootcamp"));
        assert!(session.collect(&pairs(&bad)).is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let session = FormSession::<Milestone>::open_create();
        let err = session.collect(&pairs(&[("salary", "1")])).unwrap_err();
        assert_eq!(err.to_string(), "unknown field 'salary' for milestone");
    }

    #[test]
    fn checkbox_and_date_rendering() {
        let story = TransformationStory {
            id: 1,
            featured: true,
            published_date: Some("2024-02-01T00:00:00.000Z".into()),
            ..Default::default()
        };
        let prefill = FormSession::open_edit(story).prefill();
        assert!(prefill.contains(&("featured", "true".to_string())));
        assert!(prefill.contains(&("published_date", "2024-02-01".to_string())));
    }
}
