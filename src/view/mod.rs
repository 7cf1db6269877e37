//! View state containers.
//!
//! A view owns the snapshot it displays and nothing else: it is built over
//! a borrowed [`Backend`](crate::api::Backend), fetches on `load()`, and
//! after every successful mutation either refetches or reconciles the
//! returned entity into its rows, according to its [`MutationPolicy`].

pub mod dashboard;
pub mod list;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

pub use dashboard::{Arrival, DashboardView};
pub use list::ListView;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Initial state, and the state while a fetch is outstanding.
    Loading,
    Loaded(T),
    /// The fetch succeeded with no rows.
    Empty,
    /// The fetch failed; the message is shown next to an empty table.
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> ViewState<Vec<T>> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Self::Empty
        } else {
            Self::Loaded(rows)
        }
    }

    /// Rows to display. Loading, empty and failed views all show none.
    pub fn rows(&self) -> &[T] {
        match self {
            Self::Loaded(rows) => rows,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Mutation policy
// ---------------------------------------------------------------------------

/// How a list view refreshes after a successful create, update or delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationPolicy {
    /// Issue exactly one follow-up list fetch.
    #[default]
    Refetch,
    /// Merge the returned entity into the local rows without a round trip.
    /// Falls back to a refetch when the response is not a full entity.
    Reconcile,
}

impl MutationPolicy {
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_ascii_lowercase().as_str() {
            "refetch" => Some(Self::Refetch),
            "reconcile" => Some(Self::Reconcile),
            _ => None,
        }
    }
}

impl std::fmt::Display for MutationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Refetch => write!(f, "refetch"),
            Self::Reconcile => write!(f, "reconcile"),
        }
    }
}

/// What a successful mutation did to the view afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Refetched,
    Reconciled,
    /// The view was cancelled; nothing was sent or the reply was dropped.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user said no. No request was made.
    Declined,
    Deleted(MutationOutcome),
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared flag marking a view as gone. Once set, the view sends nothing
/// new and drops results that arrive afterwards.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Asks the user a yes/no question before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_of_non_loaded_states_are_empty() {
        assert!(ViewState::<Vec<i32>>::Loading.rows().is_empty());
        assert!(ViewState::<Vec<i32>>::Failed("x".into()).rows().is_empty());
        assert_eq!(ViewState::from_rows(vec![1, 2]).rows(), &[1, 2]);
        assert_eq!(ViewState::<Vec<i32>>::from_rows(Vec::new()), ViewState::Empty);
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn closures_confirm() {
        let yes = |_: &str| true;
        assert!(yes.confirm("Delete?"));
    }

    #[test]
    fn policy_parsing() {
        assert_eq!(MutationPolicy::parse("Reconcile"), Some(MutationPolicy::Reconcile));
        assert_eq!(MutationPolicy::parse("refetch"), Some(MutationPolicy::Refetch));
        assert_eq!(MutationPolicy::parse("merge"), None);
    }
}
