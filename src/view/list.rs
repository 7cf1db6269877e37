//! List view over one entity collection.
use serde::Serialize;
use serde_json::Value;

use super::{CancelToken, Confirm, DeleteOutcome, MutationOutcome, MutationPolicy, ViewState};
use crate::analytics::events::{self, EventKind};
use crate::api::{ApiError, Backend, Filters, Method, Resource};
use crate::models::Entity;

/// Holds the rows of one collection and keeps them in step with the
/// backend across mutations.
pub struct ListView<'a, T: Entity> {
    resource: Resource<'a, T>,
    filters: Filters,
    policy: MutationPolicy,
    state: ViewState<Vec<T>>,
    cancel: CancelToken,
}

impl<'a, T: Entity> ListView<'a, T> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            resource: Resource::new(backend),
            filters: Vec::new(),
            policy: MutationPolicy::default(),
            state: ViewState::Loading,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_policy(mut self, policy: MutationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &ViewState<Vec<T>> {
        &self.state
    }

    pub fn rows(&self) -> &[T] {
        self.state.rows()
    }

    pub fn policy(&self) -> MutationPolicy {
        self.policy
    }

    pub fn resource(&self) -> &Resource<'a, T> {
        &self.resource
    }

    /// Token that cancels this view, e.g. from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Cancel the view. Later calls send nothing and in-flight results are
    /// dropped.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // -----------------------------------------------------------------------
    // Fetch
    // -----------------------------------------------------------------------

    /// Fetch the collection once and replace the snapshot.
    ///
    /// A failure is logged and leaves the view `Failed` (no rows).
    pub fn load(&mut self) -> &ViewState<Vec<T>> {
        if self.is_cancelled() {
            return &self.state;
        }

        self.state = ViewState::Loading;
        let result = self.resource.list(&self.filters);
        if self.is_cancelled() {
            return &self.state;
        }

        self.state = match result {
            Ok(rows) => ViewState::from_rows(rows),
            Err(e) => {
                events::record(EventKind::FetchFailed, T::RESOURCE, &e.to_string());
                ViewState::Failed(e.to_string())
            }
        };
        &self.state
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// `POST` a new entity, then refresh the rows.
    pub fn create(&mut self, data: &impl Serialize) -> Result<MutationOutcome, ApiError> {
        if self.is_cancelled() {
            return Ok(MutationOutcome::Skipped);
        }
        let reply = self.resource.create(data);
        let reply = self.check(Method::Post, self.resource.path(), reply)?;
        Ok(self.settle(reply, |rows, entity| rows.push(entity)))
    }

    /// `PUT` changes to entity `id`, then refresh the rows.
    pub fn update(&mut self, id: i64, data: &impl Serialize) -> Result<MutationOutcome, ApiError> {
        if self.is_cancelled() {
            return Ok(MutationOutcome::Skipped);
        }
        let reply = self.resource.update(id, data);
        let reply = self.check(Method::Put, self.item_path(id), reply)?;
        Ok(self.settle(reply, |rows, entity| {
            match rows.iter_mut().find(|row| row.id() == entity.id()) {
                Some(row) => *row = entity,
                None => rows.push(entity),
            }
        }))
    }

    /// Ask `confirm` with the entity's delete prompt, then `DELETE` it.
    /// Declining sends nothing.
    pub fn delete(&mut self, id: i64, confirm: &dyn Confirm) -> Result<DeleteOutcome, ApiError> {
        if self.is_cancelled() {
            return Ok(DeleteOutcome::Deleted(MutationOutcome::Skipped));
        }
        if !confirm.confirm(T::DELETE_PROMPT) {
            return Ok(DeleteOutcome::Declined);
        }

        let reply = self.resource.delete(id);
        self.check(Method::Delete, self.item_path(id), reply)?;
        if self.is_cancelled() {
            return Ok(DeleteOutcome::Deleted(MutationOutcome::Skipped));
        }

        let outcome = if self.policy == MutationPolicy::Reconcile
            && let Some(mut rows) = self.reconcilable_rows()
        {
            rows.retain(|row| row.id() != id);
            self.state = ViewState::from_rows(rows);
            MutationOutcome::Reconciled
        } else {
            self.load();
            MutationOutcome::Refetched
        };
        Ok(DeleteOutcome::Deleted(outcome))
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}/{id}", self.resource.path())
    }

    /// Log a failed mutation and pass the result through.
    fn check<R>(&self, method: Method, path: String, result: Result<R, ApiError>) -> Result<R, ApiError> {
        result.inspect_err(|e| {
            events::record(EventKind::MutationFailed, &format!("{method} {path}"), &e.to_string());
        })
    }

    /// Bring the rows up to date after a successful create or update.
    fn settle(&mut self, reply: Value, merge: impl FnOnce(&mut Vec<T>, T)) -> MutationOutcome {
        if self.is_cancelled() {
            return MutationOutcome::Skipped;
        }

        if self.policy == MutationPolicy::Reconcile
            && let Some(mut rows) = self.reconcilable_rows()
            && let Some(entity) = complete_entity::<T>(reply)
        {
            merge(&mut rows, entity);
            self.state = ViewState::from_rows(rows);
            return MutationOutcome::Reconciled;
        }

        self.load();
        MutationOutcome::Refetched
    }

    /// Current rows when the snapshot is known to be complete.
    fn reconcilable_rows(&self) -> Option<Vec<T>> {
        match &self.state {
            ViewState::Loaded(rows) => Some(rows.clone()),
            ViewState::Empty => Some(Vec::new()),
            ViewState::Loading | ViewState::Failed(_) => None,
        }
    }
}

/// Decode `reply` as a full `T`: a JSON object carrying every field `T`
/// serializes. Acknowledgements such as `{"id": 1, "message": "..."}`
/// decode thanks to field defaults but are not records, so they yield
/// `None`.
fn complete_entity<T: Entity>(reply: Value) -> Option<T> {
    let Value::Object(fields) = &reply else {
        return None;
    };
    let entity = serde_json::from_value::<T>(reply.clone()).ok()?;
    match serde_json::to_value(&entity).ok()? {
        Value::Object(expected) if expected.keys().all(|k| fields.contains_key(k)) => Some(entity),
        _ => None,
    }
}
