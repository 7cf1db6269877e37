//! Generic CRUD over one entity collection.
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;

use super::{ApiError, ApiRequest, Backend, decode};
use crate::models::Entity;

/// CRUD operations for the entity `T`, rooted at `/{T::RESOURCE}`.
///
/// `create` and `update` return the backend's reply undecoded. It may be the
/// full record or only an acknowledgement, and the list view decides.
pub struct Resource<'a, T> {
    backend: &'a dyn Backend,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Resource<'a, T> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    /// Collection path, e.g. `/participants`.
    pub fn path(&self) -> String {
        format!("/{}", T::RESOURCE)
    }

    fn item_path(&self, id: i64) -> String {
        format!("/{}/{id}", T::RESOURCE)
    }

    pub fn backend(&self) -> &'a dyn Backend {
        self.backend
    }

    /// `GET /{resource}?filters…`
    pub fn list(&self, filters: &[(String, String)]) -> Result<Vec<T>, ApiError> {
        let path = self.path();
        let value = self
            .backend
            .send(&ApiRequest::get(path.clone()).with_query(filters))?;
        decode(self.backend, &path, value)
    }

    /// `GET /{resource}/{id}`
    pub fn get(&self, id: i64) -> Result<T, ApiError> {
        let path = self.item_path(id);
        let value = self.backend.send(&ApiRequest::get(path.clone()))?;
        decode(self.backend, &path, value)
    }

    /// `DELETE /{resource}/{id}`
    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.backend.send(&ApiRequest::delete(self.item_path(id)))?;
        Ok(())
    }

    /// `POST /{resource}`
    pub fn create(&self, data: &impl Serialize) -> Result<Value, ApiError> {
        let body = self.body(data)?;
        self.backend.send(&ApiRequest::post(self.path(), body))
    }

    /// `PUT /{resource}/{id}`
    pub fn update(&self, id: i64, data: &impl Serialize) -> Result<Value, ApiError> {
        let body = self.body(data)?;
        self.backend.send(&ApiRequest::put(self.item_path(id), body))
    }

    fn body(&self, data: &impl Serialize) -> Result<Value, ApiError> {
        serde_json::to_value(data).map_err(|e| ApiError::Decode {
            url: format!("{}{}", self.backend.base_url(), self.path()),
            message: format!("failed to encode request body: {e}"),
        })
    }
}
