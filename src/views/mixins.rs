//! Ready-made lifecycle bodies
//!
//! These functions implement the usual model behavior on top of a bound
//! [`GenericApiView`]. Lifecycle trait implementations can call them directly
//! or wrap them with their own logic; the `perform_*` hooks are the
//! persistence step on its own.

use crate::core::error::{ViewError, ViewResult};
use crate::core::model::Model;
use crate::core::session::Session;
use crate::views::generic::GenericApiView;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

fn request_body<M: Model>(view: &GenericApiView<M>) -> ViewResult<Value> {
    view.request()
        .body()
        .cloned()
        .ok_or_else(|| ViewError::bad_request("Request body is required"))
}

fn primary_key_value<M: Model>(view: &GenericApiView<M>, instance: &M) -> ViewResult<Value> {
    instance.primary_key_value().ok_or_else(|| {
        ViewError::improperly_configured(
            view.config().name(),
            format!("{} instance has no '{}' value", M::table_name(), M::primary_key()),
        )
    })
}

/// List the filtered query, one page at a time when the view paginates
pub fn list<M: Model>(view: &mut GenericApiView<M>) -> ViewResult<Response> {
    let query = view.filter_query(view.get_query()?)?;
    let schema = view.get_schema()?;

    if let Some(page) = view.paginate_query(query.clone())? {
        let data = schema.dump_many(&page)?;
        return view.get_paginated_response(data);
    }

    let rows = query.all()?;
    Ok(Json(schema.dump_many(&rows)?).into_response())
}

/// Load the request body, persist it and answer 201
pub fn create<M: Model>(view: &GenericApiView<M>) -> ViewResult<Response> {
    let schema = view.get_schema()?;
    let instance = schema.load(request_body(view)?)?;
    let instance = perform_create(view, instance)?;

    tracing::debug!(table = M::table_name(), "created instance");
    Ok((StatusCode::CREATED, Json(schema.dump(&instance)?)).into_response())
}

pub fn perform_create<M: Model>(view: &GenericApiView<M>, instance: M) -> ViewResult<M> {
    Ok(view.request().dbsession().add(&instance)?)
}

pub fn retrieve<M: Model>(view: &GenericApiView<M>) -> ViewResult<Response> {
    let instance = view.get_object()?;
    let schema = view.get_schema()?;
    Ok(Json(schema.dump(&instance)?).into_response())
}

/// Replace (`partial == false`) or patch the looked-up object
pub fn update<M: Model>(view: &GenericApiView<M>, partial: bool) -> ViewResult<Response> {
    let instance = view.get_object()?;
    let data = request_body(view)?;
    let schema = view.get_schema()?;

    let changed = if partial {
        schema.load_partial(data, &instance)?
    } else {
        schema.load(data)?
    };
    let updated = perform_update(view, &instance, changed)?;

    Ok(Json(schema.dump(&updated)?).into_response())
}

/// Write `changed` over the row of `instance`
///
/// The stored row always keeps the primary key of `instance`; a key in
/// `changed` is ignored.
pub fn perform_update<M: Model>(
    view: &GenericApiView<M>,
    instance: &M,
    changed: M,
) -> ViewResult<M> {
    let key = primary_key_value(view, instance)?;

    let mut row = changed.to_row()?;
    if let Some(object) = row.as_object_mut() {
        object.insert(M::primary_key().to_string(), key.clone());
    }

    let stored = view
        .request()
        .dbsession()
        .update(M::table_name(), M::primary_key(), &key, row)?;

    tracing::debug!(table = M::table_name(), key = %key, "updated instance");
    Ok(M::from_row(stored)?)
}

/// Delete the looked-up object and answer 204
pub fn destroy<M: Model>(view: &GenericApiView<M>) -> ViewResult<Response> {
    let instance = view.get_object()?;
    perform_destroy(view, &instance)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub fn perform_destroy<M: Model>(view: &GenericApiView<M>, instance: &M) -> ViewResult<()> {
    let key = primary_key_value(view, instance)?;
    let deleted = view
        .request()
        .dbsession()
        .delete(M::table_name(), M::primary_key(), &key)?;

    tracing::debug!(table = M::table_name(), key = %key, deleted, "destroyed instance");
    Ok(())
}
