//! Genre and category routes. Both tables share one set of handlers keyed by
//! the `{kind}` path segment.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{Envelope, MessageResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use cadenza_core::models::{
    visibility_message, CreateTermsRequest, SetVisibilityRequest, TaxonomyKind, UpdateTermRequest,
};
use cadenza_services::CascadeReport;
use std::sync::Arc;
use validator::Validate;

fn singular(kind: TaxonomyKind) -> &'static str {
    match kind {
        TaxonomyKind::Genre => "Genre",
        TaxonomyKind::Category => "Category",
    }
}

#[utoipa::path(
    get,
    path = "/taxonomy/{kind}",
    tag = "taxonomy",
    params(("kind" = TaxonomyKind, Path, description = "genres or categories")),
    responses(
        (status = 200, description = "All terms of the kind"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn list_terms(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<TaxonomyKind>,
) -> Result<Response, HttpAppError> {
    let terms = state.taxonomy.list_terms(kind).await?;
    Ok(Envelope::ok(terms).into_response())
}

#[utoipa::path(
    post,
    path = "/admin/taxonomy/{kind}",
    tag = "admin",
    params(("kind" = TaxonomyKind, Path, description = "genres or categories")),
    request_body = CreateTermsRequest,
    responses(
        (status = 200, description = "Terms created"),
        (status = 400, description = "No label given", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(kind = %kind, operation = "create_terms"))]
pub async fn create_terms(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<TaxonomyKind>,
    ValidatedJson(request): ValidatedJson<CreateTermsRequest>,
) -> Result<Response, HttpAppError> {
    request.validate()?;
    let terms = state
        .taxonomy
        .create_terms(kind, request.labels, request.visible)
        .await?;

    let message = format!("Added New {} Successfully", singular(kind));
    Ok(Envelope::with_row(message, terms).into_response())
}

#[utoipa::path(
    put,
    path = "/admin/taxonomy/{kind}/{id}",
    tag = "admin",
    params(
        ("kind" = TaxonomyKind, Path, description = "genres or categories"),
        ("id" = i32, Path, description = "Term ID")
    ),
    request_body = UpdateTermRequest,
    responses(
        (status = 200, description = "Term renamed; rowData counts the tracks rewritten"),
        (status = 404, description = "No term with that id", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(kind = %kind, term_id = id, operation = "update_term"))]
pub async fn update_term(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(TaxonomyKind, i32)>,
    ValidatedJson(request): ValidatedJson<UpdateTermRequest>,
) -> Result<Response, HttpAppError> {
    request.validate()?;
    let previous = request.previous.filter(|label| !label.trim().is_empty());
    let report = state
        .taxonomy
        .update_term(kind, id, &request.label, request.visible, previous)
        .await?;

    Ok(Envelope::<String, CascadeReport> {
        code: 200,
        message: format!("{} Updated Successfully", singular(kind)),
        row_data: report,
    }
    .into_response())
}

#[utoipa::path(
    put,
    path = "/admin/taxonomy/{kind}/{id}/visibility",
    tag = "admin",
    params(
        ("kind" = TaxonomyKind, Path, description = "genres or categories"),
        ("id" = i32, Path, description = "Term ID")
    ),
    request_body = SetVisibilityRequest,
    responses(
        (status = 200, description = "Visibility changed", body = MessageResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
pub async fn set_term_visibility(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(TaxonomyKind, i32)>,
    ValidatedJson(request): ValidatedJson<SetVisibilityRequest>,
) -> Result<Response, HttpAppError> {
    state
        .taxonomy
        .set_term_visibility(kind, id, request.visible)
        .await?;
    Ok(Envelope::ok(visibility_message(request.visible)).into_response())
}

#[utoipa::path(
    delete,
    path = "/admin/taxonomy/{kind}/{id}",
    tag = "admin",
    params(
        ("kind" = TaxonomyKind, Path, description = "genres or categories"),
        ("id" = i32, Path, description = "Term ID")
    ),
    responses(
        (status = 200, description = "Term deleted", body = MessageResponse),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(kind = %kind, term_id = id, operation = "delete_term"))]
pub async fn delete_term(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(TaxonomyKind, i32)>,
) -> Result<Response, HttpAppError> {
    state.taxonomy.delete_term(kind, id).await?;
    Ok(Envelope::ok(format!("{} deleted successfully", singular(kind))).into_response())
}
