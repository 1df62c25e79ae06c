use super::extract::ActorId;
use super::AppState;
use crate::core::requests::{
    ActionRequest, AssignCaseRequest, CreateCaseRequest, CreateDepartmentRequest,
    CreateDocumentRequest, CreateUserRequest, CustodyTransferRequest, ForwardRequest,
    IssueCopyRequest, LinkRequest, MergeRequest, RemarkRequest, SplitRequest,
    UpdateDocumentRequest,
};
use crate::domain::model::DocumentFilter;
use crate::utils::error::Result;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

type Created<T> = (StatusCode, Json<T>);

fn created<T>(value: T) -> Created<T> {
    (StatusCode::CREATED, Json(value))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub department_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn public_tracking(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.public_tracking(&tracking_number)?))
}

// 目錄

pub async fn list_departments(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.list_departments(actor)?))
}

pub async fn create_department(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<CreateDepartmentRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.create_department(actor, &request)?))
}

pub async fn list_users(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.list_users(actor, query.department_id)?))
}

pub async fn create_user(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.create_user(actor, &request)?))
}

// 文件

pub async fn list_documents(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Query(filter): Query<DocumentFilter>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.list_documents(actor, &filter)?))
}

pub async fn create_document(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.create_document(actor, &request)?))
}

pub async fn show_document(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    let document = registry.get_document(actor, id)?;
    let children = registry.document_children(actor, id)?;
    let custody = registry.custody(actor, id)?;
    Ok(Json(json!({
        "document": document,
        "children": children,
        "custody": {
            "original": custody.original,
            "copy": custody.copy,
        },
    })))
}

pub async fn update_document(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.update_document(actor, id, &request)?))
}

pub async fn document_transfers(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.document_transfers(actor, id)?))
}

pub async fn document_events(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.events(actor, id)?))
}

pub async fn search_suggestions(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Query(query): Query<SuggestionQuery>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.search_suggestions(actor, &query.q)?))
}

// 流程

pub async fn forward(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    Json(request): Json<ForwardRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.forward(actor, id, &request)?))
}

/// 空 body 視為沒有附註
fn action_request(body: Option<Json<ActionRequest>>) -> ActionRequest {
    body.map(|Json(request)| request).unwrap_or_default()
}

pub async fn accept_transfer(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    body: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.accept(actor, id, &action_request(body))?))
}

pub async fn reject_transfer(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    body: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.reject(actor, id, &action_request(body))?))
}

pub async fn recall_transfer(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    body: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.recall(actor, id, &action_request(body))?))
}

pub async fn complete(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    body: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.complete(actor, id, &action_request(body))?))
}

pub async fn reopen(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    body: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.reopen(actor, id, &action_request(body))?))
}

pub async fn archive(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    body: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.archive(actor, id, &action_request(body))?))
}

pub async fn split(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    Json(request): Json<SplitRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.split(actor, id, &request)?))
}

pub async fn merge(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    Json(request): Json<MergeRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.merge(actor, id, &request)?))
}

// 保管

pub async fn custody(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.custody(actor, id)?))
}

pub async fn transfer_custody(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    Json(request): Json<CustodyTransferRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.transfer_custody(actor, id, &request)?))
}

pub async fn issue_copy(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    body: Option<Json<IssueCopyRequest>>,
) -> Result<impl IntoResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let mut registry = state.registry.lock().await;
    Ok(created(registry.issue_copy(actor, id, &request)?))
}

pub async fn return_copy(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.return_copy(actor, id)?))
}

// 關聯與留言

pub async fn relationships(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.relationships(actor, id)?))
}

pub async fn link(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    Json(request): Json<LinkRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.link(actor, id, &request)?))
}

pub async fn unlink(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.unlink(actor, id)?))
}

pub async fn remarks(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.remarks(actor, id)?))
}

pub async fn add_remark(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    Json(request): Json<RemarkRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.add_remark(actor, id, &request)?))
}

// 案件

pub async fn create_case(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<CreateCaseRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(created(registry.create_case(actor, &request)?))
}

pub async fn show_case(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.get_case(actor, id)?))
}

pub async fn assign_case(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
    Json(request): Json<AssignCaseRequest>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.assign_case(actor, id, &request)?))
}

pub async fn close_case(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let mut registry = state.registry.lock().await;
    Ok(Json(registry.close_case(actor, id)?))
}

// 報表

pub async fn report_summary(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.status_summary(actor)?))
}

pub async fn report_holdings(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.department_holdings(actor)?))
}

pub async fn report_overdue(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.overdue_transfers(actor)?))
}

pub async fn export_csv(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Query(filter): Query<DocumentFilter>,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    let body = registry.export_csv(actor, &filter)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"documents.csv\"",
            ),
        ],
        body,
    ))
}

pub async fn notification_counts(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
) -> Result<impl IntoResponse> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.notification_counts(actor)?))
}
