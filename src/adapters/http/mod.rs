pub mod error;
pub mod extract;
pub mod handlers;

use crate::core::DocumentRegistry;
use crate::utils::error::Result;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// 所有請求共用一個 registry，依序存取資料庫
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Mutex<DocumentRegistry>>,
}

impl AppState {
    pub fn new(registry: DocumentRegistry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    use handlers::*;

    Router::new()
        .route("/health", get(health))
        .route("/track/:tracking_number", get(public_tracking))
        .route("/departments", get(list_departments).post(create_department))
        .route("/users", get(list_users).post(create_user))
        .route("/documents", get(list_documents).post(create_document))
        .route("/documents/:id", get(show_document).patch(update_document))
        .route("/documents/:id/forward", post(forward))
        .route("/documents/:id/complete", post(complete))
        .route("/documents/:id/reopen", post(reopen))
        .route("/documents/:id/archive", post(archive))
        .route("/documents/:id/split", post(split))
        .route("/documents/:id/merge", post(merge))
        .route("/documents/:id/custody", get(custody).post(transfer_custody))
        .route("/documents/:id/copies", post(issue_copy))
        .route("/documents/:id/relationships", get(relationships).post(link))
        .route("/documents/:id/events", get(document_events))
        .route("/documents/:id/transfers", get(document_transfers))
        .route("/documents/:id/remarks", get(remarks).post(add_remark))
        .route("/transfers/:id/accept", post(accept_transfer))
        .route("/transfers/:id/reject", post(reject_transfer))
        .route("/transfers/:id/recall", post(recall_transfer))
        .route("/copies/:id/return", post(return_copy))
        .route("/relationships/:id", delete(unlink))
        .route("/cases", post(create_case))
        .route("/cases/:id", get(show_case))
        .route("/cases/:id/documents", post(assign_case))
        .route("/cases/:id/close", post(close_case))
        .route("/reports/summary", get(report_summary))
        .route("/reports/holdings", get(report_holdings))
        .route("/reports/overdue", get(report_overdue))
        .route("/reports/export.csv", get(export_csv))
        .route("/api/search/suggestions", get(search_suggestions))
        .route("/api/notifications/count", get(notification_counts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 綁定位址並開始服務，直到收到 Ctrl-C
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("🚀 doc-tracker listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Failed to listen for shutdown signal: {}", e);
    }
}
