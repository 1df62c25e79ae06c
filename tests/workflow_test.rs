mod common;

use chrono::Duration;
use common::Fixture;
use doc_tracker::core::requests::{ActionRequest, ForwardRequest, UpdateDocumentRequest};
use doc_tracker::domain::model::{DocumentStatus, EventType, TransferStatus, VersionType};
use doc_tracker::DocTrackError;

fn no_remarks() -> ActionRequest {
    ActionRequest::default()
}

#[test]
fn test_tracking_numbers_are_daily_sequences() {
    let mut fx = Fixture::new();

    let first = fx.create_doc(fx.alice, "Purchase request");
    let second = fx.create_doc(fx.alice, "Leave application");
    assert_eq!(first.tracking_number, "241017001");
    assert_eq!(second.tracking_number, "241017002");

    fx.clock.advance(Duration::days(1));
    let next_day = fx.create_doc(fx.bob, "Budget memo");
    assert_eq!(next_day.tracking_number, "241018001");
}

#[test]
fn test_create_sets_intake_state() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Purchase request");

    assert_eq!(doc.status, DocumentStatus::Received);
    assert_eq!(doc.origin_department_id, fx.reg);
    assert_eq!(doc.current_department_id, fx.reg);
    assert_eq!(doc.current_user_id, Some(fx.alice));

    let custody = fx.registry.custody(fx.alice, doc.id).unwrap();
    assert_eq!(custody.original.map(|c| c.department_id), Some(fx.reg));
    assert!(custody.copy.is_none());

    let events = fx.registry.events(fx.alice, doc.id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Created);
}

#[test]
fn test_forward_then_accept_moves_department_and_custody() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Purchase request");

    let transfer = fx.forward_to(fx.alice, doc.id, fx.fin);
    assert_eq!(transfer.status, TransferStatus::Pending);
    assert_eq!(fx.document(doc.id).status, DocumentStatus::InTransit);

    let accepted = fx.registry.accept(fx.bob, transfer.id, &no_remarks()).unwrap();
    assert_eq!(accepted.status, DocumentStatus::Received);
    assert_eq!(accepted.current_department_id, fx.fin);
    assert_eq!(accepted.current_user_id, Some(fx.bob));

    let custody = fx.registry.custody(fx.bob, doc.id).unwrap();
    let original = custody.original.unwrap();
    assert_eq!(original.department_id, fx.fin);
    assert_eq!(original.user_id, Some(fx.bob));
    assert_eq!(custody.history.len(), 2);

    let transfers = fx.registry.document_transfers(fx.bob, doc.id).unwrap();
    assert_eq!(transfers[0].status, TransferStatus::Accepted);
    assert_eq!(transfers[0].resolved_by, Some(fx.bob));

    let kinds: Vec<EventType> = fx
        .registry
        .events(fx.bob, doc.id)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        kinds,
        vec![EventType::Created, EventType::Forwarded, EventType::Accepted]
    );
}

#[test]
fn test_reject_returns_document_to_sender() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Purchase request");
    let transfer = fx.forward_to(fx.alice, doc.id, fx.fin);

    let rejected = fx
        .registry
        .reject(
            fx.carol,
            transfer.id,
            &ActionRequest {
                remarks: Some("Missing signature".to_string()),
            },
        )
        .unwrap();

    assert_eq!(rejected.status, DocumentStatus::Returned);
    assert_eq!(rejected.current_department_id, fx.reg);
    assert_eq!(rejected.current_user_id, Some(fx.alice));

    // 正本從未離開 REG
    let custody = fx.registry.custody(fx.alice, doc.id).unwrap();
    assert_eq!(custody.original.map(|c| c.department_id), Some(fx.reg));

    // 退回後可以再次轉送
    let again = fx.forward_to(fx.alice, doc.id, fx.leg);
    assert_eq!(again.to_department_id, fx.leg);
}

#[test]
fn test_recall_restores_sender() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Purchase request");
    let transfer = fx.forward_to(fx.alice, doc.id, fx.fin);

    let recalled = fx.registry.recall(fx.alice, transfer.id, &no_remarks()).unwrap();
    assert_eq!(recalled.status, DocumentStatus::Received);
    assert_eq!(recalled.current_department_id, fx.reg);

    let transfers = fx.registry.document_transfers(fx.alice, doc.id).unwrap();
    assert_eq!(transfers[0].status, TransferStatus::Recalled);

    // 已撤回的轉送不能再接收
    let err = fx.registry.accept(fx.bob, transfer.id, &no_remarks()).unwrap_err();
    assert!(matches!(err, DocTrackError::InvalidWorkflowTransition { .. }));
}

#[test]
fn test_unauthorized_actors_change_nothing() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Purchase request");
    let events_before = fx.event_count(doc.id);

    // FIN 不持有文件，不能轉送
    let err = fx
        .registry
        .forward(fx.bob, doc.id, &ForwardRequest::to_department(fx.leg))
        .unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));
    assert_eq!(fx.document(doc.id).status, DocumentStatus::Received);
    assert_eq!(fx.event_count(doc.id), events_before);

    let transfer = fx.forward_to(fx.alice, doc.id, fx.fin);

    // 只有收件部門能接收
    let err = fx.registry.accept(fx.dave, transfer.id, &no_remarks()).unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));

    // 只有寄件部門能撤回
    let err = fx.registry.recall(fx.bob, transfer.id, &no_remarks()).unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));

    let doc = fx.document(doc.id);
    assert_eq!(doc.status, DocumentStatus::InTransit);
    assert_eq!(doc.current_department_id, fx.reg);
    assert_eq!(fx.event_count(doc.id), events_before + 1);
}

#[test]
fn test_named_recipient_must_accept() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Contract draft");
    let transfer = fx
        .registry
        .forward(
            fx.alice,
            doc.id,
            &ForwardRequest {
                to_department_id: fx.fin,
                to_user_id: Some(fx.bob),
                version_type: VersionType::Original,
                remarks: None,
            },
        )
        .unwrap();

    let err = fx.registry.accept(fx.carol, transfer.id, &no_remarks()).unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));

    let accepted = fx.registry.accept(fx.bob, transfer.id, &no_remarks()).unwrap();
    assert_eq!(accepted.current_user_id, Some(fx.bob));
}

#[test]
fn test_admin_bypasses_department_checks() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.bob, "Budget memo");

    let transfer = fx.forward_to(fx.admin, doc.id, fx.leg);
    assert_eq!(transfer.from_department_id, fx.fin);

    let accepted = fx.registry.accept(fx.admin, transfer.id, &no_remarks()).unwrap();
    assert_eq!(accepted.current_department_id, fx.leg);
}

#[test]
fn test_forward_validations() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Purchase request");

    let err = fx
        .registry
        .forward(fx.alice, doc.id, &ForwardRequest::to_department(fx.reg))
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    let err = fx
        .registry
        .forward(fx.alice, doc.id, &ForwardRequest::to_department(999))
        .unwrap_err();
    assert!(matches!(err, DocTrackError::NotFound { .. }));

    // 收件人必須屬於目標部門
    let err = fx
        .registry
        .forward(
            fx.alice,
            doc.id,
            &ForwardRequest {
                to_department_id: fx.fin,
                to_user_id: Some(fx.dave),
                version_type: VersionType::Original,
                remarks: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    fx.forward_to(fx.alice, doc.id, fx.fin);
    let err = fx
        .registry
        .forward(fx.alice, doc.id, &ForwardRequest::to_department(fx.leg))
        .unwrap_err();
    assert!(matches!(err, DocTrackError::InvalidWorkflowTransition { .. }));
}

#[test]
fn test_lifecycle_complete_reopen_archive() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.dave, "Legal opinion");

    let err = fx.registry.reopen(fx.dave, doc.id, &no_remarks()).unwrap_err();
    assert!(matches!(err, DocTrackError::InvalidWorkflowTransition { .. }));

    let completed = fx.registry.complete(fx.dave, doc.id, &no_remarks()).unwrap();
    assert_eq!(completed.status, DocumentStatus::Completed);

    let reopened = fx.registry.reopen(fx.dave, doc.id, &no_remarks()).unwrap();
    assert_eq!(reopened.status, DocumentStatus::Received);

    fx.registry.complete(fx.dave, doc.id, &no_remarks()).unwrap();
    let archived = fx.registry.archive(fx.dave, doc.id, &no_remarks()).unwrap();
    assert_eq!(archived.status, DocumentStatus::Archived);

    let err = fx.registry.reopen(fx.dave, doc.id, &no_remarks()).unwrap_err();
    assert!(matches!(err, DocTrackError::InvalidWorkflowTransition { .. }));

    let err = fx
        .registry
        .update_document(
            fx.dave,
            doc.id,
            &UpdateDocumentRequest {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::InvalidWorkflowTransition { .. }));
}

#[test]
fn test_records_officer_archives_other_departments() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.bob, "Invoice batch");
    fx.registry.complete(fx.bob, doc.id, &no_remarks()).unwrap();

    // 一般承辦不能歸檔別部門的文件
    let err = fx.registry.archive(fx.dave, doc.id, &no_remarks()).unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));

    let archived = fx.registry.archive(fx.rita, doc.id, &no_remarks()).unwrap();
    assert_eq!(archived.status, DocumentStatus::Archived);
}

#[test]
fn test_update_records_changed_fields() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Purchase request");

    let updated = fx
        .registry
        .update_document(
            fx.alice,
            doc.id,
            &UpdateDocumentRequest {
                title: Some("Purchase request (revised)".to_string()),
                metadata: Some(serde_json::json!({"priority": "high"})),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Purchase request (revised)");
    assert_eq!(updated.metadata["priority"], "high");

    let events = fx.registry.events(fx.alice, doc.id).unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.event_type, EventType::Updated);
    assert_eq!(last.details["fields"], serde_json::json!(["title", "metadata"]));

    let err = fx
        .registry
        .update_document(
            fx.bob,
            doc.id,
            &UpdateDocumentRequest {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));
}

#[test]
fn test_unknown_actor_is_unauthenticated() {
    let mut fx = Fixture::new();
    let err = fx
        .registry
        .create_document(
            4242,
            &doc_tracker::core::requests::CreateDocumentRequest {
                title: "Ghost".to_string(),
                document_type: "memo".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::Unauthenticated { .. }));
}
