mod common;

use chrono::Duration;
use common::Fixture;
use doc_tracker::core::requests::{ActionRequest, ForwardRequest, RemarkRequest};
use doc_tracker::domain::model::{DocumentFilter, DocumentStatus, TransferStatus, VersionType};
use doc_tracker::{DocTrackError, WorkflowSettings};

#[test]
fn test_status_summary_counts_every_status() {
    let mut fx = Fixture::new();
    let a = fx.create_doc(fx.alice, "Memo A");
    fx.create_doc(fx.alice, "Memo B");
    let c = fx.create_doc(fx.bob, "Memo C");
    fx.forward_to(fx.alice, a.id, fx.fin);
    fx.registry
        .complete(fx.bob, c.id, &ActionRequest::default())
        .unwrap();

    let summary = fx.registry.status_summary(fx.dave).unwrap();
    assert_eq!(summary.len(), DocumentStatus::ALL.len());

    let count = |status: DocumentStatus| {
        summary
            .iter()
            .find(|s| s.status == status)
            .map(|s| s.count)
            .unwrap()
    };
    assert_eq!(count(DocumentStatus::Received), 1);
    assert_eq!(count(DocumentStatus::InTransit), 1);
    assert_eq!(count(DocumentStatus::Completed), 1);
    assert_eq!(count(DocumentStatus::Archived), 0);
}

#[test]
fn test_department_holdings() {
    let mut fx = Fixture::new();
    let a = fx.create_doc(fx.alice, "Memo A");
    fx.create_doc(fx.alice, "Memo B");
    fx.create_doc(fx.dave, "Memo C");
    fx.forward_to(fx.alice, a.id, fx.fin);

    let holdings = fx.registry.department_holdings(fx.admin).unwrap();
    let codes: Vec<&str> = holdings.iter().map(|h| h.code.as_str()).collect();
    assert_eq!(codes, vec!["FIN", "LEG", "REG"]);

    let by_code = |code: &str| holdings.iter().find(|h| h.code == code).unwrap();
    // 傳送中的文件仍算在送出部門
    assert_eq!(by_code("REG").held, 2);
    assert_eq!(by_code("FIN").held, 0);
    assert_eq!(by_code("FIN").pending_incoming, 1);
    assert_eq!(by_code("LEG").held, 1);
}

#[test]
fn test_overdue_transfers_follow_clock() {
    let mut fx = Fixture::with_settings(WorkflowSettings {
        overdue_after_hours: 24,
        ..WorkflowSettings::default()
    });
    let slow = fx.create_doc(fx.alice, "Slow memo");
    let transfer = fx.forward_to(fx.alice, slow.id, fx.fin);

    assert!(fx.registry.overdue_transfers(fx.admin).unwrap().is_empty());

    fx.clock.advance(Duration::hours(30));
    let fresh = fx.create_doc(fx.alice, "Fresh memo");
    fx.forward_to(fx.alice, fresh.id, fx.leg);

    let overdue = fx.registry.overdue_transfers(fx.admin).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].transfer_id, transfer.id);
    assert_eq!(overdue[0].from_department, "Registry");
    assert_eq!(overdue[0].to_department, "Finance");
    assert_eq!(overdue[0].hours_pending, 30);

    fx.registry
        .accept(fx.bob, transfer.id, &ActionRequest::default())
        .unwrap();
    assert!(fx.registry.overdue_transfers(fx.admin).unwrap().is_empty());
    assert!(fx.registry.offline_overdue().unwrap().is_empty());
}

#[test]
fn test_export_csv() {
    let mut fx = Fixture::new();
    fx.create_doc(fx.alice, "Memo, with comma");
    let other = fx.create_doc(fx.bob, "Budget");
    fx.registry
        .complete(fx.bob, other.id, &ActionRequest::default())
        .unwrap();

    let bytes = fx
        .registry
        .export_csv(fx.alice, &DocumentFilter::default())
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("tracking_number,title,document_type,status,origin_department,current_department,case_id,created_at,updated_at")
    );
    assert!(text.contains("\"Memo, with comma\""));
    assert_eq!(text.lines().count(), 3);

    let completed_only = DocumentFilter {
        status: Some(DocumentStatus::Completed),
        ..Default::default()
    };
    let bytes = fx.registry.offline_export(&completed_only).unwrap();
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "241017002");
    assert_eq!(&rows[0][3], "completed");
    assert_eq!(&rows[0][5], "Finance");
}

#[test]
fn test_export_csv_is_not_paginated() {
    let mut fx = Fixture::new();
    for i in 0..60 {
        fx.create_doc(fx.alice, &format!("Memo {}", i));
    }

    let count_rows = |bytes: Vec<u8>| csv::Reader::from_reader(bytes.as_slice()).records().count();

    let bytes = fx
        .registry
        .export_csv(fx.alice, &DocumentFilter::default())
        .unwrap();
    assert_eq!(count_rows(bytes), 60);

    let bytes = fx.registry.offline_export(&DocumentFilter::default()).unwrap();
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 60);
    assert_eq!(&rows[0][0], "241017001");
    assert_eq!(&rows[59][0], "241017060");
}

#[test]
fn test_notification_counts() {
    let mut fx = Fixture::new();
    let a = fx.create_doc(fx.alice, "Memo A");
    let b = fx.create_doc(fx.alice, "Memo B");
    fx.forward_to(fx.alice, a.id, fx.fin);
    fx.registry
        .forward(
            fx.alice,
            b.id,
            &ForwardRequest {
                to_department_id: fx.fin,
                to_user_id: Some(fx.bob),
                version_type: VersionType::Original,
                remarks: None,
            },
        )
        .unwrap();

    let bob = fx.registry.notification_counts(fx.bob).unwrap();
    assert_eq!(bob.incoming, 2);
    assert_eq!(bob.addressed_to_me, 1);
    assert_eq!(bob.total, 2);

    let carol = fx.registry.notification_counts(fx.carol).unwrap();
    assert_eq!(carol.addressed_to_me, 0);

    let transfers = fx.registry.document_transfers(fx.alice, a.id).unwrap();
    fx.registry
        .reject(fx.carol, transfers[0].id, &ActionRequest::default())
        .unwrap();

    let alice = fx.registry.notification_counts(fx.alice).unwrap();
    assert_eq!(alice.returned, 1);
    assert_eq!(alice.incoming, 0);
    assert_eq!(alice.total, 1);
}

#[test]
fn test_public_tracking_hides_internal_details() {
    let mut fx = Fixture::with_settings(WorkflowSettings {
        public_base_url: Some("https://records.example.org/".to_string()),
        ..WorkflowSettings::default()
    });
    let doc = fx.create_doc(fx.alice, "Business permit");
    fx.registry
        .add_remark(
            fx.alice,
            doc.id,
            &RemarkRequest {
                body: "Applicant owes fees".to_string(),
                parent_id: None,
            },
        )
        .unwrap();
    let transfer = fx.forward_to(fx.alice, doc.id, fx.fin);
    fx.registry
        .accept(fx.bob, transfer.id, &ActionRequest::default())
        .unwrap();

    let tracking = fx.registry.public_tracking(" 241017001 ").unwrap();
    assert_eq!(tracking.tracking_number, "241017001");
    assert_eq!(tracking.current_department, "Finance");
    assert_eq!(tracking.timeline.len(), 1);
    assert_eq!(tracking.timeline[0].status, TransferStatus::Accepted);
    assert_eq!(
        tracking.url.as_deref(),
        Some("https://records.example.org/track/241017001")
    );

    let body = serde_json::to_string(&tracking).unwrap();
    assert!(!body.contains("Applicant owes fees"));
    assert!(!body.contains("alice"));

    let err = fx.registry.public_tracking("999999999").unwrap_err();
    assert!(matches!(err, DocTrackError::NotFound { .. }));
}

#[test]
fn test_search_suggestions() {
    let mut fx = Fixture::with_settings(WorkflowSettings {
        suggestion_limit: 2,
        ..WorkflowSettings::default()
    });
    fx.create_doc(fx.alice, "Water permit");
    fx.create_doc(fx.alice, "Building permit");
    fx.create_doc(fx.alice, "Fishing permit");
    fx.create_doc(fx.alice, "Annual report");

    assert!(fx.registry.search_suggestions(fx.bob, "p").unwrap().is_empty());

    let hits = fx.registry.search_suggestions(fx.bob, "permit").unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "Fishing permit");

    let by_number = fx.registry.search_suggestions(fx.bob, "241017004").unwrap();
    assert_eq!(by_number.len(), 1);
    assert_eq!(by_number[0].title, "Annual report");
    assert_eq!(by_number[0].status, "received");
}

#[test]
fn test_list_documents_filters() {
    let mut fx = Fixture::new();
    let a = fx.create_doc(fx.alice, "Water permit");
    fx.create_doc(fx.bob, "Budget");
    fx.forward_to(fx.alice, a.id, fx.leg);

    let in_transit = fx
        .registry
        .list_documents(
            fx.admin,
            &DocumentFilter {
                status: Some(DocumentStatus::InTransit),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(in_transit.len(), 1);
    assert_eq!(in_transit[0].id, a.id);

    let at_fin = fx
        .registry
        .list_documents(
            fx.admin,
            &DocumentFilter {
                department_id: Some(fx.fin),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(at_fin.len(), 1);
    assert_eq!(at_fin[0].title, "Budget");

    let searched = fx
        .registry
        .list_documents(
            fx.admin,
            &DocumentFilter {
                q: Some("water".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(searched.len(), 1);
}
