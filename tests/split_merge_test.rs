mod common;

use common::Fixture;
use doc_tracker::core::requests::{
    ActionRequest, AssignCaseRequest, CreateCaseRequest, CreateDocumentRequest, LinkRequest,
    MergeRequest, RemarkRequest, SplitPart, SplitRequest, UpdateDocumentRequest, MAX_TITLE_LENGTH,
};
use doc_tracker::domain::model::{
    CaseStatus, DocumentStatus, EventType, RelationType, VersionType,
};
use doc_tracker::DocTrackError;
use serde_json::json;

#[test]
fn test_split_assigns_sequential_suffixes() {
    let mut fx = Fixture::new();
    let parent = fx.create_doc(fx.alice, "Procurement bundle");

    let children = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(3))
        .unwrap();
    let numbers: Vec<&str> = children.iter().map(|c| c.tracking_number.as_str()).collect();
    assert_eq!(numbers, vec!["241017001-A", "241017001-B", "241017001-C"]);
    assert_eq!(children[0].title, "Procurement bundle (Part A)");
    assert_eq!(children[0].parent_id, Some(parent.id));
    assert_eq!(children[0].status, DocumentStatus::Received);

    // 後續拆分接在最大字母之後
    let more = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(1))
        .unwrap();
    assert_eq!(more[0].tracking_number, "241017001-D");
    assert_eq!(more[0].split_suffix, Some('D'));

    // 母文件狀態不變
    assert_eq!(fx.document(parent.id).status, DocumentStatus::Received);
    let listed = fx.registry.document_children(fx.alice, parent.id).unwrap();
    assert_eq!(listed.len(), 4);
}

#[test]
fn test_split_children_inherit_and_override() {
    let mut fx = Fixture::new();
    let parent = fx
        .registry
        .create_document(
            fx.alice,
            &CreateDocumentRequest {
                title: "Permit application".to_string(),
                description: Some("Filed at the counter".to_string()),
                document_type: "application".to_string(),
                metadata: Some(json!({"priority": "low", "channel": "walk-in"})),
                case_id: None,
            },
        )
        .unwrap();

    let children = fx
        .registry
        .split(
            fx.alice,
            parent.id,
            &SplitRequest {
                parts: vec![
                    SplitPart {
                        title: Some("Site plan".to_string()),
                        description: None,
                        metadata: Some(json!({"priority": "high"})),
                    },
                    SplitPart::default(),
                ],
                remarks: Some("separate review tracks".to_string()),
            },
        )
        .unwrap();

    assert_eq!(children[0].title, "Site plan");
    assert_eq!(children[0].document_type, "application");
    assert_eq!(children[0].description.as_deref(), Some("Filed at the counter"));
    assert_eq!(children[0].metadata, json!({"priority": "high", "channel": "walk-in"}));
    assert_eq!(children[1].metadata, json!({"priority": "low", "channel": "walk-in"}));

    let custody = fx.registry.custody(fx.alice, children[0].id).unwrap();
    let original = custody.original.unwrap();
    assert_eq!(original.department_id, fx.reg);
    assert_eq!(original.notes.as_deref(), Some("split"));

    let relations = fx.registry.relationships(fx.alice, children[1].id).unwrap();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].relation, RelationType::SplitFrom);
    assert_eq!(relations[0].to_document_id, parent.id);

    let parent_events = fx.registry.events(fx.alice, parent.id).unwrap();
    let split_event = parent_events.last().unwrap();
    assert_eq!(split_event.event_type, EventType::Split);
    assert_eq!(
        split_event.details["children"],
        json!(["241017001-A", "241017001-B"])
    );

    let child_events = fx.registry.events(fx.alice, children[0].id).unwrap();
    assert_eq!(child_events[0].event_type, EventType::SplitChildCreated);
}

#[test]
fn test_split_capacity_is_all_or_nothing() {
    let mut fx = Fixture::new();
    let parent = fx.create_doc(fx.alice, "Archive box 12");

    let first = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(24))
        .unwrap();
    assert_eq!(first.last().unwrap().split_suffix, Some('X'));

    let err = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(3))
        .unwrap_err();
    match err {
        DocTrackError::SplitCapacityExceeded {
            requested,
            available,
        } => {
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        fx.registry
            .document_children(fx.alice, parent.id)
            .unwrap()
            .len(),
        24
    );

    let last = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(2))
        .unwrap();
    let suffixes: Vec<Option<char>> = last.iter().map(|c| c.split_suffix).collect();
    assert_eq!(suffixes, vec![Some('Y'), Some('Z')]);
}

#[test]
fn test_split_child_title_stays_editable_for_long_parent() {
    let mut fx = Fixture::new();
    let parent = fx.create_doc(fx.alice, &"x".repeat(MAX_TITLE_LENGTH));

    let children = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(1))
        .unwrap();
    let title = children[0].title.clone();
    assert!(title.chars().count() <= MAX_TITLE_LENGTH);
    assert!(title.ends_with(" (Part A)"));

    // 預設標題必須能原樣存回
    let updated = fx
        .registry
        .update_document(
            fx.alice,
            children[0].id,
            &UpdateDocumentRequest {
                title: Some(title.clone()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, title);
}

#[test]
fn test_split_preconditions() {
    let mut fx = Fixture::new();
    let parent = fx.create_doc(fx.alice, "Procurement bundle");

    let err = fx
        .registry
        .split(fx.bob, parent.id, &SplitRequest::into_parts(2))
        .unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));

    let err = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::default())
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    let children = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(1))
        .unwrap();
    let err = fx
        .registry
        .split(fx.alice, children[0].id, &SplitRequest::into_parts(1))
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    fx.forward_to(fx.alice, parent.id, fx.fin);
    let err = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(1))
        .unwrap_err();
    assert!(matches!(err, DocTrackError::InvalidWorkflowTransition { .. }));
}

#[test]
fn test_merge_closes_sources() {
    let mut fx = Fixture::new();
    let target = fx.create_doc(fx.alice, "Consolidated claim");
    let a = fx.create_doc(fx.alice, "Receipt 1");
    let b = fx.create_doc(fx.alice, "Receipt 2");

    let merged = fx
        .registry
        .merge(
            fx.alice,
            target.id,
            &MergeRequest {
                source_ids: vec![a.id, b.id],
                remarks: None,
            },
        )
        .unwrap();
    assert_eq!(merged.status, DocumentStatus::Received);

    for source in [a.id, b.id] {
        assert_eq!(fx.document(source).status, DocumentStatus::Merged);
        let relations = fx.registry.relationships(fx.alice, source).unwrap();
        assert!(relations
            .iter()
            .any(|r| r.relation == RelationType::MergedInto && r.to_document_id == target.id));
    }

    let events = fx.registry.events(fx.alice, target.id).unwrap();
    assert_eq!(events.last().unwrap().event_type, EventType::MergeTarget);

    // 合併後的文件不能再做任何流程動作
    let err = fx
        .registry
        .complete(fx.alice, a.id, &ActionRequest::default())
        .unwrap_err();
    assert!(matches!(err, DocTrackError::InvalidWorkflowTransition { .. }));
}

#[test]
fn test_merge_is_atomic() {
    let mut fx = Fixture::new();
    let target = fx.create_doc(fx.alice, "Consolidated claim");
    let mine = fx.create_doc(fx.alice, "Receipt 1");
    let theirs = fx.create_doc(fx.bob, "Receipt 2");

    let err = fx
        .registry
        .merge(
            fx.alice,
            target.id,
            &MergeRequest {
                source_ids: vec![mine.id, theirs.id],
                remarks: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));
    assert_eq!(fx.document(mine.id).status, DocumentStatus::Received);

    let err = fx
        .registry
        .merge(
            fx.alice,
            target.id,
            &MergeRequest {
                source_ids: vec![target.id],
                remarks: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));
}

#[test]
fn test_link_and_unlink() {
    let mut fx = Fixture::new();
    let letter = fx.create_doc(fx.alice, "Cover letter");
    let annex = fx.create_doc(fx.bob, "Annex");

    let link = LinkRequest {
        to_document_id: annex.id,
        relation: RelationType::AttachedTo,
    };
    let relationship = fx.registry.link(fx.alice, letter.id, &link).unwrap();
    assert_eq!(relationship.from_document_id, letter.id);

    let err = fx.registry.link(fx.alice, letter.id, &link).unwrap_err();
    assert!(matches!(err, DocTrackError::Conflict { .. }));

    let err = fx
        .registry
        .link(
            fx.alice,
            letter.id,
            &LinkRequest {
                to_document_id: letter.id,
                relation: RelationType::RelatedTo,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    let err = fx
        .registry
        .link(
            fx.alice,
            letter.id,
            &LinkRequest {
                to_document_id: annex.id,
                relation: RelationType::MergedInto,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    // 兩份文件都看得到這條關聯
    assert_eq!(fx.registry.relationships(fx.bob, annex.id).unwrap().len(), 1);

    let err = fx.registry.unlink(fx.bob, relationship.id).unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));

    fx.registry.unlink(fx.alice, relationship.id).unwrap();
    assert!(fx.registry.relationships(fx.alice, letter.id).unwrap().is_empty());

    let kinds: Vec<EventType> = fx
        .registry
        .events(fx.alice, letter.id)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert!(kinds.contains(&EventType::Linked));
    assert!(kinds.contains(&EventType::Unlinked));
}

#[test]
fn test_case_lifecycle() {
    let mut fx = Fixture::new();
    let case = fx
        .registry
        .create_case(
            fx.alice,
            &CreateCaseRequest {
                title: "Road widening project".to_string(),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(case.case_number, "CASE-2024-0001");
    assert_eq!(case.status, CaseStatus::Open);

    let second = fx
        .registry
        .create_case(
            fx.bob,
            &CreateCaseRequest {
                title: "Budget review".to_string(),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(second.case_number, "CASE-2024-0002");

    let doc = fx.create_doc(fx.alice, "Right of way survey");
    let assigned = fx
        .registry
        .assign_case(fx.alice, case.id, &AssignCaseRequest { document_id: doc.id })
        .unwrap();
    assert_eq!(assigned.case_id, Some(case.id));

    let err = fx
        .registry
        .assign_case(fx.bob, case.id, &AssignCaseRequest { document_id: doc.id })
        .unwrap_err();
    assert!(matches!(err, DocTrackError::UnauthorizedWorkflowAction { .. }));

    let detail = fx.registry.get_case(fx.bob, case.id).unwrap();
    assert_eq!(detail.documents.len(), 1);

    let err = fx.registry.close_case(fx.alice, case.id).unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    fx.registry
        .complete(fx.alice, doc.id, &ActionRequest::default())
        .unwrap();
    let closed = fx.registry.close_case(fx.alice, case.id).unwrap();
    assert_eq!(closed.status, CaseStatus::Closed);
    assert!(closed.closed_at.is_some());

    let err = fx.registry.close_case(fx.alice, case.id).unwrap_err();
    assert!(matches!(err, DocTrackError::Conflict { .. }));

    // 已結案的案件不再收文件
    let late = fx.create_doc(fx.alice, "Late survey");
    let err = fx
        .registry
        .assign_case(fx.alice, case.id, &AssignCaseRequest { document_id: late.id })
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));
}

#[test]
fn test_split_children_stay_in_case() {
    let mut fx = Fixture::new();
    let case = fx
        .registry
        .create_case(
            fx.alice,
            &CreateCaseRequest {
                title: "Land dispute".to_string(),
                description: None,
            },
        )
        .unwrap();
    let parent = fx
        .registry
        .create_document(
            fx.alice,
            &CreateDocumentRequest {
                title: "Complaint".to_string(),
                document_type: "complaint".to_string(),
                case_id: Some(case.id),
                ..Default::default()
            },
        )
        .unwrap();

    let children = fx
        .registry
        .split(fx.alice, parent.id, &SplitRequest::into_parts(2))
        .unwrap();
    assert!(children.iter().all(|c| c.case_id == Some(case.id)));
    assert_eq!(fx.registry.get_case(fx.alice, case.id).unwrap().documents.len(), 3);
}

#[test]
fn test_remark_threads() {
    let mut fx = Fixture::new();
    let doc = fx.create_doc(fx.alice, "Purchase request");
    let other = fx.create_doc(fx.alice, "Unrelated");

    let root = fx
        .registry
        .add_remark(
            fx.alice,
            doc.id,
            &RemarkRequest {
                body: "Please attach the quotation".to_string(),
                parent_id: None,
            },
        )
        .unwrap();
    let reply = fx
        .registry
        .add_remark(
            fx.bob,
            doc.id,
            &RemarkRequest {
                body: "  Attached in annex B  ".to_string(),
                parent_id: Some(root.id),
            },
        )
        .unwrap();
    assert_eq!(reply.body, "Attached in annex B");
    fx.registry
        .add_remark(
            fx.dave,
            doc.id,
            &RemarkRequest {
                body: "Legal has no objection".to_string(),
                parent_id: None,
            },
        )
        .unwrap();

    let thread = fx.registry.remarks(fx.alice, doc.id).unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].remark.id, root.id);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].remark.author_id, fx.bob);
    assert!(thread[1].replies.is_empty());

    let err = fx
        .registry
        .add_remark(
            fx.alice,
            other.id,
            &RemarkRequest {
                body: "Cross-thread reply".to_string(),
                parent_id: Some(root.id),
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    let err = fx
        .registry
        .add_remark(
            fx.alice,
            doc.id,
            &RemarkRequest {
                body: "   ".to_string(),
                parent_id: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DocTrackError::ValidationError { .. }));

    // 轉送中也可以留言
    fx.forward_to(fx.alice, doc.id, fx.fin);
    fx.registry
        .add_remark(
            fx.carol,
            doc.id,
            &RemarkRequest {
                body: "Incoming, will review".to_string(),
                parent_id: None,
            },
        )
        .unwrap();
    let custody = fx.registry.custody(fx.alice, doc.id).unwrap();
    assert_eq!(custody.original.unwrap().version_type, VersionType::Original);
}
