use std::sync::Arc;

use resume_scout::application::ports::ObjectVersion;
use resume_scout::application::services::{
    DispatchOutcome, HarvestBudget, UploadedObject, idempotency_key,
};
use resume_scout::domain::{JobStatus, ObjectKey};
use resume_scout::infrastructure::extraction::ScriptedExtractionEngine;
use resume_scout::infrastructure::storage::ObjectStoreStorage;

use crate::helpers::{Pipeline, RESUME_KEY, pages, uploaded};

fn started(outcome: DispatchOutcome) -> resume_scout::domain::JobId {
    match outcome {
        DispatchOutcome::Started { job_id } => job_id,
        other => panic!("expected a started job, got {other:?}"),
    }
}

#[tokio::test]
async fn given_eligible_upload_when_dispatching_then_job_started_and_both_records_seeded() {
    let pipeline = Pipeline::new(pages(&[&["A"]]));
    pipeline.upload(RESUME_KEY, b"%PDF-1").await;

    let outcome = pipeline.dispatcher.dispatch(uploaded(RESUME_KEY)).await.unwrap();

    let DispatchOutcome::Started { job_id } = outcome else {
        panic!("expected a started job, got {outcome:?}");
    };
    let by_upload = pipeline
        .job_store
        .get_by_upload(&ObjectKey::new(RESUME_KEY))
        .await
        .unwrap()
        .unwrap()
        .value;
    let by_job = pipeline.job_store.get_by_job(&job_id).await.unwrap().unwrap();

    assert_eq!(by_upload.job_id, job_id);
    assert_eq!(by_upload.status, JobStatus::Started);
    assert_eq!(by_upload, by_job);

    let submissions = pipeline.engine.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].bucket, "resume-bucket");
    assert_eq!(submissions[0].object_key.as_str(), RESUME_KEY);
    assert_eq!(
        Some(submissions[0].client_token.as_str()),
        by_upload.idempotency_key.as_deref()
    );
}

#[tokio::test]
async fn given_ineligible_upload_when_dispatching_then_ignored_without_side_effects() {
    let pipeline = Pipeline::new(pages(&[&["A"]]));

    for key in ["uploads/r.docx", "other/r.pdf", "extracted/r.pdf"] {
        let outcome = pipeline.dispatcher.dispatch(uploaded(key)).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Ignored);
    }

    assert!(pipeline.engine.submissions().is_empty());
}

#[tokio::test]
async fn given_redelivered_upload_when_dispatching_then_existing_job_is_returned() {
    let pipeline = Pipeline::new(pages(&[&["A"]]));
    pipeline.upload(RESUME_KEY, b"%PDF-1").await;

    let first = pipeline.dispatcher.dispatch(uploaded(RESUME_KEY)).await.unwrap();
    let second = pipeline.dispatcher.dispatch(uploaded(RESUME_KEY)).await.unwrap();

    let DispatchOutcome::Started { job_id } = first else {
        panic!("expected a started job, got {first:?}");
    };
    assert_eq!(second, DispatchOutcome::AlreadyTracked { job_id });
    assert_eq!(pipeline.engine.submissions().len(), 1);
}

#[tokio::test]
async fn given_changed_content_when_dispatching_again_then_new_job_replaces_by_upload() {
    let pipeline = Pipeline::new(pages(&[&["A"]]));
    pipeline.upload(RESUME_KEY, b"%PDF-1").await;
    let first = pipeline.dispatcher.dispatch(uploaded(RESUME_KEY)).await.unwrap();

    pipeline.upload(RESUME_KEY, b"%PDF-2 updated").await;
    let second = pipeline.dispatcher.dispatch(uploaded(RESUME_KEY)).await.unwrap();

    let (DispatchOutcome::Started { job_id: first_id }, DispatchOutcome::Started { job_id: second_id }) =
        (first, second)
    else {
        panic!("both dispatches should start a job");
    };
    assert_ne!(first_id, second_id);

    let by_upload = pipeline
        .job_store
        .get_by_upload(&ObjectKey::new(RESUME_KEY))
        .await
        .unwrap()
        .unwrap()
        .value;
    assert_eq!(by_upload.job_id, second_id);
    assert!(pipeline.job_store.get_by_job(&first_id).await.unwrap().is_some());
}

#[tokio::test]
async fn given_unreadable_by_upload_record_when_dispatching_then_submits_anyway() {
    let pipeline = Pipeline::new(pages(&[&["A"]]));
    let key = ObjectKey::new(RESUME_KEY);
    pipeline
        .put_raw(&resume_scout::domain::StoragePath::by_upload(&key), b"garbage")
        .await;

    let outcome = pipeline.dispatcher.dispatch(uploaded(RESUME_KEY)).await.unwrap();

    assert!(matches!(outcome, DispatchOutcome::Started { .. }));
}

#[test]
fn given_same_key_and_tag_when_deriving_idempotency_key_then_result_is_stable() {
    let key = ObjectKey::new(RESUME_KEY);
    let v1 = ObjectVersion {
        e_tag: Some("\"etag-1\"".to_string()),
        version: None,
    };
    let v2 = ObjectVersion {
        e_tag: Some("\"etag-2\"".to_string()),
        version: None,
    };

    assert_eq!(idempotency_key(&key, Some(&v1)), idempotency_key(&key, Some(&v1)));
    assert_ne!(idempotency_key(&key, Some(&v1)), idempotency_key(&key, Some(&v2)));
    assert_ne!(
        idempotency_key(&key, None),
        idempotency_key(&ObjectKey::new("uploads/other.pdf"), None)
    );
}

#[tokio::test]
async fn given_local_upload_with_reserved_characters_when_content_changes_then_new_job_starts() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = Arc::new(ObjectStoreStorage::local(dir.path().to_path_buf()).unwrap());
    let pipeline = Pipeline::with_storage(
        storage,
        ScriptedExtractionEngine::new(pages(&[&["A"]])),
        HarvestBudget::default(),
    );
    let key = "uploads/cv [final].pdf";
    let file = dir.path().join(key);
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();

    std::fs::write(&file, b"%PDF-1").unwrap();
    let first = started(pipeline.dispatcher.dispatch(uploaded(key)).await.unwrap());

    std::fs::write(&file, b"%PDF-2 with more pages").unwrap();
    let second = started(pipeline.dispatcher.dispatch(uploaded(key)).await.unwrap());

    assert_ne!(first, second);
    assert_eq!(pipeline.engine.submissions().len(), 2);
}

#[tokio::test]
async fn given_upload_from_another_bucket_when_dispatching_then_key_alone_identifies_it() {
    let pipeline = Pipeline::new(pages(&[&["A"]]));
    pipeline.upload(RESUME_KEY, b"%PDF-1").await;
    let elsewhere = || UploadedObject {
        bucket: "other-bucket".to_string(),
        object_key: ObjectKey::new(RESUME_KEY),
    };

    let job_id = started(pipeline.dispatcher.dispatch(elsewhere()).await.unwrap());
    pipeline.upload(RESUME_KEY, b"%PDF-2 updated").await;
    let second = pipeline.dispatcher.dispatch(elsewhere()).await.unwrap();

    assert_eq!(second, DispatchOutcome::AlreadyTracked { job_id });
    assert_eq!(pipeline.engine.submissions()[0].bucket, "other-bucket");
    assert_eq!(
        pipeline.engine.submissions()[0].client_token,
        idempotency_key(&ObjectKey::new(RESUME_KEY), None)
    );
}

#[test]
fn given_versioned_object_when_deriving_idempotency_key_then_version_id_wins_over_entity_tag() {
    let key = ObjectKey::new(RESUME_KEY);
    let first_upload = ObjectVersion {
        e_tag: Some("\"same-md5\"".to_string()),
        version: Some("v1".to_string()),
    };
    let identical_reupload = ObjectVersion {
        e_tag: Some("\"same-md5\"".to_string()),
        version: Some("v2".to_string()),
    };

    assert_ne!(
        idempotency_key(&key, Some(&first_upload)),
        idempotency_key(&key, Some(&identical_reupload))
    );
}
