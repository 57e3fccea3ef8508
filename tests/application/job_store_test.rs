use std::sync::Arc;

use resume_scout::application::ports::{ObjectStorage, WriteMode};
use resume_scout::application::services::{ConditionalWrite, JobStore, JobStoreError};
use resume_scout::domain::{JobId, JobRecord, ObjectKey, StoragePath};
use resume_scout::infrastructure::storage::ObjectStoreStorage;

fn record(job: &str) -> JobRecord {
    JobRecord::started(JobId::new(job), ObjectKey::new("uploads/r.pdf"), None)
}

fn memory_store() -> (Arc<dyn ObjectStorage>, JobStore) {
    let storage: Arc<dyn ObjectStorage> = Arc::new(ObjectStoreStorage::in_memory());
    let store = JobStore::new(Arc::clone(&storage));
    (storage, store)
}

#[tokio::test]
async fn given_missing_records_when_reading_then_returns_none() {
    let (_storage, store) = memory_store();

    assert!(store.get_by_job(&JobId::new("nope")).await.unwrap().is_none());
    assert!(store
        .get_by_upload(&ObjectKey::new("uploads/nope.pdf"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn given_record_when_written_to_both_families_then_each_reads_back() {
    let (_storage, store) = memory_store();
    let record = record("job-1");

    store.put_by_job(&record).await.unwrap();
    store.put_by_upload(&record).await.unwrap();

    assert_eq!(store.get_by_job(&record.job_id).await.unwrap(), Some(record.clone()));
    let by_upload = store.get_by_upload(&record.object_key).await.unwrap().unwrap();
    assert_eq!(by_upload.value, record);
}

#[tokio::test]
async fn given_garbage_by_upload_object_when_reading_then_reports_malformed() {
    let (storage, store) = memory_store();
    let key = ObjectKey::new("uploads/r.pdf");
    storage
        .put(&StoragePath::by_upload(&key), b"{not json".to_vec(), WriteMode::Overwrite)
        .await
        .unwrap();

    let err = store.get_by_upload(&key).await.unwrap_err();

    assert!(matches!(err, JobStoreError::Malformed { .. }));
}

#[tokio::test]
async fn given_current_version_when_replacing_by_upload_then_write_is_applied() {
    let (_storage, store) = memory_store();
    store.put_by_upload(&record("job-1")).await.unwrap();
    let current = store
        .get_by_upload(&ObjectKey::new("uploads/r.pdf"))
        .await
        .unwrap()
        .unwrap();

    let outcome = store
        .replace_by_upload(&record("job-2"), Some(&current.version))
        .await
        .unwrap();

    assert_eq!(outcome, ConditionalWrite::Applied);
}

#[tokio::test]
async fn given_stale_version_when_replacing_by_upload_then_reports_conflict() {
    let (_storage, store) = memory_store();
    store.put_by_upload(&record("job-1")).await.unwrap();
    let stale = store
        .get_by_upload(&ObjectKey::new("uploads/r.pdf"))
        .await
        .unwrap()
        .unwrap();
    store.put_by_upload(&record("job-2")).await.unwrap();

    let outcome = store
        .replace_by_upload(&record("job-3"), Some(&stale.version))
        .await
        .unwrap();

    assert_eq!(outcome, ConditionalWrite::Conflict);
    let current = store
        .get_by_upload(&ObjectKey::new("uploads/r.pdf"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.value.job_id, JobId::new("job-2"));
}

#[tokio::test]
async fn given_record_appeared_when_creating_by_upload_then_reports_conflict() {
    let (_storage, store) = memory_store();
    store.put_by_upload(&record("job-1")).await.unwrap();

    let outcome = store.replace_by_upload(&record("job-2"), None).await.unwrap();

    assert_eq!(outcome, ConditionalWrite::Conflict);
}

#[tokio::test]
async fn given_local_backend_when_replacing_by_upload_then_falls_back_to_overwrite() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage: Arc<dyn ObjectStorage> =
        Arc::new(ObjectStoreStorage::local(dir.path().to_path_buf()).unwrap());
    let store = JobStore::new(storage);
    store.put_by_upload(&record("job-1")).await.unwrap();
    let current = store
        .get_by_upload(&ObjectKey::new("uploads/r.pdf"))
        .await
        .unwrap()
        .unwrap();

    let outcome = store
        .replace_by_upload(&record("job-2"), Some(&current.version))
        .await
        .unwrap();

    assert_eq!(outcome, ConditionalWrite::Applied);
    let after = store
        .get_by_upload(&ObjectKey::new("uploads/r.pdf"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.value.job_id, JobId::new("job-2"));
}

#[tokio::test]
async fn given_checkpoint_when_deleted_twice_then_second_delete_is_a_no_op() {
    let (_storage, store) = memory_store();
    let checkpoint = resume_scout::domain::HarvestCheckpoint::new(JobId::new("job-1"));
    store.put_checkpoint(&checkpoint).await.unwrap();

    store.delete_checkpoint(&checkpoint.job_id).await.unwrap();
    store.delete_checkpoint(&checkpoint.job_id).await.unwrap();

    assert!(store.get_checkpoint(&checkpoint.job_id).await.unwrap().is_none());
}
