//! Wire shapes of the two trigger payloads: storage object-created events
//! and engine completion notifications delivered through a pub/sub envelope.

use serde::Deserialize;

use crate::application::services::CompletionNotice;
use crate::domain::{JobId, ObjectKey};

#[derive(Debug, Default, Deserialize)]
pub struct UploadEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<UploadRecord>,
    #[serde(default)]
    pub detail: Option<UploadDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadRecord {
    #[serde(default)]
    pub s3: Option<UploadDetail>,
}

/// `bucket.name` / `object.key`, shared by the direct record and the
/// wrapped (`detail`) form.
#[derive(Debug, Default, Deserialize)]
pub struct UploadDetail {
    #[serde(default)]
    pub bucket: Option<BucketRef>,
    #[serde(default)]
    pub object: Option<ObjectRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BucketRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObjectRef {
    #[serde(default)]
    pub key: Option<String>,
}

impl UploadDetail {
    fn bucket(&self) -> Option<&str> {
        non_empty(self.bucket.as_ref()?.name.as_deref())
    }

    fn key(&self) -> Option<&str> {
        non_empty(self.object.as_ref()?.key.as_deref())
    }
}

impl UploadEvent {
    /// `(bucket, raw key)` from the first direct record, else from the
    /// wrapped form with the bucket falling back to `default_bucket`.
    pub fn location<'a>(&'a self, default_bucket: &'a str) -> Option<(&'a str, &'a str)> {
        let direct = self
            .records
            .first()
            .and_then(|r| r.s3.as_ref())
            .and_then(|s3| Some((s3.bucket()?, s3.key()?)));
        if direct.is_some() {
            return direct;
        }

        let detail = self.detail.as_ref()?;
        let key = detail.key()?;
        let bucket = detail.bucket().or(non_empty(Some(default_bucket)))?;
        Some((bucket, key))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationEnvelope {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationRecord {
    #[serde(rename = "Sns", default)]
    pub sns: Option<SnsMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SnsMessage {
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

impl NotificationEnvelope {
    pub fn message(&self) -> Option<&str> {
        let from_record = self
            .records
            .first()
            .and_then(|r| r.sns.as_ref())
            .and_then(|s| s.message.as_deref());
        non_empty(from_record.or(self.message.as_deref()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompletionMessage {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub job_status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub document_location: Option<DocumentLocation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentLocation {
    #[serde(rename = "S3Object", default)]
    pub s3_object: Option<S3ObjectRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3ObjectRef {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CompletionMessage {
    pub fn into_notice(self) -> CompletionNotice {
        let status = self.status.or(self.job_status).unwrap_or_default();
        let document_location = self
            .document_location
            .and_then(|l| l.s3_object)
            .and_then(|o| o.name)
            .filter(|n| !n.is_empty())
            .map(ObjectKey::new);

        CompletionNotice {
            job_id: JobId::new(self.job_id.unwrap_or_default()),
            status,
            status_message: self.status_message,
            document_location,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
