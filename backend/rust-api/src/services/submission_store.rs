use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::models::Submission;

const SUBMISSIONS_COLLECTION: &str = "submissions";

/// Durable record of submissions. A record is created pending (no document
/// URL) and patched exactly once after a successful upload.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn create(&self, submission: &Submission) -> Result<()>;

    /// Idempotent single-field update; repeating it with the same URL is a
    /// no-op as far as the stored document is concerned.
    async fn set_document_url(&self, id: &str, url: &str) -> Result<()>;

    async fn list_all(&self) -> Result<Vec<Submission>>;
}

pub struct MongoSubmissionStore {
    mongo: Database,
}

impl MongoSubmissionStore {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn collection(&self) -> Collection<Submission> {
        self.mongo.collection(SUBMISSIONS_COLLECTION)
    }
}

#[async_trait]
impl SubmissionStore for MongoSubmissionStore {
    async fn create(&self, submission: &Submission) -> Result<()> {
        self.collection()
            .insert_one(submission)
            .await
            .context("Failed to insert submission")?;
        Ok(())
    }

    async fn set_document_url(&self, id: &str, url: &str) -> Result<()> {
        self.collection()
            .update_one(doc! { "_id": id }, doc! { "$set": { "documentUrl": url } })
            .await
            .context("Failed to persist document URL")?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Submission>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .await
            .context("Failed to query submissions")?;

        cursor
            .try_collect()
            .await
            .context("Submission cursor failure")
    }
}
