use std::sync::Arc;

use mongodb::{Client as MongoClient, Database};

use crate::catalog::QuestionCatalog;
use crate::config::Config;

pub mod answer_grouper;
pub mod email_service;
pub mod object_storage;
pub mod result_renderer;
pub mod submission_pipeline;
pub mod submission_store;

use email_service::{EmailNotifier, ResultsNotifier};
use object_storage::{DocumentStorage, ObjectStorageClient};
use submission_store::{MongoSubmissionStore, SubmissionStore};

/// Shared application state. The catalog is read-only for the process
/// lifetime; the collaborators behind trait objects are what the pipeline
/// touches, so tests can swap them for in-memory fakes.
pub struct AppState {
    pub config: Config,
    pub mongo: Database,
    pub catalog: Arc<QuestionCatalog>,
    pub store: Arc<dyn SubmissionStore>,
    pub storage: Arc<dyn DocumentStorage>,
    pub notifier: Arc<dyn ResultsNotifier>,
}

impl AppState {
    pub async fn new(
        config: Config,
        mongo_client: MongoClient,
        catalog: QuestionCatalog,
    ) -> anyhow::Result<Self> {
        let mongo = mongo_client.database(&config.mongo_database);

        tracing::info!("Pinging MongoDB...");
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            mongo.run_command(mongodb::bson::doc! { "ping": 1 }),
        )
        .await
        .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 5s"))??;
        tracing::info!("MongoDB connection established");

        let storage = ObjectStorageClient::new(config.storage.clone())?;
        let notifier = EmailNotifier::new(config.email.clone());
        let store = MongoSubmissionStore::new(mongo.clone());

        Ok(Self {
            config,
            mongo,
            catalog: Arc::new(catalog),
            store: Arc::new(store),
            storage: Arc::new(storage),
            notifier: Arc::new(notifier),
        })
    }
}
