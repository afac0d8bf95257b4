use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::Router;

use quiz_results_api::catalog::QuestionCatalog;
use quiz_results_api::config::{Config, EmailSettings, ObjectStorageSettings};
use quiz_results_api::create_router;
use quiz_results_api::models::{Question, Submission};
use quiz_results_api::services::email_service::ResultsNotifier;
use quiz_results_api::services::object_storage::DocumentStorage;
use quiz_results_api::services::submission_store::SubmissionStore;
use quiz_results_api::services::AppState;

/// In-memory stand-in for the Mongo submission store.
#[derive(Default)]
pub struct InMemoryStore {
    pub records: Mutex<Vec<Submission>>,
    pub fail_writes: bool,
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn create(&self, submission: &Submission) -> Result<()> {
        if self.fail_writes {
            bail!("store is down");
        }
        self.records.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn set_document_url(&self, id: &str, url: &str) -> Result<()> {
        if self.fail_writes {
            bail!("store is down");
        }
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record.document_url = Some(url.to_string());
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Submission>> {
        Ok(self.records.lock().unwrap().clone())
    }
}

pub struct RecordedUpload {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob store fake returning a stable URL per key.
#[derive(Default)]
pub struct FakeStorage {
    pub uploads: Mutex<Vec<RecordedUpload>>,
    pub fail: bool,
}

#[async_trait]
impl DocumentStorage for FakeStorage {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        if self.fail {
            bail!("object storage rejected the upload");
        }
        self.uploads.lock().unwrap().push(RecordedUpload {
            key: key.to_string(),
            bytes,
            content_type: content_type.to_string(),
        });
        Ok(format!("https://storage.example.com/quiz-results/{key}"))
    }
}

pub struct NotifyCall {
    pub address: String,
    pub display_name: String,
    pub document_name: String,
    pub document_url: String,
}

#[derive(Default)]
pub struct FakeNotifier {
    pub calls: Mutex<Vec<NotifyCall>>,
    pub fail: bool,
}

#[async_trait]
impl ResultsNotifier for FakeNotifier {
    async fn notify(
        &self,
        address: &str,
        display_name: &str,
        document_name: &str,
        document_url: &str,
    ) -> Result<()> {
        if self.fail {
            bail!("SMTP relay unreachable");
        }
        self.calls.lock().unwrap().push(NotifyCall {
            address: address.to_string(),
            display_name: display_name.to_string(),
            document_name: document_name.to_string(),
            document_url: document_url.to_string(),
        });
        Ok(())
    }
}

pub struct TestHarness {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub storage: Arc<FakeStorage>,
    pub notifier: Arc<FakeNotifier>,
}

pub fn test_catalog() -> QuestionCatalog {
    QuestionCatalog::from_questions(vec![
        Question {
            question_text: "Q1".into(),
            chapter_name: "Intro".into(),
            follow_up: false,
        },
        Question {
            question_text: "Q2".into(),
            chapter_name: "Intro".into(),
            follow_up: true,
        },
        Question {
            question_text: "Q3".into(),
            chapter_name: "Advanced".into(),
            follow_up: false,
        },
    ])
}

fn test_config() -> Config {
    Config {
        http_port: 0,
        mongo_uri: "mongodb://127.0.0.1:27017".into(),
        mongo_database: "quiz_test".into(),
        catalog_path: "questions.json".into(),
        upload_timeout_secs: 5,
        notify_timeout_secs: 5,
        storage: ObjectStorageSettings {
            bucket: "quiz-results".into(),
            region: "ru-central1".into(),
            endpoint: Some("https://storage.example.com".into()),
            access_key: "test".into(),
            secret_key: "test".into(),
            documents_prefix: "results".into(),
        },
        email: EmailSettings {
            server: "localhost".into(),
            port: 2525,
            login: "quiz".into(),
            password: "quiz".into(),
            from_email: "quiz@example.com".into(),
            from_name: "Quiz Team".into(),
            use_tls: false,
        },
    }
}

pub async fn create_test_app(
    store: Arc<InMemoryStore>,
    storage: Arc<FakeStorage>,
    notifier: Arc<FakeNotifier>,
) -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let config = test_config();

    // The Mongo client connects lazily; the fakes keep these tests off the
    // network entirely, the handle only exists for the health endpoint.
    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("Failed to create test Mongo client");
    let mongo = mongo_client.database(&config.mongo_database);

    let app_state = Arc::new(AppState {
        config,
        mongo,
        catalog: Arc::new(test_catalog()),
        store,
        storage,
        notifier,
    });

    create_router(app_state)
}

pub async fn create_test_harness() -> TestHarness {
    let store = Arc::new(InMemoryStore::default());
    let storage = Arc::new(FakeStorage::default());
    let notifier = Arc::new(FakeNotifier::default());
    let app = create_test_app(store.clone(), storage.clone(), notifier.clone()).await;

    TestHarness {
        app,
        store,
        storage,
        notifier,
    }
}
