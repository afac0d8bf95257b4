use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::time::timeout;

use crate::catalog::QuestionCatalog;
use crate::error::SubmitError;
use crate::metrics::{DOCUMENTS_UPLOADED_TOTAL, RESULT_EMAILS_TOTAL};
use crate::models::{SubmitUserDataRequest, Submission};
use crate::services::answer_grouper::group_answers;
use crate::services::email_service::ResultsNotifier;
use crate::services::object_storage::DocumentStorage;
use crate::services::result_renderer::render_results_pdf;
use crate::services::submission_store::SubmissionStore;
use crate::services::AppState;

/// One-shot orchestration of a submission request: group answers, render
/// the results document, persist a pending record, upload the document,
/// patch the record with the document URL, notify the submitter.
///
/// Steps run strictly in sequence; each instance owns its submission for
/// the duration of the request and nothing is shared across requests
/// except the read-only catalog. No step is retried.
pub struct SubmissionPipeline {
    catalog: Arc<QuestionCatalog>,
    store: Arc<dyn SubmissionStore>,
    storage: Arc<dyn DocumentStorage>,
    notifier: Arc<dyn ResultsNotifier>,
    upload_timeout: Duration,
    notify_timeout: Duration,
}

impl SubmissionPipeline {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            catalog: state.catalog.clone(),
            store: state.store.clone(),
            storage: state.storage.clone(),
            notifier: state.notifier.clone(),
            upload_timeout: Duration::from_secs(state.config.upload_timeout_secs),
            notify_timeout: Duration::from_secs(state.config.notify_timeout_secs),
        }
    }

    pub async fn submit(
        &self,
        request: SubmitUserDataRequest,
    ) -> Result<Submission, SubmitError> {
        let mut submission = Submission::from_request(request);

        let grouped = group_answers(&self.catalog, &submission.answers)?;
        let document = render_results_pdf(&submission, &grouped, &self.catalog)?;

        self.store
            .create(&submission)
            .await
            .map_err(SubmitError::Persistence)?;

        // On upload failure the pending record stays behind without a
        // document URL; it is not rolled back.
        let file_name = document_file_name(&submission);
        let document_url = timeout(
            self.upload_timeout,
            self.storage
                .upload(&file_name, document, "application/pdf"),
        )
        .await
        .map_err(|_| {
            SubmitError::Upload(anyhow!(
                "upload timed out after {}s",
                self.upload_timeout.as_secs()
            ))
        })?
        .map_err(SubmitError::Upload)?;
        DOCUMENTS_UPLOADED_TOTAL.inc();

        self.store
            .set_document_url(&submission.id, &document_url)
            .await
            .map_err(SubmitError::Persistence)?;
        submission.document_url = Some(document_url.clone());

        // Submission and document are durable at this point; a failed email
        // must not fail the request.
        match self
            .notify(&submission, &file_name, &document_url)
            .await
        {
            Ok(()) => {
                RESULT_EMAILS_TOTAL.with_label_values(&["sent"]).inc();
            }
            Err(err) => {
                RESULT_EMAILS_TOTAL.with_label_values(&["failed"]).inc();
                tracing::warn!(
                    error = %err,
                    submission = %submission.id,
                    "Results email failed; submission is stored and the response still succeeds"
                );
            }
        }

        Ok(submission)
    }

    async fn notify(
        &self,
        submission: &Submission,
        document_name: &str,
        document_url: &str,
    ) -> Result<(), SubmitError> {
        timeout(
            self.notify_timeout,
            self.notifier.notify(
                &submission.user_email,
                &submission.user_name,
                document_name,
                document_url,
            ),
        )
        .await
        .map_err(|_| {
            SubmitError::Notification(anyhow!(
                "notification timed out after {}s",
                self.notify_timeout.as_secs()
            ))
        })?
        .map_err(SubmitError::Notification)
    }
}

/// Document name mirrors the submitter: `{name}_{surname}_{rand}.pdf`. The
/// random suffix keeps repeat submissions from overwriting each other.
fn document_file_name(submission: &Submission) -> String {
    let suffix = 1000 + rand::random::<u32>() % 9000;
    format!(
        "{}_{}_{}.pdf",
        sanitize_name_component(&submission.user_name),
        sanitize_name_component(&submission.user_surname),
        suffix
    )
}

fn sanitize_name_component(component: &str) -> String {
    component.replace('/', "_")
}
