use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use client_core::{AttachmentUpload, EventProposalClient, FileUploadClient};
use shared::protocol::{join_file_urls, EventProposalRequest, SeparatorInUrl};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    draft::ProposalDraft,
    notify::{NotificationPresenter, ToastOptions, ToastPosition, ToastRef, ToastStatus},
};

pub const SUBMITTING_MESSAGE: &str = "Submitting event proposal...";
pub const SUBMITTING_TITLE: &str = "Loading";
pub const SUCCESS_MESSAGE: &str = "Event proposal submitted successfully!";
pub const SUCCESS_TITLE: &str = "Success";
pub const SUCCESS_DURATION_MS: u64 = 5000;
pub const FAILURE_MESSAGE: &str = "Failed to submit event proposal";
pub const FAILURE_TITLE: &str = "Error";
pub const FAILURE_DURATION_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Uploading,
    SubmittingProposal,
}

#[derive(Debug, Error)]
pub enum SubmitFailure {
    #[error("attachment upload failed: {0:#}")]
    Upload(anyhow::Error),
    #[error("uploaded file urls cannot be joined: {cause}")]
    FileUrls {
        orphaned_urls: Vec<String>,
        cause: SeparatorInUrl,
    },
    #[error("event proposal post failed: {cause:#}")]
    Proposal {
        orphaned_urls: Vec<String>,
        cause: anyhow::Error,
    },
}

impl SubmitFailure {
    /// Static tag naming the step that failed, for diagnostics only.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload_files",
            Self::FileUrls { .. } => "join_file_urls",
            Self::Proposal { .. } => "post_event_proposal",
        }
    }

    /// URLs uploaded before the proposal post failed. Nothing removes them.
    pub fn orphaned_urls(&self) -> &[String] {
        match self {
            Self::Upload(_) => &[],
            Self::FileUrls { orphaned_urls, .. } | Self::Proposal { orphaned_urls, .. } => {
                orphaned_urls
            }
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted { file_urls: Vec<String> },
    Failed(SubmitFailure),
    /// Another submission was still in flight; nothing was sent.
    Rejected,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

/// Read-only state for whatever renders the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: String,
    pub content_html: String,
    pub selected_file_names: String,
    pub attached_count: usize,
    pub phase: SubmissionPhase,
}

/// Holds a submission's in-flight phase and loading toast. Dropping it, on
/// completion or when the `submit` future is abandoned, closes the toast and
/// returns the form to `Idle`.
struct InFlight<'a> {
    phase: &'a StdMutex<SubmissionPhase>,
    loading: Option<ToastRef>,
}

impl InFlight<'_> {
    fn advance(&self, next: SubmissionPhase) {
        set_phase(self.phase, next);
    }

    fn close_loading(&mut self) {
        if let Some(loading) = self.loading.take() {
            loading.close();
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.loading.is_some() {
            warn!("event proposal submission abandoned before completion");
            self.close_loading();
        }
        set_phase(self.phase, SubmissionPhase::Idle);
    }
}

fn set_phase(phase: &StdMutex<SubmissionPhase>, next: SubmissionPhase) {
    *phase.lock().unwrap_or_else(PoisonError::into_inner) = next;
}

/// The add-event-proposal form and its submission workflow.
pub struct AddEventProposal {
    uploader: Arc<dyn FileUploadClient>,
    proposals: Arc<dyn EventProposalClient>,
    presenter: Arc<dyn NotificationPresenter>,
    toast_position: ToastPosition,
    draft: Mutex<ProposalDraft>,
    phase: StdMutex<SubmissionPhase>,
}

impl AddEventProposal {
    pub fn new(
        uploader: Arc<dyn FileUploadClient>,
        proposals: Arc<dyn EventProposalClient>,
        presenter: Arc<dyn NotificationPresenter>,
    ) -> Self {
        Self {
            uploader,
            proposals,
            presenter,
            toast_position: ToastPosition::default(),
            draft: Mutex::new(ProposalDraft::default()),
            phase: StdMutex::new(SubmissionPhase::Idle),
        }
    }

    pub fn with_toast_position(mut self, position: ToastPosition) -> Self {
        self.toast_position = position;
        self
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        self.draft.lock().await.title = title.into();
    }

    pub async fn set_content_html(&self, content_html: impl Into<String>) {
        self.draft.lock().await.content_html = content_html.into();
    }

    pub async fn add_files(&self, files: impl IntoIterator<Item = AttachmentUpload>) {
        self.draft.lock().await.add_files(files);
    }

    pub async fn remove_file(&self, index: usize) -> Option<AttachmentUpload> {
        self.draft.lock().await.remove_file(index)
    }

    pub async fn reset(&self) {
        self.draft.lock().await.reset();
    }

    pub async fn selected_file_names(&self) -> String {
        self.draft.lock().await.selected_file_names()
    }

    pub async fn phase(&self) -> SubmissionPhase {
        self.current_phase()
    }

    pub async fn snapshot(&self) -> FormView {
        let draft = self.draft.lock().await;
        FormView {
            title: draft.title.clone(),
            content_html: draft.content_html.clone(),
            selected_file_names: draft.selected_file_names(),
            attached_count: draft.attached_files().len(),
            phase: self.current_phase(),
        }
    }

    fn current_phase(&self) -> SubmissionPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Uploads the attachments, posts the proposal, and reports progress via
    /// toasts. Failures end up in the returned outcome, never as an error.
    pub async fn submit(&self) -> SubmitOutcome {
        let mut in_flight = {
            let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
            if *phase != SubmissionPhase::Idle {
                warn!(phase = ?*phase, "event proposal submission already in flight");
                return SubmitOutcome::Rejected;
            }
            *phase = SubmissionPhase::Uploading;
            InFlight {
                phase: &self.phase,
                loading: None,
            }
        };
        in_flight.loading = Some(ToastRef::show(
            &self.presenter,
            SUBMITTING_MESSAGE,
            SUBMITTING_TITLE,
            ToastOptions::persistent(ToastStatus::Info).at(self.toast_position),
        ));

        let draft = self.draft.lock().await.clone();
        if draft.is_empty() {
            debug!("submitting an empty event proposal");
        }

        let result = self.upload_and_post(&draft, &in_flight).await;
        in_flight.close_loading();

        let mut live_draft = self.draft.lock().await;
        drop(in_flight);
        match result {
            Ok(file_urls) => {
                info!(
                    title = %draft.title,
                    attachments = file_urls.len(),
                    "event proposal submitted"
                );
                self.presenter.show(
                    SUCCESS_MESSAGE,
                    SUCCESS_TITLE,
                    ToastOptions::timed(SUCCESS_DURATION_MS, ToastStatus::Success)
                        .at(self.toast_position),
                );
                live_draft.reset();
                SubmitOutcome::Submitted { file_urls }
            }
            Err(failure) => {
                error!(stage = failure.stage(), error = %failure, "event proposal submission failed");
                if !failure.orphaned_urls().is_empty() {
                    warn!(
                        urls = ?failure.orphaned_urls(),
                        "uploaded attachments are not referenced by any proposal"
                    );
                }
                self.presenter.show(
                    FAILURE_MESSAGE,
                    FAILURE_TITLE,
                    ToastOptions::timed(FAILURE_DURATION_MS, ToastStatus::Danger)
                        .at(self.toast_position),
                );
                SubmitOutcome::Failed(failure)
            }
        }
    }

    async fn upload_and_post(
        &self,
        draft: &ProposalDraft,
        in_flight: &InFlight<'_>,
    ) -> Result<Vec<String>, SubmitFailure> {
        let file_urls = self
            .uploader
            .upload_files(draft.attached_files())
            .await
            .map_err(SubmitFailure::Upload)?;

        let joined = match join_file_urls(&file_urls) {
            Ok(joined) => joined,
            Err(cause) => {
                return Err(SubmitFailure::FileUrls {
                    orphaned_urls: file_urls,
                    cause,
                })
            }
        };
        let proposal = EventProposalRequest {
            title: draft.title.clone(),
            content: draft.content_html.clone(),
            file_urls: joined,
        };
        in_flight.advance(SubmissionPhase::SubmittingProposal);

        match self.proposals.post_event_proposal(&proposal).await {
            Ok(()) => Ok(file_urls),
            Err(cause) => Err(SubmitFailure::Proposal {
                orphaned_urls: file_urls,
                cause,
            }),
        }
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
