//! Add-event-proposal form: the in-memory draft, the notification contract it
//! reports through, and the upload-then-post submission workflow.

pub mod draft;
pub mod notify;
pub mod workflow;

pub use draft::{ProposalDraft, NO_FILES_LABEL};
pub use notify::{NotificationPresenter, ToastId, ToastOptions, ToastPosition, ToastRef, ToastStatus};
pub use workflow::{AddEventProposal, FormView, SubmissionPhase, SubmitFailure, SubmitOutcome};
