//! Terminal rendering of form toasts.

use std::{
    collections::HashMap,
    io::Write,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::{Duration, Instant},
};

use chrono::Local;
use proposal_form::{NotificationPresenter, ToastId, ToastOptions, ToastStatus};
use tracing::debug;

struct OpenToast {
    title: String,
    expires_at: Option<Instant>,
}

/// Writes each toast as one line; timed toasts lapse once their duration passes.
pub struct TerminalPresenter<W: Write + Send> {
    out: Mutex<W>,
    next_id: AtomicU64,
    open: Mutex<HashMap<ToastId, OpenToast>>,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            next_id: AtomicU64::new(1),
            open: Mutex::new(HashMap::new()),
        }
    }

    /// Titles of toasts that are still visible, oldest first.
    pub fn visible_titles(&self) -> Vec<String> {
        let now = Instant::now();
        let Ok(mut open) = self.open.lock() else {
            return Vec::new();
        };
        open.retain(|_, toast| toast.expires_at.map_or(true, |at| at > now));
        let mut visible: Vec<_> = open.iter().collect();
        visible.sort_by_key(|(id, _)| id.0);
        visible
            .into_iter()
            .map(|(_, toast)| toast.title.clone())
            .collect()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().expect("presenter output lock poisoned")
    }
}

fn status_marker(status: ToastStatus) -> &'static str {
    match status {
        ToastStatus::Info => "..",
        ToastStatus::Success => "ok",
        ToastStatus::Danger => "!!",
    }
}

impl<W: Write + Send> NotificationPresenter for TerminalPresenter<W> {
    fn show(&self, message: &str, title: &str, options: ToastOptions) -> ToastId {
        let id = ToastId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let expires_at = (!options.is_persistent())
            .then(|| Instant::now() + Duration::from_millis(options.duration_ms));

        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(
                out,
                "{} [{}] {}: {}",
                Local::now().format("%H:%M:%S"),
                status_marker(options.status),
                title,
                message
            );
        }
        if let Ok(mut open) = self.open.lock() {
            open.insert(
                id,
                OpenToast {
                    title: title.to_string(),
                    expires_at,
                },
            );
        }
        debug!(toast = id.0, position = %options.position, duration_ms = options.duration_ms, "toast shown");
        id
    }

    fn dismiss(&self, id: ToastId) {
        if let Ok(mut open) = self.open.lock() {
            open.remove(&id);
        }
        debug!(toast = id.0, "toast dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_toast() {
        let presenter = TerminalPresenter::new(Vec::new());
        presenter.show(
            "Submitting event proposal...",
            "Loading",
            ToastOptions::persistent(ToastStatus::Info),
        );
        presenter.show(
            "Failed to submit event proposal",
            "Error",
            ToastOptions::timed(3000, ToastStatus::Danger),
        );

        let output = String::from_utf8(presenter.into_inner()).expect("utf8");
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[..] Loading: Submitting event proposal..."));
        assert!(lines[1].ends_with("[!!] Error: Failed to submit event proposal"));
    }

    #[test]
    fn dismissed_and_lapsed_toasts_are_not_visible() {
        let presenter = TerminalPresenter::new(std::io::sink());
        let loading = presenter.show("working", "Loading", ToastOptions::persistent(ToastStatus::Info));
        presenter.show("gone", "Flash", ToastOptions::timed(1, ToastStatus::Success));
        presenter.show("stays", "Success", ToastOptions::timed(60_000, ToastStatus::Success));

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(presenter.visible_titles(), vec!["Loading", "Success"]);

        presenter.dismiss(loading);
        assert_eq!(presenter.visible_titles(), vec!["Success"]);
    }
}
