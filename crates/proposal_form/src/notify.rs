//! Transient status notifications ("toasts") shown while a form works.

use std::{fmt, str::FromStr, sync::Arc};

/// Duration value meaning "stay visible until closed".
pub const PERSISTENT: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStatus {
    Info,
    Success,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl FromStr for ToastPosition {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "top_right" => Ok(Self::TopRight),
            "top_left" => Ok(Self::TopLeft),
            "bottom_right" => Ok(Self::BottomRight),
            "bottom_left" => Ok(Self::BottomLeft),
            other => Err(format!("unknown toast position '{other}'")),
        }
    }
}

impl fmt::Display for ToastPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopRight => "top_right",
            Self::TopLeft => "top_left",
            Self::BottomRight => "bottom_right",
            Self::BottomLeft => "bottom_left",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastOptions {
    /// Auto-dismiss delay; `PERSISTENT` keeps the toast until it is closed.
    pub duration_ms: u64,
    pub position: ToastPosition,
    pub status: ToastStatus,
}

impl ToastOptions {
    pub fn persistent(status: ToastStatus) -> Self {
        Self::timed(PERSISTENT, status)
    }

    pub fn timed(duration_ms: u64, status: ToastStatus) -> Self {
        Self {
            duration_ms,
            position: ToastPosition::default(),
            status,
        }
    }

    pub fn at(mut self, position: ToastPosition) -> Self {
        self.position = position;
        self
    }

    pub fn is_persistent(&self) -> bool {
        self.duration_ms == PERSISTENT
    }
}

/// Displays toasts. Implementations own auto-dismissal of timed toasts.
pub trait NotificationPresenter: Send + Sync {
    fn show(&self, message: &str, title: &str, options: ToastOptions) -> ToastId;
    fn dismiss(&self, id: ToastId);
}

/// Handle to a shown toast. Closing consumes it.
pub struct ToastRef {
    id: ToastId,
    presenter: Arc<dyn NotificationPresenter>,
}

impl ToastRef {
    pub fn show(
        presenter: &Arc<dyn NotificationPresenter>,
        message: &str,
        title: &str,
        options: ToastOptions,
    ) -> Self {
        let id = presenter.show(message, title, options);
        Self {
            id,
            presenter: Arc::clone(presenter),
        }
    }

    pub fn id(&self) -> ToastId {
        self.id
    }

    pub fn close(self) {
        self.presenter.dismiss(self.id);
    }
}
