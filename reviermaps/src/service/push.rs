//! Push-notification contract.
//!
//! The backend pushes a typed payload when a prepared offline package is
//! ready; the service turns it into a user-facing notification with
//! download/dismiss actions. The download action deep-links to the admin
//! offline-package screen.

use serde::Deserialize;

/// Typed push payloads recognized by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PushMessage {
    /// A prepared offline package is ready for download
    OfflinePackageReady,
}

/// Action buttons attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Download,
    Dismiss,
}

impl NotificationAction {
    /// User-facing button label.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationAction::Download => "Jetzt herunterladen",
            NotificationAction::Dismiss => "Später",
        }
    }

    /// Deep-link target for the action, if it navigates anywhere.
    pub fn target(&self) -> Option<&'static str> {
        match self {
            NotificationAction::Download => Some("/admin?tab=offline-packages"),
            NotificationAction::Dismiss => None,
        }
    }
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Notification for a ready offline package.
    pub fn offline_package_ready() -> Self {
        Self {
            title: "RevierKompass".to_string(),
            body: "Offline-Paket für Baden-Württemberg ist bereit zum Download".to_string(),
            icon: "/images/police-badge.jpg".to_string(),
            actions: vec![NotificationAction::Download, NotificationAction::Dismiss],
        }
    }
}

/// Parse a push payload and produce the matching notification, if any.
///
/// Unknown payloads are ignored rather than erroring; push messages from
/// newer backend versions must not break older clients.
pub fn handle_push(payload: &[u8]) -> Option<Notification> {
    match serde_json::from_slice::<PushMessage>(payload) {
        Ok(PushMessage::OfflinePackageReady) => Some(Notification::offline_package_ready()),
        Err(_) => None,
    }
}
