//! Notifier that turns user-facing notifications into log events.

use tracing::{error, info, warn};

use cupons_core::{Notification, NotificationVariant, Notifier};

/// Emits every notification as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let Notification {
            title,
            message,
            variant,
        } = notification;

        match variant {
            NotificationVariant::Info | NotificationVariant::Success => {
                info!(target: "cupons::notify", ?variant, title = %title, "{}", message)
            }
            NotificationVariant::Warning => {
                warn!(target: "cupons::notify", title = %title, "{}", message)
            }
            NotificationVariant::Danger => {
                error!(target: "cupons::notify", title = %title, "{}", message)
            }
        }
    }
}
