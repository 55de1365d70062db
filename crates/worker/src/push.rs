//! Push display.

use crate::context::{Notification, WorkerContext};
use crate::event::PushEvent;
use aquajal_core::NotificationPayload;

/// Push handler: turn the payload into a system notification.
///
/// A push without data and a payload that is not a `{title?, body?}` object
/// are both logged and dropped; neither fails the event. The display call is
/// registered with the event so dispatch only completes once it is shown.
pub fn on_push(ctx: &WorkerContext, event: &mut PushEvent) {
    tracing::info!("push received");

    let Some(data) = event.data.as_ref() else {
        tracing::error!("push event but no data");
        return;
    };

    let payload = match NotificationPayload::from_slice(data) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(bytes = data.len(), "ignoring malformed push payload: {e}");
            return;
        }
    };

    let notification = Notification::from_payload(&payload, &ctx.config.notification);
    let notifier = ctx.notifier.clone();
    event.wait_until(async move { notifier.show_notification(notification).await });
}
