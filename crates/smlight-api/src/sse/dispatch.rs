//! Routing of one wire event to the registered callbacks.

use tracing::trace;

use super::event::{EventKind, MessageEvent};
use super::registry::CallbackRegistry;
use super::settings::dispatch_settings;

/// Invoke every callback that matches `event`, in this order:
///
/// 1. the settings decoder, for `SAVE_PARAMS`
/// 2. the callback registered for the event's exact kind
/// 3. the catch-all callback, for every event including unrecognized ones
///
/// Returns the number of callbacks invoked.
pub(crate) fn dispatch(event: &MessageEvent, registry: &CallbackRegistry) -> usize {
    let mut invoked = 0;

    match event.kind() {
        Some(kind) => {
            if kind == EventKind::SaveParams {
                invoked += dispatch_settings(event, registry);
            }
            if let Some(callback) = registry.event_callback(kind) {
                callback(event);
                invoked += 1;
            }
        }
        None => trace!(event_type = %event.event_type, "unrecognized event type"),
    }

    if let Some(callback) = registry.event_callback(EventKind::CatchAll) {
        callback(event);
        invoked += 1;
    }

    invoked
}
