//! Subscriber resolution: (subscriber, event field name) → (topic, id, callback).

use std::sync::Arc;

use crate::error::SubscribeError;
use crate::handlers::{Callback, HandlerId};
use crate::subscribers::Subscriber;

/// A fully resolved subscriber.
#[derive(Debug)]
pub(crate) struct Resolved {
    pub topic: String,
    pub id: HandlerId,
    pub callback: Callback,
}

/// Resolves `subscriber` using its capabilities first and the `event_field` tag second.
pub(crate) fn resolve<S: Subscriber>(
    subscriber: Arc<S>,
    event_field: &str,
) -> Result<Resolved, SubscribeError> {
    let name = std::any::type_name::<S>();
    let id = subscriber.handler_id();

    let topic = subscriber
        .topic()
        .filter(|t| !t.is_empty())
        .map(|t| t.into_owned());
    let callback = Arc::clone(&subscriber).callback();

    let (topic, callback) = match (topic, callback) {
        (Some(topic), Some(callback)) => {
            return Ok(Resolved {
                topic,
                id,
                callback,
            })
        }
        partial => partial,
    };

    let field = subscriber
        .event_fields()
        .into_iter()
        .find(|f| f.name() == event_field)
        .ok_or_else(|| SubscribeError::MissingEventField {
            subscriber: name,
            field: event_field.to_string(),
        })?;

    let topic = match topic {
        Some(topic) => topic,
        None => field
            .topic_tag()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| SubscribeError::MissingTopic {
                subscriber: name,
                field: event_field.to_string(),
            })?,
    };

    let callback = match callback {
        Some(callback) => callback,
        None => {
            let notice = field
                .notice_tag()
                .ok_or_else(|| SubscribeError::MissingNotice {
                    subscriber: name,
                    field: event_field.to_string(),
                })?;
            subscriber
                .notice(notice)
                .ok_or_else(|| SubscribeError::NoticeNotFound {
                    subscriber: name,
                    notice: notice.to_string(),
                })?
        }
    };

    Ok(Resolved {
        topic,
        id,
        callback,
    })
}
