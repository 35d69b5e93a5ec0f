//! Conversion between `ContentUpdate` payloads and `Content` records.

use super::error::MappingError;
use super::models::{Content, ContentUpdate};
use uuid::Uuid;

fn required<T: Clone>(value: &Option<T>, field: &'static str) -> Result<T, MappingError> {
    value.clone().ok_or(MappingError::MissingField { field })
}

/// Build a brand new record. Every scalar must be present, the genre list
/// defaults to empty.
pub fn map(id: Uuid, payload: &ContentUpdate) -> Result<Content, MappingError> {
    Ok(Content {
        id,
        title: required(&payload.title, "Title")?,
        subtitle: required(&payload.subtitle, "SubTitle")?,
        description: required(&payload.description, "Description")?,
        image_url: required(&payload.image_url, "ImageUrl")?,
        duration: required(&payload.duration, "Duration")?,
        start_time: required(&payload.start_time, "StartTime")?,
        end_time: required(&payload.end_time, "EndTime")?,
        genre_list: payload.genre_list.clone(),
    })
}

/// Merge `payload` into `existing`, producing a new record.
///
/// Present scalars overwrite, absent ones keep the existing value. The genre
/// list is replaced only when the payload's list is non-empty, so an empty
/// list can never clear genres.
pub fn patch(existing: &Content, payload: &ContentUpdate) -> Content {
    Content {
        id: existing.id,
        title: payload.title.clone().unwrap_or_else(|| existing.title.clone()),
        subtitle: payload
            .subtitle
            .clone()
            .unwrap_or_else(|| existing.subtitle.clone()),
        description: payload
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone()),
        image_url: payload
            .image_url
            .clone()
            .unwrap_or_else(|| existing.image_url.clone()),
        duration: payload.duration.unwrap_or(existing.duration),
        start_time: payload.start_time.unwrap_or(existing.start_time),
        end_time: payload.end_time.unwrap_or(existing.end_time),
        genre_list: if payload.genre_list.is_empty() {
            existing.genre_list.clone()
        } else {
            payload.genre_list.clone()
        },
    }
}
