//! Test fixture creation
//!
//! Seeds a store with a small, known set of records.

use super::constants::*;
use chrono::{DateTime, Utc};
use content_catalog_server::content_store::{ContentStore, ContentUpdate};
use uuid::Uuid;

fn parse_time(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("Invalid fixture timestamp")
        .with_timezone(&Utc)
}

pub fn fixture_payload(title: &str, genres: &[&str]) -> ContentUpdate {
    ContentUpdate::default()
        .title(title)
        .subtitle(format!("Subtitle for {}", title))
        .description(format!("Description for {}", title))
        .image_url(format!("https://example.com/{}.jpg", title.replace(' ', "_")))
        .duration(FIXTURE_DURATION)
        .start_time(parse_time(FIXTURE_START_TIME))
        .end_time(parse_time(FIXTURE_END_TIME))
        .genres(genres.iter().copied())
}

/// Creates the two fixture records and returns their ids in order.
pub async fn seed_fixture_contents(store: &dyn ContentStore) -> anyhow::Result<[Uuid; 2]> {
    let first = store
        .create(fixture_payload(CONTENT_1_TITLE, CONTENT_1_GENRES))
        .await?;
    let second = store
        .create(fixture_payload(CONTENT_2_TITLE, CONTENT_2_GENRES))
        .await?;
    Ok([first.id, second.id])
}
