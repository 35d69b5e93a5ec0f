//! Catalog content models.
//!
//! `Content` is the canonical record owned by a store, `ContentUpdate` is
//! the partial payload used both to create records and to patch them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// A catalog record describing one piece of media.
///
/// Records are immutable once stored: every mutation builds a new value
/// and swaps it in, the `id` is carried over untouched.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "SubTitle")]
    pub subtitle: String,
    pub description: String,
    pub image_url: String,
    /// Duration in minutes.
    pub duration: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub genre_list: Vec<String>,
}

impl Content {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre_list.iter().any(|g| g == genre)
    }
}

// Genre order is kept for display but is not part of a record's identity.
impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.subtitle == other.subtitle
            && self.description == other.description
            && self.image_url == other.image_url
            && self.duration == other.duration
            && self.start_time == other.start_time
            && self.end_time == other.end_time
            && self.genre_list.iter().collect::<HashSet<_>>()
                == other.genre_list.iter().collect::<HashSet<_>>()
    }
}

impl Eq for Content {}

/// Partial content payload.
///
/// A `None` scalar means "leave unchanged" (or "missing" on creation),
/// `Some(String::new())` means "set to empty". `genre_list` has no such
/// distinction: an empty list is read as "no change requested".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub duration: Option<i32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub genre_list: Vec<String>,
}

impl ContentUpdate {
    /// A payload that only carries a genre list.
    pub fn with_genres(genres: Vec<String>) -> Self {
        Self {
            genre_list: genres,
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn duration(mut self, duration: i32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genre_list = genres.into_iter().map(Into::into).collect();
        self
    }
}
