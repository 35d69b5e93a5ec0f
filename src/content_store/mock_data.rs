//! Demo records for an empty catalog.

use super::error::ContentStoreResult;
use super::models::ContentUpdate;
use super::trait_def::ContentStore;
use chrono::{Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::info;

pub const MOCK_TITLES: [&str; 10] = [
    "Inception",
    "Interstellar",
    "The Dark Knight",
    "Pulp Fiction",
    "The Shawshank Redemption",
    "Forrest Gump",
    "The Godfather",
    "Fight Club",
    "Gladiator",
    "The Lord of the Rings: The Fellowship of the Ring",
];

pub const MOCK_GENRES: [&str; 10] = [
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Fantasy",
    "Horror",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
];

/// Build `count` complete creation payloads, cycling through `MOCK_TITLES`.
///
/// Record `i` runs for 120 + i minutes, starts `i` days from now and ends two
/// hours later, with one to three distinct random genres.
pub fn mock_payloads(count: usize) -> Vec<ContentUpdate> {
    let mut rng = rand::rng();
    let now = Utc::now();

    (0..count)
        .map(|i| {
            let title = MOCK_TITLES[i % MOCK_TITLES.len()];
            let start = now + Duration::days(i as i64);
            let genre_count = rng.random_range(1..=3);
            let genres: Vec<&str> = MOCK_GENRES
                .choose_multiple(&mut rng, genre_count)
                .copied()
                .collect();

            ContentUpdate::default()
                .title(title)
                .subtitle(format!("Subtitle for {}", title))
                .description(format!("Description for {}", title))
                .image_url(format!(
                    "https://example.com/{}.jpg",
                    title.replace(' ', "_")
                ))
                .duration(120 + i as i32)
                .start_time(start)
                .end_time(start + Duration::hours(2))
                .genres(genres)
        })
        .collect()
}

/// Create `count` mock records in `store`. Returns how many were created.
pub async fn seed_mock_data(store: &dyn ContentStore, count: usize) -> ContentStoreResult<usize> {
    let payloads = mock_payloads(count);
    for payload in payloads {
        store.create(payload).await?;
    }
    info!("Seeded {} mock content records", count);
    Ok(count)
}
