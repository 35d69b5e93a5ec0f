//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all content endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, CONTENT_API, path)
    }

    /// A creation body with every required field, built from fixture constants
    pub fn complete_input(title: &str, genres: &[&str]) -> Value {
        json!({
            "Title": title,
            "SubTitle": format!("Subtitle for {}", title),
            "Description": format!("Description for {}", title),
            "ImageUrl": "https://example.com/image.jpg",
            "Duration": FIXTURE_DURATION,
            "StartTime": FIXTURE_START_TIME,
            "EndTime": FIXTURE_END_TIME,
            "GenreList": genres,
        })
    }

    // ========================================================================
    // Content Endpoints
    // ========================================================================

    /// GET / (server stats)
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET /api/v1/Content
    pub async fn list_contents(&self) -> Response {
        self.client
            .get(self.url(""))
            .send()
            .await
            .expect("List request failed")
    }

    /// GET /api/v1/Content/filter
    pub async fn filter_contents(&self, title: Option<&str>, genre: Option<&str>) -> Response {
        let mut query = Vec::new();
        if let Some(title) = title {
            query.push(("title", title));
        }
        if let Some(genre) = genre {
            query.push(("genre", genre));
        }
        self.client
            .get(self.url("/filter"))
            .query(&query)
            .send()
            .await
            .expect("Filter request failed")
    }

    /// GET /api/v1/Content/{id}
    pub async fn get_content(&self, id: Uuid) -> Response {
        self.client
            .get(self.url(&format!("/{}", id)))
            .send()
            .await
            .expect("Get request failed")
    }

    /// POST /api/v1/Content
    pub async fn create_content(&self, body: &Value) -> Response {
        self.client
            .post(self.url(""))
            .json(body)
            .send()
            .await
            .expect("Create request failed")
    }

    /// PATCH /api/v1/Content/{id}
    pub async fn update_content(&self, id: Uuid, body: &Value) -> Response {
        self.client
            .patch(self.url(&format!("/{}", id)))
            .json(body)
            .send()
            .await
            .expect("Update request failed")
    }

    /// DELETE /api/v1/Content/{id}
    pub async fn delete_content(&self, id: Uuid) -> Response {
        self.client
            .delete(self.url(&format!("/{}", id)))
            .send()
            .await
            .expect("Delete request failed")
    }

    // ========================================================================
    // Genre Endpoints
    // ========================================================================

    /// POST /api/v1/Content/{id}/genre
    pub async fn add_genres(&self, id: Uuid, genres: &[&str]) -> Response {
        self.client
            .post(self.url(&format!("/{}/genre", id)))
            .json(&genres)
            .send()
            .await
            .expect("Add genres request failed")
    }

    /// DELETE /api/v1/Content/{id}/genre
    pub async fn remove_genres(&self, id: Uuid, genres: &[&str]) -> Response {
        self.client
            .delete(self.url(&format!("/{}/genre", id)))
            .json(&genres)
            .send()
            .await
            .expect("Remove genres request failed")
    }
}
