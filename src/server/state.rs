use axum::extract::FromRef;

use crate::content_service::ContentService;
use std::time::Instant;

use super::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub content_service: ContentService,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, content_service: ContentService) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            content_service,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for ContentService {
    fn from_ref(input: &ServerState) -> Self {
        input.content_service.clone()
    }
}
