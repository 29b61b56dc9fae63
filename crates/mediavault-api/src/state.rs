//! Shared application state.

use mediavault_core::Config;
use mediavault_db::{MediaRepository, TagRepository, UserRepository};
use mediavault_processing::{AudioAnalyzer, Prober, VideoTranscoder};
use mediavault_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::services::ingest::IngestService;

pub struct AppState {
    pub config: Config,
    pub users: UserRepository,
    pub media: MediaRepository,
    pub tags: TagRepository,
    pub storage: Arc<dyn Storage>,
    pub ingest: IngestService,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, storage: Arc<dyn Storage>) -> Self {
        let users = UserRepository::new(pool.clone());
        let media = MediaRepository::new(pool.clone());
        let tags = TagRepository::new(pool);

        let tool_timeout = Duration::from_secs(config.tool_timeout_seconds);
        let prober = Prober::new(config.ffprobe_path.clone(), tool_timeout);
        let transcoder = Arc::new(VideoTranscoder::new(
            config.ffmpeg_path.clone(),
            prober.clone(),
            tool_timeout,
            config.max_concurrent_transcodes,
        ));
        let audio = AudioAnalyzer::new(prober.clone());

        let ingest = IngestService::new(
            media.clone(),
            tags.clone(),
            storage.clone(),
            prober,
            audio,
            transcoder,
        );

        Self {
            config,
            users,
            media,
            tags,
            storage,
            ingest,
        }
    }
}
