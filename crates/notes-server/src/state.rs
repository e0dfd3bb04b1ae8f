//! Application state shared across handlers.

use std::sync::Arc;

use notes_store::Store;

use crate::attachments::AttachmentStore;
use crate::auth::TokenService;
use crate::config::ServerConfig;
use crate::request_log::RequestLogSink;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
/// Everything in it is built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Database store.
    store: Arc<Store>,
    /// Session token signer/validator.
    tokens: Arc<TokenService>,
    /// Attachment directory.
    attachments: Arc<AttachmentStore>,
    /// Request log queue.
    request_log: RequestLogSink,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: &ServerConfig, request_log: RequestLogSink) -> Self {
        let tokens = TokenService::new(&config.jwt_secret);
        let attachments = AttachmentStore::new(config.upload_dir.clone());

        Self {
            store: Arc::new(store),
            tokens: Arc::new(tokens),
            attachments: Arc::new(attachments),
            request_log,
        }
    }

    /// Get a reference to the database store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get a reference to the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Get a reference to the attachment store.
    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    /// Get a reference to the request log sink.
    pub fn request_log(&self) -> &RequestLogSink {
        &self.request_log
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("attachments", &self.attachments)
            .finish_non_exhaustive()
    }
}
