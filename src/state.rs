use std::sync::Arc;

use sqlx::PgPool;

use crate::aggregation::EntityRegistry;
use crate::flags::client::FlagClient;

/// Shared application state. The flag client and entity registry are carried
/// here so request paths receive them explicitly instead of reaching for a
/// process-wide global.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub flags: FlagClient,
    pub entities: Arc<EntityRegistry>,
}
