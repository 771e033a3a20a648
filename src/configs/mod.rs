use deadpool_redis::Runtime;
use std::sync::Arc;

use crate::{
    api::error,
    store::{memory::MemoryStore, redis::RedisStore, RecordStore},
    ENV,
};

pub async fn connect_store() -> Result<Arc<dyn RecordStore>, error::SystemError> {
    if ENV.store_backend == "memory" {
        log::warn!("Using the in-memory record store; data will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let mut cfg = deadpool_redis::Config::from_url(&ENV.redis_url);
    cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
    Ok(Arc::new(RedisStore::new(pool)))
}
