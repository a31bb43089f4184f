pub mod disk;
pub mod memory;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::fund::FundRecord;
use disk::DiskCache;
use memory::MemoryCache;
use std::sync::Arc;
use tracing::{debug, warn};

pub type RecordCache = Arc<dyn Cache<String, FundRecord>>;

const HOLDINGS_PARTITION: &str = "holdings";

/// Opens the fund record cache under the configured data directory, falling back to an
/// in-memory cache when the directory can not be used.
pub fn open_record_cache(config: &AppConfig) -> RecordCache {
    let opened = config.data_path().and_then(|path| {
        let cache_dir = path.join("cache");
        debug!("Opening record cache at {}", cache_dir.display());
        DiskCache::<String, FundRecord>::open(&cache_dir, HOLDINGS_PARTITION)
    });

    match opened {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!("Falling back to in-memory record cache: {}", e);
            Arc::new(MemoryCache::<String, FundRecord>::new())
        }
    }
}
