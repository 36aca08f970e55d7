use crate::config::ServerConfig;
use crate::services::storage::LocalStorage;
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &ServerConfig) -> anyhow::Result<Arc<LocalStorage>> {
    let storage = LocalStorage::new(&config.upload_dir, &config.compressed_dir);

    storage.ensure_dirs().await.with_context(|| {
        format!(
            "Error creating storage directories {} and {}",
            config.upload_dir.display(),
            config.compressed_dir.display()
        )
    })?;

    info!(
        "📁 Storage: staging={} output={}",
        storage.staging_dir().display(),
        storage.output_dir().display()
    );

    Ok(Arc::new(storage))
}
