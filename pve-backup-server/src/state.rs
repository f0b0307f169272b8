use crate::config::AppConfig;
use pve_backup::BackupService;
use std::sync::Arc;

pub struct AppState {
    pub service: Arc<BackupService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(service: BackupService, config: AppConfig) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }

    /// Run a blocking service call off the async runtime.
    pub async fn blocking<T, F>(&self, f: F) -> Result<T, crate::error::AppError>
    where
        T: Send + 'static,
        F: FnOnce(&BackupService) -> pve_backup::Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        let result = tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(result?)
    }
}
