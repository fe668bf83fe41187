use anyhow::Context;
use async_trait::async_trait;
use libris_kernel::{InitCtx, Module};

use crate::Database;

/// Core module that owns the document store connection: opened during
/// `init`, closed during `stop`.
pub struct DbModule {
    database: Database,
}

impl DbModule {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let settings = self.database.settings();
        self.database.connect().await.with_context(|| {
            format!(
                "failed to connect to {:?} database '{}'",
                settings.backend, settings.name
            )
        })?;
        tracing::info!(module = self.name(), "db module initialized");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.database
            .close()
            .await
            .context("failed to close database connection")?;
        tracing::info!(module = self.name(), "db module stopped");
        Ok(())
    }
}
