//! Process lifecycle: open the store, serve HTTP, close the store.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use libris_db::{Database, DbModule};
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Registry with the `db` core module and every custom module, all sharing
/// `database`.
pub fn build_registry(database: &Database) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DbModule::new(database.clone())));
    modules::register_all(&mut registry, database);
    registry
}

/// Run until Ctrl-C or SIGTERM.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    run_until(settings, libris_http::shutdown_signal()).await
}

/// Boot every module, serve until `shutdown` resolves, then stop every module.
pub async fn run_until<F>(settings: Settings, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let database = Database::new(settings.database.clone());
    let registry = build_registry(&database);
    let ctx = InitCtx {
        settings: &settings,
    };

    if let Err(err) = registry.boot(&ctx).await {
        if let Err(stop_err) = registry.shutdown().await {
            tracing::warn!(error = ?stop_err, "cleanup after failed boot did not complete");
        }
        return Err(err.context("failed to boot modules"));
    }

    let served = libris_http::start_server(&registry, &settings, shutdown).await;
    let stopped = registry.shutdown().await.context("failed to stop modules");

    served?;
    stopped
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_kernel::settings::DatabaseSettings;

    #[test]
    fn registry_holds_db_and_book_modules() {
        let registry = build_registry(&Database::in_memory());
        assert_eq!(registry.core_module_count(), 1);
        assert_eq!(registry.custom_module_count(), 1);
        assert!(registry.get_module("db").is_some());
        assert!(registry.get_module("book").is_some());
    }

    #[tokio::test]
    async fn full_lifecycle_with_memory_store() {
        let mut settings = Settings::default();
        settings.server.host = "127.0.0.1".to_string();
        settings.server.port = 0;
        settings.database = DatabaseSettings::in_memory();

        run_until(settings, async {}).await.unwrap();
    }
}
