pub mod books;

use libris_db::Database;
use libris_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, database: &Database) {
    registry.register_custom(books::create_module(database));
}
