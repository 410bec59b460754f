pub mod library;

use std::sync::Arc;

use libris_kernel::ModuleRegistry;

use library::repository::BookRepository;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, books: Arc<dyn BookRepository>) {
    registry.register(library::create_module(books));
}
