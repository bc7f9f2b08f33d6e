pub mod document_store;
pub use document_store::DocumentStore;
pub mod pg_store;
pub use pg_store::PgDocumentStore;
pub mod memory_store;
pub use memory_store::MemoryDocumentStore;

pub mod entity_repo;
pub use entity_repo::EntityRepository;
pub mod office_repo;
pub use office_repo::OfficeRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
