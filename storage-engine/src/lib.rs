pub mod factory;
pub mod moka_store;
pub mod sled_store;

pub use factory::EngineStorageFactory;
pub use moka_store::MokaTableStore;
pub use sled_store::SledTableStore;
