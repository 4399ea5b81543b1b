pub mod fixture;
pub mod memory;

pub use fixture::CatalogFixture;
pub use memory::CatalogStore;
