//! Content catalog: tagged podcast and documentary records.
//!
//! Two [`ContentStore`] variants share one contract: [`SeaOrmContentStore`]
//! over a SeaORM connection and [`MemoryContentStore`] for fixtures.

pub mod cursor;
pub mod error;
pub mod memory;
pub mod repository;
pub mod search;
pub mod store;
pub mod tags;
pub mod trigram;
pub mod types;

pub use cursor::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use error::CatalogError;
pub use memory::MemoryContentStore;
pub use repository::SeaOrmContentStore;
pub use store::{ContentStore, TagRegistry};
pub use types::{Content, ContentDraft, ContentType, SearchHit, parse_published_at};
