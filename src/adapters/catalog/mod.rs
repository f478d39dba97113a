//! Item catalog (source of raw records)

pub mod snowflake;
pub mod traits;

pub use snowflake::SnowflakeCatalog;
pub use traits::CatalogSource;
