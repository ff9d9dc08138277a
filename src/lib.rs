// Hotel supplier data merge: three supplier payloads in, one canonical hotel per
// (hotel id, destination id) out

pub mod aggregator;
pub mod config;
pub mod error;
pub mod formatter;
pub mod index;
pub mod query;
pub mod resolver;
pub mod supplier;

// Re-export key types for convenience
pub use aggregator::{merge, HotelAggregator};
pub use config::{MergeConfig, RetryConfig};
pub use error::{ConfigError, SupplierError};
pub use formatter::{format, Amenities, Images, Location, OutputRecord};
pub use index::{CompositeKey, SupplierIndex, SupplierIndexes};
pub use query::{query, select_keys, HotelQuery, QueryMode};
pub use resolver::{resolve, CanonicalRecord, Image};
pub use supplier::{
    fetch_snapshot, FileSupplierSource, HttpSupplierSource, RawRecord, StaticSupplierSource,
    Supplier, SupplierSnapshot, SupplierSource,
};
