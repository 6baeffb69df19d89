//! Domain types and pure logic for the operational material migrations.
//!
//! Nothing in this crate performs I/O. Storage and messaging live behind
//! the traits in [`store`], implemented by the `opsync-db` crate and by
//! in-memory fakes in tests.

pub mod category;
pub mod convert;
pub mod error;
pub mod field_value;
pub mod fields;
pub mod h5;
pub mod legacy;
pub mod localize;
pub mod material;
pub mod migrate;
pub mod overrides;
pub mod pagination;
pub mod plan;
pub mod position;
pub mod relationship;
pub mod scope;
pub mod serde_util;
pub mod store;
pub mod sync_record;
pub mod types;
