//! Girder maps typed entities onto relational storage: schema models built
//! from explicit entity descriptors, dialect-specific SQL generation, a small
//! declarative query compiler and a batched access layer with optimistic
//! concurrency detection.

mod access;
mod backend;
mod column;
mod descriptor;
mod dialect;
mod entity;
mod error;
mod index_row;
mod key;
mod query;
mod relation;
mod schema;
mod sequence;
mod util;
mod value;

pub use access::*;
pub use backend::*;
pub use column::*;
pub use descriptor::*;
pub use dialect::*;
pub use entity::*;
pub use error::*;
pub use index_row::*;
pub use key::*;
pub use query::*;
pub use relation::*;
pub use schema::*;
pub use sequence::*;
pub use util::*;
pub use value::*;

pub type Result<T> = std::result::Result<T, Error>;
