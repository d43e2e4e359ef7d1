/*!
Schema resolution and type-directed field encoding.

Module layout:
  column.rs    - Column Model (types, options, Schema)
  error.rs     - typed error taxonomy (stable codes + hints)
  normalize.rs - raw payload -> canonical Schema
  index.rs     - id/key/name lookup + type-based search
  infer.rs     - partial schema from sampled rows
  cache.rs     - durable per-list schema storage + monotonic merge
  resolve.rs   - discovery strategy chain (file -> cache -> metadata -> inference)
  encode.rs    - raw user input -> typed field payload
*/

pub mod cache;
pub mod column;
pub mod encode;
pub mod error;
pub mod index;
pub mod infer;
pub mod normalize;
pub mod resolve;

pub use cache::SchemaCache;
pub use column::{Column, ColumnOptions, ColumnType, Schema, SelectChoice};
pub use encode::{FieldPayload, encode_field};
pub use error::SchemaError;
pub use index::SchemaIndex;
pub use infer::infer_schema;
pub use normalize::normalize_schema;
pub use resolve::SchemaResolver;
