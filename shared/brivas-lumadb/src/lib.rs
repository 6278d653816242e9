//! Brivas LumaDB Client
//!
//! Pooled access to LumaDB over the PostgreSQL wire protocol.

mod error;
mod pool;

pub use error::{LumaDbError, Result};
pub use pool::{LumaDbPool, PoolConfig};
