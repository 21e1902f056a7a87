/// Database layer for Taskpad
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: Embedded schema migrations
///
/// Row-level queries live next to the models in [`crate::models`].

pub mod migrations;
pub mod pool;
