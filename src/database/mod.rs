pub mod pool;
pub mod probe;
pub mod schema;
