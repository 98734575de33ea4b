#![allow(dead_code)]

mod pipeline;
mod test_postgres;
mod test_redis;

pub use pipeline::{TEST_JWT_SECRET, TestPipeline, collect_stream, mint_token, test_settings};
pub use test_postgres::TestPostgres;
pub use test_redis::TestRedis;
