pub mod client;
pub use self::client::TestClient;

pub mod pool;
pub use self::pool::CountingPool;

pub mod source;
pub use self::source::{FailingReader, bytes_source, file_source};

use std::sync::LazyLock;
use tracing_subscriber::EnvFilter;

pub const BUCKET: &str = "test-bucket";

pub static TRACER: LazyLock<()> = LazyLock::new(|| {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("aws_compose_upload=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .init()
});
