//! Upload a local file to S3 in concurrently written parts.
//!
//! ```sh
//! cargo run --example upload_file --features tracing -- \
//!     --filepath ./data.bin --bucket my-bucket --num-of-parts 8
//! ```
use aws_compose_upload::aws_config;
use aws_compose_upload::error::Error;
use aws_compose_upload::{SdkClient, SourceFile, UploadBuilder};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{fmt, prelude::*};

const MAX_PARTS: usize = 32;

#[derive(Debug, Parser)]
#[command(about = "Split a file into parts, upload them concurrently, and compose them")]
struct Args {
    /// Location of the file.
    #[arg(long)]
    filepath: PathBuf,
    /// Bucket to upload to.
    #[arg(long)]
    bucket: String,
    /// Number of parts to split the file into.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..=MAX_PARTS as i64))]
    num_of_parts: u16,
    /// Send requests to this endpoint instead of AWS, e.g., a local MinIO.
    #[arg(long)]
    endpoint_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy("aws_compose_upload=debug");

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(phase = %e.phase(), kind = %e.kind(), part = ?e.part_index(), "{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let source = SourceFile::open(&args.filepath)?;

    let mut loader = aws_config::from_env();
    if let Some(url) = args.endpoint_url {
        loader = loader.endpoint_url(url);
    }
    let client = SdkClient::from_config(loader).await;

    let upload = UploadBuilder::new(client)
        .bucket(args.bucket)
        .part_count(usize::from(args.num_of_parts))
        .build();

    let composed = upload.upload(&source).await?;
    println!(
        "composed {} parts into {} ({} bytes), entity tag {}",
        composed.parts, composed.uri, composed.size, composed.etag
    );
    Ok(())
}
