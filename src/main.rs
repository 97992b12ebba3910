use std::env;

use clap::Parser;
use prefix_index::session::{Backend, IndexArgs};
use prefix_index::Result;
use simple_log::LogConfigBuilder;
use simple_log::{error, info};
use tokio::io::BufReader;

fn setup_debug_logging() {
    let mut temp_dir = env::temp_dir();
    temp_dir.push("prefix-index.log");
    if let Some(log_path) = temp_dir.to_str() {
        let config = LogConfigBuilder::builder().path(log_path).build();
        if let Err(_e) = simple_log::new(config) {
            error!("fail to setup log {}", log_path);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = IndexArgs::parse();

    if args.debug {
        setup_debug_logging();
    }

    let backend = Backend::new(args);
    let loaded = backend.load_corpus().await?;
    info!("corpus loaded: {} tokens", loaded);

    let stdin = BufReader::new(tokio::io::stdin());
    backend.serve(stdin, tokio::io::stdout()).await
}
