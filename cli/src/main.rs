use clap::Parser;
use dietchat_core::{application::create_controller, domain::common::DietChatConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    application::{repl::Repl, share::HtmlCardExporter, terminal::Terminal},
    args::Args,
};

mod application;
mod args;

const DEFAULT_LOG_FILTER: &str = "dietchat_cli=info,dietchat_core=info";

fn init_logger(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if args.log.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_logger(&args);

    let config = DietChatConfig::from(args.clone());
    tracing::info!("Connecting to diet service at {}", config.api.base_url);
    let controller = create_controller(config)?;

    let mut repl = Repl::new(
        controller,
        Terminal::stdio(),
        HtmlCardExporter::new(&args.output.share_dir),
        args.output.feed_path.clone(),
    );
    repl.run().await?;

    Ok(())
}
