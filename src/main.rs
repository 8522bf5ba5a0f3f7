use anyhow::Context;
use clap::Parser;
use garden_aggregator::utils::{logger, validation::Validate};
use garden_aggregator::{
    Aggregator, AggregatorConfig, AggregatorError, CatalogFilter, Cli, Command, HttpUpstream,
    ValuationRequest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let config = match &cli.config {
        Some(path) => AggregatorConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => AggregatorConfig::default(),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(2);
    }

    let upstream = HttpUpstream::new(&config.upstream)?;
    let aggregator = Aggregator::new(upstream, &config);

    match run(&aggregator, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Request failed: {} (kind: {:?}, status: {})", e, e.kind(), e.status_code());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(if e.is_client_error() { 2 } else { 1 });
        }
    }
}

async fn run(
    aggregator: &Aggregator<HttpUpstream>,
    command: Command,
) -> Result<serde_json::Value, AggregatorError> {
    let to_json = |v: serde_json::Result<serde_json::Value>| {
        v.map_err(|e| AggregatorError::decode("command output", e))
    };

    match command {
        Command::Weather => Ok((*aggregator.weather().await?).clone()),
        Command::Catalog {
            category,
            rarity,
            name,
        } => {
            let items = aggregator
                .catalog(&CatalogFilter::new(category, rarity, name))
                .await?;
            to_json(serde_json::to_value(items))
        }
        Command::Stock => {
            let stock = aggregator.stock().await?;
            to_json(serde_json::to_value(&*stock))
        }
        Command::Price { query } => {
            // 估價公式不在這裡，只輸出驗證後要交給估價元件的輸入
            let request = ValuationRequest::from_query_str(&query)?;
            to_json(serde_json::to_value(request.to_input()))
        }
    }
}
