use anyhow::Result;
use chain_gateway::config::Config;
use chain_gateway::server::GatewayServer;
use clap::{Arg, Command};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let matches = Command::new("chain-gateway")
        .version("0.1.0")
        .about("HTTP gateway for Ethereum blocks, transactions and contract call data")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("listen")
                .short('l')
                .long("listen")
                .value_name("ADDR")
                .help("Address to listen on, e.g. 0.0.0.0:8080"),
        )
        .arg(
            Arg::new("node-url")
                .short('n')
                .long("node-url")
                .value_name("URL")
                .help("Default JSON-RPC node used when a request has no X-Node-Address header"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .help("Generate a sample configuration file and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-path")
                .long("config-path")
                .help("Print the default configuration file path and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Handle special commands first
    if matches.get_flag("generate-config") {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        return Ok(());
    }

    if matches.get_flag("config-path") {
        match Config::default_config_path() {
            Ok(path) => {
                println!("{}", path.display());
                return Ok(());
            }
            Err(e) => {
                error!("Could not determine default config path: {}", e);
                return Err(e);
            }
        }
    }

    // Load configuration, falling back to the default location
    let config_path = match matches.get_one::<String>("config") {
        Some(path) => Some(path.into()),
        None => Config::default_config_path().ok().filter(|p| p.exists()),
    };
    let mut config = Config::load_or_default(config_path.as_deref()).await;

    // Override with command line arguments
    if let Some(listen) = matches.get_one::<String>("listen") {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{}': {}", listen, e))?;
    }

    if let Some(node_url) = matches.get_one::<String>("node-url") {
        config.node.default_rpc_url = node_url.clone();
    }

    info!("Starting chain gateway");
    info!("Default node: {}", config.node.default_rpc_url);
    info!(
        "Codec: fixed bytes input {:?}, function lookup {:?}",
        config.codec.fixed_bytes_input, config.codec.function_lookup
    );

    let server = GatewayServer::new(config);

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
