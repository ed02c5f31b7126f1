use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use data_analyst_agent::{
    agents::DataAnalystAgent,
    cli::{run_ask, Cli, Commands},
    config::Config,
    extraction::DocumentExtractor,
    llm::create_answer_service,
    routes::create_router,
    utils::init_logger,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    init_logger(config.logging.log_dir.as_deref());
    info!("Configuration loaded: {:?}", config.server);
    info!("Answer service: {:?}", config.llm);

    let answer_service = create_answer_service(&config.llm);
    let extractor = DocumentExtractor::new(&config.ocr);
    if !extractor.ocr_available() {
        warn!(
            "OCR engine '{}' not found; image uploads will fail",
            config.ocr.tesseract_cmd
        );
    }
    let agent = DataAnalystAgent::new(extractor, answer_service);

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

            let app = create_router(AppState::new(config, agent));

            info!("Server listening on {}", addr);
            let listener = TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
        Commands::Ask { file, question, chart_out } => {
            let output = run_ask(&agent, &file, question.as_deref(), &chart_out).await?;
            print!("{}", output);
        }
    }

    Ok(())
}
