use clap::Parser;
use tracerlink::cli::{Cli, Commands};
use tracerlink::config::{get_config, init_config_from};
use tracerlink::runtime::modes;
use tracerlink::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = get_config();
            let _guard = init_logging(&config.logging)?;
            if let Err(e) = modes::run_server().await {
                tracing::error!("{:#}", e);
                return Err(e);
            }
            Ok(())
        }
        command => {
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{} {:#}", colored::Colorize::red("[ERROR]"), e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
