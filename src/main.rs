use clap::Parser;

use linktrkr::cli::{Cli, Commands};
use linktrkr::config;
use linktrkr::runtime::modes;
use linktrkr::system::{logging, panic_handler};

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let static_config = match config::init_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    match cli.command {
        None | Some(Commands::Serve) => {
            panic_handler::install_panic_hook(true);

            if let Err(e) = static_config.validate() {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }

            // guard 必须存活到进程结束，否则缓冲的日志会丢失
            let _guard = match logging::init_logging(&static_config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    std::process::exit(1);
                }
            };

            if let Err(e) = modes::run_server().await {
                tracing::error!("Server exited with error: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(cmd) => {
            panic_handler::install_panic_hook(false);

            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
    }
}
