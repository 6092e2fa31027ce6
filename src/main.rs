use clap::Parser;
use colored::Colorize;

use sysocial::cli::{Cli, Commands, ConfigCommands};
use sysocial::config::{StaticConfig, get_config, init_config, init_config_from};
use sysocial::runtime::lifetime::startup::run_migrations;
use sysocial::runtime::modes::run_server;
use sysocial::system::init_logging;

fn generate_config(output_path: Option<&str>) -> anyhow::Result<()> {
    let sample = StaticConfig::generate_sample_config();
    match output_path {
        Some(path) => {
            std::fs::write(path, sample)?;
            println!(
                "{} Sample configuration written to {}",
                "[OK]".green().bold(),
                path
            );
        }
        None => print!("{}", sample),
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env 在读取配置之前加载
    dotenvy::dotenv().ok();

    let command = cli.command();
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path },
    } = &command
    {
        return generate_config(output_path.as_deref());
    }

    match cli.config.as_deref() {
        Some(path) => init_config_from(path),
        None => init_config(),
    }
    let config = get_config();

    let _guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    match command {
        Commands::Migrate => run_migrations().await,
        _ => run_server().await,
    }
}
