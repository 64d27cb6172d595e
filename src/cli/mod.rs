pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "desa-digital")]
#[command(about = "Desa Digital - village website backend API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server (default)")]
    Serve {
        #[arg(long, help = "Apply pending migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Seed permissions, roles and the admin/user accounts")]
    Seed {
        #[arg(long, help = "Password assigned to every seeded account")]
        password: String,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { migrate: false }) {
        Commands::Serve { migrate } => commands::serve::handle(config, migrate).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::Seed { password } => commands::seed::handle(config, &password).await,
    }
}
