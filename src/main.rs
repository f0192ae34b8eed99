use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use montesuivi::client::{ReportOptions, TrackerClient};
use montesuivi::config::AppConfig;
use montesuivi::report::text::render_text;
use montesuivi::{api, db};

#[derive(Parser)]
#[command(name = "montesuivi")]
#[command(about = "Montessori workshop progress tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Args, Debug, PartialEq)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "MONTESUIVI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port for HTTP API
    #[arg(short, long, env = "MONTESUIVI_PORT", default_value = "3000")]
    port: u16,

    /// SQLite database file (defaults to the platform data directory)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MonteSuivi server
    Serve(ServeArgs),
    /// Print a progress report fetched from a running server
    Report {
        /// Kid to report on. Reports on every kid when omitted.
        #[arg(short, long)]
        kid: Option<Uuid>,

        /// Start of the period (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End of the period, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Include presented / validated percentages
        #[arg(long)]
        percentages: bool,
    },
    /// Check server status
    Status,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "montesuivi=debug,tower_http=debug".into()),
    );

    // Logs go to stderr so report output on stdout stays clean
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let ServeArgs {
        host,
        port,
        database,
    } = args;
    let mut config = AppConfig::from_env();
    if let Some(path) = database {
        config = config.with_database_path(path);
    }

    let db = match &config.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;

    let app = api::create_router_with_config(db, &config);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!(
        "MonteSuivi server listening on http://{}:{}{}",
        host,
        port,
        config.basename
    );

    axum::serve(listener, app).await?;
    Ok(())
}

async fn report(kid: Option<Uuid>, options: ReportOptions) -> anyhow::Result<()> {
    let client = TrackerClient::from_env();

    let kid_ids = match kid {
        Some(id) => vec![id],
        None => client.list_kids().await?.into_iter().map(|k| k.id).collect(),
    };

    for (i, id) in kid_ids.into_iter().enumerate() {
        if i > 0 {
            // Form feed: page break when piped to a printer
            println!("\x0c");
        }
        let report = client.get_kid_report(id, &options).await?;
        print!("{}", render_text(&report));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve(args)) => serve(args).await?,
        Some(Commands::Report {
            kid,
            from,
            to,
            percentages,
        }) => {
            let options = ReportOptions {
                from,
                to,
                include_percentages: percentages,
            };
            report(kid, options).await?
        }
        Some(Commands::Status) => {
            let client = TrackerClient::from_env();
            let status = client
                .health()
                .await
                .context("MonteSuivi server unreachable")?;
            println!("MonteSuivi server: {}", status);
        }
        None => serve(cli.serve).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_takes_serve_options() {
        let cli = Cli::try_parse_from(["montesuivi", "--port", "4000", "--host", "0.0.0.0"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, 4000);
        assert_eq!(cli.serve.host, "0.0.0.0");
    }

    #[test]
    fn serve_subcommand_parses_the_same_options() {
        let cli = Cli::try_parse_from(["montesuivi", "serve", "--port", "4000", "--host", "0.0.0.0"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => assert_eq!(
                args,
                ServeArgs {
                    host: "0.0.0.0".to_string(),
                    port: 4000,
                    database: None,
                }
            ),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn report_kid_is_optional() {
        let cli = Cli::try_parse_from(["montesuivi", "report", "--from", "2024-01-01"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Report { kid: None, .. })));
    }
}
