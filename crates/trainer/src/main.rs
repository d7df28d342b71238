use trainer::app;
use trainer::config::{CliArgs, Config};
use trainer::Trainer;

use opening_book::OpeningBook;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so they stay off the board
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = CliArgs::parse(&args)?;
    let book = OpeningBook::builtin();

    if cli.list {
        println!("{}", serde_json::to_string_pretty(&app::catalog_json(book))?);
        return Ok(());
    }

    let config = Config::from_env().with_args(&cli);
    tracing::info!(
        reply_delay_ms = config.reply_delay.as_millis() as u64,
        seeded = config.seed.is_some(),
        "Starting trainer"
    );

    let mut trainer = Trainer::new(book.clone(), &config);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    app::run(&mut trainer, config.opening.as_deref(), stdin, &mut stdout).await?;

    Ok(())
}
