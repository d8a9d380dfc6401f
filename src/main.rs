use change_trends::cli::{read_password, Cli, Commands, TrendingRow};
use change_trends::config::AppConfig;
use change_trends::error::AppError;
use change_trends::services::{
    CacheStore, CredentialService, GerritClient, SqlitePreferences, TrendingPipeline,
};
use change_trends::{db, logging};
use clap::Parser;

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match serde_json::to_string(&e) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let account = config.account_key();

    match cli.command {
        Commands::Fetch { query, explain } => trending(&config, query, false, explain).await,
        Commands::Refresh { query, explain } => trending(&config, query, true, explain).await,
        Commands::SetMaxItems { max_items } => {
            let pool = db::initialize(&config.db_path).await?;
            SqlitePreferences::new(pool, account.clone(), config.default_max_items)
                .set_max_fetched_items(max_items)
                .await?;
            log::info!("Max trending items for {} set to {}", account, max_items);
            Ok(())
        }
        Commands::ClearCache => {
            let pool = db::initialize(&config.db_path).await?;
            CacheStore::new(pool).invalidate(&account).await?;
            log::info!("Cleared trending cache for {}", account);
            Ok(())
        }
        Commands::StorePassword => {
            let (url, username) = keychain_target(&config)?;
            let password = match config.password.clone() {
                Some(password) => password,
                None => read_password(std::io::stdin().lock())?,
            };
            let client = GerritClient::new(config.client_config(Some(password.clone()))?)?;
            let account = client.get_self_account().await?;
            CredentialService::store_password(url, username, &password)?;
            log::info!("Stored password for {} (account {})", username, account.account_id);
            Ok(())
        }
        Commands::ForgetPassword => {
            let (url, username) = keychain_target(&config)?;
            CredentialService::delete_password(url, username)
        }
    }
}

fn keychain_target(config: &AppConfig) -> Result<(&str, &str), AppError> {
    let url = config.require_gerrit_url()?;
    let username = config
        .username
        .as_deref()
        .ok_or_else(|| AppError::invalid_input_field("TRENDS_USERNAME is not set", "username"))?;
    Ok((url, username))
}

/// Resolve the HTTP password from the environment, then the keychain.
fn resolve_password(config: &AppConfig) -> Option<String> {
    if config.password.is_some() {
        return config.password.clone();
    }
    let (url, username) = keychain_target(config).ok()?;
    match CredentialService::get_password(url, username) {
        Ok(password) => Some(password),
        Err(e) => {
            log::warn!("No stored password for {}: {}", username, e);
            None
        }
    }
}

async fn trending(
    config: &AppConfig,
    query: Option<String>,
    force_refresh: bool,
    explain: bool,
) -> Result<(), AppError> {
    let query = query.unwrap_or_else(|| config.query.clone());
    let client = GerritClient::new(config.client_config(resolve_password(config))?)?;

    let pool = db::initialize(&config.db_path).await?;
    let preferences =
        SqlitePreferences::new(pool.clone(), config.account_key(), config.default_max_items);
    let pipeline = TrendingPipeline::new(client, preferences, CacheStore::new(pool));

    let result = pipeline.fetch(&query, force_refresh).await?;
    let explain_at = explain.then_some(result.computed_at);
    let rows: Vec<TrendingRow> = result
        .changes
        .iter()
        .map(|item| TrendingRow::new(item, explain_at))
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
