use rbac_server::{Config, Server, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    config.log_fallbacks();

    tracing::info!(
        database = %config.database_path,
        policy = %config.unknown_permission_policy,
        "Starting RBAC server"
    );

    Server::new(config).run().await?;
    Ok(())
}
