use eyre::Result;
use moodlog_client::api_client::health_check;
use moodlog_client::context::AppContext;
use moodlog_client::guard::INDEX;
use moodlog_client::settings::Settings;
use std::path::PathBuf;

use crate::VERSION;

pub async fn run(settings: Settings) -> Result<()> {
    let env_config_dir = std::env::var("MOODLOG_CONFIG_DIR");

    let config_dir = if let Ok(config_dir) = &env_config_dir {
        PathBuf::from(config_dir)
    } else {
        moodlog_common::utils::config_dir()
    };
    let config_file = config_dir.join("config.toml");

    println!(
        "VARS:\nMOODLOG_CONFIG_DIR = {:?}\n",
        env_config_dir.unwrap_or("None".into())
    );

    let mut paths = String::from("PATHS:\n");
    paths.push_str(&format!("config_path: {config_file:?}\n"));
    paths.push_str(&format!("db_path: {:?}\n", settings.db_path));
    paths.push_str(&format!("session_path: {:?}", settings.session_path));
    println!("{paths}\n");

    let server = match health_check(&settings.server_address).await {
        Ok(res) => format!("{} ({}, v{})", settings.server_address, res.status, res.version),
        Err(err) => format!("{} (unreachable: {err})", settings.server_address),
    };

    let (ctx, _) = AppContext::new(settings, INDEX).await?;
    println!("ACCOUNT:");
    println!("Server: {server}");
    println!(
        "Auth: {}",
        ctx.backend
            .session()
            .map(|u| u.email)
            .unwrap_or("Unauthenticated".into())
    );
    println!("Network: {}", ctx.network.label());

    println!();
    println!("Version: {VERSION}");
    Ok(())
}
