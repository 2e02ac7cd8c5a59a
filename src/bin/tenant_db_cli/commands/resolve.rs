// ABOUTME: resolve subcommand showing which connection a dictionary maps to
// ABOUTME: Optionally opens the connection through the manager's pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use serde_json::json;
use tenant_db_manager::database::repositories::{
    ConnectionConfigRepository, ConnectionConfigRepositoryImpl,
};
use tenant_db_manager::models::ConfigSource;

use super::{render_json, Context};

pub async fn run(
    dictionary: &str,
    org_code: Option<&str>,
    connect: bool,
    json: bool,
) -> Result<()> {
    let ctx = Context::from_env().await?;
    let organization_id = match org_code {
        Some(code) => Some(ctx.organization(code).await?.id),
        None => None,
    };

    let repository =
        ConnectionConfigRepositoryImpl::new(ctx.db.clone(), ctx.config.legacy_passwords_encrypted);
    let config = repository.resolve(dictionary, organization_id).await?;

    let connected = if connect {
        ctx.manager
            .get_connection_for_dictionary(dictionary, organization_id)
            .await?;
        Some(ctx.manager.pool_stats())
    } else {
        None
    };

    if json {
        let output = json!({
            "dictionary": dictionary,
            "organization_id": organization_id,
            "config": config,
            "pool": connected,
        });
        println!("{}", render_json(&output)?);
    } else {
        let source = match config.source {
            ConfigSource::Tenant { organization_id } => format!("tenant {organization_id}"),
            ConfigSource::Legacy => "legacy schema".to_owned(),
            ConfigSource::Adhoc => "ad hoc".to_owned(),
        };
        println!("Dictionary:  {dictionary}");
        println!("Source:      {source}");
        if let Some(name) = &config.connection_name {
            println!("Connection:  {name}");
        }
        println!("Driver:      {}", config.driver);
        println!("Target:      {}", config.target_label());
        println!("User:        {}", config.user);
        if let Some(stats) = &connected {
            println!("Connected:   yes ({} cached handle(s))", stats.active_connections);
        }
    }

    ctx.manager.close_all_connections().await;
    Ok(())
}
