// ABOUTME: Connection subcommands: list, test and set-default
// ABOUTME: Connections are addressed by organization code and connection name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use tenant_db_manager::errors::{AppError, AppResult};
use tenant_db_manager::models::DatabaseConnection;
use tracing::info;

use super::{render_json, Context};

pub async fn list(org_code: &str) -> AppResult<()> {
    let ctx = Context::from_env().await?;
    let organization = ctx.organization(org_code).await?;
    let connections = ctx.db.list_active_connections(organization.id).await?;

    println!("{} ({})", organization.name, organization.code);
    if connections.is_empty() {
        println!("  no active connections");
        return Ok(());
    }
    for connection in &connections {
        let marker = if connection.is_default { "*" } else { " " };
        println!(
            "{marker} {:<20} {:<10} {}",
            connection.connection_name,
            connection.driver,
            connection.to_config().target_label()
        );
    }
    Ok(())
}

pub async fn test(org_code: &str, name: &str, json: bool) -> Result<()> {
    let ctx = Context::from_env().await?;
    let connection = find_connection(&ctx, org_code, name).await?;
    let config = connection.to_config();
    let result = ctx.manager.test_connection(&config).await;

    if json {
        println!("{}", render_json(&result)?);
    } else {
        println!("{}", result.message);
        if let Some(details) = &result.details {
            println!("  driver:   {}", details.driver);
            println!("  host:     {}", details.host);
            println!("  database: {}", details.database);
        }
    }

    if result.success {
        Ok(())
    } else {
        let target = config.target_label();
        Err(AppError::connection_open(config.driver, target, result.message).into())
    }
}

pub async fn set_default(org_code: &str, name: &str) -> AppResult<()> {
    let ctx = Context::from_env().await?;
    let connection = find_connection(&ctx, org_code, name).await?;
    let cleared = ctx
        .db
        .set_default_connection(connection.organization_id, connection.id)
        .await?;

    info!(org = org_code, connection = name, cleared, "Default connection set");
    println!("{name} is now the default connection for {org_code}");
    Ok(())
}

async fn find_connection(ctx: &Context, org_code: &str, name: &str) -> AppResult<DatabaseConnection> {
    let organization = ctx.organization(org_code).await?;
    ctx.db
        .find_connection_by_name(organization.id, name)
        .await?
        .ok_or_else(|| AppError::not_found("Database connection", format!("{org_code}/{name}")))
}
