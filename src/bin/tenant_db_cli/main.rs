// ABOUTME: Administrative CLI for tenant database connections
// ABOUTME: Encrypts passwords, resolves dictionaries, lists/tests connections and swaps defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Usage:
//! ```bash
//! tenant-db-cli encrypt-password --password 's3cret'
//! tenant-db-cli resolve --dictionary CENSUS_DICT --org ANSD --connect
//! tenant-db-cli list-connections --org ANSD
//! tenant-db-cli test-connection --org ANSD --name PROD --json
//! tenant-db-cli set-default --org ANSD --name BACKUP
//! ```
//!
//! Configuration comes from `TENANT_DB_*` environment variables.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tenant-db-cli",
    about = "Tenant database connection administration",
    long_about = "Inspect and manage per-organization database connections"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt a password for the db_password_encrypted column
    EncryptPassword {
        /// Plaintext password
        #[arg(long)]
        password: String,
    },

    /// Show which connection a dictionary resolves to
    Resolve {
        /// Dictionary name
        #[arg(long)]
        dictionary: String,

        /// Organization code
        #[arg(long)]
        org: Option<String>,

        /// Also open the connection through the pool
        #[arg(long)]
        connect: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the active connections of an organization
    ListConnections {
        /// Organization code
        #[arg(long)]
        org: String,
    },

    /// Open a connection and run a trivial query
    TestConnection {
        /// Organization code
        #[arg(long)]
        org: String,

        /// Connection name
        #[arg(long)]
        name: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Make a connection the organization's only default
    SetDefault {
        /// Organization code
        #[arg(long)]
        org: String,

        /// Connection name
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tenant_db_manager::logging::init_from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Command::EncryptPassword { password } => commands::password::encrypt(&password)?,
        Command::Resolve {
            dictionary,
            org,
            connect,
            json,
        } => commands::resolve::run(&dictionary, org.as_deref(), connect, json).await?,
        Command::ListConnections { org } => commands::connections::list(&org).await?,
        Command::TestConnection { org, name, json } => {
            commands::connections::test(&org, &name, json).await?;
        }
        Command::SetDefault { org, name } => commands::connections::set_default(&org, &name).await?,
    }

    Ok(())
}
