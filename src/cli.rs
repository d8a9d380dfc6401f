//! Command line interface of the `trends` host binary.

use crate::error::AppError;
use crate::models::ScoredChange;
use crate::services::scoring::{self, ScoreBreakdown};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::BufRead;

#[derive(Parser, Debug)]
#[command(name = "trends", version, about = "Rank the hottest open changes on a Gerrit server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show trending changes, using the cache when it is fresh
    Fetch {
        /// Override the trending query
        #[arg(short, long)]
        query: Option<String>,

        /// Include the per-signal score breakdown
        #[arg(long)]
        explain: bool,
    },

    /// Recompute trending changes, ignoring the cache
    Refresh {
        /// Override the trending query
        #[arg(short, long)]
        query: Option<String>,

        /// Include the per-signal score breakdown
        #[arg(long)]
        explain: bool,
    },

    /// Set how many trending changes the current account sees
    SetMaxItems {
        max_items: usize,
    },

    /// Drop the current account's cached result
    ClearCache,

    /// Save the HTTP password in the OS keychain, read from
    /// `TRENDS_PASSWORD` or the first line of stdin
    StorePassword,

    /// Remove the HTTP password from the OS keychain
    ForgetPassword,
}

/// One row of command output.
#[derive(Debug, Serialize)]
pub struct TrendingRow {
    pub id: String,
    pub number: i64,
    pub project: String,
    pub subject: String,
    pub score: u32,
    pub updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl TrendingRow {
    /// Build an output row; `explain_at` adds the breakdown as of that time.
    pub fn new(item: &ScoredChange, explain_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: item.change.id.clone(),
            number: item.change.number,
            project: item.change.project.clone(),
            subject: item.change.subject.clone(),
            score: item.score,
            updated: item.change.updated,
            breakdown: explain_at.map(|at| scoring::explain(&item.change, at)),
        }
    }
}

/// Read a password from the first line of `reader`.
pub fn read_password(mut reader: impl BufRead) -> Result<String, AppError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| AppError::internal(format!("Failed to read password: {}", e)))?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(AppError::invalid_input_field("Password is empty", "password"));
    }
    Ok(password.to_string())
}
