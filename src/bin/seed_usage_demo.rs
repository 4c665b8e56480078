// ABOUTME: Demo data seeder for the usage API
// ABOUTME: Creates trackers, logs chat turns for one user, and prints a bearer token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Seeds a user's ledger so the usage endpoints return something to look at.
//!
//! ```bash
//! cargo run --bin seed-usage-demo -- demo-user --phone +15550100
//! curl -H "Authorization: Bearer $TOKEN" localhost:8081/api/usage
//! ```

use anyhow::Result;
use clap::Parser;
use expense_tracker::{
    auth::AuthContext, config::environment::ServerConfig, logging, models::TrackerType,
    resources::ServerResources,
};
use tracing::info;

/// Chat turns logged per tracker: (user prompt, assistant reply)
const DEMO_TURNS: [(&str, &str); 3] = [
    (
        "Add 42.10 for groceries at the farmers market",
        "Logged 42.10 under Groceries for today.",
    ),
    (
        "How much did I spend on transport this week?",
        "You spent 37.50 on transport this week across 4 trips.",
    ),
    (
        "Move yesterday's coffee to the office budget",
        "Done. The 4.80 coffee is now in Office.",
    ),
];

#[derive(Parser)]
#[command(name = "seed-usage-demo")]
#[command(about = "Seed demo usage data for one user and print a bearer token")]
struct Args {
    /// User id to seed
    user_id: String,

    /// Phone number placed in the token
    #[arg(long, default_value = "")]
    phone: String,

    /// Number of times the demo conversation is logged per tracker
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::from_env()?;
    logging::init_from_env(config.log_level)?;

    let resources = ServerResources::from_config(config).await?;
    let auth = AuthContext::new(args.user_id.clone(), args.phone.clone());
    let usage = &resources.usage_service;

    let trackers = [
        usage
            .trackers()
            .create(&auth.user_id, "Household", TrackerType::Personal)
            .await?,
        usage
            .trackers()
            .create(&auth.user_id, "Consulting", TrackerType::Business)
            .await?,
    ];

    for tracker in &trackers {
        for _ in 0..args.repeat {
            for (prompt, reply) in DEMO_TURNS {
                let outcome = resources
                    .usage_logger
                    .record_turn(&auth, &tracker.id, prompt, reply)
                    .await;
                anyhow::ensure!(
                    outcome.is_complete(),
                    "failed to log a demo turn for tracker {}",
                    tracker.id
                );
            }
        }
        info!(tracker_id = %tracker.id, name = %tracker.name, "Seeded tracker");
    }

    let summary = usage.overall_usage(&auth).await?;
    let token = resources
        .auth_manager
        .generate_token(&auth.user_id, &auth.phone)?;

    println!("Seeded user {}", auth.user_id);
    for tracker in &trackers {
        println!("  tracker {} ({})", tracker.id, tracker.name);
    }
    println!(
        "  {} messages, {} tokens",
        summary.overall.total_messages, summary.overall.total_tokens
    );
    println!();
    println!("Bearer token (valid with the same JWT_SECRET):");
    println!("{token}");

    Ok(())
}
