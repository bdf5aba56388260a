//! # Seed Data Generator
//!
//! Populates the database with vending machine data for development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p vendo-db --bin seed
//!
//! # Specify database path and buyer count
//! cargo run -p vendo-db --bin seed -- --db ./vendo_dev.db --buyers 5
//! ```
//!
//! ## Generated Data
//! - Two sellers, each owning half of a small snack/drink catalogue
//! - Every cost is a multiple of 5 cents so change is always payable
//! - A handful of buyer accounts, each pre-loaded with a few coins

use chrono::Utc;
use std::env;
use vendo_core::{BuyerAccount, Denomination, Product};
use vendo_db::{Database, DbConfig};
use uuid::Uuid;

/// Catalogue of (name, cost in cents, initial stock).
///
/// Costs deliberately cover exact-change cases (multiples of 100) and
/// cases that produce mixed-coin change.
const CATALOG: &[(&str, i64, i64)] = &[
    ("Sparkling Water", 65, 24),
    ("Still Water", 50, 30),
    ("Cola Classic", 100, 18),
    ("Orange Soda", 95, 12),
    ("Iced Tea", 120, 10),
    ("Espresso Shot", 85, 20),
    ("Trail Mix", 145, 8),
    ("Salted Pretzels", 70, 15),
    ("Chocolate Bar", 110, 16),
    ("Gummy Bears", 90, 14),
    ("Protein Bar", 185, 6),
    ("Chewing Gum", 10, 40),
];

/// Coins loaded into each seeded buyer account, cycled by index.
const STARTING_COINS: &[&[Denomination]] = &[
    &[Denomination::Hundred, Denomination::Fifty],
    &[Denomination::Twenty, Denomination::Twenty, Denomination::Ten],
    &[Denomination::Hundred, Denomination::Hundred, Denomination::Five],
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Surface repository debug logs when RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut buyers: usize = 3;
    let mut db_path = String::from("./vendo_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--buyers" | "-b" => {
                if i + 1 < args.len() {
                    buyers = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vendo Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -b, --buyers <N>   Number of buyer accounts (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: ./vendo_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vendo Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Buyers:   {}", buyers);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Two sellers split the catalogue between them
    let seller_a = Uuid::new_v4().to_string();
    let seller_b = Uuid::new_v4().to_string();
    println!();
    println!("Sellers:");
    println!("  {}", seller_a);
    println!("  {}", seller_b);

    println!();
    println!("Seeding catalogue...");

    for (idx, (name, cost_cents, amount)) in CATALOG.iter().enumerate() {
        let seller_id = if idx % 2 == 0 { &seller_a } else { &seller_b };
        let now = Utc::now();

        let product = Product {
            id: Uuid::new_v4().to_string(),
            seller_id: seller_id.clone(),
            name: (*name).to_string(),
            cost_cents: *cost_cents,
            amount_available: *amount,
            created_at: now,
            updated_at: now,
        };

        db.products().insert(&product).await?;
        println!("  {:<16} {:>5}¢  stock {:>3}  [{}]", name, cost_cents, amount, product.id);
    }

    println!();
    println!("Seeding buyer accounts...");

    for n in 0..buyers {
        let now = Utc::now();
        let account = BuyerAccount {
            id: Uuid::new_v4().to_string(),
            deposit_cents: 0,
            created_at: now,
            updated_at: now,
        };
        db.accounts().insert(&account).await?;

        let coins = STARTING_COINS[n % STARTING_COINS.len()];
        for coin in coins {
            db.accounts().credit(&account.id, coin.cents()).await?;
        }

        let balance: i64 = coins.iter().map(|c| c.cents()).sum();
        println!("  buyer {}  balance {:>4}¢  [{}]", n + 1, balance, account.id);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
