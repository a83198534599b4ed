//! # Seed Data
//!
//! Inserts the default merchant categories. Safe to run repeatedly:
//! existing categories are left untouched.
//!
//! ## Usage
//! ```bash
//! cargo run -p cupons-db --bin seed
//!
//! # Specify database path
//! cargo run -p cupons-db --bin seed -- --db ./data/cupons.db
//! ```

use std::env;

use cupons_db::{Database, DbConfig};

/// Categories offered on the merchant sign-up form.
const DEFAULT_CATEGORIES: &[&str] = &[
    "Alimentação",
    "Beleza e Estética",
    "Educação",
    "Farmácia",
    "Lazer e Entretenimento",
    "Mercado",
    "Moda e Vestuário",
    "Pet Shop",
    "Saúde",
    "Serviços",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./cupons.db".to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cupons Seed Data");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./cupons.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cupons Seed Data");
    println!("===================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let (total, applied) = db.migration_status().await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    let before = db.categories().count().await?;

    for name in DEFAULT_CATEGORIES {
        let category = db.categories().insert_if_missing(name).await?;
        println!("  {:>3}  {}", category.id, category.name);
    }

    let after = db.categories().count().await?;

    println!();
    println!("✓ {} new categories ({} total)", after - before, after);

    db.close().await;
    Ok(())
}
