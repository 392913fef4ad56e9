//! # Seed Data Generator
//!
//! Populates the database with categories and products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p kasir-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p kasir-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! Each product gets a variant suffix, a price between 2.000 and 40.000 and a
//! stock between 0 and 100, derived deterministically from its index.

use std::env;

use kasir_core::{validation, CategoryInput, Money, NewProduct};
use kasir_db::{Database, DbConfig, DbResult};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Categories with their base products.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Minuman",
        &[
            "Kopi Susu",
            "Kopi Hitam",
            "Teh Manis",
            "Teh Tawar",
            "Es Jeruk",
            "Air Mineral",
            "Susu Coklat",
            "Jus Alpukat",
            "Jus Mangga",
            "Soda Gembira",
        ],
    ),
    (
        "Makanan",
        &[
            "Nasi Goreng",
            "Mie Goreng",
            "Mie Rebus",
            "Roti Bakar",
            "Roti Tawar",
            "Bubur Ayam",
            "Sate Ayam",
            "Gado-Gado",
            "Pisang Goreng",
            "Martabak",
        ],
    ),
    (
        "Makanan Ringan",
        &[
            "Keripik Singkong",
            "Keripik Kentang",
            "Kacang Goreng",
            "Wafer Coklat",
            "Biskuit Kelapa",
            "Permen Mint",
            "Coklat Batang",
            "Kerupuk Udang",
        ],
    ),
    (
        "Kebutuhan Rumah",
        &[
            "Sabun Mandi",
            "Sampo",
            "Pasta Gigi",
            "Sikat Gigi",
            "Deterjen",
            "Tisu",
            "Minyak Goreng",
            "Gula Pasir",
            "Beras",
            "Telur",
        ],
    ),
];

/// Variant suffixes with their price addon.
const VARIANTS: &[(&str, i64)] = &[
    ("Kecil", 0),
    ("Sedang", 2_000),
    ("Besar", 4_000),
    ("Jumbo", 7_500),
    ("Hemat", 1_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./kasir_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Kasir POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./kasir_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(database = %db_path, products = count, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing = existing,
            "Database already has products, skipping seed (delete the file to regenerate)"
        );
        db.close().await;
        return Ok(());
    }

    let start = std::time::Instant::now();
    let generated = seed(&db, count).await?;

    info!(
        generated = generated,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    let sample = db.products().list(Some("kopi")).await?;
    if let Some(first) = sample.first() {
        info!(
            matches = sample.len(),
            first = %first.name,
            price = %Money::from_units(first.price),
            "Name filter check for 'kopi'"
        );
    }

    db.close().await;
    Ok(())
}

/// Inserts the categories and `count` products. Returns how many products
/// were inserted.
async fn seed(db: &Database, count: usize) -> DbResult<usize> {
    let mut generated = 0;

    let mut catalog = Vec::with_capacity(CATEGORIES.len());
    for (category_name, products) in CATEGORIES {
        let category = db
            .categories()
            .insert(&CategoryInput {
                name: category_name.to_string(),
                description: None,
            })
            .await?;
        catalog.push((category.id, *products));
    }

    // The catalog is walked in rounds until `count` products exist; rounds
    // after the first get a numbered suffix.
    let mut round = 0;
    'rounds: while generated < count {
        let before = generated;

        for (category_id, products) in &catalog {
            for (product_idx, product_name) in products.iter().enumerate() {
                for (variant_idx, (variant, price_addon)) in VARIANTS.iter().enumerate() {
                    if generated >= count {
                        break 'rounds;
                    }

                    let mix = *category_id as usize * 1000 + product_idx * 20 + variant_idx + round * 7;
                    let product =
                        generate_product(product_name, variant, *price_addon, *category_id, mix, round);

                    if let Err(e) = validation::validate_new_product(&product) {
                        warn!(name = %product.name, error = %e, "Skipping invalid product");
                        continue;
                    }
                    if let Err(e) = db.products().insert(&product).await {
                        warn!(name = %product.name, error = %e, "Failed to insert product");
                        continue;
                    }

                    generated += 1;
                    if generated % 50 == 0 {
                        info!(generated = generated, "Seeding in progress");
                    }
                }
            }
        }

        if generated == before {
            warn!(round = round, "No product inserted in a full round, stopping");
            break;
        }
        round += 1;
    }

    Ok(generated)
}

/// Builds one product with deterministic price and stock.
fn generate_product(
    name: &str,
    variant: &str,
    price_addon: i64,
    category_id: i64,
    seed: usize,
    round: usize,
) -> NewProduct {
    // 2.000 - 32.000 in steps of 500, plus the variant addon
    let base_price = 2_000 + ((seed * 17) % 61) as i64 * 500;

    NewProduct {
        name: if round == 0 {
            format!("{} {}", name, variant)
        } else {
            format!("{} {} #{}", name, variant, round + 1)
        },
        price: base_price + price_addon,
        stock: (seed % 101) as i64,
        category_id: Some(category_id),
    }
}
