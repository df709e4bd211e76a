//! Cost Manager Demo
//!
//! Drives the CostDB store the way the cost manager application does:
//! - Open the database once at startup and declare its table
//! - Add cost items from "form" input
//! - Generate a monthly report with per-category totals
//! - Update and delete entries from "list actions"
//!
//! Run with: cargo run -p cost_manager
//! Pass a directory argument to persist between runs:
//! cargo run -p cost_manager -- ./costs_data

use costdb_engine::Engine;
use costdb_store::{CostItem, CostItemPatch, Store, StoreConfig, TableDecl};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DB_NAME: &str = "CostManagerDB";
const DB_VERSION: u32 = 1;
const COST_ITEMS: &str = "costItems";

fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Cost Manager");
    println!("============\n");

    // In-memory by default; a directory argument persists between runs
    let engine = match std::env::args().nth(1) {
        Some(dir) => {
            println!("[*] Using data directory: {dir}");
            Arc::new(Engine::on_disk(dir))
        }
        None => Arc::new(Engine::in_memory()),
    };

    let store = Store::new(
        engine,
        StoreConfig::new(DB_NAME)
            .version(DB_VERSION)
            .table(TableDecl::new(COST_ITEMS)),
    );

    // The store must not be used before this succeeds
    store.open().await?;

    // ========================================================================
    // Add cost items
    // ========================================================================
    println!("[+] Adding 8 cost items...");

    let entries = vec![
        CostItem::new(42.50, "FOOD", "Lunch with the team", "2024-03-15"),
        CostItem::new(12.00, "FOOD", "Coffee and pastry", "2024-03-18"),
        CostItem::new(65.00, "CAR", "Fuel", "2024-03-05"),
        CostItem::new(29.99, "ENTERTAINMENT", "Streaming subscription", "2024-03-01"),
        CostItem::new(120.00, "BILLS", "Electricity", "2024-03-10"),
        CostItem::new(54.30, "SHOPPING", "Groceries", "2024-03-22"),
        CostItem::new(18.00, "FOOD", "Takeaway dinner", "2024-04-02"),
        CostItem::new(200.00, "TRAVEL", "Weekend train tickets", "2024-04-12"),
    ];

    let mut keys = Vec::new();
    for entry in &entries {
        keys.push(store.add(COST_ITEMS, entry).await?);
    }

    // ========================================================================
    // Monthly report: March 2024
    // ========================================================================
    let (month, year) = (3, 2024);
    println!("\n[?] Report for {year}-{month:02}:");

    let report: Vec<CostItem> = store
        .scan(COST_ITEMS, move |item: &CostItem| {
            item.month() == Some(month) && item.year() == Some(year)
        })
        .await?;

    for item in &report {
        println!(
            "    #{:<3} {}  {:14} {:>10}  {}",
            item.id.map(|k| k.as_u64()).unwrap_or(0),
            item.date,
            item.category,
            format_amount(item.amount),
            item.description,
        );
    }

    // Per-category totals, the numbers behind the pie chart
    println!("\n[#] {year}-{month:02} totals by category:");

    let mut totals: Vec<(String, f64)> = Vec::new();
    for item in &report {
        match totals.iter_mut().find(|(name, _)| *name == item.category) {
            Some((_, total)) => *total += item.amount,
            None => totals.push((item.category.clone(), item.amount)),
        }
    }
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    let month_total: f64 = totals.iter().map(|(_, t)| t).sum();
    for (category, total) in &totals {
        let share = 100.0 * total / month_total;
        println!("    {category:14} {:>10}  {share:5.1}%", format_amount(*total));
    }
    println!("    {:14} {:>10}", "TOTAL", format_amount(month_total));

    // ========================================================================
    // Update an entry
    // ========================================================================
    let lunch_key = keys[0];
    println!("\n[~] Correcting the lunch amount to $50.00...");

    let updated: CostItem = store
        .update(COST_ITEMS, lunch_key, CostItemPatch::new().amount(50.00))
        .await?;
    println!(
        "    #{} {} {} {}",
        lunch_key.as_u64(),
        updated.date,
        format_amount(updated.amount),
        updated.description,
    );

    // ========================================================================
    // Delete an entry
    // ========================================================================
    let train_key = keys[7];
    println!("\n[-] Deleting the train tickets entry...");
    store.delete(COST_ITEMS, train_key).await?;

    // ========================================================================
    // Summary
    // ========================================================================
    let all: Vec<CostItem> = store.get_all(COST_ITEMS).await?;
    let grand_total: f64 = all.iter().map(|item| item.amount).sum();

    println!("\n[*] {} items stored, {} in total", all.len(), format_amount(grand_total));

    Ok(())
}
