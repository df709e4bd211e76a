//! End-to-end scenarios for the cost store.

use costdb_engine::Engine;
use costdb_store::{
    CostItem, CostItemPatch, RecordKey, Store, StoreConfig, TableDecl,
};
use std::sync::Arc;

const DB: &str = "CostManagerDB";
const ITEMS: &str = "costItems";

fn cost_manager_config() -> StoreConfig {
    StoreConfig::new(DB).version(1).table(TableDecl::new(ITEMS))
}

async fn open_store(engine: Arc<Engine>) -> Store {
    let store = Store::new(engine, cost_manager_config());
    store.open().await.unwrap();
    store
}

#[tokio::test]
async fn cost_manager_walkthrough() {
    let store = open_store(Arc::new(Engine::in_memory())).await;

    // Two expenses, one in March and one in April
    let first = store
        .add(ITEMS, &CostItem::new(42.5, "Food", "lunch", "2024-03-15"))
        .await
        .unwrap();
    assert_eq!(first, RecordKey::new(1));

    let second = store
        .add(ITEMS, &CostItem::new(18.0, "Travel", "train", "2024-04-01"))
        .await
        .unwrap();
    assert_eq!(second, RecordKey::new(2));

    // Monthly report: March 2024 only
    let march: Vec<CostItem> = store
        .scan(ITEMS, |item: &CostItem| {
            item.month() == Some(3) && item.year() == Some(2024)
        })
        .await
        .unwrap();
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].id, Some(first));
    assert_eq!(march[0].description, "lunch");

    // Update the amount; everything else keeps its value
    let updated: CostItem = store
        .update(ITEMS, first, CostItemPatch::new().amount(50.0))
        .await
        .unwrap();
    assert_eq!(
        updated,
        CostItem {
            id: Some(first),
            amount: 50.0,
            category: "Food".to_string(),
            description: "lunch".to_string(),
            date: "2024-03-15".to_string(),
        }
    );

    // Delete the April record; exactly the updated March record remains
    store.delete(ITEMS, second).await.unwrap();

    let remaining: Vec<CostItem> = store.get_all(ITEMS).await.unwrap();
    assert_eq!(remaining, vec![updated]);
}

#[tokio::test]
async fn scan_is_an_ordered_subsequence_of_get_all() {
    let store = open_store(Arc::new(Engine::in_memory())).await;

    let categories = ["Food", "Travel", "Food", "Bills", "Food", "Travel"];
    for (i, category) in categories.iter().enumerate() {
        store
            .add(
                ITEMS,
                &CostItem::new(i as f64, *category, "entry", "2024-05-01"),
            )
            .await
            .unwrap();
    }

    let all: Vec<CostItem> = store.get_all(ITEMS).await.unwrap();
    let food: Vec<CostItem> = store
        .scan(ITEMS, |item: &CostItem| item.category == "Food")
        .await
        .unwrap();

    let expected: Vec<CostItem> = all
        .iter()
        .filter(|item| item.category == "Food")
        .cloned()
        .collect();
    assert_eq!(food, expected);
}

#[tokio::test]
async fn reopen_is_idempotent() {
    let engine = Arc::new(Engine::in_memory());

    let store = open_store(Arc::clone(&engine)).await;
    let key = store
        .add(ITEMS, &CostItem::new(10.0, "Food", "snack", "2024-06-01"))
        .await
        .unwrap();

    // A second store opening the same database sees the same table and
    // data; no table is created twice.
    let again = open_store(engine).await;
    let items: Vec<CostItem> = again.get_all(ITEMS).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, Some(key));
}

#[tokio::test]
async fn version_bump_adds_missing_table_and_keeps_data() {
    let engine = Arc::new(Engine::in_memory());

    let store = open_store(Arc::clone(&engine)).await;
    store
        .add(ITEMS, &CostItem::new(10.0, "Food", "snack", "2024-06-01"))
        .await
        .unwrap();

    let wider = Store::new(
        engine,
        StoreConfig::new(DB)
            .version(2)
            .table(TableDecl::new(ITEMS))
            .table(TableDecl::new("budgets")),
    );
    wider.open().await.unwrap();

    assert_eq!(wider.count(ITEMS).await.unwrap(), 1);
    assert_eq!(wider.count("budgets").await.unwrap(), 0);
}

#[tokio::test]
async fn on_disk_store_survives_restart() {
    let temp = tempfile::tempdir().unwrap();

    let first;
    {
        let store = open_store(Arc::new(Engine::on_disk(temp.path()))).await;
        first = store
            .add(ITEMS, &CostItem::new(99.0, "Bills", "rent", "2024-07-01"))
            .await
            .unwrap();
    }

    // A fresh engine over the same root replays the persisted state;
    // identifiers continue where they left off.
    let store = open_store(Arc::new(Engine::on_disk(temp.path()))).await;

    let items: Vec<CostItem> = store.get_all(ITEMS).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, Some(first));
    assert_eq!(items[0].description, "rent");

    let next = store
        .add(ITEMS, &CostItem::new(25.0, "Bills", "power", "2024-07-02"))
        .await
        .unwrap();
    assert_eq!(next, RecordKey::new(2));
}
