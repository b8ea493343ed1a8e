//! Counter Store
//!
//! This example drives a small counter through updates, subscriptions and
//! the undo/redo history.
//!
//! Key concepts:
//! - Functional updates built from the previous snapshot
//! - Subscribers notified synchronously on every commit
//! - Undo, redo and reset over a bounded history
//!
//! Run with: cargo run --example counter_store

use chrono::Utc;
use recall::logging::{init, Profile};
use recall::{Snapshot, Store, StoreError, Value};
use serde_json::json;

fn increment(store: &Store) -> Result<(), StoreError> {
    store.update(|prev| {
        let count = prev.get("count").and_then(Value::as_i64).unwrap_or(0);
        prev.merged(
            &[
                ("count", Value::from(count + 1)),
                ("lastUpdated", Value::from(Utc::now().to_rfc3339())),
            ]
            .into_iter()
            .collect(),
        )
    })?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== Counter Store Example ===\n");

    let store = Store::new(Snapshot::try_from(json!({"count": 0, "lastUpdated": null}))?);
    println!("Initial state: {}", store.get_state().to_json());

    increment(&store)?;
    println!("Updated state: {}", store.get_state().to_json());

    println!("\nSubscribing...");
    let subscription = store.subscribe(|state| {
        println!("  State changed: {}", state.to_json());
        Ok(())
    });

    for _ in 0..3 {
        increment(&store)?;
    }

    subscription.unsubscribe();
    println!("Unsubscribed from state changes");

    println!("\n=== History ===");
    println!(
        "Entries: {} (cursor at {})",
        store.history_len(),
        store.history_index()
    );

    store.undo()?;
    store.undo()?;
    println!("After two undos: count = {:?}", store.select("count"));

    store.redo()?;
    println!("After one redo: count = {:?}", store.select("count"));

    store.reset()?;
    println!("After reset: count = {:?}", store.select("count"));

    println!("\n=== Example Complete ===");
    Ok(())
}
