//! Todo Store
//!
//! This example keeps a todo list with derived statistics and a keyed
//! settings store, and shows the structural changes each update reports.
//!
//! Key concepts:
//! - Replacing nested arrays and objects through functional updates
//! - Dotted-path patches that copy only the touched ancestors
//! - Change reports (added, updated, removed) per update
//! - Value watchers and checkpoints
//!
//! Run with: cargo run --example todo_store

use recall::checkpoint::Checkpoint;
use recall::{Object, Snapshot, Store, StoreBuilder, StoreError, Value};
use serde_json::json;

fn stats(todos: &[Value]) -> Object {
    let total = todos.len();
    let completed = todos
        .iter()
        .filter(|todo| {
            todo.as_object()
                .and_then(|t| t.get("completed"))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .count();

    [
        ("total", total),
        ("completed", completed),
        ("pending", total - completed),
    ]
    .into_iter()
    .collect()
}

fn todos_of(state: &Snapshot) -> Vec<Value> {
    state
        .get("todos")
        .and_then(Value::as_array)
        .map(<[Value]>::to_vec)
        .unwrap_or_default()
}

fn with_todos(prev: &Snapshot, todos: Vec<Value>) -> Snapshot {
    let summary = stats(&todos);
    prev.merged(
        &[
            ("todos", Value::from(todos)),
            ("stats", Value::from(summary)),
        ]
        .into_iter()
        .collect(),
    )
}

fn add_todo(store: &Store, id: u64, text: &str) -> Result<(), StoreError> {
    store.update(|prev| {
        let mut todos = todos_of(prev);
        todos.push(Value::from(json!({"id": id, "text": text, "completed": false})));
        with_todos(prev, todos)
    })?;
    Ok(())
}

fn toggle_todo(store: &Store, id: u64) -> Result<(), StoreError> {
    let result = store.update(|prev| {
        let todos = todos_of(prev)
            .into_iter()
            .map(|todo| match todo.as_object() {
                Some(t) if t.get("id").and_then(Value::as_u64) == Some(id) => {
                    let mut toggled = t.clone();
                    let done = t.get("completed").and_then(Value::as_bool).unwrap_or(false);
                    toggled.insert("completed", !done);
                    Value::from(toggled)
                }
                _ => todo,
            })
            .collect();
        with_todos(prev, todos)
    })?;

    for change in &result.changes {
        println!("  {:?} {}", change.kind(), change.path());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Todo Store Example ===\n");

    let store = Store::new(Snapshot::try_from(json!({
        "todos": [],
        "filter": "all",
        "stats": {"total": 0, "completed": 0, "pending": 0}
    }))?);

    store.watch_value("stats.completed", |now, before| {
        println!("  completed: {:?} -> {:?}", before, now);
        Ok(())
    });

    add_todo(&store, 1, "Learn Recall")?;
    add_todo(&store, 2, "Write tests")?;
    add_todo(&store, 3, "Update documentation")?;
    println!("After adding todos: {}\n", store.get_state().to_json());

    println!("Toggling todos:");
    toggle_todo(&store, 1)?;
    toggle_todo(&store, 2)?;
    println!("\nAfter toggling: {}", store.select("stats").map(|s| s.to_json()).unwrap_or_default());

    println!("\n=== Settings Store ===");
    let settings = StoreBuilder::new()
        .initial(json!({
            "settings": {"theme": "light", "language": "en", "notifications": true}
        }))
        .key("app-settings")
        .persist(true)
        .build()?;

    settings.patch("settings.theme", "dark")?;
    let result = settings.patch("settings.language", "tr")?;
    println!("Updated settings: {}", settings.get_state().to_json());
    println!("Last change: {}", serde_json::to_string(&result.changes)?);

    let saved = settings.checkpoint().to_json()?;
    let restored = Store::resume(Checkpoint::from_json(&saved)?)?;
    restored.undo()?;
    println!(
        "Restored from checkpoint, one step back: {}",
        restored.get_state().to_json()
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
