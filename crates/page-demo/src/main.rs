//! # Page Engine Demo
//!
//! Activates a todo-list page over the in-memory collaborators, then walks
//! through a few interactions:
//!
//! 1. Render the settled page.
//! 2. Add, complete and remove todos through component events.
//! 3. Navigate away.
//! 4. Close the instance, which tears the autosave hook down.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

use page_engine::lifecycle::{setup_tracing, EngineConfig, PageInstance};
use page_engine::permission::Principal;
use page_engine::services::memory::{MemoryNavigator, MemoryResources, MemoryStore};
use page_engine::services::{HookRegistry, Services, Subscription, TransformRegistry};
use page_engine::{EngineError, PageClient};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn, Instrument};

const TODO_PAGE: &str = include_str!("../pages/todos.json");

/// Logs what an autosave would persist.
struct Autosave;

impl Subscription for Autosave {
    fn refresh(&mut self, inputs: &Map<String, Value>) {
        let count = inputs.get("items").and_then(Value::as_array).map_or(0, Vec::len);
        info!(count, "Autosave");
    }

    fn teardown(&mut self) {
        info!("Autosave stopped");
    }
}

fn services(store: &MemoryStore, navigator: &MemoryNavigator) -> Services {
    let transforms = TransformRegistry::new().with("remaining", |inputs| {
        let todos = inputs
            .get("todos")
            .and_then(Value::as_array)
            .ok_or_else(|| "todos is not a list".to_string())?;
        let open = todos.iter().filter(|todo| todo["done"] != json!(true)).count();
        Ok(json!(open))
    });
    let hooks = HookRegistry::new().with_fn("autosave", |_| Ok(Box::new(Autosave) as Box<dyn Subscription>));

    Services::builder()
        .kv(Arc::new(store.clone()))
        .resources(Arc::new(MemoryResources::new(store.clone())))
        .navigator(Arc::new(navigator.clone()))
        .transforms(transforms)
        .hooks(hooks)
        .build()
}

async fn show(client: &PageClient) -> Result<(), EngineError> {
    client.settled().await?;
    let view = client.render().await?;
    let rendered = serde_json::to_string_pretty(&view).map_err(EngineError::Config)?;
    info!("Rendered page:\n{rendered}");
    Ok(())
}

async fn interact(client: &PageClient, event: &str, payload: Value) {
    let span = tracing::info_span!("interaction", event);
    let result = client.dispatch("list", event, payload).instrument(span).await;
    if result.ok {
        info!(event, data = ?result.data, "Interaction ok");
    } else {
        warn!(event, error = ?result.error, "Interaction failed");
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let store = MemoryStore::new();
    store.insert("todos", json!([{ "id": "t1", "title": "Write the schema", "done": true }]));
    let navigator = MemoryNavigator::new();

    let raw: Value = serde_json::from_str(TODO_PAGE).map_err(|e| e.to_string())?;
    let principal = Principal::anonymous();
    let page = PageInstance::activate(&raw, services(&store, &navigator), &principal, &EngineConfig::default())
        .map_err(|e| e.to_string())?;
    let client = page.client();
    info!(page = %page.definition().name, "Page activated");

    show(&client).await.map_err(|e| e.to_string())?;

    interact(&client, "add", json!({ "title": "Bind the tree" })).await;
    interact(&client, "add", json!({ "title": "Dispatch actions" })).await;
    interact(&client, "complete", json!({ "id": "todos_1" })).await;
    interact(&client, "remove", json!({ "id": "t1" })).await;
    interact(&client, "remove", json!({ "id": "missing" })).await;
    show(&client).await.map_err(|e| e.to_string())?;

    interact(&client, "select", Value::Null).await;
    info!(history = ?navigator.history(), "Navigation");

    page.close().await.map_err(|e| e.to_string())?;
    info!("Demo finished");
    Ok(())
}
