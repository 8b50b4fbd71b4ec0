use anyhow::bail;
use sweep_core::{aliases_of, resolve_canonical, ApiClient, RenameMapStore};

use crate::output::print_json;

pub async fn run(
    client: &ApiClient,
    store: &RenameMapStore,
    strategy_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let map = store.sync(client).await;
    let canonical = resolve_canonical(strategy_id, &map);
    if canonical.is_empty() {
        bail!("strategy id must not be empty");
    }
    let aliases = aliases_of(&canonical, &map);

    if json {
        print_json(&serde_json::json!({
            "canonical_id": canonical,
            "aliases": aliases,
        }))?;
    } else {
        println!("canonical: {canonical}");
        for alias in aliases.iter().filter(|a| **a != canonical) {
            println!("alias:     {alias}");
        }
    }
    Ok(())
}
