use anyhow::Context;
use sweep_core::{cascade_delete, ApiClient, RenameMapStore};

use crate::output::print_json;

pub async fn run(
    client: &ApiClient,
    store: &RenameMapStore,
    strategy_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = cascade_delete(client, store, strategy_id)
        .await
        .with_context(|| format!("failed to cascade-delete strategy '{strategy_id}'"))?;

    if json {
        print_json(&outcome)?;
    } else {
        println!(
            "deleted strategy '{}' and {} job(s) across its aliases",
            outcome.canonical_id, outcome.deleted_jobs
        );
    }
    Ok(())
}
