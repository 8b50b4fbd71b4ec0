use sweep_core::{ApiClient, RenameMapStore};

use crate::output::print_json;

pub async fn run(client: &ApiClient, store: &RenameMapStore, json: bool) -> anyhow::Result<()> {
    let map = store.sync(client).await;

    if json {
        print_json(&map)?;
    } else {
        println!(
            "rename map has {} entr{} (stored at {})",
            map.len(),
            if map.len() == 1 { "y" } else { "ies" },
            store.path().display()
        );
    }
    Ok(())
}
