//! Server startup tasks
//!
//! Runs after the store is ready and before the listener is bound, so no
//! request can observe a partially imported table.

use crate::{
    services::{ImportOutcome, PatientImporter},
    state::AppState,
};

/// Run the CSV bootstrap import unless `import.enabled` is false.
///
/// Returns `None` when the import is disabled. Import failures are logged by
/// the importer and never stop the server.
pub async fn run_startup_import(state: &AppState) -> Option<ImportOutcome> {
    if !state.config.import.enabled {
        tracing::info!("CSV import disabled (import.enabled=false)");
        return None;
    }

    let importer = PatientImporter::new(state.store.clone(), &state.config.import);
    Some(importer.run().await)
}
