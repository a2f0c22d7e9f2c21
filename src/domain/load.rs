use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::Snapshot;

pub(super) fn parse_snapshot(raw: &str) -> Result<Snapshot> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in snapshot")?;
    if !parsed.is_object() {
        return Err(anyhow!("snapshot must be a JSON object"));
    }

    serde_json::from_value(parsed).context("snapshot does not match the expected shape")
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;

    let snapshot = parse_snapshot(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        entities = snapshot.entities.len(),
        relationships = snapshot.relationships.len(),
        links = snapshot.links.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}
