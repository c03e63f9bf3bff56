//! Nudge snapshot sink: pretty JSON on disk.

use std::path::Path;

use tracing::info;

use crate::error::OutputError;
use crate::pipeline::types::Nudge;

/// Write `nudges` to `path`, creating parent directories as needed.
pub async fn save_nudges(path: &Path, nudges: &[Nudge]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(nudges)?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), count = nudges.len(), "Saved nudges");
    Ok(())
}

/// Read a snapshot written by [`save_nudges`].
pub async fn load_nudges(path: &Path) -> Result<Vec<Nudge>, OutputError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Tone;

    fn nudges() -> Vec<Nudge> {
        vec![
            Nudge {
                deal_id: "OPP-123".into(),
                contact: "marie.cfo@acme.com".into(),
                nudge: "Hi Marie, can we lock the terms Thursday?".into(),
                urgency: 45_000,
                reply_speed: 45.0,
                tone: Tone::Casual,
            },
            Nudge {
                deal_id: "OPP-456".into(),
                contact: "marie.cfo@acme.com".into(),
                nudge: "Hi Marie, any thoughts on the proposal?".into(),
                urgency: 100_000,
                reply_speed: f64::INFINITY,
                tone: Tone::Formal,
            },
        ]
    }

    #[tokio::test]
    async fn save_creates_directories_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nudges.json");

        save_nudges(&path, &nudges()).await.unwrap();
        let loaded = load_nudges(&path).await.unwrap();
        assert_eq!(loaded, nudges());
    }

    #[tokio::test]
    async fn infinite_reply_speed_is_written_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nudges.json");

        save_nudges(&path, &nudges()).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["reply_speed"], 45.0);
        assert!(raw[1]["reply_speed"].is_null());
        assert_eq!(raw[1]["tone"], "formal");
    }

    #[tokio::test]
    async fn empty_list_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nudges.json");

        save_nudges(&path, &[]).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(load_nudges(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_nudges(&dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, OutputError::Io(_)));
    }
}
