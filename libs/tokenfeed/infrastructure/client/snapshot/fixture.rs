//! Local JSON fixture

use super::{BootstrapError, Result, SnapshotSource};
use crate::domain::{RawTokensData, SnapshotResponse};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Accepts either the API envelope or the bare `{new, final, migrated}` object
#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Envelope(SnapshotResponse),
    Bare(RawTokensData),
}

/// Parse fixture contents in either accepted shape
pub fn parse_fixture(contents: &str) -> Result<RawTokensData> {
    let parsed: FixtureFile = serde_json::from_str(contents)
        .map_err(|e| BootstrapError::DeserializeFailed(e.to_string()))?;

    let data = match parsed {
        FixtureFile::Envelope(envelope) => envelope.data,
        FixtureFile::Bare(data) => data,
    };

    if data.is_empty() {
        return Err(BootstrapError::Empty);
    }
    Ok(data)
}

/// Snapshot read from disk
pub struct FixtureSnapshotSource {
    path: PathBuf,
}

impl FixtureSnapshotSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Blocking load, for callers outside the runtime
    pub fn load(&self) -> Result<RawTokensData> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| BootstrapError::FixtureRead {
                path: self.path.display().to_string(),
                source,
            })?;
        let data = parse_fixture(&contents)?;
        info!(
            "[Bootstrap] Loaded {} tokens from {}",
            data.len(),
            self.path.display()
        );
        Ok(data)
    }
}

#[async_trait]
impl SnapshotSource for FixtureSnapshotSource {
    async fn fetch(&self) -> Result<RawTokensData> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| BootstrapError::FixtureRead {
                path: self.path.display().to_string(),
                source,
            })?;
        let data = parse_fixture(&contents)?;
        info!(
            "[Bootstrap] Loaded {} tokens from {}",
            data.len(),
            self.path.display()
        );
        Ok(data)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOKEN: &str = r#"{
        "id": "t1", "name": "One", "symbol": "ONE", "image": "",
        "price": 0.5, "marketCap": 500, "volume24h": 50,
        "change1h": 1, "change24h": 2, "chain": "SOL"
    }"#;

    #[test]
    fn test_parse_bare_and_envelope() {
        let bare = format!(r#"{{"new": [{}], "final": [], "migrated": []}}"#, TOKEN);
        assert_eq!(parse_fixture(&bare).unwrap().new.len(), 1);

        let envelope = format!(
            r#"{{"version": "1.0.0", "timestamp": 1, "data": {{"new": [], "final": [{}], "migrated": []}}}}"#,
            TOKEN
        );
        assert_eq!(parse_fixture(&envelope).unwrap().final_stretch.len(), 1);
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert!(matches!(
            parse_fixture(r#"{"new": [], "final": [], "migrated": []}"#),
            Err(BootstrapError::Empty)
        ));
        assert!(matches!(
            parse_fixture("not json"),
            Err(BootstrapError::DeserializeFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"new": [], "final": [], "migrated": [{}]}}"#, TOKEN).unwrap();

        let source = FixtureSnapshotSource::new(file.path());
        let data = source.fetch().await.unwrap();
        assert_eq!(data.migrated[0].id, "t1");
        assert_eq!(source.load().unwrap(), data);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = FixtureSnapshotSource::new("/nonexistent/tokens.json");
        assert!(matches!(
            source.fetch().await,
            Err(BootstrapError::FixtureRead { .. })
        ));
    }
}
