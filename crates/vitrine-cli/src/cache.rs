//! Last-failed cache
//!
//! `.vitrine_cache/lastfailed.json` maps scenario paths to `true`. A run
//! removes the paths it executed and adds back the ones that failed, so
//! scenarios that were not selected keep their recorded failure.

use crate::error::CliResult;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use vitrine::SuiteReport;

/// Default cache directory, relative to the working directory
pub const CACHE_DIR: &str = ".vitrine_cache";

const LAST_FAILED_FILE: &str = "lastfailed.json";

/// Paths that failed in earlier runs
#[derive(Debug, Clone)]
pub struct LastFailedCache {
    path: PathBuf,
}

impl Default for LastFailedCache {
    fn default() -> Self {
        Self::in_dir(CACHE_DIR)
    }
}

impl LastFailedCache {
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(LAST_FAILED_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorded failures; empty when no cache exists yet
    pub fn load(&self) -> CliResult<BTreeSet<String>> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        let entries: BTreeMap<String, bool> = serde_json::from_str(&text)?;
        Ok(entries
            .into_iter()
            .filter_map(|(path, failed)| failed.then_some(path))
            .collect())
    }

    pub fn store(&self, failed: &BTreeSet<String>) -> CliResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let entries: BTreeMap<&str, bool> = failed.iter().map(|p| (p.as_str(), true)).collect();
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        tracing::debug!(path = %self.path.display(), failed = failed.len(), "last-failed cache written");
        Ok(())
    }

    /// Fold a finished run into the cache
    pub fn update(&self, report: &SuiteReport) -> CliResult<BTreeSet<String>> {
        let mut failed = self.load()?;
        for result in &report.results {
            failed.remove(&result.path());
        }
        failed.extend(report.failed_paths());
        self.store(&failed)?;
        Ok(failed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use vitrine::{BrowserKind, Marker, ScenarioOutcome, ScenarioResult};

    fn result(file: &str, name: &str, outcome: ScenarioOutcome) -> ScenarioResult {
        ScenarioResult {
            file: file.to_string(),
            name: name.to_string(),
            markers: vec![Marker::Smoke],
            outcome,
            duration: Duration::from_millis(5),
            started_at: chrono::Local::now(),
            screenshot: None,
        }
    }

    fn report(results: Vec<ScenarioResult>) -> SuiteReport {
        SuiteReport {
            name: "vitrine".to_string(),
            backend: "fixture".to_string(),
            browser: BrowserKind::Chrome,
            started_at: chrono::Local::now(),
            duration: Duration::from_millis(20),
            results,
        }
    }

    #[test]
    fn test_missing_cache_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = LastFailedCache::in_dir(dir.path().join("nested"));
        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn test_store_and_load() {
        let dir = TempDir::new().unwrap();
        let cache = LastFailedCache::in_dir(dir.path());
        let failed: BTreeSet<String> = ["cart::test_cart_totals".to_string()].into();
        cache.store(&failed).unwrap();
        assert_eq!(cache.load().unwrap(), failed);

        let raw = std::fs::read_to_string(cache.path()).unwrap();
        assert!(raw.contains("\"cart::test_cart_totals\": true"));
    }

    #[test]
    fn test_false_entries_are_ignored() {
        let dir = TempDir::new().unwrap();
        let cache = LastFailedCache::in_dir(dir.path());
        std::fs::write(cache.path(), r#"{"a::x": true, "b::y": false}"#).unwrap();
        assert_eq!(cache.load().unwrap(), ["a::x".to_string()].into());
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = LastFailedCache::in_dir(dir.path());
        std::fs::write(cache.path(), "not json").unwrap();
        assert!(cache.load().is_err());
    }

    #[test]
    fn test_update_keeps_unrun_failures() {
        let dir = TempDir::new().unwrap();
        let cache = LastFailedCache::in_dir(dir.path());
        cache
            .store(&["login::test_valid_login".to_string(), "cart::test_cart_totals".to_string()].into())
            .unwrap();

        let run = report(vec![
            result("cart", "test_cart_totals", ScenarioOutcome::Passed),
            result("cart", "test_checkout", ScenarioOutcome::Errored("boom".into())),
            result("cart", "test_coupon", ScenarioOutcome::Skipped("no coupon box".into())),
        ]);
        let failed = cache.update(&run).unwrap();

        assert_eq!(
            failed,
            ["cart::test_checkout".to_string(), "login::test_valid_login".to_string()].into()
        );
        assert_eq!(cache.load().unwrap(), failed);
    }
}
