//! Case scenarios and the directory-backed store that loads them.
//!
//! One JSON object per file. Missing optional fields default to empty so
//! hand-authored records stay forgiving; files that fail to parse are
//! skipped with a warning rather than sinking the whole catalog.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::personas::{CounselStrategy, JudgePersonality};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Precedent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub holding: String,
}

/// Immutable case definition. Never mutated after load, except for the
/// persona overrides applied once when a simulation starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub facts: String,
    #[serde(default)]
    pub legal_issues: Vec<String>,
    #[serde(default)]
    pub precedents: Vec<Precedent>,
    #[serde(default)]
    pub statutes: Vec<String>,
    #[serde(default)]
    pub judge_personality: JudgePersonality,
    #[serde(default)]
    pub plaintiff_counsel_strategy: CounselStrategy,
    #[serde(default)]
    pub defendant_counsel_strategy: CounselStrategy,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

pub struct ScenarioStore {
    dir: PathBuf,
}

impl ScenarioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ScenarioStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads every parseable `.json` record, in sorted filename order.
    /// A missing directory yields an empty catalog.
    pub fn scenarios(&self) -> Vec<Scenario> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut scenarios = Vec::new();
        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str::<Scenario>(&contents) {
                    Ok(scenario) => scenarios.push(scenario),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "skipping unparseable scenario");
                    }
                },
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable scenario");
                }
            }
        }
        scenarios
    }

    /// First record whose id matches; duplicate ids resolve to the first
    /// in load order.
    pub fn find(&self, scenario_id: &str) -> Option<Scenario> {
        self.scenarios()
            .into_iter()
            .find(|scenario| scenario.id == scenario_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_scenario(dir: &Path, file: &str, json: &str) {
        std::fs::write(dir.join(file), json).unwrap();
    }

    #[test]
    fn loads_records_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        write_scenario(
            dir.path(),
            "b-case.json",
            r#"{"id": "b", "title": "Second"}"#,
        );
        write_scenario(dir.path(), "a-case.json", r#"{"id": "a", "title": "First"}"#);

        let store = ScenarioStore::new(dir.path());
        let scenarios = store.scenarios();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].id, "a");
        assert_eq!(scenarios[1].id, "b");
    }

    #[test]
    fn missing_fields_default_empty() {
        let dir = TempDir::new().unwrap();
        write_scenario(dir.path(), "minimal.json", r#"{"id": "min"}"#);

        let store = ScenarioStore::new(dir.path());
        let scenario = store.find("min").unwrap();
        assert_eq!(scenario.title, "");
        assert!(scenario.legal_issues.is_empty());
        assert!(scenario.precedents.is_empty());
        assert_eq!(scenario.judge_personality, JudgePersonality::Neutral);
        assert_eq!(
            scenario.plaintiff_counsel_strategy,
            CounselStrategy::Standard
        );
        assert_eq!(scenario.difficulty, "medium");
    }

    #[test]
    fn bad_json_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_scenario(dir.path(), "broken.json", "{not json");
        write_scenario(dir.path(), "ok.json", r#"{"id": "ok"}"#);

        let store = ScenarioStore::new(dir.path());
        let scenarios = store.scenarios();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].id, "ok");
    }

    #[test]
    fn duplicate_ids_take_first_match() {
        let dir = TempDir::new().unwrap();
        write_scenario(
            dir.path(),
            "1-first.json",
            r#"{"id": "dup", "title": "Kept"}"#,
        );
        write_scenario(
            dir.path(),
            "2-second.json",
            r#"{"id": "dup", "title": "Shadowed"}"#,
        );

        let store = ScenarioStore::new(dir.path());
        assert_eq!(store.find("dup").unwrap().title, "Kept");
    }

    #[test]
    fn missing_directory_yields_empty_catalog() {
        let store = ScenarioStore::new("/nonexistent/scenario/dir");
        assert!(store.scenarios().is_empty());
        assert!(store.find("anything").is_none());
    }

    #[test]
    fn unknown_persona_keys_decode_to_defaults() {
        let dir = TempDir::new().unwrap();
        write_scenario(
            dir.path(),
            "odd.json",
            r#"{"id": "odd", "judge_personality": "capricious", "defendant_counsel_strategy": "aggressive"}"#,
        );

        let store = ScenarioStore::new(dir.path());
        let scenario = store.find("odd").unwrap();
        assert_eq!(scenario.judge_personality, JudgePersonality::Neutral);
        assert_eq!(
            scenario.defendant_counsel_strategy,
            CounselStrategy::Aggressive
        );
    }
}
