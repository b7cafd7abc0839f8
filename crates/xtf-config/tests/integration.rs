//! Integration tests for xtf-config.
//!
//! Tests the full loading pipeline: read -> parse -> resolve -> validate.

// Integration tests have no cfg(test) module to live in.
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use xtf_config::{Config, ConfigError, ConfigWarning, SortGroupsBy};

/// Test helper to create a temporary directory for config files.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_full_config() {
    let env = TestEnv::new();
    let path = env.create_file(
        "conf/xtf.toml",
        r#"
[index]
path = "../data/index"
default_fields = "text"

[[facet]]
field = "subject"
select = "**[topChoices]#1-5"
sort_groups_by = "value"

[[facet]]
field = "dynamic:frbr(title author date [sort=-date])"
"#,
    );

    let config = Config::load(&path).unwrap();

    assert_eq!(
        config.index.path,
        env.path().join("conf").join("../data/index")
    );
    assert_eq!(config.index.default_fields, vec!["text".to_string()]);
    assert_eq!(config.facets.len(), 2);

    let subject = config.facet("subject").unwrap();
    assert_eq!(subject.select, "**[topChoices]#1-5");
    assert_eq!(subject.sort_groups_by, SortGroupsBy::Value);

    let frbr = &config.facets[1];
    assert!(frbr.is_dynamic());
    assert_eq!(frbr.sort_groups_by, SortGroupsBy::TotalDocs);
    assert!(config.validate().is_empty());
}

#[test]
fn test_missing_file() {
    let env = TestEnv::new();
    let err = Config::load(&env.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_invalid_toml() {
    let env = TestEnv::new();
    let path = env.create_file("xtf.toml", "[[facet]\nfield = ");
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
}

#[test]
fn test_duplicate_facet() {
    let env = TestEnv::new();
    let path = env.create_file(
        "xtf.toml",
        "[[facet]]\nfield = \"subject\"\n\n[[facet]]\nfield = \"SUBJECT\"\n",
    );
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_warnings_for_facetless_config() {
    let env = TestEnv::new();
    let path = env.create_file("xtf.toml", "[index]\npath = \"idx\"\n");
    let config = Config::load(&path).unwrap();
    assert_eq!(config.validate(), vec![ConfigWarning::NoFacetsDefined]);
}

#[test]
fn test_unknown_index_key_rejected() {
    let env = TestEnv::new();
    let path = env.create_file("xtf.toml", "[index]\nmax_docs = 3\n");
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
    assert!(err.to_string().contains("max_docs"));
}
