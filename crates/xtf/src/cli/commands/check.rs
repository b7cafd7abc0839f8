//! Implementation of `xtf check`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use xtf_config::{Config, ConfigWarning};
use xtf_facet::{DynamicField, FacetError, FacetSpec};

use crate::cli::context::CommandContext;

/// Exit codes for `xtf check`.
mod exit_codes {
    use std::process::ExitCode;

    /// Configuration is valid with no warnings.
    pub const OK: ExitCode = ExitCode::SUCCESS;
    /// Configuration has warnings or unusable facets.
    pub const PROBLEMS: ExitCode = ExitCode::FAILURE;
}

/// Validates the loaded configuration and every facet definition in it.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;

    println!("Checking configuration...");
    println!();
    match &config.source {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none found, using defaults)"),
    }
    println!("Index: {}", ctx.index_dir(None).display());
    println!();

    let errors = facet_errors(config);
    if !config.facets.is_empty() {
        println!("{}", facet_table(config, &errors));
        println!();
    }

    let warnings = config.validate();
    if warnings.is_empty() && errors.is_empty() {
        println!("No issues found.");
        return exit_codes::OK;
    }

    if !errors.is_empty() {
        println!("Errors ({}):", errors.len());
        for (field, error) in &errors {
            println!("  - facet '{field}': {error}");
        }
        println!();
    }
    if !warnings.is_empty() {
        println!("Warnings ({}):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
        println!();
        print_hints(&warnings);
    }

    exit_codes::PROBLEMS
}

/// Compiles every facet, returning the ones that fail with their errors.
fn facet_errors(config: &Config) -> Vec<(String, FacetError)> {
    config
        .facets
        .iter()
        .filter_map(|facet| {
            let checked = FacetSpec::from_settings(facet).and_then(|spec| spec.dynamic());
            checked.err().map(|e| (facet.field.clone(), e))
        })
        .collect()
}

/// Summarizes the configured facets.
fn facet_table(config: &Config, errors: &[(String, FacetError)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Field", "Kind", "Select", "Sort", "Status"]);

    for facet in &config.facets {
        let kind = match DynamicField::parse(&facet.field) {
            Ok(Some(DynamicField::Frbr { .. })) => "frbr",
            Ok(None) => "static",
            Err(_) => "invalid",
        };
        let select = if facet.select.is_empty() {
            "(root)"
        } else {
            facet.select.as_str()
        };
        let status = if errors.iter().any(|(field, _)| *field == facet.field) {
            "error"
        } else {
            "ok"
        };
        table.add_row(vec![
            Cell::new(&facet.field),
            Cell::new(kind),
            Cell::new(select),
            Cell::new(facet.sort_groups_by.as_str()),
            Cell::new(status),
        ]);
    }
    table
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|warning| match warning {
            ConfigWarning::NoFacetsDefined => {
                "Add [[facet]] tables naming the fields to group results by."
            }
            ConfigWarning::UnsupportedSortDocsBy { .. } => {
                "Remove sort_docs_by or set it to \"score\"."
            }
            ConfigWarning::EmptyGroupsOnDynamicFacet { .. } => {
                "Remove include_empty_groups from dynamic facets."
            }
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    println!("Hints:");
    for hint in hints {
        println!("  - {hint}");
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn config(toml: &str) -> Config {
        Config::from_toml(toml, Path::new("xtf.toml")).unwrap()
    }

    #[test]
    fn valid_facets_have_no_errors() {
        let config = config(
            "[[facet]]\nfield = \"subject\"\nselect = \"*[1-5]\"\n\
             [[facet]]\nfield = \"dynamic:frbr(title author)\"\n",
        );
        assert!(facet_errors(&config).is_empty());
    }

    #[test]
    fn bad_facets_are_reported() {
        let config = config(
            "[[facet]]\nfield = \"subject\"\nselect = \"*[\"\n\
             [[facet]]\nfield = \"dynamic:cluster(title)\"\n",
        );
        let errors = facet_errors(&config);
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["subject", "dynamic:cluster(title)"]);
        assert!(matches!(errors[0].1, FacetError::Select(_)));
        assert!(matches!(errors[1].1, FacetError::InvalidDynamicField { .. }));

        let table = facet_table(&config, &errors).to_string();
        assert!(table.contains("invalid"));
        assert!(table.contains("error"));
    }
}
