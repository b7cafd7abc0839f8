//! Implementation of `xtf facet`.

use std::process::ExitCode;

use tantivy::{
    Index,
    collector::TopDocs,
    query::{AllQuery, Query, QueryParser},
    schema::Field,
};
use tracing::{debug, info};
use xtf_config::{Config, FacetSettings};
use xtf_facet::{FacetError, FacetSpec, ResultFacet, ScoredHit, TantivySource};

use crate::cli::{
    args::FacetCommand,
    context::CommandContext,
    output::{FacetReport, output_report},
};

/// Runs a query and prints one result tree per facet.
pub fn run(ctx: &CommandContext, cmd: &FacetCommand) -> ExitCode {
    let specs = match facet_specs(&ctx.config, cmd) {
        Ok(specs) if specs.is_empty() => {
            eprintln!("error: no facets to compute");
            eprintln!("Name one with --facet or add a [[facet]] table to the configuration.");
            return ExitCode::FAILURE;
        }
        Ok(specs) => specs,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let dir = ctx.index_dir(cmd.index.as_deref());
    let index = match CommandContext::open_index(&dir) {
        Ok(index) => index,
        Err(code) => return code,
    };
    let query = match parse_query(&index, &ctx.config, &cmd.query) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let searcher = match index.reader() {
        Ok(reader) => reader.searcher(),
        Err(e) => {
            eprintln!("error: failed to open index reader: {e}");
            return ExitCode::FAILURE;
        }
    };
    let source = TantivySource::new(searcher);

    let hits = match collect_hits(&source, query.as_ref()) {
        Ok(hits) => hits,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(query = cmd.query.as_str(), hits = hits.len(), "query matched");

    let mut facets: Vec<ResultFacet<ScoredHit>> = Vec::with_capacity(specs.len());
    for spec in &specs {
        debug!(field = spec.field.as_str(), chain = %spec.selector, "computing facet");
        match spec.evaluate(&source, &hits) {
            Ok(facet) => facets.push(facet),
            Err(e) => {
                eprintln!("error: facet '{}': {e}", spec.field);
                return ExitCode::FAILURE;
            }
        }
    }

    let report = FacetReport {
        query: cmd.query.clone(),
        total_docs: hits.len(),
        facets,
    };
    output_report(&report, &source, cmd.json)
}

/// The facets to compute: the ones named on the command line, looked up in
/// configuration when present, or else every configured facet. Command line
/// overrides apply to each.
fn facet_specs(config: &Config, cmd: &FacetCommand) -> Result<Vec<FacetSpec>, FacetError> {
    let settings: Vec<FacetSettings> = if cmd.facets.is_empty() {
        config.facets.clone()
    } else {
        cmd.facets
            .iter()
            .map(|field| {
                config
                    .facet(field)
                    .cloned()
                    .unwrap_or_else(|| FacetSettings::new(field.as_str()))
            })
            .collect()
    };

    settings
        .into_iter()
        .map(|mut facet| {
            if let Some(select) = &cmd.select {
                facet.select.clone_from(select);
            }
            if let Some(sort) = cmd.sort {
                facet.sort_groups_by = sort;
            }
            if cmd.include_empty {
                facet.include_empty_groups = true;
            }
            FacetSpec::from_settings(&facet)
        })
        .collect()
}

/// Parses the query against the configured default fields. `*` and the
/// empty query match everything.
fn parse_query(index: &Index, config: &Config, query: &str) -> Result<Box<dyn Query>, String> {
    let trimmed = query.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return Ok(Box::new(AllQuery));
    }

    let schema = index.schema();
    let fields: Vec<Field> = config
        .index
        .default_fields
        .iter()
        .filter_map(|name| schema.get_field(name).ok())
        .collect();
    if fields.is_empty() {
        return Err(format!(
            "none of the default fields ({}) exist in the index",
            config.index.default_fields.join(", ")
        ));
    }

    QueryParser::for_index(index, fields)
        .parse_query(trimmed)
        .map_err(|e| format!("invalid query '{trimmed}': {e}"))
}

/// Every matching document, in ascending document order.
fn collect_hits(source: &TantivySource, query: &dyn Query) -> tantivy::Result<Vec<ScoredHit>> {
    let searcher = source.searcher();
    let limit = usize::try_from(searcher.num_docs())
        .unwrap_or(usize::MAX)
        .max(1);
    let top = searcher.search(query, &TopDocs::with_limit(limit))?;

    let mut hits: Vec<ScoredHit> = top
        .into_iter()
        .map(|(score, address)| ScoredHit::new(source.global_doc(address), score))
        .collect();
    hits.sort_unstable_by_key(|hit| hit.doc);
    Ok(hits)
}
