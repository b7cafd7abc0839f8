//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use serde::Serialize;
use tantivy::{
    TantivyDocument,
    schema::{Field, Value},
};
use xtf_facet::{ResultFacet, ResultGroup, ScoredHit, TantivySource};

/// Stored fields tried, in order, to label a document hit.
const LABEL_FIELDS: &[&str] = &["id", "title"];

/// Everything `xtf facet` reports for one query.
#[derive(Serialize)]
pub struct FacetReport {
    /// The query as given.
    pub query: String,
    /// Documents matching the query.
    pub total_docs: usize,
    /// One result tree per facet.
    pub facets: Vec<ResultFacet<ScoredHit>>,
}

/// Prints a report as JSON or as indented text trees.
pub fn output_report(report: &FacetReport, source: &TantivySource, json: bool) -> ExitCode {
    if json {
        return match serde_json::to_string_pretty(report) {
            Ok(json_str) => {
                println!("{json_str}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let labeler = Labeler::new(source);
    print!("{}", format_report(report, &|doc| labeler.label(doc)));
    ExitCode::SUCCESS
}

/// Renders a report as text, labelling hits with `label`.
pub fn format_report(report: &FacetReport, label: &dyn Fn(u32) -> String) -> String {
    let mut out = format!(
        "Query: {} ({} {})\n",
        report.query,
        report.total_docs,
        plural(report.total_docs, "document")
    );
    for facet in &report.facets {
        out.push('\n');
        out.push_str(&format!(
            "{} ({} {})\n",
            facet.field,
            facet.root_group.total_sub_groups,
            plural(facet.root_group.total_sub_groups as usize, "group")
        ));
        format_hits(&facet.root_group, 1, label, &mut out);
        for group in &facet.root_group.sub_groups {
            format_group(group, 1, label, &mut out);
        }
    }
    out
}

/// Appends one group line, its hits, then its displayed children.
fn format_group(
    group: &ResultGroup<ScoredHit>,
    depth: usize,
    label: &dyn Fn(u32) -> String,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    let more = (group.total_sub_groups as usize).saturating_sub(group.sub_groups.len());
    let suffix = if more > 0 {
        format!(" (+{more} more)")
    } else {
        String::new()
    };
    out.push_str(&format!(
        "{indent}{}. {} [{}]{suffix}\n",
        group.rank + 1,
        group.value,
        group.total_docs
    ));

    format_hits(group, depth + 1, label, out);
    for kid in &group.sub_groups {
        format_group(kid, depth + 1, label, out);
    }
}

/// Appends the hit lines of a group.
fn format_hits(
    group: &ResultGroup<ScoredHit>,
    depth: usize,
    label: &dyn Fn(u32) -> String,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    for (rank, hit) in (group.start_doc..).zip(&group.doc_hits) {
        out.push_str(&format!(
            "{indent}#{} {} (score {:.3})\n",
            rank + 1,
            label(hit.doc),
            hit.score
        ));
    }
}

/// `noun`, pluralized for `n`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

/// Looks up a readable label for a document.
struct Labeler<'a> {
    /// Index being read.
    source: &'a TantivySource,
    /// Stored fields usable as labels.
    fields: Vec<Field>,
}

impl<'a> Labeler<'a> {
    /// Finds which label fields exist in the index.
    fn new(source: &'a TantivySource) -> Self {
        let schema = source.searcher().schema();
        let fields = LABEL_FIELDS
            .iter()
            .filter_map(|name| schema.get_field(name).ok())
            .filter(|&field| schema.get_field_entry(field).is_stored())
            .collect();
        Self { source, fields }
    }

    /// The first stored label of `doc`, or its id.
    fn label(&self, doc: u32) -> String {
        let address = self.source.doc_address(doc);
        let stored: Option<TantivyDocument> = self.source.searcher().doc(address).ok();
        stored
            .and_then(|stored| {
                self.fields.iter().find_map(|&field| {
                    stored
                        .get_first(field)
                        .and_then(|value| value.as_str())
                        .map(str::to_string)
                })
            })
            .unwrap_or_else(|| format!("doc {doc}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(value: &str, rank: u32, total_docs: u32) -> ResultGroup<ScoredHit> {
        ResultGroup {
            value: value.to_string(),
            rank,
            total_sub_groups: 0,
            sub_groups: Vec::new(),
            total_docs,
            start_doc: 0,
            end_doc: 0,
            doc_hits: Vec::new(),
        }
    }

    #[test]
    fn text_tree() {
        let mut fiction = group("Fiction", 0, 3);
        fiction.total_sub_groups = 2;
        fiction.sub_groups.push(group("Mystery", 0, 2));
        fiction.doc_hits = vec![ScoredHit::new(2, 1.5)];
        fiction.end_doc = 1;

        let mut root = group("", 0, 5);
        root.total_sub_groups = 2;
        root.sub_groups = vec![fiction, group("Nonfiction", 1, 2)];

        let report = FacetReport {
            query: "*".into(),
            total_docs: 5,
            facets: vec![ResultFacet {
                field: "subject".into(),
                root_group: root,
            }],
        };
        let text = format_report(&report, &|doc| format!("d{doc}"));
        assert_eq!(
            text,
            "Query: * (5 documents)\n\
             \n\
             subject (2 groups)\n\
             \x20 1. Fiction [3] (+1 more)\n\
             \x20   #1 d2 (score 1.500)\n\
             \x20   1. Mystery [2]\n\
             \x20 2. Nonfiction [2]\n"
        );
    }

    #[test]
    fn plurals() {
        assert_eq!(plural(1, "group"), "group");
        assert_eq!(plural(0, "group"), "groups");
    }
}
