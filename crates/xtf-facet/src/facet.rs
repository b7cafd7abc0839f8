//! Facet specifications.

use std::sync::Arc;

use tracing::debug;
use xtf_config::{DYNAMIC_PREFIX, FacetSettings, SortGroupsBy};

use crate::{
    DocId,
    counts::{GroupCounts, ResultFacet},
    error::FacetError,
    frbr::{FrbrCollector, FrbrGroupData},
    group_data::GroupData,
    hit::DocHitMaker,
    selector::{self, SelectorChain},
    source::TermSource,
    static_data::StaticGroupData,
};

/// How one facet is grouped, selected and sorted.
#[derive(Debug, Clone)]
pub struct FacetSpec {
    /// Index field, or a `dynamic:` grouping.
    pub field: String,
    /// Which groups are displayed and which carry hits.
    pub selector: SelectorChain,
    /// Sibling order.
    pub sort_groups_by: SortGroupsBy,
    /// Show groups without matching documents.
    pub include_empty_groups: bool,
    /// Order of hits within a group. Interpreted by the caller.
    pub sort_docs_by: String,
}

impl FacetSpec {
    /// A facet on `field` that selects only the root.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            selector: SelectorChain::root_only(),
            sort_groups_by: SortGroupsBy::default(),
            include_empty_groups: false,
            sort_docs_by: "score".to_string(),
        }
    }

    /// Builds a spec from configuration, compiling its selection.
    pub fn from_settings(settings: &FacetSettings) -> Result<Self, FacetError> {
        Ok(Self {
            field: settings.field.clone(),
            selector: selector::compile(&settings.select)?,
            sort_groups_by: settings.sort_groups_by,
            include_empty_groups: settings.include_empty_groups,
            sort_docs_by: settings.sort_docs_by.clone(),
        })
    }

    /// Replaces the selection with a compiled expression.
    pub fn with_select(mut self, select: &str) -> Result<Self, FacetError> {
        self.selector = selector::compile(select)?;
        Ok(self)
    }

    /// Sets the sibling order.
    pub fn with_sort(mut self, sort: SortGroupsBy) -> Self {
        self.sort_groups_by = sort;
        self
    }

    /// Sets whether empty groups are shown.
    pub fn with_empty_groups(mut self, include: bool) -> Self {
        self.include_empty_groups = include;
        self
    }

    /// The dynamic grouping named by the field, if any.
    pub fn dynamic(&self) -> Result<Option<DynamicField>, FacetError> {
        DynamicField::parse(&self.field)
    }

    /// Groups a complete set of hits, which must be in ascending document
    /// order, and renders the facet.
    pub fn evaluate<H, M>(
        &self,
        source: &dyn TermSource,
        hits: &[M],
    ) -> Result<ResultFacet<H>, FacetError>
    where
        H: Ord,
        M: DocHitMaker<H>,
    {
        let docs = hits.iter().map(|hit| (hit.doc_num(), hit.score()));
        let groups = FacetGroups::load(source, self, docs)?;
        let mut counts = GroupCounts::new(groups.data(), self)?;
        for hit in hits {
            counts.add_doc(hit);
        }
        counts.into_result()
    }
}

/// A grouping computed per query rather than read from an index field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicField {
    /// `dynamic:frbr(<params>)`: FRBR work clustering.
    Frbr {
        /// FRBR parameter string.
        params: String,
    },
}

impl DynamicField {
    /// Parses a facet field. Returns `None` for ordinary index fields.
    pub fn parse(field: &str) -> Result<Option<Self>, FacetError> {
        let Some(spec) = field.strip_prefix(DYNAMIC_PREFIX) else {
            return Ok(None);
        };
        let invalid = |reason: &str| FacetError::InvalidDynamicField {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let (kind, rest) = spec
            .split_once('(')
            .ok_or_else(|| invalid("expected kind(params)"))?;
        let params = rest
            .strip_suffix(')')
            .ok_or_else(|| invalid("missing closing parenthesis"))?;

        match kind.trim() {
            "frbr" | "FRBR" => Ok(Some(Self::Frbr {
                params: params.to_string(),
            })),
            _ => Err(invalid("unknown dynamic grouping")),
        }
    }

    /// Starts collecting a result set for this grouping.
    pub fn init(&self, source: &dyn TermSource) -> Result<FrbrCollector, FacetError> {
        match self {
            Self::Frbr { params } => FrbrGroupData::init(source, params),
        }
    }
}

/// Group data for one facet of one query.
#[derive(Debug)]
pub enum FacetGroups {
    /// Shared hierarchy read from an index field.
    Static(Arc<StaticGroupData>),
    /// Groups computed from this query's hits.
    Frbr(FrbrGroupData),
}

impl FacetGroups {
    /// Loads static data, or clusters the `(doc, score)` pairs of a query
    /// for a dynamic facet. Documents must ascend.
    pub fn load(
        source: &dyn TermSource,
        spec: &FacetSpec,
        docs: impl IntoIterator<Item = (DocId, f32)>,
    ) -> Result<Self, FacetError> {
        match spec.dynamic()? {
            None => Ok(Self::Static(StaticGroupData::cached(source, &spec.field)?)),
            Some(dynamic) => {
                let mut collector = dynamic.init(source)?;
                for (doc, score) in docs {
                    collector.collect(doc, score)?;
                }
                debug!(
                    field = spec.field.as_str(),
                    docs = collector.len(),
                    "clustering dynamic facet"
                );
                Ok(Self::Frbr(collector.finish()))
            }
        }
    }

    /// The group data as a trait object.
    pub fn data(&self) -> &dyn GroupData {
        match self {
            Self::Static(data) => &**data,
            Self::Frbr(data) => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let spec = FacetSpec::new("subject");
        assert_eq!(spec.sort_groups_by, SortGroupsBy::TotalDocs);
        assert!(!spec.include_empty_groups);
        assert_eq!(spec.sort_docs_by, "score");
        assert_eq!(spec.selector.to_string(), "root -> mark");
        assert_eq!(spec.dynamic().unwrap(), None);
    }

    #[test]
    fn from_settings_compiles_selection() {
        let mut settings = FacetSettings::new("subject");
        settings.select = "*[1-3]#1-5".into();
        settings.sort_groups_by = SortGroupsBy::Value;
        let spec = FacetSpec::from_settings(&settings).unwrap();
        assert_eq!(spec.selector.to_string(), "root -> * -> [1-3] -> #1-5 -> mark");
        assert_eq!(spec.sort_groups_by, SortGroupsBy::Value);

        settings.select = "*[".into();
        assert!(matches!(
            FacetSpec::from_settings(&settings),
            Err(FacetError::Select(_))
        ));
    }

    #[test]
    fn dynamic_fields() {
        let field = DynamicField::parse("dynamic:frbr(title author [sort=date])").unwrap();
        assert_eq!(
            field,
            Some(DynamicField::Frbr {
                params: "title author [sort=date]".into()
            })
        );
        assert_eq!(DynamicField::parse("subject").unwrap(), None);

        for bad in ["dynamic:frbr", "dynamic:frbr(title", "dynamic:cluster(title)"] {
            let err = DynamicField::parse(bad).unwrap_err();
            assert!(
                matches!(&err, FacetError::InvalidDynamicField { field, .. } if field == bad),
                "{bad}: {err}"
            );
        }
    }
}
