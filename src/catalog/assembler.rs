//! Shapes raw engine results into the public response types

use crate::catalog::params::{FilterSelection, PageParameters};
use crate::error::Result;
use crate::models::Board;
use crate::search::{BucketGroup, Hit, SearchHits};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Facet values with their document counts, serialized as a JSON object
/// in engine order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetValues(pub Vec<(String, u64)>);

impl FacetValues {
    pub fn get(&self, value: &str) -> Option<u64> {
        self.0.iter().find(|(v, _)| v == value).map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FacetValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, count) in &self.0 {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

/// One facet of the result set and the value the request pinned it to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardFilter {
    pub name: String,
    pub values: FacetValues,
    /// Empty when the request did not select this facet
    pub selected_value: String,
}

/// One page of boards
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPage {
    pub values: Vec<Board>,
    /// Facet summary; absent for free-text search
    pub filters: Option<Vec<BoardFilter>>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// Number of pages of `page_size` needed for `total` hits
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

pub fn board_from_hit(hit: Hit) -> Result<Board> {
    Ok(Board::from_source(hit.id, hit.source)?)
}

/// Page of boards in engine order, without facets
pub fn assemble_page(result: SearchHits, page: &PageParameters) -> Result<BoardPage> {
    let values = result
        .hits
        .into_iter()
        .map(board_from_hit)
        .collect::<Result<Vec<_>>>()?;

    Ok(BoardPage {
        values,
        filters: None,
        page: page.page,
        page_size: page.page_size,
        total: result.total,
        total_pages: total_pages(result.total, page.page_size),
    })
}

/// Facet summary: one entry per aggregation group, annotated with the selection
pub fn assemble_filters(groups: Vec<BucketGroup>, selection: &FilterSelection) -> Vec<BoardFilter> {
    groups
        .into_iter()
        .map(|group| BoardFilter {
            selected_value: selection.get(&group.name).unwrap_or_default().to_string(),
            values: FacetValues(
                group
                    .buckets
                    .into_iter()
                    .map(|bucket| (bucket.key, bucket.doc_count))
                    .collect(),
            ),
            name: group.name,
        })
        .collect()
}

/// Page of boards plus the facet summary of the whole match set
pub fn assemble_filtered_page(
    mut result: SearchHits,
    page: &PageParameters,
    selection: &FilterSelection,
) -> Result<BoardPage> {
    let groups = std::mem::take(&mut result.aggregations);
    let mut board_page = assemble_page(result, page)?;
    board_page.filters = Some(assemble_filters(groups, selection));
    Ok(board_page)
}
