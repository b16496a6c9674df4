//! Float to agency (data assembly center) lookup
//!
//! Agencies are only needed for agency coloring. They can come from an Argo
//! profile index file, from a `DAC` column of the trajectory file, or be built
//! directly from pairs.

use super::data::FloatId;
use super::error::Result;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// Resolves the owning agency of a float
pub trait AgencyLookup {
    fn agency_of(&self, float: FloatId) -> Option<&str>;
}

impl AgencyLookup for HashMap<FloatId, String> {
    fn agency_of(&self, float: FloatId) -> Option<&str> {
        self.get(&float).map(String::as_str)
    }
}

/// In-memory float → agency index
#[derive(Debug, Clone, Default)]
pub struct AgencyIndex {
    by_float: HashMap<FloatId, String>,
}

impl AgencyIndex {
    /// Build from (float, agency) pairs; the first agency seen for a float wins
    pub fn from_pairs(pairs: impl IntoIterator<Item = (FloatId, String)>) -> Self {
        let mut by_float = HashMap::new();
        for (id, agency) in pairs {
            if !agency.is_empty() {
                by_float.entry(id).or_insert(agency);
            }
        }
        Self { by_float }
    }

    /// Load from an Argo profile index (`ar_index_global_prof.txt`)
    ///
    /// The index is a CSV with `#` comment lines. Its `file` column holds
    /// paths of the form `dac/wmo/profiles/R<wmo>_<cycle>.nc`.
    pub fn from_profile_index(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|opts| opts.with_comment_prefix(Some("#")))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let files = df.column("file")?.cast(&DataType::String)?;
        let files = files.as_materialized_series().str()?;
        let index = Self::from_pairs(files.into_iter().flatten().filter_map(parse_index_path));

        tracing::debug!(
            "Loaded agency index {}: {} profiles, {} floats",
            path.display(),
            df.height(),
            index.len()
        );

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.by_float.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_float.is_empty()
    }
}

impl AgencyLookup for AgencyIndex {
    fn agency_of(&self, float: FloatId) -> Option<&str> {
        self.by_float.get(&float).map(String::as_str)
    }
}

/// Split an index path `dac/wmo/...` into (float, agency)
fn parse_index_path(path: &str) -> Option<(FloatId, String)> {
    let mut parts = path.trim().split('/');
    let dac = parts.next()?;
    let wmo = parts.next()?.parse::<u32>().ok()?;
    Some((FloatId(wmo), dac.to_string()))
}
