use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// One occurrence of the query as reported by the search server.
///
/// `line_number` is 1-based. `before` and `after` hold up to two lines of
/// surrounding source each, nearest-last and nearest-first respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMatch {
    #[serde(rename = "LineNumber")]
    pub line_number: i64,
    #[serde(rename = "Line")]
    pub line: String,
    #[serde(rename = "Before", default, deserialize_with = "null_as_empty")]
    pub before: Vec<String>,
    #[serde(rename = "After", default, deserialize_with = "null_as_empty")]
    pub after: Vec<String>,
}

// The server encodes empty context as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileMatches {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Matches")]
    pub matches: Vec<CodeMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoResult {
    #[serde(rename = "Matches")]
    pub matches: Vec<FileMatches>,
    #[serde(rename = "FilesWithMatch", default)]
    pub files_with_match: u64,
    #[serde(rename = "Revision", default)]
    pub revision: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchStats {
    #[serde(rename = "FilesOpened", default)]
    pub files_opened: u64,
    #[serde(rename = "Duration", default)]
    pub duration_ms: u64,
}

/// Body of `GET /api/v1/search`. Repo keys keep the order the server sent.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Results")]
    pub results: IndexMap<String, RepoResult>,
    #[serde(rename = "Stats", default)]
    pub stats: Option<SearchStats>,
}

impl SearchResponse {
    pub fn total_matches(&self) -> usize {
        self.results
            .values()
            .flat_map(|repo| repo.matches.iter())
            .map(|file| file.matches.len())
            .sum()
    }
}

/// Flattened, per-occurrence search result handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub path: String,
    /// 0-based, as expected by editor navigation.
    pub line: i64,
    pub query: String,
    pub code_match: CodeMatch,
}
