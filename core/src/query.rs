use crate::model::{MatchRecord, SearchResponse};

pub const SEARCH_PATH: &str = "/api/v1/search";

/// Queries this short are never sent; they would flood the server while typing.
pub const MIN_QUERY_CHARS: usize = 3;

/// Per-file match slice requested from the server.
pub const MATCH_RANGE: &str = ":20";

/// Returns the query to send, or `None` when it is absent or too short.
pub fn accept_query(query: Option<&str>) -> Option<&str> {
    let query = query?;
    if query.chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    Some(query)
}

/// Joins the configured base URI with the search endpoint.
pub fn search_url(base_uri: &str) -> String {
    format!("{}{}", base_uri.trim_end_matches('/'), SEARCH_PATH)
}

/// Query string pairs for one search. `files` is left off the wire.
pub fn search_params(query: &str) -> [(&'static str, &str); 5] {
    [
        ("stats", "fosho"),
        ("repos", "*"),
        ("q", query),
        ("rng", MATCH_RANGE),
        ("i", "nope"),
    ]
}

/// Flattens a response into one record per code match, keeping server order.
pub fn flatten_response(response: SearchResponse, query: &str) -> Vec<MatchRecord> {
    let mut records = Vec::with_capacity(response.total_matches());

    for (_repo, repo_result) in response.results {
        for file in repo_result.matches {
            for code_match in file.matches {
                records.push(MatchRecord {
                    path: file.filename.clone(),
                    line: code_match.line_number - 1,
                    query: query.to_string(),
                    code_match,
                });
            }
        }
    }

    records
}
