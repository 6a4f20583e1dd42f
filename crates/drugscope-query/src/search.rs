//! Search resolver: free-text term to a bounded, ranked candidate list.
//!
//! Matching is plain case-insensitive substring containment. An empty term
//! yields the popular set (late-phase drugs). Ranking is phase descending
//! with unknown phases last, then name ascending by byte order, so the top K
//! is stable for unchanged data.

use std::collections::HashSet;
use std::sync::Arc;

use drugscope_common::{DrugCandidate, Phase, QueryResult, SearchTerm};
use drugscope_config::QueryConfig;
use drugscope_db::{CandidateFilter, CandidateQuery, CandidateRow, ConnectionManager};
use tracing::{debug, instrument};

pub struct SearchResolver {
    manager: Arc<ConnectionManager>,
    limit: usize,
    therapeutic_only: bool,
}

impl SearchResolver {
    pub fn new(manager: Arc<ConnectionManager>, config: &QueryConfig) -> Self {
        Self {
            manager,
            limit: config.search_limit,
            therapeutic_only: config.therapeutic_only,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// At most `limit` candidates. No match is an empty list, never an error.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str) -> QueryResult<Vec<DrugCandidate>> {
        let term = SearchTerm::parse(term);
        let query = CandidateQuery {
            filter: match &term {
                SearchTerm::Popular            => CandidateFilter::Popular,
                SearchTerm::Fragment(fragment) => CandidateFilter::Containing(fragment.clone()),
            },
            limit: self.limit,
            therapeutic_only: self.therapeutic_only,
        };

        let rows = self
            .manager
            .run("search", self.manager.backend().candidates(&query))
            .await?;

        let candidates = rank_candidates(&term, rows, self.limit);
        debug!(count = candidates.len(), "search resolved");
        Ok(candidates)
    }
}

/// Keep rows that satisfy `term`, drop repeated names, rank and truncate.
pub fn rank_candidates(term: &SearchTerm, rows: Vec<CandidateRow>, limit: usize) -> Vec<DrugCandidate> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<DrugCandidate> = rows
        .into_iter()
        .filter(|row| term.matches(&row.name))
        .filter(|row| seen.insert(row.name.clone()))
        .map(|row| DrugCandidate {
            name: row.name,
            phase: row.max_phase.and_then(Phase::from_raw),
        })
        .collect();

    candidates.sort_by(|a, b| a.rank_cmp(b));
    candidates.truncate(limit);
    candidates
}
