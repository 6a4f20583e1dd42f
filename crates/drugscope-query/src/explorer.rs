//! Facade over the resolver and aggregators.
//!
//! Each aggregator owns its own backend call and error translation, so one
//! failing section of a profile never aborts the others.

use std::sync::Arc;

use drugscope_common::{
    DrugCandidate, DrugDetail, DrugIdentity, DrugProperties, InteractionRecord, QueryResult,
};
use drugscope_config::QueryConfig;
use drugscope_db::ConnectionManager;
use drugscope_kg::{build_interaction_graph, InteractionGraph};
use tracing::{debug, instrument};

use crate::details::DetailAggregator;
use crate::interactions::InteractionAggregator;
use crate::properties::PropertyAggregator;
use crate::search::SearchResolver;

/// Everything known about one drug. Each section carries its own outcome.
#[derive(Debug)]
pub struct DrugProfile {
    pub identity: DrugIdentity,
    pub details: QueryResult<DrugDetail>,
    pub properties: QueryResult<DrugProperties>,
    pub interactions: QueryResult<Vec<InteractionRecord>>,
    /// Built when the interaction section succeeded.
    pub graph: Option<InteractionGraph>,
}

pub struct DrugExplorer {
    manager: Arc<ConnectionManager>,
    search: SearchResolver,
    details: DetailAggregator,
    properties: PropertyAggregator,
    interactions: InteractionAggregator,
    parallel: bool,
}

impl DrugExplorer {
    pub fn new(manager: Arc<ConnectionManager>, config: &QueryConfig) -> Self {
        Self {
            search: SearchResolver::new(manager.clone(), config),
            details: DetailAggregator::new(manager.clone()),
            properties: PropertyAggregator::new(manager.clone()),
            interactions: InteractionAggregator::new(manager.clone(), config),
            parallel: config.parallel_profile,
            manager,
        }
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    pub async fn search(&self, term: &str) -> QueryResult<Vec<DrugCandidate>> {
        self.search.search(term).await
    }

    pub async fn get_details(&self, identity: &str) -> QueryResult<DrugDetail> {
        self.details.get_details(identity).await
    }

    pub async fn get_properties(&self, identity: &str) -> QueryResult<DrugProperties> {
        self.properties.get_properties(identity).await
    }

    pub async fn get_interactions(&self, identity: &str) -> QueryResult<Vec<InteractionRecord>> {
        self.interactions.get_interactions(identity).await
    }

    /// Interaction graph rooted at the queried drug.
    pub async fn network(&self, identity: &str) -> QueryResult<InteractionGraph> {
        let records = self.get_interactions(identity).await?;
        Ok(graph_for(&DrugIdentity::parse(identity)?, &records))
    }

    /// Run all three aggregators. A malformed identity fails up front;
    /// anything after that is reported per section.
    #[instrument(skip(self))]
    pub async fn profile(&self, identity: &str) -> QueryResult<DrugProfile> {
        let parsed = DrugIdentity::parse(identity)?;

        let (details, properties, interactions) = if self.parallel {
            tokio::join!(
                self.get_details(identity),
                self.get_properties(identity),
                self.get_interactions(identity),
            )
        } else {
            (
                self.get_details(identity).await,
                self.get_properties(identity).await,
                self.get_interactions(identity).await,
            )
        };

        let graph = interactions.as_ref().ok().map(|records| graph_for(&parsed, records));

        debug!(
            details = details.is_ok(),
            properties = properties.is_ok(),
            interactions = interactions.is_ok(),
            "profile assembled"
        );

        Ok(DrugProfile { identity: parsed, details, properties, interactions, graph })
    }
}

/// Root at the stored name when any record carries it, else at the normalized identity.
fn graph_for(identity: &DrugIdentity, records: &[InteractionRecord]) -> InteractionGraph {
    let root = records
        .first()
        .map(|r| r.source_drug.as_str())
        .unwrap_or(identity.as_str());
    build_interaction_graph(Some(root), records)
}
