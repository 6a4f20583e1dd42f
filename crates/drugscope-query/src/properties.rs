//! Property aggregator: computed physico-chemical properties and drug-likeness.

use std::sync::Arc;

use drugscope_common::{
    DrugIdentity, DrugLikeness, DrugProperties, LipinskiProfile, QueryError, QueryResult,
};
use drugscope_db::{ConnectionManager, PropertyLookup};
use tracing::{debug, instrument};

pub struct PropertyAggregator {
    manager: Arc<ConnectionManager>,
}

impl PropertyAggregator {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// A drug without a computed-properties row reports every value unknown.
    #[instrument(skip(self))]
    pub async fn get_properties(&self, identity: &str) -> QueryResult<DrugProperties> {
        let identity = DrugIdentity::parse(identity)?;

        let lookup = self
            .manager
            .run("properties", self.manager.backend().drug_properties(&identity))
            .await?
            .ok_or_else(|| QueryError::not_found(identity.as_str()))?;

        debug!(has_row = lookup.properties.is_some(), "properties resolved");
        Ok(properties_from_lookup(lookup))
    }
}

pub fn properties_from_lookup(lookup: PropertyLookup) -> DrugProperties {
    let row = lookup.properties.unwrap_or_default();

    let molecular_weight = measure(row.full_mwt);
    let logp = measure(row.alogp);
    let h_bond_acceptors = count(row.hba);
    let h_bond_donors = count(row.hbd);

    DrugProperties {
        name: lookup.name,
        molecular_weight,
        molecular_weight_freebase: measure(row.mw_freebase),
        logp,
        psa: measure(row.psa),
        h_bond_donors,
        h_bond_acceptors,
        aromatic_rings: count(row.aromatic_rings),
        drug_likeness: DrugLikeness {
            qed: measure(row.qed_weighted).filter(|q| (0.0..=1.0).contains(q)),
            lipinski: LipinskiProfile::evaluate(molecular_weight, logp, h_bond_acceptors, h_bond_donors),
        },
    }
}

fn measure(raw: Option<f64>) -> Option<f64> {
    raw.filter(|v| v.is_finite())
}

// Negative counts are corrupt data, not zero.
fn count(raw: Option<i32>) -> Option<u32> {
    raw.and_then(|n| u32::try_from(n).ok())
}
