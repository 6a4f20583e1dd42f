//! Interaction aggregator: drugs sharing a mechanism of action with the queried one.
//!
//! The backend returns raw joined rows, which may repeat a (partner, mechanism)
//! pair once per target. Collation keeps the first row of each pair, groups
//! by mechanism in first-seen order and sorts partners by name within each
//! group, so graph group assignment downstream is deterministic.

use std::collections::HashSet;
use std::sync::Arc;

use drugscope_common::{
    normalize_name, ActionType, DrugIdentity, InteractionRecord, MolecularTarget, QueryError,
    QueryResult,
};
use drugscope_config::QueryConfig;
use drugscope_db::{ConnectionManager, InteractionRow};
use tracing::{debug, instrument};

pub struct InteractionAggregator {
    manager: Arc<ConnectionManager>,
    row_limit: usize,
}

impl InteractionAggregator {
    pub fn new(manager: Arc<ConnectionManager>, config: &QueryConfig) -> Self {
        Self { manager, row_limit: config.interaction_limit }
    }

    /// `NotFound` when the drug does not exist; an empty list when it exists
    /// but shares no mechanism with any other drug.
    #[instrument(skip(self))]
    pub async fn get_interactions(&self, identity: &str) -> QueryResult<Vec<InteractionRecord>> {
        let identity = DrugIdentity::parse(identity)?;

        let lookup = self
            .manager
            .run(
                "interactions",
                self.manager.backend().drug_interactions(&identity, self.row_limit),
            )
            .await?
            .ok_or_else(|| QueryError::not_found(identity.as_str()))?;

        let raw = lookup.rows.len();
        let records = collate_interactions(&lookup.name, lookup.rows);
        debug!(raw, kept = records.len(), "interactions resolved");
        Ok(records)
    }
}

/// Dedupe, group and order raw rows for `source`. Rows naming `source`
/// itself (another molecule under the same preferred name) are dropped.
pub fn collate_interactions(source: &str, rows: Vec<InteractionRow>) -> Vec<InteractionRecord> {
    let source_key = normalize_name(source);
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut groups: Vec<(String, Vec<InteractionRecord>)> = Vec::new();

    for row in rows {
        let partner = row.interacting_drug.trim();
        let mechanism = row.mechanism_of_action.trim();
        if partner.is_empty() || mechanism.is_empty() {
            continue;
        }
        let partner_key = normalize_name(partner);
        if partner_key == source_key {
            continue;
        }
        if !seen.insert((partner_key, mechanism.to_string())) {
            continue;
        }

        let record = InteractionRecord {
            source_drug: source.to_string(),
            target: partner.to_string(),
            mechanism_of_action: mechanism.to_string(),
            relationship_type: row.action_type.as_deref().and_then(ActionType::parse),
            molecular_target: molecular_target(row.target_name, row.target_organism),
        };

        match groups.iter_mut().find(|(m, _)| m == mechanism) {
            Some((_, members)) => members.push(record),
            None => groups.push((mechanism.to_string(), vec![record])),
        }
    }

    groups
        .into_iter()
        .flat_map(|(_, mut members)| {
            members.sort_by(|a, b| a.target.as_bytes().cmp(b.target.as_bytes()));
            members
        })
        .collect()
}

fn molecular_target(name: Option<String>, organism: Option<String>) -> Option<MolecularTarget> {
    let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    match (clean(name), clean(organism)) {
        (None, None) => None,
        (name, organism) => Some(MolecularTarget { name, organism }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(partner: &str, mechanism: &str, target: Option<&str>) -> InteractionRow {
        InteractionRow {
            interacting_drug: partner.into(),
            mechanism_of_action: mechanism.into(),
            action_type: Some("INHIBITOR".into()),
            target_name: target.map(str::to_string),
            target_organism: target.map(|_| "Homo sapiens".to_string()),
        }
    }

    fn pairs(records: &[InteractionRecord]) -> Vec<(&str, &str)> {
        records
            .iter()
            .map(|r| (r.target.as_str(), r.mechanism_of_action.as_str()))
            .collect()
    }

    #[test]
    fn test_duplicate_pairs_collapse_to_first_row() {
        let rows = vec![
            row("IBUPROFEN", "Cyclooxygenase inhibitor", Some("Cyclooxygenase-1")),
            row("IBUPROFEN", "Cyclooxygenase inhibitor", Some("Cyclooxygenase-2")),
        ];
        let records = collate_interactions("ASPIRIN", rows);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].molecular_target.as_ref().and_then(|t| t.name.as_deref()),
            Some("Cyclooxygenase-1")
        );
    }

    #[test]
    fn test_partner_name_variants_are_one_partner() {
        let rows = vec![
            row("Ibuprofen", "Cyclooxygenase inhibitor", None),
            row("IBUPROFEN ", "Cyclooxygenase inhibitor", None),
        ];
        assert_eq!(collate_interactions("ASPIRIN", rows).len(), 1);
    }

    #[test]
    fn test_grouped_by_first_seen_mechanism_then_partner() {
        let rows = vec![
            row("NAPROXEN", "Cyclooxygenase inhibitor", None),
            row("CLOPIDOGREL", "Platelet aggregation inhibitor", None),
            row("IBUPROFEN", "Cyclooxygenase inhibitor", None),
            row("ABCIXIMAB", "Platelet aggregation inhibitor", None),
        ];
        let records = collate_interactions("ASPIRIN", rows);
        assert_eq!(
            pairs(&records),
            vec![
                ("IBUPROFEN", "Cyclooxygenase inhibitor"),
                ("NAPROXEN", "Cyclooxygenase inhibitor"),
                ("ABCIXIMAB", "Platelet aggregation inhibitor"),
                ("CLOPIDOGREL", "Platelet aggregation inhibitor"),
            ]
        );
        assert!(records.iter().all(|r| r.source_drug == "ASPIRIN"));
    }

    #[test]
    fn test_same_partner_under_two_mechanisms_is_two_records() {
        let rows = vec![
            row("IBUPROFEN", "Cyclooxygenase inhibitor", None),
            row("IBUPROFEN", "Platelet aggregation inhibitor", None),
        ];
        assert_eq!(collate_interactions("ASPIRIN", rows).len(), 2);
    }

    #[test]
    fn test_unknown_action_and_target() {
        let rows = vec![InteractionRow {
            interacting_drug: "COX PROBE 17".into(),
            mechanism_of_action: "Cyclooxygenase inhibitor".into(),
            action_type: None,
            target_name: None,
            target_organism: Some("  ".into()),
        }];
        let records = collate_interactions("ASPIRIN", rows);
        assert_eq!(records[0].relationship_type, None);
        assert_eq!(records[0].molecular_target, None);
    }

    #[test]
    fn test_action_type_parsed() {
        let records = collate_interactions("ASPIRIN", vec![row("IBUPROFEN", "Cyclooxygenase inhibitor", None)]);
        assert_eq!(records[0].relationship_type, Some(ActionType::Inhibitor));
    }

    #[test]
    fn test_same_name_molecule_is_not_its_own_partner() {
        let rows = vec![
            row("Aspirin", "Cyclooxygenase inhibitor", None),
            row(" aspirin\t", "Cyclooxygenase inhibitor", None),
            row("IBUPROFEN", "Cyclooxygenase inhibitor", None),
        ];
        let records = collate_interactions("ASPIRIN", rows);
        assert_eq!(pairs(&records), vec![("IBUPROFEN", "Cyclooxygenase inhibitor")]);
    }

    #[test]
    fn test_empty_rows_empty_result() {
        assert!(collate_interactions("METFORMIN", Vec::new()).is_empty());
    }
}
