//! Detail aggregator: identity and classification attributes of one drug.

use std::collections::BTreeSet;
use std::sync::Arc;

use drugscope_common::{
    AdministrationRoute, Chirality, DrugDetail, DrugIdentity, Phase, QueryError, QueryResult,
};
use drugscope_db::{ConnectionManager, DetailRow};
use tracing::{debug, instrument};

pub struct DetailAggregator {
    manager: Arc<ConnectionManager>,
}

impl DetailAggregator {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    #[instrument(skip(self))]
    pub async fn get_details(&self, identity: &str) -> QueryResult<DrugDetail> {
        let identity = DrugIdentity::parse(identity)?;

        let row = self
            .manager
            .run("details", self.manager.backend().drug_detail(&identity))
            .await?
            .ok_or_else(|| QueryError::not_found(identity.as_str()))?;

        debug!(molregno = row.molregno, "details resolved");
        Ok(detail_from_row(row))
    }
}

/// Interpret a raw row. NULLs and unknown codes become `None`.
pub fn detail_from_row(row: DetailRow) -> DrugDetail {
    let max_phase = row.max_phase.and_then(Phase::from_raw);

    DrugDetail {
        name: row.pref_name,
        max_phase,
        therapeutic_flag: flag(row.therapeutic_flag),
        molecule_type: row
            .molecule_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("unknown")),
        first_approval: row.first_approval.filter(|year| *year > 0),
        administration_routes: administration_routes(
            flag(row.oral),
            flag(row.parenteral),
            flag(row.topical),
            max_phase,
        ),
        black_box_warning: flag(row.black_box_warning),
        natural_product: flag(row.natural_product),
        first_in_class: flag(row.first_in_class),
        chirality: row.chirality.and_then(Chirality::from_code),
    }
}

/// 1 is yes, 0 is no; -1, NULL and anything else is unknown.
pub fn flag(raw: Option<i32>) -> Option<bool> {
    match raw {
        Some(1) => Some(true),
        Some(0) => Some(false),
        _       => None,
    }
}

/// Known-true routes; `None` when no route flag is known at all.
///
/// An approved drug with all three flags known to be false is given through
/// some other route (inhaled, ophthalmic, ...).
pub fn administration_routes(
    oral: Option<bool>,
    parenteral: Option<bool>,
    topical: Option<bool>,
    max_phase: Option<Phase>,
) -> Option<BTreeSet<AdministrationRoute>> {
    let flags = [
        (oral, AdministrationRoute::Oral),
        (parenteral, AdministrationRoute::Parenteral),
        (topical, AdministrationRoute::Topical),
    ];
    if flags.iter().all(|(known, _)| known.is_none()) {
        return None;
    }

    let mut routes: BTreeSet<_> = flags
        .iter()
        .filter(|(known, _)| *known == Some(true))
        .map(|(_, route)| *route)
        .collect();

    let all_false = flags.iter().all(|(known, _)| *known == Some(false));
    if all_false && max_phase.is_some_and(|p| p.is_approved()) {
        routes.insert(AdministrationRoute::Other);
    }
    Some(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row() -> DetailRow {
        DetailRow { molregno: 1, pref_name: "ASPIRIN".into(), ..Default::default() }
    }

    #[test]
    fn test_null_columns_are_unknown_not_false() {
        let detail = detail_from_row(row());
        assert_eq!(detail.black_box_warning, None);
        assert_eq!(detail.therapeutic_flag, None);
        assert_eq!(detail.max_phase, None);
        assert_eq!(detail.administration_routes, None);
        assert_eq!(detail.chirality, None);
        assert_eq!(detail.first_approval, None);
    }

    #[test]
    fn test_flag_codes() {
        assert_eq!(flag(Some(1)), Some(true));
        assert_eq!(flag(Some(0)), Some(false));
        assert_eq!(flag(Some(-1)), None);
        assert_eq!(flag(None), None);
    }

    #[test]
    fn test_known_false_is_kept() {
        let detail = detail_from_row(DetailRow { black_box_warning: Some(0), ..row() });
        assert_eq!(detail.black_box_warning, Some(false));
    }

    #[test]
    fn test_routes_from_flags() {
        let routes = administration_routes(Some(true), Some(false), None, Phase::from_raw(4.0));
        assert_eq!(routes, Some(BTreeSet::from([AdministrationRoute::Oral])));
    }

    #[test]
    fn test_routes_other_only_when_approved() {
        let approved = administration_routes(Some(false), Some(false), Some(false), Phase::from_raw(4.0));
        assert_eq!(approved, Some(BTreeSet::from([AdministrationRoute::Other])));

        let clinical = administration_routes(Some(false), Some(false), Some(false), Phase::from_raw(2.0));
        assert_eq!(clinical, Some(BTreeSet::new()));
    }

    #[test]
    fn test_partial_flags_do_not_imply_other() {
        let routes = administration_routes(Some(false), None, Some(false), Phase::from_raw(4.0));
        assert_eq!(routes, Some(BTreeSet::new()));
    }

    #[test]
    fn test_molecule_type_blank_or_unknown() {
        let blank = detail_from_row(DetailRow { molecule_type: Some("  ".into()), ..row() });
        assert_eq!(blank.molecule_type, None);
        let unknown = detail_from_row(DetailRow { molecule_type: Some("Unknown".into()), ..row() });
        assert_eq!(unknown.molecule_type, None);
        let small = detail_from_row(DetailRow { molecule_type: Some("Small molecule".into()), ..row() });
        assert_eq!(small.molecule_type.as_deref(), Some("Small molecule"));
    }

    #[test]
    fn test_chirality_codes() {
        let detail = detail_from_row(DetailRow { chirality: Some(2), ..row() });
        assert_eq!(detail.chirality, Some(Chirality::Achiral));
        let unknown = detail_from_row(DetailRow { chirality: Some(-1), ..row() });
        assert_eq!(unknown.chirality, None);
    }
}
