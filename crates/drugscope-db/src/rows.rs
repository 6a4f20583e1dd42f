//! Raw row shapes returned by a [`DrugBackend`](crate::DrugBackend).
//!
//! Every column that can be NULL upstream is an `Option`. Interpretation (flag
//! codes, unknown sentinels, derived values) belongs to the aggregators.

/// What the candidate query should match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateFilter {
    /// Late-phase drugs for the initial suggestions view.
    Popular,
    /// Case-insensitive substring of the preferred name (already case-folded).
    Containing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuery {
    pub filter: CandidateFilter,
    pub limit: usize,
    pub therapeutic_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub name: String,
    pub max_phase: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailRow {
    pub molregno: i64,
    pub pref_name: String,
    pub max_phase: Option<f64>,
    pub therapeutic_flag: Option<i32>,
    pub molecule_type: Option<String>,
    pub first_approval: Option<i32>,
    pub oral: Option<i32>,
    pub parenteral: Option<i32>,
    pub topical: Option<i32>,
    pub black_box_warning: Option<i32>,
    pub natural_product: Option<i32>,
    pub first_in_class: Option<i32>,
    pub chirality: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyRow {
    pub full_mwt: Option<f64>,
    pub mw_freebase: Option<f64>,
    pub alogp: Option<f64>,
    pub psa: Option<f64>,
    pub hba: Option<i32>,
    pub hbd: Option<i32>,
    pub aromatic_rings: Option<i32>,
    pub qed_weighted: Option<f64>,
}

/// The drug exists; `properties` is `None` when it has no computed-properties row.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyLookup {
    pub name: String,
    pub properties: Option<PropertyRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRow {
    pub interacting_drug: String,
    pub mechanism_of_action: String,
    pub action_type: Option<String>,
    pub target_name: Option<String>,
    pub target_organism: Option<String>,
}

/// The drug exists; `rows` may be empty and may contain join fan-out duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionLookup {
    pub name: String,
    pub rows: Vec<InteractionRow>,
}
