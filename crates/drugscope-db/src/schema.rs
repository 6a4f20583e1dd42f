//! The external schema contract.
//!
//! The store is a ChEMBL-style dump populated upstream. Only these relations and
//! columns are read; anything else in the database is ignored.

pub const TABLE_MOLECULE_DICTIONARY: &str = "molecule_dictionary";
pub const TABLE_COMPOUND_PROPERTIES: &str = "compound_properties";
pub const TABLE_DRUG_MECHANISM: &str = "drug_mechanism";
pub const TABLE_TARGET_DICTIONARY: &str = "target_dictionary";

/// Drugs in these phases make up the suggestions shown before anything is typed.
pub const POPULAR_MIN_PHASE: f64 = 3.0;

pub const EXPECTED_COLUMNS: &[(&str, &[&str])] = &[
    (
        TABLE_MOLECULE_DICTIONARY,
        &[
            "molregno",
            "pref_name",
            "max_phase",
            "therapeutic_flag",
            "molecule_type",
            "first_approval",
            "oral",
            "parenteral",
            "topical",
            "black_box_warning",
            "natural_product",
            "first_in_class",
            "chirality",
        ],
    ),
    (
        TABLE_COMPOUND_PROPERTIES,
        &[
            "molregno",
            "full_mwt",
            "mw_freebase",
            "alogp",
            "psa",
            "hba",
            "hbd",
            "aromatic_rings",
            "qed_weighted",
        ],
    ),
    (
        TABLE_DRUG_MECHANISM,
        &["molregno", "tid", "mechanism_of_action", "action_type"],
    ),
    (TABLE_TARGET_DICTIONARY, &["tid", "pref_name", "organism"]),
];

/// Compare the expected contract against `(table, column)` pairs the store reports.
/// Returns `table.column` entries (or bare `table` when the whole relation is absent)
/// that are missing, in contract order.
pub fn missing_objects<'a, I>(present: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let present: Vec<(&str, &str)> = present.into_iter().collect();
    let mut missing = Vec::new();

    for (table, columns) in EXPECTED_COLUMNS {
        if !present.iter().any(|(t, _)| t == table) {
            missing.push((*table).to_string());
            continue;
        }
        for column in columns.iter() {
            if !present.iter().any(|(t, c)| t == table && c == column) {
                missing.push(format!("{table}.{column}"));
            }
        }
    }

    missing
}
