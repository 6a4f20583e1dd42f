//! A small ChEMBL-shaped data set.
//!
//! Molregnos:
//!
//! | # | name                    | phase | notes                                        |
//! |---|-------------------------|-------|----------------------------------------------|
//! | 1 | ASPIRIN                 | 4     | full detail + properties                     |
//! | 2 | Aspirin-like compound X | 1     | every optional column NULL, no properties    |
//! | 3 | IBUPROFEN               | 4     | two targets under one mechanism (fan-out)    |
//! | 4 | NAPROXEN                | 4     | exact duplicate mechanism row                |
//! | 5 | CLOPIDOGREL             | 4     | boxed warning, shares platelet mechanism     |
//! | 6 | CELECOXIB               | 4     | COX-2 selective, shares nothing with aspirin |
//! | 7 | COX PROBE 17            | NULL  | not therapeutic                              |
//! | 8 | METFORMIN               | 4     | exists, no interaction partners              |

use drugscope_db::{DetailRow, PropertyRow};

use crate::backend::{mechanism, molecule, InMemoryBackend};

pub const COX_INHIBITOR: &str = "Cyclooxygenase inhibitor";
pub const COX2_INHIBITOR: &str = "Cyclooxygenase-2 inhibitor";
pub const PLATELET_INHIBITOR: &str = "Platelet aggregation inhibitor";
pub const AMPK_ACTIVATOR: &str = "AMP-activated protein kinase activator";

const HUMAN: &str = "Homo sapiens";

pub fn chembl_sample() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_molecule(DetailRow {
            molecule_type: Some("Small molecule".into()),
            first_approval: Some(1950),
            oral: Some(1),
            parenteral: Some(0),
            topical: Some(0),
            black_box_warning: Some(0),
            natural_product: Some(0),
            first_in_class: Some(0),
            chirality: Some(2),
            ..molecule(1, "ASPIRIN", Some(4.0))
        })
        .with_properties(1, PropertyRow {
            full_mwt: Some(180.16),
            mw_freebase: Some(180.16),
            alogp: Some(1.31),
            psa: Some(63.6),
            hba: Some(3),
            hbd: Some(1),
            aromatic_rings: Some(1),
            qed_weighted: Some(0.55),
        })
        .with_molecule(molecule(2, "Aspirin-like compound X", Some(1.0)))
        .with_molecule(DetailRow {
            molecule_type: Some("Small molecule".into()),
            first_approval: Some(1974),
            oral: Some(1),
            parenteral: Some(1),
            topical: Some(1),
            black_box_warning: Some(1),
            natural_product: Some(0),
            first_in_class: Some(0),
            chirality: Some(0),
            ..molecule(3, "IBUPROFEN", Some(4.0))
        })
        .with_properties(3, PropertyRow {
            full_mwt: Some(206.29),
            mw_freebase: Some(206.29),
            alogp: Some(3.07),
            psa: Some(37.3),
            hba: Some(1),
            hbd: Some(1),
            aromatic_rings: Some(1),
            qed_weighted: Some(0.82),
        })
        .with_molecule(DetailRow {
            molecule_type: Some("Small molecule".into()),
            oral: Some(1),
            parenteral: Some(0),
            topical: Some(0),
            chirality: Some(1),
            ..molecule(4, "NAPROXEN", Some(4.0))
        })
        .with_properties(4, PropertyRow {
            full_mwt: Some(230.26),
            alogp: Some(3.04),
            hba: Some(2),
            hbd: Some(1),
            ..Default::default()
        })
        .with_molecule(DetailRow {
            molecule_type: Some("Small molecule".into()),
            first_approval: Some(1997),
            oral: Some(1),
            parenteral: Some(0),
            topical: Some(0),
            black_box_warning: Some(1),
            chirality: Some(1),
            ..molecule(5, "CLOPIDOGREL", Some(4.0))
        })
        .with_properties(5, PropertyRow {
            full_mwt: Some(321.83),
            mw_freebase: Some(321.83),
            alogp: Some(3.83),
            psa: Some(29.54),
            hba: Some(4),
            hbd: Some(0),
            aromatic_rings: Some(2),
            qed_weighted: Some(0.83),
        })
        .with_molecule(molecule(6, "CELECOXIB", Some(4.0)))
        .with_molecule(DetailRow {
            therapeutic_flag: Some(0),
            ..molecule(7, "COX PROBE 17", None)
        })
        .with_molecule(DetailRow {
            oral: Some(0),
            parenteral: Some(0),
            topical: Some(0),
            ..molecule(8, "METFORMIN", Some(4.0))
        })
        // ASPIRIN
        .with_mechanism(mechanism(1, COX_INHIBITOR, Some("INHIBITOR"), Some(("Cyclooxygenase-1", HUMAN))))
        .with_mechanism(mechanism(1, COX_INHIBITOR, Some("INHIBITOR"), Some(("Cyclooxygenase-2", HUMAN))))
        .with_mechanism(mechanism(1, PLATELET_INHIBITOR, Some("INHIBITOR"), None))
        // IBUPROFEN: one mechanism, two targets
        .with_mechanism(mechanism(3, COX_INHIBITOR, Some("INHIBITOR"), Some(("Cyclooxygenase-2", HUMAN))))
        .with_mechanism(mechanism(3, COX_INHIBITOR, Some("INHIBITOR"), Some(("Cyclooxygenase-1", HUMAN))))
        // NAPROXEN: duplicated row
        .with_mechanism(mechanism(4, COX_INHIBITOR, Some("INHIBITOR"), Some(("Cyclooxygenase-1", HUMAN))))
        .with_mechanism(mechanism(4, COX_INHIBITOR, Some("INHIBITOR"), Some(("Cyclooxygenase-1", HUMAN))))
        // CLOPIDOGREL
        .with_mechanism(mechanism(5, PLATELET_INHIBITOR, Some("ANTAGONIST"), Some(("P2Y purinoceptor 12", HUMAN))))
        // CELECOXIB
        .with_mechanism(mechanism(6, COX2_INHIBITOR, Some("INHIBITOR"), Some(("Cyclooxygenase-2", HUMAN))))
        // COX PROBE 17: unknown action type, unresolved target
        .with_mechanism(mechanism(7, COX_INHIBITOR, None, None))
        // METFORMIN
        .with_mechanism(mechanism(8, AMPK_ACTIVATOR, Some("ACTIVATOR"), None))
}
