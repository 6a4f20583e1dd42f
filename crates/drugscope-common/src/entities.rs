//! Read-only projections over the ChEMBL-style relational store.
//! `None` on a field always means "unknown", never zero or false.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Development phase
// ---------------------------------------------------------------------------

/// Maximum development phase reached (0.5 = early phase 1, 4 = approved).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(f64);

impl Phase {
    /// ChEMBL stores -1 for "unknown"; NaN and negatives map to `None`.
    pub fn from_raw(raw: f64) -> Option<Self> {
        if raw.is_finite() && raw >= 0.0 {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_approved(&self) -> bool {
        self.0 >= 4.0
    }

    /// Descending by phase with unknown phases last.
    pub fn cmp_desc(a: Option<Phase>, b: Option<Phase>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => b.0.total_cmp(&a.0),
            (Some(_), None)    => Ordering::Less,
            (None, Some(_))    => Ordering::Greater,
            (None, None)       => Ordering::Equal,
        }
    }
}

// ---------------------------------------------------------------------------
// Search candidate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugCandidate {
    pub name: String,
    pub phase: Option<Phase>,
}

impl DrugCandidate {
    /// Ranking order: phase descending (unknown last), then name ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        Phase::cmp_desc(self.phase, other.phase).then_with(|| self.name.cmp(&other.name))
    }
}

// ---------------------------------------------------------------------------
// Detail record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdministrationRoute {
    Oral,
    Parenteral,
    Topical,
    /// Approved through a route outside the three tracked flags (e.g. inhaled).
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chirality {
    Racemic,
    SingleStereoisomer,
    Achiral,
}

impl Chirality {
    /// Decode the stored code: 0 racemic, 1 single stereoisomer, 2 achiral, -1 unknown.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Chirality::Racemic),
            1 => Some(Chirality::SingleStereoisomer),
            2 => Some(Chirality::Achiral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugDetail {
    pub name: String,
    pub max_phase: Option<Phase>,
    pub therapeutic_flag: Option<bool>,
    pub molecule_type: Option<String>,
    /// Year of first approval; the store only records the year.
    pub first_approval: Option<i32>,
    /// `None` when none of the route flags are known.
    pub administration_routes: Option<BTreeSet<AdministrationRoute>>,
    pub black_box_warning: Option<bool>,
    pub natural_product: Option<bool>,
    pub first_in_class: Option<bool>,
    pub chirality: Option<Chirality>,
}

// ---------------------------------------------------------------------------
// Computed properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugProperties {
    pub name: String,
    /// Full molecular weight (Da).
    pub molecular_weight: Option<f64>,
    pub molecular_weight_freebase: Option<f64>,
    /// ALogP
    pub logp: Option<f64>,
    /// Polar surface area
    pub psa: Option<f64>,
    pub h_bond_donors: Option<u32>,
    pub h_bond_acceptors: Option<u32>,
    pub aromatic_rings: Option<u32>,
    pub drug_likeness: DrugLikeness,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugLikeness {
    /// Weighted quantitative estimate of drug-likeness, 0..1.
    pub qed: Option<f64>,
    pub lipinski: LipinskiProfile,
}

/// Rule-of-five checks. Each is `None` when its input is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LipinskiProfile {
    pub molecular_weight_ok: Option<bool>,
    pub logp_ok: Option<bool>,
    pub h_bond_acceptors_ok: Option<bool>,
    pub h_bond_donors_ok: Option<bool>,
    /// Violations among the known checks.
    pub violations: u8,
    /// At most one violation. `None` if the unknown checks could flip the verdict.
    pub passes: Option<bool>,
}

impl LipinskiProfile {
    pub const MAX_MOLECULAR_WEIGHT: f64 = 500.0;
    pub const MAX_LOGP: f64 = 5.0;
    pub const MAX_H_BOND_ACCEPTORS: u32 = 10;
    pub const MAX_H_BOND_DONORS: u32 = 5;

    pub fn evaluate(
        molecular_weight: Option<f64>,
        logp: Option<f64>,
        h_bond_acceptors: Option<u32>,
        h_bond_donors: Option<u32>,
    ) -> Self {
        let checks = [
            molecular_weight.map(|mw| mw <= Self::MAX_MOLECULAR_WEIGHT),
            logp.map(|lp| lp <= Self::MAX_LOGP),
            h_bond_acceptors.map(|n| n <= Self::MAX_H_BOND_ACCEPTORS),
            h_bond_donors.map(|n| n <= Self::MAX_H_BOND_DONORS),
        ];

        let violations = checks.iter().filter(|c| **c == Some(false)).count() as u8;
        let unknown = checks.iter().filter(|c| c.is_none()).count() as u8;

        let passes = if violations > 1 {
            Some(false)
        } else if violations + unknown <= 1 {
            Some(true)
        } else {
            None
        };

        Self {
            molecular_weight_ok: checks[0],
            logp_ok: checks[1],
            h_bond_acceptors_ok: checks[2],
            h_bond_donors_ok: checks[3],
            violations,
            passes,
        }
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// Mechanism action type. Unrecognized values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Inhibitor,
    Antagonist,
    Agonist,
    PartialAgonist,
    InverseAgonist,
    Blocker,
    Modulator,
    PositiveAllostericModulator,
    NegativeAllostericModulator,
    Activator,
    Opener,
    ReleasingAgent,
    Substrate,
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Inhibitor                   => "INHIBITOR",
            ActionType::Antagonist                  => "ANTAGONIST",
            ActionType::Agonist                     => "AGONIST",
            ActionType::PartialAgonist              => "PARTIAL AGONIST",
            ActionType::InverseAgonist              => "INVERSE AGONIST",
            ActionType::Blocker                     => "BLOCKER",
            ActionType::Modulator                   => "MODULATOR",
            ActionType::PositiveAllostericModulator => "POSITIVE ALLOSTERIC MODULATOR",
            ActionType::NegativeAllostericModulator => "NEGATIVE ALLOSTERIC MODULATOR",
            ActionType::Activator                   => "ACTIVATOR",
            ActionType::Opener                      => "OPENER",
            ActionType::ReleasingAgent              => "RELEASING AGENT",
            ActionType::Substrate                   => "SUBSTRATE",
            ActionType::Other(s)                    => s.as_str(),
        }
    }

    /// Parse case-insensitively. Blank input is not an action type.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let parsed = match trimmed.to_uppercase().as_str() {
            "INHIBITOR"                     => ActionType::Inhibitor,
            "ANTAGONIST"                    => ActionType::Antagonist,
            "AGONIST"                       => ActionType::Agonist,
            "PARTIAL AGONIST"               => ActionType::PartialAgonist,
            "INVERSE AGONIST"               => ActionType::InverseAgonist,
            "BLOCKER"                       => ActionType::Blocker,
            "MODULATOR"                     => ActionType::Modulator,
            "POSITIVE ALLOSTERIC MODULATOR" => ActionType::PositiveAllostericModulator,
            "NEGATIVE ALLOSTERIC MODULATOR" => ActionType::NegativeAllostericModulator,
            "ACTIVATOR"                     => ActionType::Activator,
            "OPENER"                        => ActionType::Opener,
            "RELEASING AGENT"               => ActionType::ReleasingAgent,
            "SUBSTRATE"                     => ActionType::Substrate,
            _                               => ActionType::Other(trimmed.to_string()),
        };
        Some(parsed)
    }
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        ActionType::parse(&s).unwrap_or(ActionType::Other(s))
    }
}

impl From<ActionType> for String {
    fn from(a: ActionType) -> Self {
        a.as_str().to_string()
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The protein (or other) target the shared mechanism acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MolecularTarget {
    pub name: Option<String>,
    pub organism: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// The queried drug, as named in the store.
    pub source_drug: String,
    /// Interaction partner: another drug sharing a mechanism with the source.
    pub target: String,
    pub mechanism_of_action: String,
    pub relationship_type: Option<ActionType>,
    pub molecular_target: Option<MolecularTarget>,
}
