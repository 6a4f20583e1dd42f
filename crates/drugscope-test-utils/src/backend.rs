//! In-memory [`DrugBackend`] that follows the PostgreSQL backend's contract:
//! identity normalization, candidate ordering and limits, shared-mechanism
//! interaction partners, and the raw join fan-out the aggregators must dedupe.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use drugscope_common::DrugIdentity;
use drugscope_db::schema::{self, POPULAR_MIN_PHASE};
use drugscope_db::{
    CandidateFilter, CandidateQuery, CandidateRow, DbError, DetailRow, DrugBackend,
    InteractionLookup, InteractionRow, PropertyLookup, PropertyRow,
};

/// Backend entry points that can carry an injected fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Ping,
    Candidates,
    Detail,
    Properties,
    Interactions,
    SchemaColumns,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Fail as if the connection was refused.
    Unavailable,
    /// Fail as if `object` did not exist.
    SchemaMismatch(String),
    /// Never answer.
    Hang,
    /// Answer normally after a delay.
    Delay(Duration),
}

/// One `drug_mechanism` row joined with its (optional) target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MechanismFixture {
    pub molregno: i64,
    pub mechanism_of_action: Option<String>,
    pub action_type: Option<String>,
    pub target_name: Option<String>,
    pub target_organism: Option<String>,
}

/// A therapeutic molecule with every optional column NULL.
pub fn molecule(molregno: i64, name: &str, max_phase: Option<f64>) -> DetailRow {
    DetailRow {
        molregno,
        pref_name: name.to_string(),
        max_phase,
        therapeutic_flag: Some(1),
        ..Default::default()
    }
}

pub fn mechanism(
    molregno: i64,
    mechanism_of_action: &str,
    action_type: Option<&str>,
    target: Option<(&str, &str)>,
) -> MechanismFixture {
    MechanismFixture {
        molregno,
        mechanism_of_action: Some(mechanism_of_action.to_string()),
        action_type: action_type.map(str::to_string),
        target_name: target.map(|(name, _)| name.to_string()),
        target_organism: target.map(|(_, organism)| organism.to_string()),
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    molecules: Vec<DetailRow>,
    properties: HashMap<i64, PropertyRow>,
    mechanisms: Vec<MechanismFixture>,
    missing_columns: Vec<(String, String)>,
    faults: Mutex<HashMap<Operation, Fault>>,
    calls: Mutex<HashMap<Operation, usize>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_molecule(mut self, row: DetailRow) -> Self {
        self.molecules.push(row);
        self
    }

    pub fn with_properties(mut self, molregno: i64, row: PropertyRow) -> Self {
        self.properties.insert(molregno, row);
        self
    }

    pub fn with_mechanism(mut self, row: MechanismFixture) -> Self {
        self.mechanisms.push(row);
        self
    }

    /// Hide a column from the schema report.
    pub fn without_column(mut self, table: &str, column: &str) -> Self {
        self.missing_columns.push((table.to_string(), column.to_string()));
        self
    }

    /// Inject `fault` into every later call of `op`.
    pub fn fail(&self, op: Operation, fault: Fault) {
        lock(&self.faults).insert(op, fault);
    }

    pub fn heal(&self, op: Operation) {
        lock(&self.faults).remove(&op);
    }

    pub fn heal_all(&self) {
        lock(&self.faults).clear();
    }

    /// Number of times `op` was invoked, faulted calls included.
    pub fn calls(&self, op: Operation) -> usize {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    async fn enter(&self, op: Operation) -> drugscope_db::Result<()> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;
        let fault = lock(&self.faults).get(&op).cloned();

        match fault {
            None => Ok(()),
            Some(Fault::Unavailable) => Err(DbError::Unavailable("connection refused (injected)".into())),
            Some(Fault::SchemaMismatch(object)) => Err(DbError::schema(object, "does not exist (injected)")),
            Some(Fault::Hang) => std::future::pending().await,
            Some(Fault::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    /// Highest-phase molecule whose name normalizes to `identity`, lowest molregno on ties.
    fn resolve(&self, identity: &DrugIdentity) -> Option<&DetailRow> {
        self.molecules
            .iter()
            .filter(|m| identity.matches(&m.pref_name))
            .min_by(|a, b| phase_desc(a.max_phase, b.max_phase).then(a.molregno.cmp(&b.molregno)))
    }

    fn name_of(&self, molregno: i64) -> Option<&str> {
        self.molecules
            .iter()
            .find(|m| m.molregno == molregno)
            .map(|m| m.pref_name.as_str())
    }
}

#[async_trait]
impl DrugBackend for InMemoryBackend {
    async fn ping(&self) -> drugscope_db::Result<()> {
        self.enter(Operation::Ping).await
    }

    async fn candidates(&self, query: &CandidateQuery) -> drugscope_db::Result<Vec<CandidateRow>> {
        self.enter(Operation::Candidates).await?;

        // GROUP BY pref_name with MAX(max_phase), NULLs and negatives ignored.
        let mut grouped: HashMap<&str, Option<f64>> = HashMap::new();
        for m in &self.molecules {
            if query.therapeutic_only && m.therapeutic_flag != Some(1) {
                continue;
            }
            let keep = match &query.filter {
                CandidateFilter::Popular => m.max_phase.is_some_and(|p| p >= POPULAR_MIN_PHASE),
                CandidateFilter::Containing(fragment) => {
                    m.pref_name.to_lowercase().contains(fragment.as_str())
                }
            };
            if !keep {
                continue;
            }
            let entry = grouped.entry(m.pref_name.as_str()).or_insert(None);
            *entry = match (*entry, known_phase(m.max_phase)) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
        }

        let mut rows: Vec<CandidateRow> = grouped
            .into_iter()
            .map(|(name, max_phase)| CandidateRow { name: name.to_string(), max_phase })
            .collect();
        rows.sort_by(|a, b| {
            phase_desc(a.max_phase, b.max_phase).then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
        });
        rows.truncate(query.limit);
        Ok(rows)
    }

    async fn drug_detail(&self, identity: &DrugIdentity) -> drugscope_db::Result<Option<DetailRow>> {
        self.enter(Operation::Detail).await?;
        Ok(self.resolve(identity).cloned())
    }

    async fn drug_properties(
        &self,
        identity: &DrugIdentity,
    ) -> drugscope_db::Result<Option<PropertyLookup>> {
        self.enter(Operation::Properties).await?;
        Ok(self.resolve(identity).map(|m| PropertyLookup {
            name: m.pref_name.clone(),
            properties: self.properties.get(&m.molregno).cloned(),
        }))
    }

    async fn drug_interactions(
        &self,
        identity: &DrugIdentity,
        limit: usize,
    ) -> drugscope_db::Result<Option<InteractionLookup>> {
        self.enter(Operation::Interactions).await?;

        let Some(source) = self.resolve(identity) else {
            return Ok(None);
        };

        let shared: BTreeSet<&str> = self
            .mechanisms
            .iter()
            .filter(|m| m.molregno == source.molregno)
            .filter_map(|m| m.mechanism_of_action.as_deref())
            .collect();

        let mut rows: Vec<InteractionRow> = self
            .mechanisms
            .iter()
            .filter(|m| m.molregno != source.molregno)
            .filter_map(|m| {
                let moa = m.mechanism_of_action.as_deref()?;
                if !shared.contains(moa) {
                    return None;
                }
                let partner = self.name_of(m.molregno)?;
                if identity.matches(partner) {
                    return None;
                }
                Some(InteractionRow {
                    interacting_drug: partner.to_string(),
                    mechanism_of_action: moa.to_string(),
                    action_type: m.action_type.clone(),
                    target_name: m.target_name.clone(),
                    target_organism: m.target_organism.clone(),
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            a.interacting_drug
                .as_bytes()
                .cmp(b.interacting_drug.as_bytes())
                .then_with(|| a.mechanism_of_action.as_bytes().cmp(b.mechanism_of_action.as_bytes()))
                .then_with(|| nulls_last(a.target_name.as_deref(), b.target_name.as_deref()))
        });
        rows.truncate(limit);

        Ok(Some(InteractionLookup { name: source.pref_name.clone(), rows }))
    }

    async fn schema_columns(&self) -> drugscope_db::Result<Vec<(String, String)>> {
        self.enter(Operation::SchemaColumns).await?;

        Ok(schema::EXPECTED_COLUMNS
            .iter()
            .flat_map(|(table, columns)| {
                columns.iter().map(move |c| (table.to_string(), c.to_string()))
            })
            .filter(|pair| !self.missing_columns.contains(pair))
            .collect())
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Negative phases are the store's "unknown" sentinel.
fn known_phase(phase: Option<f64>) -> Option<f64> {
    phase.filter(|p| *p >= 0.0)
}

/// `ORDER BY max_phase DESC NULLS LAST`, negatives folded into NULL
fn phase_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (known_phase(a), known_phase(b)) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None)    => Ordering::Less,
        (None, Some(_))    => Ordering::Greater,
        (None, None)       => Ordering::Equal,
    }
}

/// `ORDER BY x COLLATE "C" NULLS LAST`
fn nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.as_bytes().cmp(b.as_bytes()),
        (Some(_), None)    => Ordering::Less,
        (None, Some(_))    => Ordering::Greater,
        (None, None)       => Ordering::Equal,
    }
}
