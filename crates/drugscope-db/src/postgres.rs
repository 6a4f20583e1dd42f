//! PostgreSQL implementation of [`DrugBackend`] over a deadpool-managed pool.
//!
//! The pool is created lazily: no connection is attempted until the first
//! checkout, so a dead database never stops the process from starting.
//! Every checkout is an RAII `Object` that returns to the pool when dropped,
//! including when a query fails or the caller's timeout abandons the future.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{
    Config as PoolConfigBuilder, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime,
    Timeouts,
};
use drugscope_common::DrugIdentity;
use drugscope_config::{DatabaseConfig, ExhaustionPolicy, PoolSettings, QueryConfig};
use tokio_postgres::types::FromSql;
use tokio_postgres::{NoTls, Row};
use tracing::{debug, instrument};

use crate::backend::DrugBackend;
use crate::error::{DbError, Result};
use crate::rows::{
    CandidateFilter, CandidateQuery, CandidateRow, DetailRow, InteractionLookup, InteractionRow,
    PropertyLookup, PropertyRow,
};
use crate::schema::{self, POPULAR_MIN_PHASE};

// ── SQL ────────────────────────────────────────────────────────────────────

/// Identity key of a stored name: trimmed of any whitespace, inner runs
/// collapsed to one space, lower-cased.
macro_rules! name_key {
    () => {
        r"LOWER(regexp_replace(regexp_replace(md.pref_name, '^\s+|\s+$', '', 'g'), '\s+', ' ', 'g'))"
    };
}

/// `max_phase` with the negative "unknown" sentinel folded into NULL.
macro_rules! known_phase {
    () => {
        "(CASE WHEN md.max_phase < 0 THEN NULL ELSE md.max_phase END)"
    };
}

const PING_SQL: &str = "SELECT 1";

const POPULAR_SQL: &str = concat!(
    r#"
    SELECT md.pref_name AS drug_name,
           MAX("#, known_phase!(), r#")::float8 AS max_phase
    FROM molecule_dictionary md
    WHERE md.pref_name IS NOT NULL
      AND md.max_phase::float8 >= $1::float8
      AND ($2::bool = FALSE OR md.therapeutic_flag = 1)
    GROUP BY md.pref_name
    ORDER BY max_phase DESC NULLS LAST, md.pref_name COLLATE "C"
    LIMIT $3::int8
"#
);

const SEARCH_SQL: &str = concat!(
    r#"
    SELECT md.pref_name AS drug_name,
           MAX("#, known_phase!(), r#")::float8 AS max_phase
    FROM molecule_dictionary md
    WHERE md.pref_name IS NOT NULL
      AND md.pref_name ILIKE $1::text ESCAPE '\'
      AND ($2::bool = FALSE OR md.therapeutic_flag = 1)
    GROUP BY md.pref_name
    ORDER BY max_phase DESC NULLS LAST, md.pref_name COLLATE "C"
    LIMIT $3::int8
"#
);

// Duplicated names resolve to the most advanced molecule, then the lowest molregno.
const DETAIL_SQL: &str = concat!(
    r#"
    SELECT md.molregno::int8            AS molregno,
           md.pref_name,
           md.max_phase::float8         AS max_phase,
           md.therapeutic_flag::int4    AS therapeutic_flag,
           md.molecule_type::text       AS molecule_type,
           md.first_approval::int4      AS first_approval,
           md.oral::int4                AS oral,
           md.parenteral::int4          AS parenteral,
           md.topical::int4             AS topical,
           md.black_box_warning::int4   AS black_box_warning,
           md.natural_product::int4     AS natural_product,
           md.first_in_class::int4      AS first_in_class,
           md.chirality::int4           AS chirality
    FROM molecule_dictionary md
    WHERE md.pref_name IS NOT NULL
      AND "#, name_key!(), r#" = $1::text
    ORDER BY "#, known_phase!(), r#" DESC NULLS LAST, md.molregno
    LIMIT 1
"#
);

const RESOLVE_SQL: &str = concat!(
    r#"
    SELECT md.molregno::int8 AS molregno,
           md.pref_name
    FROM molecule_dictionary md
    WHERE md.pref_name IS NOT NULL
      AND "#, name_key!(), r#" = $1::text
    ORDER BY "#, known_phase!(), r#" DESC NULLS LAST, md.molregno
    LIMIT 1
"#
);

const PROPERTIES_SQL: &str = r#"
    SELECT cp.full_mwt::float8        AS full_mwt,
           cp.mw_freebase::float8     AS mw_freebase,
           cp.alogp::float8           AS alogp,
           cp.psa::float8             AS psa,
           cp.hba::int4               AS hba,
           cp.hbd::int4               AS hbd,
           cp.aromatic_rings::int4    AS aromatic_rings,
           cp.qed_weighted::float8    AS qed_weighted
    FROM compound_properties cp
    WHERE cp.molregno = $1::int8
    LIMIT 1
"#;

// Partners are the other molecules sharing at least one mechanism of action,
// excluding any that carry the queried drug's own name.
const INTERACTIONS_SQL: &str = concat!(
    r#"
    WITH selected_mechanisms AS (
        SELECT DISTINCT dm.mechanism_of_action
        FROM drug_mechanism dm
        WHERE dm.molregno = $1::int8
          AND dm.mechanism_of_action IS NOT NULL
    )
    SELECT md.pref_name            AS interacting_drug,
           dm.mechanism_of_action,
           dm.action_type::text    AS action_type,
           td.pref_name            AS target_name,
           td.organism             AS target_organism
    FROM drug_mechanism dm
    JOIN selected_mechanisms sm ON sm.mechanism_of_action = dm.mechanism_of_action
    JOIN molecule_dictionary md ON md.molregno = dm.molregno
    LEFT JOIN target_dictionary td ON td.tid = dm.tid
    WHERE dm.molregno <> $1::int8
      AND md.pref_name IS NOT NULL
      AND "#, name_key!(), r#" <> $3::text
    ORDER BY md.pref_name COLLATE "C",
             dm.mechanism_of_action COLLATE "C",
             td.pref_name COLLATE "C" NULLS LAST
    LIMIT $2::int8
"#
);

const SCHEMA_SQL: &str = r#"
    SELECT table_name::text  AS table_name,
           column_name::text AS column_name
    FROM information_schema.columns
    WHERE table_schema = ANY(current_schemas(false))
      AND table_name::text = ANY($1::text[])
"#;

// ── Backend ────────────────────────────────────────────────────────────────

/// PostgreSQL-backed drug store.
#[derive(Clone)]
pub struct PgBackend {
    pool: Pool,
}

impl PgBackend {
    /// Build the pool from configuration. Does not connect.
    pub fn connect(
        database: &DatabaseConfig,
        pool: &PoolSettings,
        query: &QueryConfig,
    ) -> Result<Self> {
        let mut cfg = PoolConfigBuilder::new();
        cfg.host = Some(database.host.clone());
        cfg.port = Some(database.port);
        cfg.dbname = Some(database.name.clone());
        cfg.user = Some(database.user.clone());
        cfg.password = Some(database.password().to_string());
        cfg.application_name = Some("drugscope".to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let wait = checkout_wait(pool.on_exhausted, query.timeout());
        let mut pool_cfg = PoolConfig::new(pool.max_size);
        pool_cfg.timeouts = Timeouts {
            wait: Some(wait),
            create: Some(query.probe_timeout()),
            recycle: Some(query.probe_timeout()),
        };
        cfg.pool = Some(pool_cfg);

        let max_size = pool.max_size;
        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
        debug!(url = %database.redacted_url(), max_size, "created connection pool");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

#[async_trait]
impl DrugBackend for PgBackend {
    async fn ping(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.query_one(PING_SQL, &[]).await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn candidates(&self, query: &CandidateQuery) -> Result<Vec<CandidateRow>> {
        let client = self.pool.get().await?;
        let limit = query.limit as i64;

        let rows = match &query.filter {
            CandidateFilter::Popular => {
                client
                    .query(POPULAR_SQL, &[&POPULAR_MIN_PHASE, &query.therapeutic_only, &limit])
                    .await?
            }
            CandidateFilter::Containing(fragment) => {
                let pattern = like_pattern(fragment);
                client
                    .query(SEARCH_SQL, &[&pattern, &query.therapeutic_only, &limit])
                    .await?
            }
        };

        debug!(rows = rows.len(), "candidate rows fetched");
        rows.iter().map(candidate_from_row).collect()
    }

    #[instrument(skip(self), level = "debug")]
    async fn drug_detail(&self, identity: &DrugIdentity) -> Result<Option<DetailRow>> {
        let client = self.pool.get().await?;
        let row = client.query_opt(DETAIL_SQL, &[&identity.as_str()]).await?;
        row.as_ref().map(detail_from_row).transpose()
    }

    #[instrument(skip(self), level = "debug")]
    async fn drug_properties(&self, identity: &DrugIdentity) -> Result<Option<PropertyLookup>> {
        let client = self.pool.get().await?;

        let Some(molecule) = client.query_opt(RESOLVE_SQL, &[&identity.as_str()]).await? else {
            return Ok(None);
        };
        let molregno: i64 = column(&molecule, schema::TABLE_MOLECULE_DICTIONARY, "molregno")?;
        let name: String = column(&molecule, schema::TABLE_MOLECULE_DICTIONARY, "pref_name")?;

        let properties = client
            .query_opt(PROPERTIES_SQL, &[&molregno])
            .await?
            .as_ref()
            .map(properties_from_row)
            .transpose()?;

        Ok(Some(PropertyLookup { name, properties }))
    }

    #[instrument(skip(self), level = "debug")]
    async fn drug_interactions(
        &self,
        identity: &DrugIdentity,
        limit: usize,
    ) -> Result<Option<InteractionLookup>> {
        let client = self.pool.get().await?;

        let Some(molecule) = client.query_opt(RESOLVE_SQL, &[&identity.as_str()]).await? else {
            return Ok(None);
        };
        let molregno: i64 = column(&molecule, schema::TABLE_MOLECULE_DICTIONARY, "molregno")?;
        let name: String = column(&molecule, schema::TABLE_MOLECULE_DICTIONARY, "pref_name")?;

        let rows = client
            .query(INTERACTIONS_SQL, &[&molregno, &(limit as i64), &identity.as_str()])
            .await?;
        debug!(molregno, rows = rows.len(), "interaction rows fetched");

        let rows = rows
            .iter()
            .map(interaction_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(InteractionLookup { name, rows }))
    }

    async fn schema_columns(&self) -> Result<Vec<(String, String)>> {
        let client = self.pool.get().await?;
        let tables: Vec<&str> = schema::EXPECTED_COLUMNS.iter().map(|(t, _)| *t).collect();
        let rows = client.query(SCHEMA_SQL, &[&tables]).await?;

        rows.iter()
            .map(|row| {
                Ok((
                    column(row, "information_schema.columns", "table_name")?,
                    column(row, "information_schema.columns", "column_name")?,
                ))
            })
            .collect()
    }
}

/// How long a checkout may wait for a free connection. Under `Block` the wait
/// ends strictly before the manager's call timeout, so exhaustion surfaces as
/// `PoolExhausted` rather than as a timed-out call.
pub fn checkout_wait(policy: ExhaustionPolicy, query_timeout: Duration) -> Duration {
    match policy {
        ExhaustionPolicy::Block    => query_timeout.mul_f64(0.75),
        ExhaustionPolicy::FailFast => Duration::ZERO,
    }
}

// ── Row decoding ───────────────────────────────────────────────────────────

/// Decode one column; a missing or mistyped column is a schema mismatch.
fn column<'a, T: FromSql<'a>>(row: &'a Row, relation: &str, name: &str) -> Result<T> {
    row.try_get(name)
        .map_err(|e| DbError::schema(format!("{relation}.{name}"), e.to_string()))
}

fn candidate_from_row(row: &Row) -> Result<CandidateRow> {
    const REL: &str = schema::TABLE_MOLECULE_DICTIONARY;
    Ok(CandidateRow {
        name: column(row, REL, "drug_name")?,
        max_phase: column(row, REL, "max_phase")?,
    })
}

fn detail_from_row(row: &Row) -> Result<DetailRow> {
    const REL: &str = schema::TABLE_MOLECULE_DICTIONARY;
    Ok(DetailRow {
        molregno: column(row, REL, "molregno")?,
        pref_name: column(row, REL, "pref_name")?,
        max_phase: column(row, REL, "max_phase")?,
        therapeutic_flag: column(row, REL, "therapeutic_flag")?,
        molecule_type: column(row, REL, "molecule_type")?,
        first_approval: column(row, REL, "first_approval")?,
        oral: column(row, REL, "oral")?,
        parenteral: column(row, REL, "parenteral")?,
        topical: column(row, REL, "topical")?,
        black_box_warning: column(row, REL, "black_box_warning")?,
        natural_product: column(row, REL, "natural_product")?,
        first_in_class: column(row, REL, "first_in_class")?,
        chirality: column(row, REL, "chirality")?,
    })
}

fn properties_from_row(row: &Row) -> Result<PropertyRow> {
    const REL: &str = schema::TABLE_COMPOUND_PROPERTIES;
    Ok(PropertyRow {
        full_mwt: column(row, REL, "full_mwt")?,
        mw_freebase: column(row, REL, "mw_freebase")?,
        alogp: column(row, REL, "alogp")?,
        psa: column(row, REL, "psa")?,
        hba: column(row, REL, "hba")?,
        hbd: column(row, REL, "hbd")?,
        aromatic_rings: column(row, REL, "aromatic_rings")?,
        qed_weighted: column(row, REL, "qed_weighted")?,
    })
}

fn interaction_from_row(row: &Row) -> Result<InteractionRow> {
    const REL: &str = schema::TABLE_DRUG_MECHANISM;
    Ok(InteractionRow {
        interacting_drug: column(row, REL, "interacting_drug")?,
        mechanism_of_action: column(row, REL, "mechanism_of_action")?,
        action_type: column(row, REL, "action_type")?,
        target_name: column(row, schema::TABLE_TARGET_DICTIONARY, "target_name")?,
        target_organism: column(row, schema::TABLE_TARGET_DICTIONARY, "target_organism")?,
    })
}

/// Wrap a case-folded fragment for ILIKE, escaping the LIKE metacharacters so
/// the match is plain substring containment.
pub fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
