//! Postgres-backed [`CoordinateSource`]
//!
//! `sqlx` is async; the export pipeline is a plain sequential loop, so the
//! source owns a current-thread runtime and blocks on each query.

use super::CoordinateSource;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::scanner::TimestampRange;
use crate::types::Coordinate;
use crate::Result;
use chrono::NaiveDateTime;
use log::info;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::runtime::{Builder, Runtime};

pub const SURVEY_ID_QUERY: &str = "SELECT id::BIGINT FROM surveys WHERE name = $1";

pub const FIRST_TIMESTAMP_QUERY: &str = r#"
    SELECT MIN(timestamp)::TIMESTAMP
    FROM mobile_coordinates
    WHERE survey_id = $1
      AND timestamp IS NOT NULL
      AND ($2::TIMESTAMP IS NULL OR timestamp > $2::TIMESTAMP)
"#;

pub const LAST_TIMESTAMP_QUERY: &str = r#"
    SELECT MAX(timestamp)::TIMESTAMP
    FROM mobile_coordinates
    WHERE survey_id = $1
      AND timestamp IS NOT NULL
"#;

pub const BATCH_QUERY: &str = r#"
    SELECT id::BIGINT AS id,
           survey_id::BIGINT AS survey_id,
           mobile_id::BIGINT AS mobile_id,
           latitude::DOUBLE PRECISION AS latitude,
           longitude::DOUBLE PRECISION AS longitude,
           altitude::DOUBLE PRECISION AS altitude,
           speed::DOUBLE PRECISION AS speed,
           direction::DOUBLE PRECISION AS direction,
           h_accuracy::DOUBLE PRECISION AS h_accuracy,
           v_accuracy::DOUBLE PRECISION AS v_accuracy,
           acceleration_x::DOUBLE PRECISION AS acceleration_x,
           acceleration_y::DOUBLE PRECISION AS acceleration_y,
           acceleration_z::DOUBLE PRECISION AS acceleration_z,
           mode_detected::BIGINT AS mode_detected,
           point_type::BIGINT AS point_type,
           timestamp::TIMESTAMP AS timestamp
    FROM mobile_coordinates
    WHERE survey_id = $1
      AND timestamp > $2
    ORDER BY timestamp ASC, id ASC
    LIMIT $3
"#;

pub const IDENTIFIERS_QUERY: &str =
    "SELECT id::BIGINT, uuid::TEXT FROM mobile_users WHERE survey_id = $1";

/// Survey tables in a Postgres database
pub struct PgCoordinateSource {
    runtime: Runtime,
    pool: PgPool,
}

impl PgCoordinateSource {
    /// Connect using `config.database_url`, or the `PG*` variables when unset.
    ///
    /// Any failure here means the data source is unreachable and is reported
    /// as a configuration error.
    pub fn connect(config: &ExportConfig) -> Result<Self> {
        info!("Connecting to database...");
        let options = match &config.database_url {
            Some(url) => PgConnectOptions::from_str(url)
                .map_err(|e| ExportError::Config(format!("invalid database URL: {e}")))?,
            None => PgConnectOptions::new(),
        };

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ExportError::Config(format!("could not start runtime: {e}")))?;

        let pool = runtime
            .block_on(
                PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(options),
            )
            .map_err(|e| ExportError::Config(format!("could not connect to database: {e}")))?;

        Ok(Self { runtime, pool })
    }
}

impl CoordinateSource for PgCoordinateSource {
    fn resolve_survey_id(&self, name: &str) -> Result<i64> {
        let survey_id: Option<i64> = self
            .runtime
            .block_on(
                sqlx::query_scalar(SURVEY_ID_QUERY)
                    .bind(name)
                    .fetch_optional(&self.pool),
            )
            .map_err(|e| ExportError::Config(format!("survey lookup for {name} failed: {e}")))?;

        survey_id.ok_or_else(|| ExportError::SurveyNotFound(name.to_string()))
    }

    fn timestamp_range(
        &self,
        survey_id: i64,
        cutoff: Option<NaiveDateTime>,
    ) -> Result<Option<TimestampRange>> {
        let first: Option<NaiveDateTime> = self
            .runtime
            .block_on(
                sqlx::query_scalar(FIRST_TIMESTAMP_QUERY)
                    .bind(survey_id)
                    .bind(cutoff)
                    .fetch_one(&self.pool),
            )
            .map_err(|e| ExportError::Scan(format!("first timestamp query failed: {e}")))?;

        let last: Option<NaiveDateTime> = self
            .runtime
            .block_on(
                sqlx::query_scalar(LAST_TIMESTAMP_QUERY)
                    .bind(survey_id)
                    .fetch_one(&self.pool),
            )
            .map_err(|e| ExportError::Scan(format!("last timestamp query failed: {e}")))?;

        Ok(match (first, last) {
            (Some(first), Some(last)) => Some(TimestampRange { first, last }),
            _ => None,
        })
    }

    fn fetch_batch(
        &self,
        survey_id: i64,
        after: NaiveDateTime,
        limit: usize,
    ) -> Result<Vec<Coordinate>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.runtime
            .block_on(
                sqlx::query_as::<_, Coordinate>(BATCH_QUERY)
                    .bind(survey_id)
                    .bind(after)
                    .bind(limit)
                    .fetch_all(&self.pool),
            )
            .map_err(|e| ExportError::Scan(format!("batch query after {after} failed: {e}")))
    }

    fn resolve_identifiers(&self, survey_id: i64) -> Result<HashMap<i64, String>> {
        let rows: Vec<(i64, String)> = self
            .runtime
            .block_on(
                sqlx::query_as(IDENTIFIERS_QUERY)
                    .bind(survey_id)
                    .fetch_all(&self.pool),
            )
            .map_err(|e| ExportError::Resolution(format!("uuid lookup failed: {e}")))?;

        Ok(rows.into_iter().collect())
    }
}

impl Drop for PgCoordinateSource {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}
