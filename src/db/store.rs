use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

use crate::detection::outcome;
use crate::detection::record::{BuzzerbeaterRecord, ShotInfo};
use crate::report::RecordFilter;
use crate::timeline::models::{EventKind, Period, PixelPos, Score, TeamRef};

pub struct Store {
    pool: SqlitePool,
}

/// Raw `buzzerbeaters` row. Every column except the key is nullable so
/// rows written by older schemas still load.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BuzzerbeaterRow {
    pub id: Option<i64>,
    pub match_id: i64,
    pub team_id: i64,
    pub team_name: Option<String>,
    pub opponent_id: Option<i64>,
    pub opponent_name: Option<String>,
    pub player_id: i64,
    pub player_name: Option<String>,
    pub period: String,
    pub game_clock: i64,
    pub comment: Option<String>,
    pub match_type: Option<String>,
    pub is_home: Option<i64>,
    pub event_kind: Option<String>,
    pub shot_type: Option<String>,
    pub shot_type_label: Option<String>,
    pub three_point: Option<i64>,
    pub free_throw_type: Option<String>,
    pub shot_x: Option<i64>,
    pub shot_y: Option<i64>,
    pub shot_distance: Option<f64>,
    pub shot_distance_ft: Option<f64>,
    pub score_before_home: Option<i64>,
    pub score_before_away: Option<i64>,
    pub score_after_home: Option<i64>,
    pub score_after_away: Option<i64>,
    pub final_score_home: Option<i64>,
    pub final_score_away: Option<i64>,
    pub season: Option<i64>,
    pub outcome_changed: i64,
    pub updated_at: Option<String>,
}

fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value).with_context(|| format!("Column {column} out of range: {value}"))
}

fn opt_u32(value: Option<i64>, column: &str) -> Result<Option<u32>> {
    value.map(|v| to_u32(v, column)).transpose()
}

fn score_pair(home: Option<i64>, away: Option<i64>, column: &str) -> Result<Option<Score>> {
    match (opt_u32(home, column)?, opt_u32(away, column)?) {
        (Some(home), Some(away)) => Ok(Some(Score::new(home, away))),
        _ => Ok(None),
    }
}

impl TryFrom<BuzzerbeaterRow> for BuzzerbeaterRecord {
    type Error = anyhow::Error;

    fn try_from(row: BuzzerbeaterRow) -> Result<Self> {
        let period = Period::from_str(&row.period)
            .with_context(|| format!("Row {:?} has an invalid period", row.id))?;
        let side_known = row.is_home.is_some();
        let is_home = row.is_home.map_or(true, |h| h == 1);
        let event_kind = EventKind::from_stored(row.event_kind.as_deref());

        let shot = (event_kind == EventKind::Shot).then(|| ShotInfo {
            shot_type: row.shot_type.clone(),
            label: row.shot_type_label.clone(),
            three_point: row.three_point.is_some_and(|t| t != 0),
            position: match (row.shot_x, row.shot_y) {
                (Some(x), Some(y)) => i32::try_from(x)
                    .ok()
                    .zip(i32::try_from(y).ok())
                    .map(|(x, y)| PixelPos { x, y }),
                _ => None,
            },
            distance_px: row.shot_distance,
            distance_ft: row.shot_distance_ft,
        });

        let score_before = score_pair(row.score_before_home, row.score_before_away, "score_before")?;
        let score_after = score_pair(row.score_after_home, row.score_after_away, "score_after")?;

        Ok(Self {
            match_id: to_u32(row.match_id, "match_id")?,
            season: opt_u32(row.season, "season")?,
            match_type: row.match_type,
            team: TeamRef {
                id: to_u32(row.team_id, "team_id")?,
                name: row.team_name.unwrap_or_default(),
            },
            opponent: TeamRef {
                id: opt_u32(row.opponent_id, "opponent_id")?.unwrap_or_default(),
                name: row.opponent_name.unwrap_or_default(),
            },
            is_home,
            player_id: to_u32(row.player_id, "player_id")?,
            player_name: row.player_name.unwrap_or_default(),
            period,
            game_clock: to_u32(row.game_clock, "game_clock")?,
            comment: row.comment.unwrap_or_default(),
            event_kind,
            shot,
            free_throw_type: row.free_throw_type,
            score_before,
            score_after,
            final_score: score_pair(row.final_score_home, row.final_score_away, "final_score")?,
            // Recomputed so rows written before the column existed agree.
            // Without a side there is no perspective to evaluate from.
            outcome_changed: side_known
                && outcome::changed(period, is_home, score_before, score_after),
        })
    }
}

impl Store {
    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn new(database_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{database_path}"))
            .context("Invalid database path")?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        // Every in-memory connection is its own database.
        let max_connections = if database_path == ":memory:" { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        let migration_sql = include_str!("../../migrations/001_init.sql");
        // Execute each statement separately (sqlx doesn't support multiple statements in one call)
        for statement in migration_sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .with_context(|| format!("Failed to execute migration: {trimmed}"))?;
            }
        }
        Ok(())
    }

    /// Insert a record, or update every non-key column if its key exists.
    /// Returns whether a row was written.
    pub async fn upsert_record(&self, record: &BuzzerbeaterRecord) -> Result<bool> {
        let shot = record.shot.as_ref();
        let position = shot.and_then(|s| s.position);

        let result = sqlx::query(
            "INSERT INTO buzzerbeaters (
                match_id, team_id, team_name, opponent_id, opponent_name,
                player_id, player_name, period, game_clock, comment, match_type, is_home,
                event_kind, shot_type, shot_type_label, three_point, free_throw_type,
                shot_x, shot_y, shot_distance, shot_distance_ft,
                score_before_home, score_before_away, score_after_home, score_after_away,
                final_score_home, final_score_away, season, outcome_changed, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(match_id, team_id, player_id, period, game_clock) DO UPDATE SET
                team_name = excluded.team_name,
                opponent_id = excluded.opponent_id,
                opponent_name = excluded.opponent_name,
                player_name = excluded.player_name,
                comment = excluded.comment,
                match_type = excluded.match_type,
                is_home = excluded.is_home,
                event_kind = excluded.event_kind,
                shot_type = excluded.shot_type,
                shot_type_label = excluded.shot_type_label,
                three_point = excluded.three_point,
                free_throw_type = excluded.free_throw_type,
                shot_x = excluded.shot_x,
                shot_y = excluded.shot_y,
                shot_distance = excluded.shot_distance,
                shot_distance_ft = excluded.shot_distance_ft,
                score_before_home = excluded.score_before_home,
                score_before_away = excluded.score_before_away,
                score_after_home = excluded.score_after_home,
                score_after_away = excluded.score_after_away,
                final_score_home = excluded.final_score_home,
                final_score_away = excluded.final_score_away,
                season = excluded.season,
                outcome_changed = excluded.outcome_changed,
                updated_at = excluded.updated_at",
        )
        .bind(i64::from(record.match_id))
        .bind(i64::from(record.team.id))
        .bind(&record.team.name)
        .bind(i64::from(record.opponent.id))
        .bind(&record.opponent.name)
        .bind(i64::from(record.player_id))
        .bind(&record.player_name)
        .bind(record.period.tag())
        .bind(i64::from(record.game_clock))
        .bind(&record.comment)
        .bind(&record.match_type)
        .bind(i64::from(record.is_home))
        .bind(record.event_kind.as_str())
        .bind(shot.and_then(|s| s.shot_type.as_deref()))
        .bind(shot.and_then(|s| s.label.as_deref()))
        .bind(shot.map(|s| i64::from(s.three_point)))
        .bind(record.free_throw_type.as_deref())
        .bind(position.map(|p| i64::from(p.x)))
        .bind(position.map(|p| i64::from(p.y)))
        .bind(shot.and_then(|s| s.distance_px))
        .bind(shot.and_then(|s| s.distance_ft))
        .bind(record.score_before.map(|s| i64::from(s.home)))
        .bind(record.score_before.map(|s| i64::from(s.away)))
        .bind(record.score_after.map(|s| i64::from(s.home)))
        .bind(record.score_after.map(|s| i64::from(s.away)))
        .bind(record.final_score.map(|s| i64::from(s.home)))
        .bind(record.final_score.map(|s| i64::from(s.away)))
        .bind(record.season.map(i64::from))
        .bind(i64::from(record.outcome_changed))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert buzzerbeater")?;

        Ok(result.rows_affected() > 0)
    }

    /// Upsert all records of one match; returns the number of rows written.
    pub async fn upsert_records(&self, records: &[BuzzerbeaterRecord]) -> Result<u64> {
        let mut written = 0;
        for record in records {
            if self.upsert_record(record).await? {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Fetch records matching the filter's id constraints, ordered by match
    /// then clock. Rows that fail to convert are skipped with a warning.
    pub async fn fetch_records(&self, filter: &RecordFilter) -> Result<Vec<BuzzerbeaterRecord>> {
        let mut clauses = Vec::new();
        let mut params: Vec<i64> = Vec::new();
        for (column, value) in [
            ("team_id", filter.team_id),
            ("opponent_id", filter.opponent_id),
            ("match_id", filter.match_id),
            ("player_id", filter.player_id),
        ] {
            if let Some(v) = value {
                clauses.push(format!("{column} = ?"));
                params.push(i64::from(v));
            }
        }

        let mut sql = "SELECT * FROM buzzerbeaters".to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY match_id, game_clock, id");

        let mut query = sqlx::query_as::<_, BuzzerbeaterRow>(&sql);
        for p in params {
            query = query.bind(p);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch buzzerbeaters")?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match BuzzerbeaterRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(row_id = ?id, error = %e, "Skipping unreadable buzzerbeater row"),
            }
        }
        Ok(filter.apply(records))
    }

    pub async fn count_records(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM buzzerbeaters")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count buzzerbeaters")?;
        Ok(row.0)
    }

    /// Rewrite legacy `Reg` period tags to `Q4`. Legacy rows whose `Q4`
    /// twin already exists are dropped. Returns the number of rows rewritten.
    pub async fn normalize_periods(&self) -> Result<u64> {
        let updated = sqlx::query("UPDATE OR IGNORE buzzerbeaters SET period = 'Q4' WHERE period = 'Reg'")
            .execute(&self.pool)
            .await
            .context("Failed to normalize periods")?
            .rows_affected();

        let dropped = sqlx::query("DELETE FROM buzzerbeaters WHERE period = 'Reg'")
            .execute(&self.pool)
            .await
            .context("Failed to drop duplicate legacy periods")?
            .rows_affected();
        if dropped > 0 {
            tracing::info!(dropped, "Dropped legacy rows duplicating a Q4 record");
        }

        Ok(updated)
    }
}
