//! SQLite store: jackpot pool, profiles, sessions, analytics

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pool value seeded on first launch
const DEFAULT_JACKPOT_POOL: f64 = 500.0;
/// Legacy per-spin win probability, kept alongside the pool
const DEFAULT_WIN_PROBABILITY: f64 = 0.1;

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unknown user: {0}")]
    UnknownUser(String),
}

/// A persisted user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub balance: f64,
    pub created_at: String,
    pub total_spins: i64,
    pub total_bets: f64,
    pub total_wins: f64,
    pub biggest_win: f64,
}

/// A persisted play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: i64,
    pub user_id: i64,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub start_balance: f64,
    pub end_balance: Option<f64>,
    pub spins: i64,
    pub bets: f64,
    pub wins: f64,
}

/// One analytics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    pub ts: String,
    pub theoretical_rtp: f64,
    pub realised_rtp: f64,
    pub spins: i64,
    pub total_bet: f64,
    pub total_win: f64,
}

/// Single-connection SQLite store
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at `path` and ensure the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut store = Self {
            conn: Connection::open(path)?,
        };
        store.init()?;
        Ok(store)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let mut store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    fn init(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS game_data (
                id INTEGER PRIMARY KEY,
                jackpot_pool REAL NOT NULL,
                win_probability REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                balance REAL NOT NULL,
                created_at TEXT NOT NULL,
                total_spins INTEGER NOT NULL DEFAULT 0,
                total_bets REAL NOT NULL DEFAULT 0,
                total_wins REAL NOT NULL DEFAULT 0,
                biggest_win REAL NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS sessions (
                session_id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(user_id),
                started_at TEXT NOT NULL,
                ended_at TEXT,
                start_balance REAL NOT NULL,
                end_balance REAL,
                spins INTEGER NOT NULL DEFAULT 0,
                bets REAL NOT NULL DEFAULT 0,
                wins REAL NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS analytics (
                id INTEGER PRIMARY KEY,
                ts TEXT NOT NULL,
                theoretical_rtp REAL NOT NULL,
                realised_rtp REAL NOT NULL,
                spins INTEGER NOT NULL,
                total_bet REAL NOT NULL,
                total_win REAL NOT NULL
            );
            COMMIT;",
        )?;

        // Seed the pool row once.
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM game_data", [], |row| row.get(0))?;
        if count == 0 {
            self.conn.execute(
                "INSERT INTO game_data (jackpot_pool, win_probability) VALUES (?1, ?2)",
                params![DEFAULT_JACKPOT_POOL, DEFAULT_WIN_PROBABILITY],
            )?;
            log::info!("seeded game_data with default jackpot pool");
        }
        Ok(())
    }

    /// Current jackpot pool
    pub fn jackpot_pool(&self) -> Result<f64, StoreError> {
        let pool = self.conn.query_row(
            "SELECT jackpot_pool FROM game_data WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(pool)
    }

    /// Persist the jackpot pool
    pub fn set_jackpot_pool(&self, pool: f64) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE game_data SET jackpot_pool = ?1 WHERE id = 1",
            params![pool],
        )?;
        Ok(())
    }

    /// Create a profile with a starting balance
    pub fn create_user(&self, username: &str, balance: f64) -> Result<UserProfile, StoreError> {
        let created_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO users (username, balance, created_at) VALUES (?1, ?2, ?3)",
            params![username, balance, created_at],
        )?;
        let user_id = self.conn.last_insert_rowid();
        Ok(UserProfile {
            user_id,
            username: username.to_string(),
            balance,
            created_at,
            total_spins: 0,
            total_bets: 0.0,
            total_wins: 0.0,
            biggest_win: 0.0,
        })
    }

    /// Look up a profile by name
    pub fn user_by_name(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let profile = self
            .conn
            .query_row(
                "SELECT user_id, username, balance, created_at,
                        total_spins, total_bets, total_wins, biggest_win
                 FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(UserProfile {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        balance: row.get(2)?,
                        created_at: row.get(3)?,
                        total_spins: row.get(4)?,
                        total_bets: row.get(5)?,
                        total_wins: row.get(6)?,
                        biggest_win: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    /// Look up a profile by name, failing when it does not exist
    pub fn require_user(&self, username: &str) -> Result<UserProfile, StoreError> {
        self.user_by_name(username)?
            .ok_or_else(|| StoreError::UnknownUser(username.to_string()))
    }

    /// Fetch an existing profile or create one with `starting_balance`
    pub fn login_or_create(
        &self,
        username: &str,
        starting_balance: f64,
    ) -> Result<UserProfile, StoreError> {
        match self.user_by_name(username)? {
            Some(profile) => Ok(profile),
            None => {
                log::info!("creating new profile for `{username}`");
                self.create_user(username, starting_balance)
            }
        }
    }

    /// Persist a balance
    pub fn save_balance(&self, user_id: i64, balance: f64) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE users SET balance = ?1 WHERE user_id = ?2",
            params![balance, user_id],
        )?;
        Ok(())
    }

    /// Open a session, returning its id
    pub fn start_session(&self, user_id: i64, start_balance: f64) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO sessions (user_id, started_at, start_balance) VALUES (?1, ?2, ?3)",
            params![user_id, Utc::now().to_rfc3339(), start_balance],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Close a session with its final numbers
    pub fn end_session(
        &self,
        session_id: i64,
        end_balance: f64,
        spins: i64,
        bets: f64,
        wins: f64,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE sessions
             SET ended_at = ?1, end_balance = ?2, spins = ?3, bets = ?4, wins = ?5
             WHERE session_id = ?6",
            params![Utc::now().to_rfc3339(), end_balance, spins, bets, wins, session_id],
        )?;
        Ok(())
    }

    /// Accumulate lifetime stats onto a profile
    pub fn update_user_stats(
        &self,
        user_id: i64,
        spins: i64,
        bets: f64,
        wins: f64,
        biggest_win: f64,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE users
             SET total_spins = total_spins + ?1,
                 total_bets = total_bets + ?2,
                 total_wins = total_wins + ?3,
                 biggest_win = MAX(biggest_win, ?4)
             WHERE user_id = ?5",
            params![spins, bets, wins, biggest_win, user_id],
        )?;
        Ok(())
    }

    /// Recent sessions for a user, newest first
    pub fn user_sessions(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, user_id, started_at, ended_at,
                    start_balance, end_balance, spins, bets, wins
             FROM sessions WHERE user_id = ?1
             ORDER BY session_id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok(SessionRecord {
                session_id: row.get(0)?,
                user_id: row.get(1)?,
                started_at: row.get(2)?,
                ended_at: row.get(3)?,
                start_balance: row.get(4)?,
                end_balance: row.get(5)?,
                spins: row.get(6)?,
                bets: row.get(7)?,
                wins: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Append an analytics snapshot stamped with the current time
    pub fn record_analytics_now(
        &self,
        theoretical_rtp: f64,
        realised_rtp: f64,
        spins: i64,
        total_bet: f64,
        total_win: f64,
    ) -> Result<(), StoreError> {
        self.record_analytics(&AnalyticsRow {
            ts: Utc::now().to_rfc3339(),
            theoretical_rtp,
            realised_rtp,
            spins,
            total_bet,
            total_win,
        })
    }

    /// Append an analytics snapshot
    pub fn record_analytics(&self, row: &AnalyticsRow) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO analytics (ts, theoretical_rtp, realised_rtp, spins, total_bet, total_win)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.ts,
                row.theoretical_rtp,
                row.realised_rtp,
                row.spins,
                row.total_bet,
                row.total_win
            ],
        )?;
        Ok(())
    }

    /// Most recent analytics snapshots, newest first
    pub fn recent_analytics(&self, limit: usize) -> Result<Vec<AnalyticsRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ts, theoretical_rtp, realised_rtp, spins, total_bet, total_win
             FROM analytics ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(AnalyticsRow {
                ts: row.get(0)?,
                theoretical_rtp: row.get(1)?,
                realised_rtp: row.get(2)?,
                spins: row.get(3)?,
                total_bet: row.get(4)?,
                total_win: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_seeded_and_updated() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.jackpot_pool().unwrap(), 500.0);
        store.set_jackpot_pool(731.5).unwrap();
        assert_eq!(store.jackpot_pool().unwrap(), 731.5);
    }

    #[test]
    fn test_profile_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let created = store.create_user("alice", 1000.0).unwrap();
        let fetched = store.user_by_name("alice").unwrap().unwrap();
        assert_eq!(created, fetched);
        assert!(store.user_by_name("bob").unwrap().is_none());

        store.save_balance(created.user_id, 842.25).unwrap();
        let fetched = store.user_by_name("alice").unwrap().unwrap();
        assert_eq!(fetched.balance, 842.25);
    }

    #[test]
    fn test_login_or_create_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let first = store.login_or_create("carol", 1000.0).unwrap();
        let second = store.login_or_create("carol", 9999.0).unwrap();
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(second.balance, 1000.0); // existing balance kept
    }

    #[test]
    fn test_session_lifecycle_and_stats() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("dave", 1000.0).unwrap();

        let session_id = store.start_session(user.user_id, 1000.0).unwrap();
        store.end_session(session_id, 850.0, 30, 300.0, 150.0).unwrap();
        store
            .update_user_stats(user.user_id, 30, 300.0, 150.0, 60.0)
            .unwrap();

        let sessions = store.user_sessions(user.user_id, 10).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].spins, 30);
        assert_eq!(sessions[0].end_balance, Some(850.0));
        assert!(sessions[0].ended_at.is_some());

        let profile = store.user_by_name("dave").unwrap().unwrap();
        assert_eq!(profile.total_spins, 30);
        assert_eq!(profile.biggest_win, 60.0);

        // A second batch accumulates and keeps the larger biggest win.
        store
            .update_user_stats(user.user_id, 10, 100.0, 40.0, 20.0)
            .unwrap();
        let profile = store.user_by_name("dave").unwrap().unwrap();
        assert_eq!(profile.total_spins, 40);
        assert_eq!(profile.biggest_win, 60.0);
    }

    #[test]
    fn test_analytics_history_newest_first() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..3i64 {
            store
                .record_analytics(&AnalyticsRow {
                    ts: format!("2026-08-0{}T00:00:00Z", i + 1),
                    theoretical_rtp: 94.5,
                    realised_rtp: 90.0 + i as f64,
                    spins: 100 * (i + 1),
                    total_bet: 500.0,
                    total_win: 450.0,
                })
                .unwrap();
        }
        let rows = store.recent_analytics(2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].spins, 300);
        assert_eq!(rows[1].spins, 200);
    }

    #[test]
    fn test_reopening_file_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spinforge.db");

        {
            let store = Store::open(&path).unwrap();
            store.set_jackpot_pool(613.0).unwrap();
            store.create_user("erin", 1000.0).unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.jackpot_pool().unwrap(), 613.0);
        assert!(store.user_by_name("erin").unwrap().is_some());
    }
}
