//! Initial goals and tasks for a fresh database.

use super::Database;
use super::goals::insert_goal_internal;
use super::tasks::insert_task_internal;
use crate::types::TaskInput;
use anyhow::Result;
use chrono::{Days, NaiveDate};
use tracing::{error, info};

/// Goal names, inserted in this order so they get ids 1..=4 on a fresh store.
pub const SEED_GOALS: [&str; 4] = ["仕事", "勉強", "趣味", "健康"];

/// Seed tasks: title, description, duration in days, ordinal of the owning goal.
const SEED_TASKS: [(&str, &str, u64, usize); 3] = [
    ("プロジェクト計画の作成", "次期プロジェクトの計画書を作成する", 7, 1),
    ("Python学習", "FastAPIの基礎を学ぶ", 14, 2),
    ("ジム通い", "週3回のジム通いを継続する", 30, 4),
];

/// Result of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Goals and tasks were inserted.
    Seeded { goals: usize, tasks: usize },
    /// The store already held goals; nothing was written.
    AlreadySeeded,
    /// Seeding failed and was rolled back.
    Failed,
}

impl Database {
    /// Insert the seed goals and tasks in a single transaction.
    ///
    /// Task dates start on `today`. Any error rolls back every row.
    pub fn seed(&self, today: NaiveDate) -> Result<SeedOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: i64 = tx.query_row("SELECT COUNT(*) FROM goals", [], |row| row.get(0))?;
            if existing > 0 {
                return Ok(SeedOutcome::AlreadySeeded);
            }

            let mut goal_ids = Vec::with_capacity(SEED_GOALS.len());
            for name in SEED_GOALS {
                goal_ids.push(insert_goal_internal(&tx, name)?.id);
            }

            for (title, description, days, goal_ordinal) in SEED_TASKS {
                let end = today
                    .checked_add_days(Days::new(days))
                    .unwrap_or(today);
                let input = TaskInput::new(title, description, today, end, goal_ids[goal_ordinal - 1]);
                insert_task_internal(&tx, &input)?;
            }

            tx.commit()?;
            Ok(SeedOutcome::Seeded {
                goals: SEED_GOALS.len(),
                tasks: SEED_TASKS.len(),
            })
        })
    }
}

/// Seed the database, logging instead of propagating failures.
pub fn run_seed(db: &Database, today: NaiveDate) -> SeedOutcome {
    info!("Seeding database");
    match db.seed(today) {
        Ok(SeedOutcome::Seeded { goals, tasks }) => {
            info!(goals, tasks, "Database seeded");
            SeedOutcome::Seeded { goals, tasks }
        }
        Ok(outcome) => {
            info!("Goals already present, skipping seed");
            outcome
        }
        Err(e) => {
            error!("Seeding failed, changes rolled back: {:#}", e);
            SeedOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn test_seed_fresh_database() {
        let db = Database::open_in_memory().unwrap();

        let outcome = db.seed(today()).unwrap();

        assert_eq!(outcome, SeedOutcome::Seeded { goals: 4, tasks: 3 });
        let goals = db.list_goals().unwrap();
        let names: Vec<&str> = goals.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, SEED_GOALS);
        assert_eq!(goals.iter().map(|g| g.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_seed_task_dates_and_goals() {
        let db = Database::open_in_memory().unwrap();
        db.seed(today()).unwrap();

        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].goal_id, 1);
        assert_eq!(tasks[1].goal_id, 2);
        assert_eq!(tasks[2].goal_id, 4);
        assert_eq!(tasks[0].start_date, today());
        assert_eq!(tasks[0].end_date, NaiveDate::from_ymd_opt(2024, 4, 8).unwrap());
        assert_eq!(tasks[2].end_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(tasks.iter().all(|t| t.progress == 0.0));
    }

    #[test]
    fn test_seed_is_skipped_when_goals_exist() {
        let db = Database::open_in_memory().unwrap();
        db.seed(today()).unwrap();

        let outcome = run_seed(&db, today());

        assert_eq!(outcome, SeedOutcome::AlreadySeeded);
        assert_eq!(db.count_goals().unwrap(), 4);
        assert_eq!(db.count_tasks().unwrap(), 3);
    }

    #[test]
    fn test_failed_seed_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE tasks;")?;
            Ok(())
        })
        .unwrap();

        let outcome = run_seed(&db, today());

        assert_eq!(outcome, SeedOutcome::Failed);
        assert_eq!(db.count_goals().unwrap(), 0);
    }
}
