//! Layered configuration.
//!
//! Tiers, lowest priority first, merged field-by-field:
//! 1. **Defaults** - built into [`Config::default`]
//! 2. **Project** - `$CWD/goal-tracker/config.yaml`
//! 3. **User** - `~/.goal-tracker/config.yaml`
//! 4. **Environment** - variables below
//!
//! ## Environment Variables
//! - `GOAL_TRACKER_CONFIG_PATH` - Explicit config file (skips tier files)
//! - `GOAL_TRACKER_DB_PATH` - Database path
//! - `GOAL_TRACKER_HOST` - Bind address
//! - `GOAL_TRACKER_PORT` - Listen port
//! - `GOAL_TRACKER_CORS_ORIGIN` - Allowed browser origin
//! - `GOAL_TRACKER_USER_DIR` - User config dir (default: `~/.goal-tracker`)
//! - `GOAL_TRACKER_PROJECT_DIR` - Project config dir (default: `./goal-tracker`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
