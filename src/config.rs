use serde::{Deserialize, Serialize};

use crate::errors::AdaptError;

///
/// Knobs controlling an adaptation run. `min_level`/`max_level` bound the
/// per-node level for the local strategy and the level sum of a level index
/// for the global strategy. `max_nodes` caps the total number of stored
/// nodes (local strategy only). The error tolerances feed the global
/// stopping rule. `workers` sizes the evaluation pool; 0 means one worker
/// per available hardware thread.
///
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Config
{
    pub min_level: u32,
    pub max_level: u32,
    pub max_nodes: usize,
    pub absolute_error: f64,
    pub relative_error: f64,
    pub workers: usize,
}

impl Default for Config
{
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 9,
            max_nodes: 10_000,
            absolute_error: 1e-6,
            relative_error: 1e-3,
            workers: 0,
        }
    }
}

impl Config
{
    pub fn validate(&self) -> Result<(), AdaptError>
    {
        if self.min_level > self.max_level
        {
            return Err(AdaptError::InvalidLevelBounds);
        }
        Ok(())
    }
}
