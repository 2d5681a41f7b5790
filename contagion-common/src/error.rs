use thiserror::Error;

/// Largest population a model accepts.
pub const MAX_POPULATION: i64 = u32::MAX as i64;

/// Rejected starting population. Raised before any cell is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Starting infected population must be less than {cells} (got {infected})")]
    InfectedExceedsPopulation { cells: i64, infected: i64 },

    #[error("Starting immune population must be less than {cells} (got {immune})")]
    ImmuneExceedsPopulation { cells: i64, immune: i64 },

    #[error("Starting infected population must be greater than 0 (got {infected})")]
    NoInitialInfection { infected: i64 },

    #[error("Starting immune population must be 0 or higher (got {immune})")]
    NegativeImmune { immune: i64 },

    #[error("Starting infected + immune population must be less than {cells} (got {infected} + {immune})")]
    NoVulnerableCells { cells: i64, infected: i64, immune: i64 },

    #[error("Population of {cells} cells exceeds the limit of {limit}")]
    PopulationTooLarge { cells: i64, limit: i64 },
}

impl ConfigError {
    /// Checks a requested population split, in the same order the messages are reported.
    pub fn check_population(cells: i64, infected: i64, immune: i64) -> Result<(), ConfigError> {
        if infected >= cells {
            return Err(ConfigError::InfectedExceedsPopulation { cells, infected });
        }
        if immune >= cells {
            return Err(ConfigError::ImmuneExceedsPopulation { cells, immune });
        }
        if infected <= 0 {
            return Err(ConfigError::NoInitialInfection { infected });
        }
        if immune < 0 {
            return Err(ConfigError::NegativeImmune { immune });
        }
        if infected + immune >= cells {
            return Err(ConfigError::NoVulnerableCells { cells, infected, immune });
        }
        // Tallies count cells in u32.
        if cells > MAX_POPULATION {
            return Err(ConfigError::PopulationTooLarge { cells, limit: MAX_POPULATION });
        }
        Ok(())
    }
}
