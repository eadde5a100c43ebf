// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::{anyhow, Error};
use config::Config;
use controller::ScoreRange;
use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_SEED_DIR: &str = "data";

/// What a postgres loader needs, all of it coming from the same configuration
/// the REPL reads.
#[derive(Debug, Clone, PartialEq)]
pub struct PgSettings {
    pub url: String,
    pub score_range: ScoreRange,
    pub reference_rater: String,
    pub seed_dir: PathBuf,
}

impl PgSettings {
    /// `DATABASE_URL` in `vars` wins over `store.database_url`
    pub fn from_config(config: &Config, vars: &HashMap<String, String>) -> Result<Self, Error> {
        let url = vars
            .get("DATABASE_URL")
            .or_else(|| config.store.database_url.as_ref())
            .cloned()
            .ok_or_else(|| anyhow!("Neither DATABASE_URL nor store.database_url are set"))?;

        Ok(Self {
            url,
            score_range: ScoreRange::new(config.engine.min_score, config.engine.max_score)?,
            reference_rater: config.engine.reference_rater.clone(),
            seed_dir: config
                .store
                .seed_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_DIR)),
        })
    }
}
