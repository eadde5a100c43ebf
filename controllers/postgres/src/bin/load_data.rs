// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use config::Config;
use controller::seed;
use diesel::Connection;
use indicatif::ProgressBar;
use pg_controller::{PgController, PgSettings};
use simplelog::{LevelFilter, TermLogger, TerminalMode};
use std::collections::HashMap;

fn main() -> Result<(), Error> {
    TermLogger::init(
        LevelFilter::Warn,
        simplelog::Config::default(),
        TerminalMode::Mixed,
    )?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ratings.toml".into());
    let config = Config::load(&config_path)?;

    let vars: HashMap<String, String> = dotenv::vars().collect();
    let settings = PgSettings::from_config(&config, &vars)?;
    let seed_dir = &settings.seed_dir;

    let controller = PgController::with_url(&settings.url, settings.score_range)?;

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(100);
    spinner.set_message(&format!("Loading seed data from {}", seed_dir.display()));

    // A serialization failure aborts the whole transaction, so the upsert
    // retry cannot help in here and the load fails as a unit instead.
    let summary = controller
        .connection()
        .transaction::<_, Error, _>(|| {
            let summary = seed::load_dir(&controller, seed_dir)?;
            controller.reset_sequences()?;
            seed::seed_reference_rater(&controller, &settings.reference_rater, seed_dir)?;
            Ok(summary)
        })?;

    spinner.finish_with_message(&format!(
        "Loaded {} users, {} movies and {} ratings ({} skipped)",
        summary.users, summary.movies, summary.ratings, summary.skipped
    ));

    Ok(())
}
