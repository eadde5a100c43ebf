pub mod parser;

use anyhow::{anyhow, Error};
use clap::{App, Arg};
use config::{Backend, Config};
use controller::{seed, Controller, NewMovie, NewUser, Ratings, ScoreRange, ToTable};
use engine::{EffectiveScore, Engine, Judge};
use memory_controller::MemoryController;
use parser::Statement;
use simplelog::{LevelFilter, TermLogger, TerminalMode};

macro_rules! prompt {
    ($ed:ident, $name:expr) => {{
        use rustyline::error::ReadlineError;

        let msg = format!("({}) {}", $name, PROMPT);

        match $ed.readline(&msg) {
            Ok(line) => {
                $ed.add_history_entry(line.as_str());
                Ok(line)
            }

            Err(ReadlineError::Interrupted) => {
                continue;
            }

            Err(ReadlineError::Eof) => {
                println!("Exiting...Good bye!");
                break;
            }

            Err(e) => Err(e),
        }
    }};
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = ">> ";

fn print_help(score_range: ScoreRange) {
    println!("Main help:");
    println!("h | help                      Shows this help");
    println!("q | quit                      Quit");
    println!("v | version                   Shows the version");
    println!("users                         List every user");
    println!("movies                        List every movie");
    println!("user(<id>)                    User profile and ratings");
    println!("movie(<id>)                   Movie detail and ratings");
    println!("add_user(<email>)             Create an account");
    println!("add_movie(<title>)            Create a movie");
    println!("rate(<user>, <movie>, <score>) Rate a movie, again to change it");
    println!("similarity(<user>, <user>)    Pearson similarity of two users");
    println!("predict(<user>, <movie>)      Predict the score of a user");
    println!("judge(<user>, <movie>)        Ask the Eye about your taste");
    println!();
    println!(
        "Scores go from {} to {}",
        score_range.min(),
        score_range.max()
    );
}

fn describe(score: Option<EffectiveScore>) -> String {
    match score {
        Some(EffectiveScore::Rated(score)) => format!("{} (rated)", score),
        Some(EffectiveScore::Predicted(score)) => format!("{:.2} (predicted)", score),
        None => "unknown".into(),
    }
}

fn execute<C>(engine: &Engine<C>, judge: &Judge<C>, stmt: Statement) -> Result<(), Error>
where
    C: Controller,
{
    let controller = engine.controller();

    match stmt {
        Statement::Users => {
            for user in controller.users()? {
                println!("{}", user.to_table());
            }
        }

        Statement::Movies => {
            for movie in controller.movies()? {
                println!("{}", movie.to_table());
            }
        }

        Statement::User(id) => {
            println!("{}", controller.user_by_id(id)?.to_table());

            let ratings = controller.user_ratings(id)?;
            if ratings.is_empty() {
                println!("No ratings found for user({})", id);
            } else {
                println!("Ratings by movie:");
                println!("{}", ratings.to_table());
            }
        }

        Statement::Movie(id) => {
            println!("{}", controller.movie_by_id(id)?.to_table());

            let ratings: Ratings = controller
                .movie_ratings(id)?
                .into_iter()
                .map(|rating| (rating.user_id, rating.score))
                .collect();

            if ratings.is_empty() {
                println!("No ratings found for movie({})", id);
            } else {
                println!("Ratings by user:");
                println!("{}", ratings.to_table());
            }
        }

        Statement::AddUser(email) => {
            let user = controller.insert_user(NewUser::with_email(&email))?;
            println!("{}", user.to_table());
        }

        Statement::AddMovie(title) => {
            let movie = controller.insert_movie(NewMovie::with_title(&title))?;
            println!("{}", movie.to_table());
        }

        Statement::Rate(user_id, movie_id, score) => {
            let rating = controller.rate(user_id, movie_id, &score)?;
            println!(
                "user({}) rated movie({}) with {}",
                rating.user_id, rating.movie_id, rating.score
            );
        }

        Statement::Similarity(user_a, user_b) => match engine.similarity(user_a, user_b)? {
            Some(similarity) => println!("Similarity is {}", similarity),
            None => println!("Similarity is undefined, not enough ratings in common"),
        },

        Statement::Predict(user_id, movie_id) => match engine.predict(user_id, movie_id)? {
            Some(predicted) => println!("Predicted score is {:.2}", predicted),
            None => println!("Failed to predict a score, no similar users rated it"),
        },

        Statement::Judge(user_id, movie_id) => {
            let verdict = judge.judge(user_id, movie_id)?;

            println!("Your score:    {}", describe(verdict.user));
            println!("The Eye score: {}", describe(verdict.reference));

            match (verdict.judgment.difference, verdict.judgment.message_text()) {
                (Some(difference), Some(message)) => {
                    println!("Difference:    {:.2}", difference);
                    println!("The Eye says: \"{}\"", message);
                }

                _ => println!("The Eye has nothing to say about this one"),
            }
        }
    }

    Ok(())
}

fn run<C>(controller: &C, config: &Config, name: &str) -> Result<(), Error>
where
    C: Controller,
{
    let judge = Judge::new(controller, &config.engine.reference_rater)?;
    let engine = Engine::with_controller(controller);
    let mut rl = rustyline::Editor::<()>::new();

    loop {
        let line: String = prompt!(rl, name)?;

        match line.trim() {
            "?" | "h" | "help" => print_help(controller.score_range()),

            "q" | "quit" => {
                println!("Bye!");
                break;
            }

            "v" | "version" => {
                println!("version: {}", VERSION);
            }

            empty if empty.is_empty() => {}

            line => match parser::parse_line(line) {
                Some(stmt) => {
                    if let Err(e) = execute(&engine, &judge, stmt) {
                        println!("{}", e);
                    }
                }
                None => println!("Invalid syntax!"),
            },
        }
    }

    Ok(())
}

fn run_in_memory(config: &Config, score_range: ScoreRange) -> Result<(), Error> {
    let controller = MemoryController::with_score_range(score_range);

    // A fresh store has no accounts, the Eye is part of the seed
    let email = &config.engine.reference_rater;
    match &config.store.seed_dir {
        Some(dir) => {
            seed::load_dir(&controller, dir)?;
            seed::seed_reference_rater(&controller, email, dir)?;
        }
        None => {
            seed::create_reference_rater(&controller, email)?;
        }
    }

    run(&controller, config, "memory")
}

#[cfg(feature = "postgres")]
fn run_in_postgres(config: &Config, score_range: ScoreRange) -> Result<(), Error> {
    let url = config
        .store
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow!("store.database_url is required by the postgres backend"))?;

    let controller = pg_controller::PgController::with_url(url, score_range)?;
    run(&controller, config, "postgres")
}

#[cfg(not(feature = "postgres"))]
fn run_in_postgres(_config: &Config, _score_range: ScoreRange) -> Result<(), Error> {
    Err(anyhow!(
        "movie-ratings was built without postgres support, enable the `postgres` feature"
    ))
}

fn main() -> Result<(), Error> {
    let matches = App::new("movie-ratings")
        .version(VERSION)
        .about("Rate movies and find out what the Eye thinks of your taste")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .takes_value(true)
                .default_value("ratings.toml"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more, can be repeated"),
        )
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(level, simplelog::Config::default(), TerminalMode::Mixed)?;

    let config = Config::load(matches.value_of("config").unwrap_or("ratings.toml"))?;
    let score_range = ScoreRange::new(config.engine.min_score, config.engine.max_score)?;

    println!("Welcome to movie-ratings {}", VERSION);

    match config.store.backend {
        Backend::Memory => run_in_memory(&config, score_range),
        Backend::Postgres => run_in_postgres(&config, score_range),
    }
}
