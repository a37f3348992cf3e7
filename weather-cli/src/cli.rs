use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, CustomUserError, Text, validator::Validation};
use weather_records_core::{
    Config, FeedState, RecordDetail, SubmissionForm, WeatherApp,
    config::{BASE_URL_ENV, DEFAULT_BASE_URL, parse_base_url},
};

use crate::{interactive, output, prompt::prompt};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-records",
    version,
    about = "Submit, look up and follow weather observations"
)]
pub struct Cli {
    /// Service base URL. Overrides WEATHER_API_URL and the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the service URL and request timeout.
    Configure,

    /// Show one stored observation.
    Lookup {
        /// Record ID returned when the observation was submitted.
        id: String,

        /// Print the raw record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List submissions, newest first.
    Feed {
        /// Print the records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Submit a new observation.
    Submit {
        /// Place to fetch the weather for, e.g. "Berlin".
        #[arg(long)]
        location: String,

        /// Observation date; defaults to today.
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Interactive session with the submissions feed kept up to date (default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let has_override = self.base_url.is_some() || std::env::var_os(BASE_URL_ENV).is_some();
        let config = config_or_default(Config::load(), has_override)?;
        let connect = || -> anyhow::Result<WeatherApp> {
            let settings = config
                .service_settings(self.base_url.as_deref())
                .context("Invalid service configuration")?;
            Ok(WeatherApp::connect(&settings)?)
        };

        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(&config).await?,
            Command::Lookup { id, json } => match connect()?.lookup_client().lookup(&id).await {
                Ok(record) if json => println!("{}", serde_json::to_string_pretty(&record)?),
                Ok(record) => output::print_detail(&RecordDetail::from(&record)),
                Err(err) => {
                    tracing::debug!(error = %err, "lookup failed");
                    bail!(err.user_message());
                }
            },
            Command::Feed { json } => {
                let state = connect()?.feed_client().load().await;
                if json {
                    let records = match state {
                        FeedState::Populated(records) => records,
                        FeedState::Loading | FeedState::Empty => Vec::new(),
                    };
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    output::print_feed(&state);
                }
            }
            Command::Submit { location, date, notes } => {
                let mut form = SubmissionForm::new(location).with_notes(notes);
                if let Some(date) = date {
                    form = form.with_date(date);
                }
                match connect()?.submit_client().submit(&form).await {
                    Ok(receipt) => println!("Submitted. Record ID: {}", receipt.id),
                    Err(err) => bail!(err.user_message()),
                }
            }
            Command::Interactive => interactive::run(connect()?).await?,
        }

        Ok(())
    }
}

/// A broken config file only matters when nothing overrides the base URL.
fn config_or_default(loaded: anyhow::Result<Config>, has_override: bool) -> anyhow::Result<Config> {
    match loaded {
        Ok(config) => Ok(config),
        Err(err) if has_override => {
            tracing::warn!(error = format!("{err:#}"), "ignoring unreadable config file");
            Ok(Config::default())
        }
        Err(err) => Err(err),
    }
}

async fn configure(config: &Config) -> anyhow::Result<()> {
    let current = config.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let Some(base_url) = prompt(move || {
        Text::new("Service base URL:")
            .with_default(&current)
            .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
                Ok(match parse_base_url(input) {
                    Ok(_) => Validation::Valid,
                    Err(err) => Validation::Invalid(err.to_string().into()),
                })
            })
            .prompt()
    })
    .await?
    else {
        return Ok(());
    };

    let current_timeout = config.timeout().as_secs();
    let Some(timeout_secs) = prompt(move || {
        CustomType::<u64>::new("Request timeout (seconds):")
            .with_default(current_timeout)
            .with_error_message("Please enter a whole number of seconds")
            .prompt()
    })
    .await?
    else {
        return Ok(());
    };

    let updated = Config {
        base_url: Some(base_url.trim().to_string()),
        timeout_secs: Some(timeout_secs),
    };
    updated.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
