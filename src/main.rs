mod config;
mod google_rs;
mod logging;
mod ports;
mod prompt;
mod services;
#[cfg(test)]
mod test_utils;
mod youtube_rs;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context, eyre::eyre};

use crate::{
    config::Config,
    logging::{init_tracing, shutdown_tracing},
    ports::accounts::{ACCOUNT_TYPE_GOOGLE, Account, AccountStore},
    ports::youtube::YoutubeApi,
    services::{
        accounts::{
            GoogleAccountStore,
            default_account::{clear_default_account, default_account, set_default_account},
            login::{complete_login, extract_authorization_code},
        },
        add_workflow::{
            AddOutcome, AddWorkflow, Awaiting, Resolution, Step, Suspension, WorkflowState,
            discard_pending, load_pending, save_pending,
        },
        preferences::{StoredPermission, TomlPreferences},
        youtube::client::YoutubeHttpAdapter,
    },
    youtube_rs::{errors::ErrorKind, video_id::parse_video_link},
};

type Workflow = AddWorkflow<
    GoogleAccountStore,
    StoredPermission<TomlPreferences>,
    YoutubeHttpAdapter,
    TomlPreferences,
>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Add YouTube videos to your Watch Later playlist", long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "WATCH_LATER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `watch_later=trace`
    #[arg(long, default_value = "warn", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// Export spans to this OTLP (gRPC) endpoint
    #[arg(long, env = "WATCH_LATER_OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    /// API key for video lookups, overrides the config file
    #[arg(long = "api-key", env = "WATCH_LATER_API_KEY", global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a video to Watch Later
    Add {
        /// Link to the video
        url: String,

        /// Account to use instead of asking
        #[arg(short, long)]
        account: Option<String>,

        /// Make the chosen account the default
        #[arg(long)]
        remember: bool,
    },
    /// Continue an add that was interrupted at a prompt
    Resume,
    /// Show title and duration of a video
    Info {
        /// Link to the video
        url: String,
    },
    /// Give Watch Later access to a Google account
    Login {
        /// The Google account, e.g. me@gmail.com
        #[arg(short, long)]
        account: String,
    },
    #[command(subcommand)]
    Accounts(AccountCommands),
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum AccountCommands {
    /// List accounts that have logged in
    List,
    /// Show, set or clear the default account
    Default {
        name: Option<String>,

        #[arg(long, conflicts_with = "name")]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

/// Shared handles for the commands that talk to Google.
struct App {
    config: Config,
    api_key: Option<String>,
    preferences: Arc<TomlPreferences>,
    accounts: GoogleAccountStore,
}

impl App {
    fn open(config: Config, api_key: Option<String>) -> Result<Self> {
        let preferences = Arc::new(TomlPreferences::open(&config.preferences_path()?)?);
        let accounts = GoogleAccountStore::open(&config.credentials_path()?, config.oauth()?)?;
        let api_key = api_key.or_else(|| config.api_key().map(str::to_string));

        Ok(Self {
            config,
            api_key,
            preferences,
            accounts,
        })
    }

    fn youtube(&self) -> Result<YoutubeHttpAdapter> {
        Ok(YoutubeHttpAdapter::new(
            self.config.youtube_endpoint()?,
            self.api_key.clone(),
        ))
    }

    fn into_workflow(self) -> Result<(Workflow, PathBuf)> {
        let youtube = self.youtube()?;
        let pending_path = self.config.pending_add_path()?;
        let permission = StoredPermission::new(
            self.preferences.clone(),
            self.config.require_account_permission,
        );
        let workflow = AddWorkflow::new(self.accounts, permission, youtube, self.preferences);
        Ok((workflow, pending_path))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        "watch-later",
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    let result = run(args).await;
    shutdown_tracing(tracer_provider);
    result
}

async fn run(args: Args) -> Result<ExitCode> {
    tracing::debug!("Watch later starting");

    if let Commands::Config(config_commands) = &args.command {
        match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                println!("Created {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        }
        return Ok(ExitCode::SUCCESS);
    }

    tracing::debug!("Loading configuration");
    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load watch-later config, create one with `watch-later config create-default`")?;

    if let Commands::Info { url } = &args.command {
        return show_info(&config, args.api_key, url).await;
    }

    let app = App::open(config, args.api_key)?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    match args.command {
        Commands::Add {
            url,
            account,
            remember,
        } => {
            let video_id = match parse_video_link(&url) {
                Ok(video_id) => video_id,
                Err(error) => return Ok(report_error(error)),
            };
            tracing::debug!("Adding video {}", video_id);

            let state = match account {
                Some(name) => {
                    let account = Account::google(name);
                    if !app.accounts.list_accounts(ACCOUNT_TYPE_GOOGLE).contains(&account) {
                        return Err(eyre!(
                            "Unknown account {}, log in with `watch-later login --account {}` first",
                            account.name,
                            account.name
                        ));
                    }
                    WorkflowState::with_account(video_id, account)
                }
                None => WorkflowState::new(video_id),
            };

            let (workflow, pending_path) = app.into_workflow()?;
            let session = Session {
                workflow: &workflow,
                pending_path: &pending_path,
                remember,
            };
            session.drive(state, &mut input, &mut output).await
        }
        Commands::Resume => {
            let (workflow, pending_path) = app.into_workflow()?;
            let Some(state) = load_pending(&pending_path)? else {
                println!("Nothing to resume");
                return Ok(ExitCode::SUCCESS);
            };
            tracing::debug!("Resuming run {} for {}", state.run(), state.video_id());

            let session = Session {
                workflow: &workflow,
                pending_path: &pending_path,
                remember: false,
            };
            session.drive(state, &mut input, &mut output).await
        }
        Commands::Info { .. } => Ok(ExitCode::SUCCESS),
        Commands::Login { account } => {
            let (intent, oauth_session) = app.accounts.begin_consent(&account);
            println!("Open this page and allow access for {}:", intent.account);
            println!();
            println!("  {}", intent.url);
            println!();
            let Some(pasted) = prompt::ask(
                &mut input,
                &mut output,
                "Paste the address you were redirected to (or the code): ",
            )?
            else {
                return Err(eyre!("Login aborted"));
            };

            let code = extract_authorization_code(&pasted, &oauth_session)?;
            complete_login(&app.accounts, &account, &code, &oauth_session).await?;
            println!("Logged in as {}", account);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Accounts(AccountCommands::List) => {
            let accounts = app.accounts.list_accounts(ACCOUNT_TYPE_GOOGLE);
            if accounts.is_empty() {
                println!("No accounts, log in with `watch-later login --account <name>`");
            }
            let default = default_account(&app.accounts, app.preferences.as_ref());
            for account in accounts {
                let marker = if default.as_deref() == Some(account.name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}", marker, account.name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Accounts(AccountCommands::Default { name, clear }) => {
            if clear {
                clear_default_account(app.preferences.as_ref())?;
                println!("Default account cleared");
            } else if let Some(name) = name {
                set_default_account(&app.accounts, app.preferences.as_ref(), &name)?;
                println!("Default account is now {}", name);
            } else {
                match default_account(&app.accounts, app.preferences.as_ref()) {
                    Some(name) => println!("{}", name),
                    None => println!("No default account"),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(_) => Ok(ExitCode::SUCCESS),
    }
}

async fn show_info(config: &Config, api_key: Option<String>, url: &str) -> Result<ExitCode> {
    let youtube = YoutubeHttpAdapter::new(
        config.youtube_endpoint()?,
        api_key.or_else(|| config.api_key().map(str::to_string)),
    );

    let video_id = match parse_video_link(url) {
        Ok(video_id) => video_id,
        Err(error) => return Ok(report_error(error)),
    };
    match youtube.video_info(&video_id).await {
        Ok(video) => {
            println!("{}", video.snippet.title);
            println!("Duration: {}", video.content_details.duration);
            if let Some(thumbnail) = video
                .snippet
                .thumbnails
                .as_ref()
                .and_then(|thumbnails| thumbnails.medium.as_ref())
            {
                println!("Thumbnail: {}", thumbnail.url);
            }
            if !video.snippet.description.is_empty() {
                println!();
                println!("{}", video.snippet.description);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => Ok(report_error(error.user_facing())),
    }
}

/// Run `future` unless Ctrl-C comes first.
async fn interruptible<T>(future: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        output = future => Some(output),
        _ = tokio::signal::ctrl_c() => None,
    }
}

fn report_error(error: ErrorKind) -> ExitCode {
    eprintln!("{}", error);
    ExitCode::FAILURE
}

/// One interactive add, from the first stage to an outcome.
struct Session<'a> {
    workflow: &'a Workflow,
    pending_path: &'a Path,
    remember: bool,
}

impl Session<'_> {
    async fn drive<R: BufRead, W: Write>(
        &self,
        mut state: WorkflowState,
        input: &mut R,
        output: &mut W,
    ) -> Result<ExitCode> {
        let mut step = match state.pending().cloned() {
            Some(suspension) => Step::Awaiting(Awaiting {
                run: state.run(),
                suspension,
            }),
            None => match interruptible(self.workflow.advance(&mut state)).await {
                Some(step) => step,
                None => return self.cancelled(&mut state, output),
            },
        };

        loop {
            match step {
                Step::Awaiting(Awaiting { run, suspension }) => {
                    let Some(resolution) = self.ask(&suspension, input, output)? else {
                        save_pending(self.pending_path, &state)?;
                        tracing::debug!(
                            run = state.run(),
                            stage = ?state.stage(),
                            account = ?state.account(),
                            "Saved suspended run"
                        );
                        writeln!(output, "Continue later with `watch-later resume`")?;
                        return Ok(ExitCode::FAILURE);
                    };
                    step = match interruptible(self.workflow.resume(&mut state, run, resolution))
                        .await
                    {
                        Some(step) => step?,
                        None => return self.cancelled(&mut state, output),
                    };
                }
                Step::Done(outcome) => {
                    discard_pending(self.pending_path)?;
                    match outcome {
                        AddOutcome::Success { title, .. } => {
                            let channel = state.channel_title().unwrap_or("your account");
                            writeln!(output, "Added \"{}\" to Watch Later of {}", title, channel)?;
                            return Ok(ExitCode::SUCCESS);
                        }
                        AddOutcome::NeedsIntent { intent } => {
                            writeln!(output, "{} needs to allow access first:", intent.account)?;
                            writeln!(output, "  watch-later login --account {}", intent.account)?;
                            return Ok(ExitCode::FAILURE);
                        }
                        AddOutcome::Error { error } => {
                            writeln!(output, "{}", error)?;
                            if !error.is_retryable()
                                || prompt::confirm(input, output, "Try again?")? != Some(true)
                            {
                                return Ok(ExitCode::FAILURE);
                            }
                            state.retry();
                            step = match interruptible(self.workflow.advance(&mut state)).await {
                                Some(step) => step,
                                None => return self.cancelled(&mut state, output),
                            };
                        }
                    }
                }
            }
        }
    }

    /// Ctrl-C while a request is in flight: the run is dropped for good.
    fn cancelled<W: Write>(&self, state: &mut WorkflowState, output: &mut W) -> Result<ExitCode> {
        state.abandon();
        discard_pending(self.pending_path)?;
        tracing::info!(run = state.run(), "Add of {} cancelled", state.video_id());
        writeln!(output, "Cancelled")?;
        Ok(ExitCode::FAILURE)
    }

    fn ask<R: BufRead, W: Write>(
        &self,
        suspension: &Suspension,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<Resolution>> {
        match suspension {
            Suspension::ChooseAccount { accounts } => {
                let Some(account) = prompt::choose_account(input, output, accounts)? else {
                    return Ok(None);
                };
                let remember = self.remember
                    || prompt::confirm(input, output, "Always use this account?")?
                        .unwrap_or(false);
                Ok(Some(Resolution::AccountChosen { account, remember }))
            }
            Suspension::GrantPermission => {
                let granted = prompt::confirm(
                    input,
                    output,
                    "Watch Later needs to use your Google accounts. Allow?",
                )?;
                Ok(granted.map(|granted| Resolution::Permission { granted }))
            }
        }
    }
}
