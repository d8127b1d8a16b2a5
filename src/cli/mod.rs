//! CLI argument parsing module
//!
//! Every invocation opens the cookie jar and the rule storage under the
//! configured home, subscribes the change interceptor, performs one command
//! and then lets the interceptor settle every change the command caused.

use std::sync::Arc;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::config::{Config, OutputConfig};
use crate::cookie::{RemoveDetails, SetDetails, Tab};
use crate::error::{CookieMasterError, Result};
use crate::exit_code::exit_code_for_error;
use crate::host::{
    AssumeYes, CookieApi, FixedTab, Osc52Clipboard, Prompt, SqliteCookieJar, SqliteStorage,
    StdinPrompt,
};
use crate::i18n;
use crate::inspector::{
    AppState, Column, HostApis, Inspector, ListStatus, NewCookie, Notice, RowAction, RowKey,
    RuleAction,
};
use crate::interceptor::ChangeInterceptor;
use crate::logging;
use crate::output::{self, OutputWriter};
use crate::utils::{now_secs, FileUtils, UrlUtils};

/// Main entry point for the CLI application
pub fn run() {
    let matches = create_app().get_matches();
    logging::init(matches.get_flag("silent") || matches.get_flag("json"));

    let config = match build_config_from_args(&matches) {
        Ok(config) => config,
        Err(err) => fail(&OutputWriter::new(OutputConfig::default()), &err),
    };
    let output = OutputWriter::new(config.output.clone());

    match run_with_args(&matches, &config, &output) {
        Ok(notice) if notice.is_alert() => std::process::exit(1),
        Ok(_) => {}
        Err(err) => fail(&output, &err),
    }
}

fn fail(output: &OutputWriter, err: &CookieMasterError) -> ! {
    let _ = output.write_error(&i18n::localize_error(err));
    std::process::exit(exit_code_for_error(err));
}

/// Run one command with parsed command line arguments
fn run_with_args(matches: &ArgMatches, config: &Config, output: &OutputWriter) -> Result<Notice> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CookieMasterError::Config(format!("Failed to create async runtime: {}", e))
    })?;
    rt.block_on(execute(matches, config, output))
}

async fn execute(matches: &ArgMatches, config: &Config, output: &OutputWriter) -> Result<Notice> {
    let jar = Arc::new(SqliteCookieJar::open(&config.cookie_db())?);
    let storage = Arc::new(SqliteStorage::open(&config.storage_db())?);
    let prompt: Arc<dyn Prompt> = if config.assume_yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(StdinPrompt)
    };
    let inspector = Inspector::new(HostApis {
        cookies: jar.clone(),
        storage,
        tabs: Arc::new(FixedTab::new(config.tab.clone())),
        clipboard: Arc::new(Osc52Clipboard),
        prompt,
    });
    let interceptor = ChangeInterceptor::new(jar.clone(), inspector.policy().clone());

    let mut changes = jar.subscribe();
    let result = match matches.subcommand() {
        Some(("list", sub)) => list(&inspector, sub, output).await,
        Some(("edit", sub)) => edit(&inspector, sub).await,
        Some(("delete", sub)) => on_row(&inspector, sub, RowAction::Delete).await,
        Some(("lock", sub)) => on_row(&inspector, sub, RowAction::ToggleLock).await,
        Some(("blacklist", sub)) => on_row(&inspector, sub, RowAction::ToggleBlacklist).await,
        Some(("create", sub)) => create(&inspector, sub).await,
        Some(("copy", sub)) => copy(&inspector, sub).await,
        Some(("rules", sub)) => rules(&inspector, sub, output).await,
        Some(("inject", sub)) => inject(&*jar, config.tab.as_ref(), sub).await,
        _ => Err(CookieMasterError::InvalidInput(
            "no command given".to_string(),
        )),
    };

    let handled = interceptor.drain(&mut changes).await;
    output.write_verbose(&format!("{} cookie change event(s) checked", handled))?;

    let notice = result?;
    if output.json() {
        if notice != Notice::None {
            output.write(&serde_json::to_string(&notice)?)?;
        }
    } else {
        output.write_notice(&notice)?;
    }
    Ok(notice)
}

async fn list(inspector: &Inspector, matches: &ArgMatches, output: &OutputWriter) -> Result<Notice> {
    let mut state = inspector.open().await;
    if let Some(filter) = matches.get_one::<String>("filter") {
        state.set_filter(filter);
    }
    if output.json() {
        output.write(&output::list_json(&state)?)?;
    } else {
        let rendered = output::format_list(&state);
        if !rendered.is_empty() {
            output.write(&rendered)?;
        }
    }
    Ok(Notice::None)
}

async fn edit(inspector: &Inspector, matches: &ArgMatches) -> Result<Notice> {
    let mut state = inspector.open().await;
    let row = select_row(&state, matches)?;
    let value = required(matches, "value")?;

    let notice = inspector
        .dispatch(&mut state, RowAction::Edit(row.clone()))
        .await;
    if notice.is_alert() {
        return Ok(notice);
    }
    Ok(inspector
        .dispatch(&mut state, RowAction::Save { row, value })
        .await)
}

async fn on_row(
    inspector: &Inspector,
    matches: &ArgMatches,
    action: fn(RowKey) -> RowAction,
) -> Result<Notice> {
    let mut state = inspector.open().await;
    let row = select_row(&state, matches)?;
    Ok(inspector.dispatch(&mut state, action(row)).await)
}

async fn create(inspector: &Inspector, matches: &ArgMatches) -> Result<Notice> {
    let mut state = inspector.open().await;
    ensure_page(&state)?;

    let notice = inspector.dispatch(&mut state, RowAction::BeginCreate).await;
    if notice.is_alert() {
        return Ok(notice);
    }
    let domain = match matches.get_one::<String>("domain") {
        Some(domain) => domain.clone(),
        None => state
            .create
            .as_ref()
            .map(|draft| draft.default_domain.clone())
            .unwrap_or_default(),
    };
    let cookie = NewCookie {
        name: required(matches, "name")?,
        value: required(matches, "value")?,
        domain,
    };
    Ok(inspector
        .dispatch(&mut state, RowAction::CreateNew(cookie))
        .await)
}

async fn copy(inspector: &Inspector, matches: &ArgMatches) -> Result<Notice> {
    let column = match matches.get_one::<String>("column") {
        Some(column) => column.parse::<Column>().map_err(|_| {
            CookieMasterError::InvalidInput(format!("unknown column '{}'", column))
        })?,
        None => Column::Value,
    };
    let mut state = inspector.open().await;
    let row = select_row(&state, matches)?;
    Ok(inspector
        .dispatch(&mut state, RowAction::Copy { row, column })
        .await)
}

async fn rules(inspector: &Inspector, matches: &ArgMatches, output: &OutputWriter) -> Result<Notice> {
    let action = match matches.subcommand() {
        Some(("lock", sub)) => RuleAction::AddLock {
            name: required(sub, "name")?,
            value: required(sub, "value")?,
        },
        Some(("unlock", sub)) => RuleAction::RemoveLock {
            name: required(sub, "name")?,
        },
        Some(("blacklist", sub)) => RuleAction::AddBlacklist {
            name: required(sub, "name")?,
        },
        Some(("unblacklist", sub)) => RuleAction::RemoveBlacklist {
            name: required(sub, "name")?,
        },
        _ => {
            let settings = inspector.policy().load().await?;
            if output.json() {
                output.write(&output::rules_json(&settings)?)?;
            } else {
                let rendered = output::format_rules(&settings);
                if !rendered.is_empty() {
                    output.write(&rendered)?;
                }
            }
            return Ok(Notice::None);
        }
    };
    let mut state = AppState::default();
    Ok(inspector.apply_rule(&mut state, action).await)
}

/// Mutate the jar the way the page in the active tab would
async fn inject(jar: &dyn CookieApi, tab: Option<&Tab>, matches: &ArgMatches) -> Result<Notice> {
    let tab = tab.ok_or(CookieMasterError::NoActiveTab)?;
    if !UrlUtils::is_http_url(&tab.url) {
        return Err(CookieMasterError::UnsupportedScheme(
            UrlUtils::scheme_of(&tab.url).to_string(),
        ));
    }
    let name = required(matches, "name")?;

    if matches.get_flag("remove") {
        let removed = jar
            .remove(&RemoveDetails {
                url: tab.url.clone(),
                name: name.clone(),
                store_id: tab.cookie_store_id.clone(),
            })
            .await?;
        if removed.is_none() {
            return Err(CookieMasterError::NotFound(name));
        }
        return Ok(Notice::None);
    }

    let details = SetDetails {
        url: tab.url.clone(),
        name,
        value: matches
            .get_one::<String>("value")
            .cloned()
            .unwrap_or_default(),
        domain: matches.get_one::<String>("domain").cloned(),
        path: matches.get_one::<String>("path").cloned(),
        secure: matches.get_flag("secure"),
        http_only: matches.get_flag("http-only"),
        expiration_date: matches
            .get_one::<f64>("expires")
            .map(|seconds| now_secs() + seconds),
        store_id: tab.cookie_store_id.clone(),
    };
    jar.set(&details).await?;
    Ok(Notice::None)
}

/// Map a list state that has no rows to act on to an error
fn ensure_page(state: &AppState) -> Result<()> {
    match &state.status {
        ListStatus::NoTab => Err(CookieMasterError::NoActiveTab),
        ListStatus::Unavailable { scheme } => {
            Err(CookieMasterError::UnsupportedScheme(scheme.clone()))
        }
        ListStatus::Failed { detail } => Err(CookieMasterError::Rejected(detail.clone())),
        _ => Ok(()),
    }
}

/// Resolve NAME plus optional --domain / --path to exactly one listed cookie
fn select_row(state: &AppState, matches: &ArgMatches) -> Result<RowKey> {
    ensure_page(state)?;
    let name = required(matches, "name")?;
    let domain = matches
        .get_one::<String>("domain")
        .map(|d| UrlUtils::strip_leading_dot(d).to_ascii_lowercase());
    let path = matches.get_one::<String>("path");

    let mut candidates: Vec<RowKey> = state
        .cookies
        .iter()
        .filter(|cookie| cookie.name == name)
        .filter(|cookie| {
            domain.as_deref().map_or(true, |domain| {
                UrlUtils::strip_leading_dot(&cookie.domain).eq_ignore_ascii_case(domain)
            })
        })
        .filter(|cookie| path.map_or(true, |path| &cookie.path == path))
        .map(RowKey::of)
        .collect();

    match candidates.len() {
        0 => Err(CookieMasterError::NotFound(name)),
        1 => Ok(candidates.remove(0)),
        count => Err(CookieMasterError::InvalidInput(format!(
            "{} cookies named '{}'; narrow with --domain or --path",
            count, name
        ))),
    }
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| CookieMasterError::InvalidInput(format!("missing {}", id)))
}

fn name_arg() -> Arg {
    Arg::new("name")
        .help("Cookie name")
        .required(true)
        .index(1)
}

fn value_arg() -> Arg {
    Arg::new("value")
        .help("Cookie value")
        .required(true)
        .index(2)
}

/// `--domain` / `--path` used to pick one of several same-named cookies
fn row_args(command: Command) -> Command {
    command
        .arg(name_arg())
        .arg(
            Arg::new("domain")
                .long("domain")
                .value_name("DOMAIN")
                .help("Only the cookie stored for this domain"),
        )
        .arg(
            Arg::new("path")
                .long("path")
                .value_name("PATH")
                .help("Only the cookie stored for this path"),
        )
}

/// Create the CLI application structure
fn create_app() -> Command {
    Command::new("cookie-master")
        .version(crate::VERSION)
        .about("Inspect, edit, lock and blacklist the cookies of the active tab")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("home")
                .long("home")
                .value_name("DIR")
                .env("COOKIE_MASTER_HOME")
                .global(true)
                .help("Directory holding the cookie jar and the rule storage"),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .env("COOKIE_MASTER_URL")
                .global(true)
                .help("URL of the active tab"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("ID")
                .global(true)
                .help("Cookie store of the active tab"),
        )
        .arg(
            Arg::new("yes")
                .short('y')
                .long("yes")
                .global(true)
                .help("Answer yes to confirmation prompts")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .help("Machine-readable output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .global(true)
                .help("Silent mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .help("Verbose output")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("list").about("List the cookies of the active tab").arg(
                Arg::new("filter")
                    .long("filter")
                    .short('f')
                    .value_name("TEXT")
                    .help("Only cookies whose name or domain contains TEXT"),
            ),
        )
        .subcommand(row_args(Command::new("edit").about("Change a cookie's value")).arg(value_arg()))
        .subcommand(row_args(Command::new("delete").about("Delete a cookie")))
        .subcommand(row_args(Command::new("lock").about("Lock or unlock a cookie at its current value")))
        .subcommand(row_args(Command::new("blacklist").about("Blacklist or un-blacklist a cookie name")))
        .subcommand(
            Command::new("create")
                .about("Create a cookie for the active tab")
                .arg(name_arg())
                .arg(value_arg())
                .arg(
                    Arg::new("domain")
                        .long("domain")
                        .value_name("DOMAIN")
                        .help("Cookie domain (defaults to the tab host)"),
                ),
        )
        .subcommand(
            row_args(Command::new("copy").about("Copy a cell to the clipboard")).arg(
                Arg::new("column")
                    .long("column")
                    .short('c')
                    .value_name("name|value|domain")
                    .help("Cell to copy (default: value)"),
            ),
        )
        .subcommand(
            Command::new("rules")
                .about("Show or edit the lock and blacklist rules")
                .subcommand(Command::new("list").about("Show every rule"))
                .subcommand(
                    Command::new("lock")
                        .about("Lock a cookie name to a value")
                        .arg(name_arg())
                        .arg(value_arg()),
                )
                .subcommand(Command::new("unlock").about("Remove a lock").arg(name_arg()))
                .subcommand(
                    Command::new("blacklist")
                        .about("Blacklist a cookie name")
                        .arg(name_arg()),
                )
                .subcommand(
                    Command::new("unblacklist")
                        .about("Remove a name from the blacklist")
                        .arg(name_arg()),
                ),
        )
        .subcommand(
            Command::new("inject")
                .about("Set or remove a cookie as the page itself would")
                .arg(name_arg())
                .arg(Arg::new("value").help("Cookie value").index(2))
                .arg(Arg::new("domain").long("domain").value_name("DOMAIN"))
                .arg(Arg::new("path").long("path").value_name("PATH"))
                .arg(Arg::new("secure").long("secure").action(ArgAction::SetTrue))
                .arg(
                    Arg::new("http-only")
                        .long("http-only")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("expires")
                        .long("expires")
                        .value_name("SECONDS")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Lifetime from now; negative expires the cookie"),
                )
                .arg(
                    Arg::new("remove")
                        .long("remove")
                        .conflicts_with_all(["value", "secure", "http-only", "expires"])
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Build configuration from command line arguments
fn build_config_from_args(matches: &ArgMatches) -> Result<Config> {
    let mut config = Config::default();

    if let Some(home) = matches.get_one::<String>("home") {
        config.home = FileUtils::expand_path(home)?;
    }

    let store = matches.get_one::<String>("store").cloned();
    match matches.get_one::<String>("url") {
        Some(url_str) => {
            let url = UrlUtils::validate_url(url_str)?;
            config.tab = Some(Tab {
                url: url.to_string(),
                cookie_store_id: store,
            });
        }
        None if store.is_some() => {
            return Err(CookieMasterError::Config(
                "--store needs --url (or COOKIE_MASTER_URL)".to_string(),
            ));
        }
        None => {}
    }

    config.assume_yes = matches.get_flag("yes");
    config.output.format_json = matches.get_flag("json");
    config.output.silent = matches.get_flag("silent");
    config.output.verbose = matches.get_flag("verbose");

    Ok(config)
}
