// Command handlers. `execute` builds the config store and API client once
// and hands them by reference to whichever handler the command needs.

use crate::api::ApiClient;
use crate::catalog::{Catalog, LevelFilter, ListFilter};
use crate::cli::{Cli, Commands, ConfigCommands, ListArgs, SubmitCommands};
use crate::download;
use crate::error::Result;
use crate::store::{self, ConfigStore, API_KEY, PASSWORD, USERNAME};
use crate::submit::{self, ChallengeSubmission, MachineSubmission};
use crate::ui;
use serde_json::Value;
use std::io::Write;

/// Run `cli`, writing user-facing output to `out`.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<()> {
    let path = cli.config.unwrap_or_else(store::default_path);
    let mut store = ConfigStore::open(path)?;

    match cli.command {
        Commands::Config(cmd) => run_config(&mut store, cmd, out),
        Commands::List(args) => {
            let client = ApiClient::from_env()?;
            run_list(&mut store, &client, &args, out)
        }
        Commands::Checkflag {
            flag,
            machine,
            no_verify,
        } => {
            let client = ApiClient::from_env()?;
            let mut catalog = Catalog::new(&mut store, &client);
            let inserted = submit::check_flag(&mut catalog, &flag, &machine, no_verify)?;
            writeln!(out, "{inserted}")?;
            Ok(())
        }
        Commands::Download {
            machine,
            no_verify,
            output,
        } => {
            let client = ApiClient::from_env()?;
            let mut catalog = Catalog::new(&mut store, &client);
            let saved = download::download(&mut catalog, &client, &machine, no_verify, &output)?;
            writeln!(out, "Saved {}", saved.display())?;
            Ok(())
        }
        Commands::Submit(cmd) => run_submit(cmd, out),
    }
}

/// Handle `config` subcommands. Every mutation is persisted by the store.
pub fn run_config(store: &mut ConfigStore, cmd: ConfigCommands, out: &mut impl Write) -> Result<()> {
    match cmd {
        ConfigCommands::Fresh {
            username,
            password,
            key,
            clean,
        } => {
            if clean {
                store.clear()?;
            }
            store.set(USERNAME, username)?;
            store.set(PASSWORD, password)?;
            store.set(API_KEY, key)?;
        }
        ConfigCommands::Username { username } => store.set(USERNAME, username)?,
        ConfigCommands::Password { password } => {
            let password = match password {
                Some(p) => p,
                None => ui::prompt_password()?,
            };
            store.set(PASSWORD, password)?;
        }
        ConfigCommands::Key { key } => store.set(API_KEY, key)?,
        ConfigCommands::Add { key, value } => store.set(&key, parse_value(&key, value))?,
        ConfigCommands::Remove { key } => {
            store.remove(&key)?;
        }
        ConfigCommands::Show => {
            writeln!(out, "# {}", store.path().display())?;
            for key in store.keys() {
                let shown = match (key, store.get(key)) {
                    (PASSWORD, Some(_)) => "********".to_string(),
                    (_, Some(Value::Array(items))) => format!("[{} items]", items.len()),
                    (_, Some(Value::String(s))) => s.clone(),
                    (_, Some(other)) => other.to_string(),
                    (_, None) => String::new(),
                };
                writeln!(out, "{key} = {shown}")?;
            }
        }
    }
    Ok(())
}

/// JSON literals (`true`, `3`, `["a"]`) keep their type, anything else is
/// stored as a plain string. Credentials are always strings.
fn parse_value(key: &str, raw: String) -> Value {
    if matches!(key, USERNAME | PASSWORD | API_KEY) {
        return Value::String(raw);
    }
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

pub fn run_list(
    store: &mut ConfigStore,
    client: &ApiClient,
    args: &ListArgs,
    out: &mut impl Write,
) -> Result<()> {
    let rows = Catalog::new(store, client).list(args.update)?;
    let filter = ListFilter {
        level: LevelFilter::parse(&args.level),
        pending: args.pending,
        finished: args.finished,
        limit: args.limit,
        descending: args.descendant,
    };
    writeln!(out, "{}", ui::render_table(&filter.apply(&rows)))?;
    Ok(())
}

fn run_submit(cmd: SubmitCommands, out: &mut impl Write) -> Result<()> {
    let payload = match cmd {
        SubmitCommands::Challenge {
            category,
            flag,
            description,
            solution,
            url,
        } => serde_json::to_value(ChallengeSubmission::prepare(
            &category,
            &flag,
            &description,
            &solution,
            url.as_deref(),
        )?)?,
        SubmitCommands::Machine {
            name,
            url,
            user_flag,
            root_flag,
            level,
            notes,
            writeup,
        } => serde_json::to_value(MachineSubmission::prepare(
            &name, &url, &user_flag, &root_flag, &level, &notes, &writeup,
        )?)?,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
    Ok(())
}
