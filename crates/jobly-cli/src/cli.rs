use jobly::{JobFilter, NewJob};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Malformed command line; maps to exit code 2.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UsageError(pub String);

macro_rules! usage {
    ($($arg:tt)*) => {
        return Err(UsageError(format!($($arg)*)).into())
    };
}

pub const DEFAULT_CONFIG: &str = "jobly.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// `--config`, if given explicitly
    pub config: Option<PathBuf>,
    /// `--database`, overriding `database.url`
    pub database: Option<String>,
}

impl GlobalArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Init,
    Setup,
    List(JobFilter),
    Get(i32),
    Create(NewJob),
    Update { id: i32, payload: serde_json::Value },
    Delete(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub global: GlobalArgs,
    pub command: Command,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Invocation> {
    let mut global = GlobalArgs::default();
    let mut rest: Vec<&str> = Vec::new();

    let mut it = args.iter().skip(1).map(|s| s.as_str());
    while let Some(token) = it.next() {
        match token {
            "--config" => {
                let Some(v) = it.next() else {
                    usage!("--config requires a value");
                };
                global.config = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--config=") => {
                global.config = Some(PathBuf::from(token.trim_start_matches("--config=")));
            }
            "--database" => {
                let Some(v) = it.next() else {
                    usage!("--database requires a value");
                };
                global.database = Some(v.to_string());
            }
            _ if token.starts_with("--database=") => {
                global.database = Some(token.trim_start_matches("--database=").to_string());
            }
            _ => rest.push(token),
        }
    }

    let command = parse_command(&rest)?;
    Ok(Invocation { global, command })
}

fn parse_command(tokens: &[&str]) -> anyhow::Result<Command> {
    let Some((first, rest)) = tokens.split_first() else {
        return Ok(Command::Help);
    };
    if rest.iter().any(|t| matches!(*t, "-h" | "--help")) {
        return Ok(Command::Help);
    }

    match *first {
        "help" | "-h" | "--help" => Ok(Command::Help),
        "init" => no_args("init", rest).map(|_| Command::Init),
        "setup" => no_args("setup", rest).map(|_| Command::Setup),
        "list" => parse_list(rest).map(Command::List),
        "get" => Ok(Command::Get(single_id("get", rest)?)),
        "delete" => Ok(Command::Delete(single_id("delete", rest)?)),
        "create" => parse_create(rest).map(Command::Create),
        "update" => parse_update(rest),
        other => usage!("unknown command: {other}"),
    }
}

fn no_args(command: &str, rest: &[&str]) -> anyhow::Result<()> {
    if let Some(extra) = rest.first() {
        usage!("unexpected argument for {command}: {extra}");
    }
    Ok(())
}

fn parse_id(command: &str, raw: &str) -> anyhow::Result<i32> {
    match raw.parse() {
        Ok(id) => Ok(id),
        Err(_) => usage!("{command}: invalid job id: {raw}"),
    }
}

fn single_id(command: &str, rest: &[&str]) -> anyhow::Result<i32> {
    match rest {
        [raw] => parse_id(command, raw),
        [] => usage!("{command} requires a job id"),
        [_, extra, ..] => usage!("unexpected argument for {command}: {extra}"),
    }
}

fn value_of<'a>(
    flag: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<&'a str> {
    match it.next() {
        Some(v) => Ok(v),
        None => usage!("{flag} requires a value"),
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, raw: &str) -> anyhow::Result<T> {
    match raw.parse() {
        Ok(v) => Ok(v),
        Err(_) => usage!("{flag}: invalid number: {raw}"),
    }
}

fn parse_list(rest: &[&str]) -> anyhow::Result<JobFilter> {
    let mut filter = JobFilter::new();
    let mut it = rest.iter().copied();

    while let Some(token) = it.next() {
        match token {
            "--min-salary" => {
                let v = value_of(token, &mut it)?;
                filter.min_salary = Some(parse_number(token, v)?);
            }
            "--has-equity" => filter.has_equity = Some(true),
            "--title" => filter.title = Some(value_of(token, &mut it)?.to_string()),
            other => usage!("unexpected argument for list: {other}"),
        }
    }

    Ok(filter)
}

fn parse_create(rest: &[&str]) -> anyhow::Result<NewJob> {
    let mut title = None;
    let mut company = None;
    let mut salary = None;
    let mut equity = None;
    let mut it = rest.iter().copied();

    while let Some(token) = it.next() {
        match token {
            "--title" => title = Some(value_of(token, &mut it)?.to_string()),
            "--company" => company = Some(value_of(token, &mut it)?.to_string()),
            "--salary" => {
                let v = value_of(token, &mut it)?;
                salary = Some(parse_number::<i32>(token, v)?);
            }
            "--equity" => {
                let v = value_of(token, &mut it)?;
                equity = Some(parse_number::<Decimal>(token, v)?);
            }
            other => usage!("unexpected argument for create: {other}"),
        }
    }

    let Some(title) = title else {
        usage!("create requires --title");
    };
    let Some(company_handle) = company else {
        usage!("create requires --company");
    };

    Ok(NewJob {
        title,
        salary,
        equity,
        company_handle,
    })
}

fn parse_update(rest: &[&str]) -> anyhow::Result<Command> {
    let [raw_id, raw_payload] = rest else {
        usage!("usage: jobly update <id> <json-object>");
    };
    let id = parse_id("update", raw_id)?;
    let payload: serde_json::Value = match serde_json::from_str(raw_payload) {
        Ok(v) => v,
        Err(e) => usage!("update: payload is not valid JSON: {e}"),
    };
    Ok(Command::Update { id, payload })
}

pub fn print_help() {
    println!(
        "\
jobly - query and edit the jobs table

USAGE:
  jobly [OPTIONS] <COMMAND>

COMMANDS:
  init                          Write a jobly.toml template
  setup                         Create the companies and jobs tables
  list [FILTERS]                List jobs, ordered by title
  get <ID>                      Show one job with its company
  create --title <T> --company <HANDLE> [--salary <N>] [--equity <E>]
                                Create a job
  update <ID> <JSON>            Apply a partial update, e.g. '{{\"salary\": 1000}}'
  delete <ID>                   Delete a job
  help                          Print help

FILTERS:
  --min-salary <N>              Only jobs paying at least N
  --has-equity                  Only jobs with non-zero equity
  --title <TEXT>                Case-insensitive title substring

OPTIONS:
  --config <FILE>               Config file path (default: jobly.toml)
  --database <URL>              Override database.url from config
  -h, --help                    Print help

EXIT CODES:
  0 ok, 2 invalid input, 3 not found, 4 conflict, 1 other errors"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("jobly")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    fn parse(list: &[&str]) -> anyhow::Result<Invocation> {
        parse_args(&args(list))
    }

    fn is_usage(err: &anyhow::Error) -> bool {
        err.downcast_ref::<UsageError>().is_some()
    }

    #[test]
    fn no_arguments_prints_help() {
        assert_eq!(parse(&[]).unwrap().command, Command::Help);
        assert_eq!(parse(&["list", "--help"]).unwrap().command, Command::Help);
    }

    #[test]
    fn global_options_anywhere() {
        let inv = parse(&["get", "7", "--config", "db.toml", "--database=postgres://x/y"]).unwrap();

        assert_eq!(inv.command, Command::Get(7));
        assert_eq!(inv.global.config_path(), PathBuf::from("db.toml"));
        assert_eq!(inv.global.database.as_deref(), Some("postgres://x/y"));
    }

    #[test]
    fn default_config_path() {
        let inv = parse(&["setup"]).unwrap();
        assert_eq!(inv.global.config, None);
        assert_eq!(inv.global.config_path(), PathBuf::from("jobly.toml"));
    }

    #[test]
    fn list_filters() {
        let inv = parse(&["list", "--min-salary", "90000", "--title", "Engineer"]).unwrap();
        assert_eq!(
            inv.command,
            Command::List(JobFilter::new().min_salary(90000).title("Engineer"))
        );

        let inv = parse(&["list", "--has-equity"]).unwrap();
        assert_eq!(inv.command, Command::List(JobFilter::new().has_equity(true)));

        let inv = parse(&["list"]).unwrap();
        assert_eq!(inv.command, Command::List(JobFilter::new()));
    }

    #[test]
    fn list_rejects_bad_numbers() {
        let err = parse(&["list", "--min-salary", "lots"]).unwrap_err();
        assert!(is_usage(&err));
    }

    #[test]
    fn create_requires_title_and_company() {
        let inv = parse(&[
            "create", "--title", "j1", "--company", "c1", "--salary", "100", "--equity", "0.1",
        ])
        .unwrap();
        let Command::Create(job) = inv.command else {
            panic!("expected create");
        };
        assert_eq!(job.title, "j1");
        assert_eq!(job.company_handle, "c1");
        assert_eq!(job.salary, Some(100));
        assert_eq!(job.equity, Some(Decimal::new(1, 1)));

        assert!(is_usage(&parse(&["create", "--title", "j1"]).unwrap_err()));
        assert!(is_usage(&parse(&["create", "--company", "c1"]).unwrap_err()));
    }

    #[test]
    fn update_takes_id_and_json() {
        let inv = parse(&["update", "3", r#"{"title": "New", "salary": 500}"#]).unwrap();
        let Command::Update { id, payload } = inv.command else {
            panic!("expected update");
        };
        assert_eq!(id, 3);
        assert_eq!(payload, serde_json::json!({"title": "New", "salary": 500}));

        assert!(is_usage(&parse(&["update", "3", "{not json"]).unwrap_err()));
        assert!(is_usage(&parse(&["update", "3"]).unwrap_err()));
    }

    #[test]
    fn id_commands_validate_ids() {
        assert_eq!(parse(&["delete", "12"]).unwrap().command, Command::Delete(12));
        assert!(is_usage(&parse(&["get", "abc"]).unwrap_err()));
        assert!(is_usage(&parse(&["get"]).unwrap_err()));
        assert!(is_usage(&parse(&["delete", "1", "2"]).unwrap_err()));
    }

    #[test]
    fn unknown_command_is_usage_error() {
        let err = parse(&["frobnicate"]).unwrap_err();
        assert!(is_usage(&err));
        assert_eq!(err.to_string(), "unknown command: frobnicate");
    }

    #[test]
    fn missing_option_values() {
        assert!(is_usage(&parse(&["list", "--config"]).unwrap_err()));
        assert!(is_usage(&parse(&["list", "--title"]).unwrap_err()));
    }
}
