//! tracebar - Entry Point

use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracebar::collector::{collect_all, ErrorReport, ExceptionsCollector, MessagesCollector};
use tracebar::config::ResolvedConfig;
use tracebar::model::error::{AppError, CollectError};
use tracing::{info, warn};

/// tracebar - normalize a JSONL log stream into debug-toolbar payloads
#[derive(Parser, Debug)]
#[command(name = "tracebar")]
#[command(version)]
#[command(about = "Collect JSONL log calls into message and exception payloads")]
pub struct Args {
    /// Path to JSONL log file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the diagnostics log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Editor link template, e.g. "editor://open?file=%f&line=%l"
    #[arg(long)]
    pub editor_link: Option<String>,

    /// Record each error's cause chain as separate exceptions
    #[arg(long)]
    pub chain: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = tracebar::config::load_config_with_precedence(args.config.clone())?;
        let merged = tracebar::config::merge_config(config_file);
        let with_env = tracebar::config::apply_env_overrides(merged);
        let chain_override = if args.chain { Some(true) } else { None };

        tracebar::config::apply_cli_overrides(
            with_env,
            args.editor_link.clone(),
            chain_override,
            args.log_file.clone(),
        )
    };

    tracebar::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let input_source = tracebar::input::detect_input_source(args.file.clone())?;
    let text = input_source.read_all()?;

    let payload = collect_log(&config, input_source.origin(), &text)?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&payload)
    } else {
        serde_json::to_string(&payload)
    }
    .map_err(CollectError::from)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;

    Ok(())
}

/// Feed every line of `text` through the collectors and return their payloads.
///
/// Valid lines become messages. Lines that fail to parse are captured as
/// `ParseError` exceptions pointing at `origin` and the offending line.
fn collect_log(
    config: &ResolvedConfig,
    origin: &Path,
    text: &str,
) -> Result<serde_json::Value, CollectError> {
    let mut messages = MessagesCollector::with_plain_formatter(config.messages_name.clone());
    let mut exceptions = ExceptionsCollector::from_config(config).build();

    for result in tracebar::parser::parse_lines(text.lines()) {
        match result {
            Ok(line) => {
                messages.log(&line.level, line.message, &line.context)?;
            }
            Err(err) => {
                warn!(line = err.line(), error = %err, "Skipping malformed log line");
                let line = u32::try_from(err.line()).unwrap_or(u32::MAX);
                let report = ErrorReport::new("ParseError", err.to_string(), origin, line);
                exceptions.capture(&report, false)?;
            }
        }
    }

    info!(
        messages = messages.own_messages().len(),
        exceptions = exceptions.exceptions().len(),
        "Log collected"
    );

    collect_all(&[&messages, &exceptions])
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["tracebar", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["tracebar", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["tracebar"]);
        assert_eq!(args.file, None);
        assert_eq!(args.config, None);
        assert_eq!(args.log_file, None);
        assert_eq!(args.editor_link, None);
        assert!(!args.chain);
        assert!(!args.pretty);
    }

    #[test]
    fn test_combined_flags() {
        let args = Args::parse_from([
            "tracebar",
            "app.jsonl",
            "--config",
            "/custom/config.toml",
            "--log-file",
            "/tmp/tracebar.log",
            "--editor-link",
            "editor://%f:%l",
            "--chain",
            "--pretty",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("app.jsonl")));
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/tracebar.log")));
        assert_eq!(args.editor_link, Some("editor://%f:%l".to_string()));
        assert!(args.chain);
        assert!(args.pretty);
    }

    #[test]
    fn test_chain_flag_flows_through_config_precedence_chain() {
        use tracebar::config::{apply_cli_overrides, merge_config, ConfigFile};

        let config_file = ConfigFile {
            chain_unroll: Some(false),
            messages_name: Some("log".to_string()),
            ..ConfigFile::default()
        };

        let merged = merge_config(Some(config_file));
        assert!(!merged.chain_unroll);
        assert_eq!(merged.messages_name, "log");

        let with_cli = apply_cli_overrides(merged, None, Some(true), None);
        assert!(with_cli.chain_unroll, "CLI --chain should override the file");
        assert_eq!(with_cli.messages_name, "log");
    }

    #[test]
    fn collect_log_splits_messages_and_parse_failures() {
        // GIVEN two valid lines around a malformed one
        let text = concat!(
            r#"{"level":"warning","message":"disk {pct} full","context":{"pct":97}}"#,
            "\n",
            "not json\n",
            r#"{"message":{"a":1}}"#,
            "\n",
        );

        // WHEN the log is collected with default names
        let payload =
            collect_log(&ResolvedConfig::default(), Path::new("<stdin>"), text).unwrap();

        // THEN messages keep order and the bad line is an exception at line 2
        let messages = &payload["messages"];
        assert_eq!(messages["count"], serde_json::json!(2));
        assert_eq!(messages["messages"][0]["text"], serde_json::json!("disk 97 full"));
        assert_eq!(messages["messages"][0]["label"], serde_json::json!("warning"));
        assert_eq!(messages["messages"][1]["is_plain_string"], serde_json::json!(false));

        let exceptions = &payload["exceptions"];
        assert_eq!(exceptions["count"], serde_json::json!(1));
        assert_eq!(exceptions["exceptions"][0]["kind"], serde_json::json!("ParseError"));
        assert_eq!(exceptions["exceptions"][0]["line"], serde_json::json!(2));
    }

    #[test]
    fn collect_log_uses_configured_names() {
        let config = ResolvedConfig {
            messages_name: "log".to_string(),
            exceptions_name: "errors".to_string(),
            ..ResolvedConfig::default()
        };

        let payload = collect_log(&config, Path::new("<stdin>"), "").unwrap();

        assert_eq!(payload["log"]["count"], serde_json::json!(0));
        assert_eq!(payload["errors"]["count"], serde_json::json!(0));
    }

    #[test]
    fn collect_log_rejects_equal_collector_names() {
        let config = ResolvedConfig {
            messages_name: "debug".to_string(),
            exceptions_name: "debug".to_string(),
            ..ResolvedConfig::default()
        };

        let result = collect_log(&config, Path::new("<stdin>"), r#"{"message":"hi"}"#);

        assert!(matches!(result, Err(CollectError::DuplicateName { .. })));
    }
}
