//! Flag parsing tests

use clap::Parser;

use super::args::{Cli, Commands, NewsArgs, build_cli};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("headsong").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn test_cli_definition_is_consistent() {
    build_cli().debug_assert();
}

#[test]
fn test_headlines_with_news_options() {
    let cli = parse(&["headlines", "--region", "gb", "--max", "5", "--json"]);

    match cli.command {
        Commands::Headlines { news, json } => {
            assert_eq!(
                news,
                NewsArgs {
                    region: Some("gb".to_string()),
                    max: Some(5),
                }
            );
            assert!(json);
        }
        other => panic!("Expected headlines command, got {other:?}"),
    }
}

#[test]
fn test_select_accepts_comma_separated_indices() {
    let cli = parse(&["lyrics", "--select", "0,2"]);

    match cli.command {
        Commands::Lyrics { select, json, .. } => {
            assert_eq!(select, vec![0, 2]);
            assert!(!json);
        }
        other => panic!("Expected lyrics command, got {other:?}"),
    }
}

#[test]
fn test_select_is_required() {
    let err = Cli::try_parse_from(["headsong", "run"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_select_rejects_non_numeric_index() {
    let err = Cli::try_parse_from(["headsong", "lyrics", "--select", "0,x"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["run", "--select", "1", "--verbose", "--timeout", "30"]);

    assert!(cli.verbose);
    assert_eq!(cli.timeout, Some(30));
    assert_eq!(cli.command.name(), "run");
}

#[test]
fn test_doctor_flags() {
    let cli = parse(&["--config", "/tmp/headsong.toml", "doctor", "--probe"]);

    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/headsong.toml"))
    );
    assert!(matches!(
        cli.command,
        Commands::Doctor {
            probe: true,
            json: false
        }
    ));
    assert!(cli.command.news_args().is_none());
}

#[test]
fn test_news_args_exposed_for_pipeline_commands() {
    let cli = parse(&["lyrics", "--select", "0", "--max", "3"]);
    assert_eq!(cli.command.news_args().and_then(|n| n.max), Some(3));
}
