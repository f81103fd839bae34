//! Command-line parsing tests.

use chrono::NaiveDate;
use clap::Parser;
use dotoday::cli::commands::goal::GoalCommands;
use dotoday::cli::{Cli, Commands};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["dotoday", "goal", "--user", "alice", "stats", "--json", "-c", "custom.yaml"]);
    assert!(cli.json);
    assert_eq!(cli.config.unwrap().to_str(), Some("custom.yaml"));

    let Commands::Goal(args) = cli.command else {
        panic!("expected goal command");
    };
    assert_eq!(args.user.as_deref(), Some("alice"));
    assert!(matches!(args.command, GoalCommands::Stats));
}

#[test]
fn test_create_with_options() {
    let cli = parse(&[
        "dotoday",
        "goal",
        "create",
        "Read 20 pages",
        "--category",
        "learning",
        "-f",
        "daily",
        "--target",
        "2",
        "--public",
        "-u",
        "alice",
    ]);

    let Commands::Goal(args) = cli.command else {
        panic!("expected goal command");
    };
    match args.command {
        GoalCommands::Create {
            title,
            category,
            frequency,
            target,
            public,
            description,
            deadline,
        } => {
            assert_eq!(title, "Read 20 pages");
            assert_eq!(category.as_deref(), Some("learning"));
            assert_eq!(frequency.as_deref(), Some("daily"));
            assert_eq!(target, Some(2));
            assert!(public);
            assert!(description.is_none());
            assert!(deadline.is_none());
        }
        other => panic!("expected create, got {other:?}"),
    }
}

#[test]
fn test_complete_with_backdated_date() {
    let cli = parse(&["dotoday", "goal", "complete", "1a2b3c4d", "--date", "2024-02-29"]);
    let Commands::Goal(args) = cli.command else {
        panic!("expected goal command");
    };
    match args.command {
        GoalCommands::Complete { id, date } => {
            assert_eq!(id, "1a2b3c4d");
            assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29));
        }
        other => panic!("expected complete, got {other:?}"),
    }
}

#[test]
fn test_invalid_date_is_rejected() {
    assert!(Cli::try_parse_from(["dotoday", "goal", "complete", "abc", "--date", "2024-13-01"]).is_err());
}

#[test]
fn test_graph_days() {
    let cli = parse(&["dotoday", "goal", "graph", "abc", "--days", "30"]);
    let Commands::Goal(args) = cli.command else {
        panic!("expected goal command");
    };
    assert!(matches!(args.command, GoalCommands::Graph { days: Some(30), .. }));
}

#[test]
fn test_serve_overrides() {
    let cli = parse(&["dotoday", "serve", "--host", "0.0.0.0", "-p", "9090"]);
    let Commands::Serve(args) = cli.command else {
        panic!("expected serve command");
    };
    assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
    assert_eq!(args.port, Some(9090));
}

#[test]
fn test_init_force() {
    let cli = parse(&["dotoday", "init", "--force"]);
    assert!(matches!(cli.command, Commands::Init(args) if args.force));
}

#[test]
fn test_missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["dotoday"]).is_err());
    assert!(Cli::try_parse_from(["dotoday", "goal"]).is_err());
}
