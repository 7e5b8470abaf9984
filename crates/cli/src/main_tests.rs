use super::*;
use clap::Parser;

#[test]
fn cli_parses_create_with_defaults() {
    let cli = Cli::try_parse_from(["lumenflow", "create", "WU-1", "Ops", "Deploy service"]).unwrap();
    match cli.command {
        Commands::Create(args) => {
            assert_eq!(args.priority, "P2");
            assert_eq!(args.mode, "worktree");
        }
        _ => panic!("expected Create"),
    }
}

#[test]
fn cli_parses_claim_with_session() {
    let cli = Cli::try_parse_from(["lumenflow", "claim", "WU-1", "--session", "agent-7"]).unwrap();
    match cli.command {
        Commands::Claim(args) => assert_eq!(args.session.as_deref(), Some("agent-7")),
        _ => panic!("expected Claim"),
    }
}

#[test]
fn cli_rejects_block_without_reason() {
    let err = Cli::try_parse_from(["lumenflow", "block", "WU-1"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}
