use std::cell::RefCell;
use std::rc::Rc;

use subcmd::{
    Command, CommandContext, Dispatcher, FnCommand, OptionSet, OutcomeKind, SetupError,
    TriggerPolicy, UsageReason, NO_DESCRIPTION, USAGE_STATUS,
};

type Calls = Rc<RefCell<Vec<Vec<String>>>>;

fn recording(calls: &Calls, arg_names: &str) -> impl Command {
    let calls = calls.clone();
    FnCommand::new(arg_names, move |args: &[String], _ctx: &CommandContext| {
        calls.borrow_mut().push(args.to_vec());
        Ok(())
    })
}

fn noop(_: &mut OptionSet) -> impl Command {
    FnCommand::new("", |_: &[String], _: &CommandContext| Ok(()))
}

#[test]
fn test_duplicate_registration_is_fatal() {
    let result = Dispatcher::builder()
        .command("build", noop)
        .unwrap()
        .command("build", noop);

    match result {
        Err(SetupError::DuplicateCommand(name)) => assert_eq!(name, "build"),
        other => panic!("expected duplicate error, got {other:?}"),
    }
}

#[test]
fn test_no_commands_is_fatal() {
    let err = Dispatcher::builder().build().unwrap_err();
    assert!(matches!(err, SetupError::NoCommands));
    assert_eq!(err.to_string(), "program has no commands defined");
}

#[test]
fn test_positional_args_reach_execute() {
    let calls = Calls::default();
    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .command("build", |_| recording(&calls, "<a> <b>"))
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["build", "x", "y"]);

    assert_eq!(outcome.status(), 0);
    assert!(!outcome.is_usage());
    assert!(outcome.diagnostics().is_empty());
    assert_eq!(outcome.command(), Some("build"));
    assert_eq!(*calls.borrow(), vec![vec!["x".to_string(), "y".to_string()]]);
}

#[test]
fn test_empty_args_report_no_command() {
    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .command("build", noop)
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(Vec::<String>::new());

    assert_eq!(outcome.status(), USAGE_STATUS);
    assert_eq!(outcome.kind(), &OutcomeKind::Usage(UsageReason::NoCommand));
    assert!(outcome.diagnostics().starts_with("No command specified.\n"));
    assert!(outcome
        .diagnostics()
        .contains("Usage:\n\n  prog [globalopts] cmd [cmdopts] [cmdargs]\n"));
}

#[test]
fn test_unknown_command() {
    let calls = Calls::default();
    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .command("build", |_| recording(&calls, ""))
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["nope"]);

    assert_eq!(outcome.status(), 2);
    assert!(outcome.diagnostics().starts_with("Unknown command: nope\nUsage:\n"));
    assert!(outcome.diagnostics().contains("Commands:\n  build: "));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_bad_command_option_prints_command_usage() {
    let calls = Calls::default();
    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .command("cmd", |opts| {
            opts.flag("verbose", "talk more");
            recording(&calls, "<argnames>")
        })
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["cmd", "-verbose", "-unknown"]);
    let text = outcome.diagnostics();

    assert_eq!(outcome.status(), 2);
    assert_eq!(
        outcome.kind(),
        &OutcomeKind::CommandUsage {
            command: "cmd".into(),
            help: false
        }
    );
    assert!(text.starts_with("flag provided but not defined: -unknown\nUsage:\n"));
    assert!(text.contains("  prog [globalopts] cmd [cmdopts] <argnames>\n"));
    assert!(text.contains("cmd options:\n  -verbose\n    \ttalk more (default false)\n"));
    assert!(!text.contains("Commands:"));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_command_without_options_omits_cmdopts() {
    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .command("cat", |_| {
            FnCommand::new("<file>", |_: &[String], _: &CommandContext| Ok(()))
        })
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["cat", "-n", "a.txt"]);

    assert_eq!(outcome.status(), 2);
    assert!(outcome
        .diagnostics()
        .ends_with("Usage:\n\n  prog [globalopts] cat <file>\n\n"));
}

#[test]
fn test_command_help_has_no_error_line() {
    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .command("build", |opts| {
            opts.int("jobs", 1, "parallel jobs");
            FnCommand::new("<target>", |_: &[String], _: &CommandContext| Ok(()))
        })
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["build", "-help"]);

    assert_eq!(outcome.status(), 2);
    assert_eq!(
        outcome.kind(),
        &OutcomeKind::CommandUsage {
            command: "build".into(),
            help: true
        }
    );
    assert!(outcome.diagnostics().starts_with("Usage:\n"));
}

#[test]
fn test_global_help_and_global_errors() {
    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .globals(|opts| {
            opts.flag("quiet", "less output");
        })
        .command("build", noop)
        .unwrap()
        .build()
        .unwrap();

    let help = dispatcher.run_from(["-h"]);
    assert_eq!(help.status(), 2);
    assert_eq!(help.kind(), &OutcomeKind::Usage(UsageReason::Help));
    assert!(help.diagnostics().starts_with("Usage:\n"));
    assert!(help
        .diagnostics()
        .ends_with("\nGlobal options:\n  -quiet\n    \tless output (default false)\n"));

    let bad = dispatcher.run_from(["-loud", "build"]);
    assert_eq!(bad.status(), 2);
    assert_eq!(bad.kind(), &OutcomeKind::Usage(UsageReason::InvalidGlobals));
    assert!(bad
        .diagnostics()
        .starts_with("flag provided but not defined: -loud\nUsage:\n"));
}

#[test]
fn test_same_option_name_in_different_scopes() {
    let seen = Rc::new(RefCell::new(None));
    let seen_clone = seen.clone();

    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .globals(|opts| {
            opts.string("name", "global-default", "global name");
        })
        .command("show", move |opts| {
            opts.string("name", "cmd-default", "command name");
            FnCommand::new("", move |_: &[String], ctx: &CommandContext| {
                *seen_clone.borrow_mut() = Some((
                    ctx.globals.string("name").map(String::from),
                    ctx.options.string("name").map(String::from),
                ));
                Ok(())
            })
        })
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["-name", "g", "show", "-name", "c"]);

    assert_eq!(outcome.status(), 0);
    assert_eq!(
        *seen.borrow(),
        Some((Some("g".to_string()), Some("c".to_string())))
    );
}

#[test]
fn test_execution_error_keeps_status_zero() {
    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .command("fail", |_| {
            FnCommand::new("", |_: &[String], _: &CommandContext| {
                Err(anyhow::anyhow!("boom"))
            })
        })
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["fail"]);

    assert_eq!(outcome.status(), 0);
    assert_eq!(outcome.diagnostics(), "boom\n");
    assert_eq!(
        outcome.kind(),
        &OutcomeKind::Executed {
            command: "fail".into(),
            failed: true
        }
    );
}

#[test]
fn test_usage_lists_commands_sorted() {
    let mut builder = Dispatcher::builder().program("prog");
    for name in ["zeta", "alpha", "mid", "beta"] {
        builder = builder.command(name, noop).unwrap();
    }
    let dispatcher = builder.build().unwrap();

    let usage = dispatcher.usage();
    let listed: Vec<&str> = usage
        .lines()
        .skip_while(|line| *line != "Commands:")
        .skip(1)
        .take_while(|line| line.starts_with("  "))
        .map(|line| line.trim_start().split(':').next().unwrap())
        .collect();

    assert_eq!(listed, vec!["alpha", "beta", "mid", "zeta"]);
}

#[test]
fn test_description_or_placeholder() {
    let dispatcher = Dispatcher::builder()
        .program("prog")
        .command("plain", noop)
        .unwrap()
        .command("fancy", |_| {
            FnCommand::new("", |_: &[String], _: &CommandContext| Ok(()))
                .with_description("does fancy things")
        })
        .unwrap()
        .build()
        .unwrap();

    let usage = dispatcher.usage();
    assert!(usage.contains("  fancy: does fancy things\n"));
    assert!(usage.contains(&format!("  plain: {NO_DESCRIPTION}\n")));
}

#[test]
fn test_trigger_invoke_skips_dispatch() {
    let fired = Rc::new(RefCell::new(0));
    let fired_clone = fired.clone();
    let calls = Calls::default();

    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .version(move || *fired_clone.borrow_mut() += 1)
        .command("build", |_| recording(&calls, ""))
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["-version", "build"]);

    assert_eq!(outcome.status(), 0);
    assert_eq!(
        outcome.kind(),
        &OutcomeKind::Triggered(vec!["version".into()])
    );
    assert_eq!(*fired.borrow(), 1);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_trigger_manual_leaves_it_to_the_host() {
    let fired = Rc::new(RefCell::new(0));
    let fired_clone = fired.clone();
    let saw_version = Rc::new(RefCell::new(false));
    let saw_clone = saw_version.clone();

    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .trigger_policy(TriggerPolicy::Manual)
        .version(move || *fired_clone.borrow_mut() += 1)
        .command("build", move |_| {
            FnCommand::new("", move |_: &[String], ctx: &CommandContext| {
                *saw_clone.borrow_mut() = ctx.globals.flag("version");
                Ok(())
            })
        })
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher.run_from(["-version", "build"]);

    assert_eq!(outcome.command(), Some("build"));
    assert_eq!(*fired.borrow(), 0);
    assert!(*saw_version.borrow());
}

#[test]
fn test_trigger_options_are_listed_as_globals() {
    let dispatcher = Dispatcher::builder()
        .program("prog")
        .version(|| {})
        .command("build", noop)
        .unwrap()
        .build()
        .unwrap();

    assert!(dispatcher
        .usage()
        .contains("Global options:\n  -version\n    \tshow version (default false)\n"));
}

#[test]
fn test_command_options_are_parsed_after_name() {
    let jobs = Rc::new(RefCell::new(None));
    let jobs_clone = jobs.clone();
    let calls = Calls::default();
    let calls_clone = calls.clone();

    let mut dispatcher = Dispatcher::builder()
        .program("prog")
        .command("build", move |opts| {
            opts.int("jobs", 1, "parallel jobs");
            FnCommand::new("<target>", move |args: &[String], ctx: &CommandContext| {
                *jobs_clone.borrow_mut() = ctx.options.int("jobs");
                calls_clone.borrow_mut().push(args.to_vec());
                Ok(())
            })
        })
        .unwrap()
        .build()
        .unwrap();

    dispatcher.run_from(["build", "-jobs=3", "release", "-jobs", "9"]);

    assert_eq!(*jobs.borrow(), Some(3));
    assert_eq!(
        *calls.borrow(),
        vec![vec![
            "release".to_string(),
            "-jobs".to_string(),
            "9".to_string()
        ]]
    );
}
