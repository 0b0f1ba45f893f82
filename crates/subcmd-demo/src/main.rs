//! Sample host program for subcmd.
//!
//! A small tool with three commands, a `-quiet` global option and a
//! `-version` trigger. Command output goes to stdout; diagnostics and usage
//! go to stderr. Set `RUST_LOG=debug` to watch the dispatcher.

use std::io::Write;

use anyhow::Context;
use subcmd::{Command, CommandContext, Dispatcher, FnCommand, OptionSet, SetupError};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `echo [-n] [-sep string] <word>...`
struct Echo;

impl Command for Echo {
    fn execute(&mut self, args: &[String], ctx: &CommandContext) -> anyhow::Result<()> {
        let sep = ctx.options.string("sep").unwrap_or(" ");
        let mut out = args.join(sep);
        if !ctx.options.flag("n") {
            out.push('\n');
        }

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(out.as_bytes())?;
        Ok(())
    }

    fn arg_names(&self) -> &str {
        "<word>..."
    }

    fn describe(&self) -> Option<&str> {
        Some("print the arguments")
    }
}

fn echo(opts: &mut OptionSet) -> Echo {
    opts.flag("n", "do not print the trailing newline")
        .string("sep", " ", "join words with `text`");
    Echo
}

/// `sum [-base uint] <number>...`, left without a description on purpose to
/// show the placeholder in the command list.
fn sum(opts: &mut OptionSet) -> impl Command {
    opts.uint("base", 10, "radix of the numbers");
    FnCommand::new("<number>...", |args: &[String], ctx: &CommandContext| {
        let base = ctx.options.uint("base").unwrap_or(10);
        let radix = u32::try_from(base)
            .ok()
            .filter(|radix| (2..=36).contains(radix))
            .with_context(|| format!("unsupported base {base}"))?;

        let mut total: i64 = 0;
        for arg in args {
            let value = i64::from_str_radix(arg, radix)
                .with_context(|| format!("not a base-{radix} number: {arg:?}"))?;
            total = total.checked_add(value).context("sum overflows")?;
        }

        if !ctx.globals.flag("quiet") {
            eprintln!("adding {} numbers", args.len());
        }
        println!("{total}");
        Ok(())
    })
}

fn upper(_opts: &mut OptionSet) -> impl Command {
    FnCommand::new("<text>...", |args: &[String], _ctx: &CommandContext| {
        println!("{}", args.join(" ").to_uppercase());
        Ok(())
    })
    .with_description("print the arguments in upper case")
}

fn build_dispatcher() -> Result<Dispatcher, SetupError> {
    Dispatcher::builder()
        .globals(|opts| {
            opts.flag("quiet", "suppress progress messages");
        })
        .version(|| println!("subcmd-demo {VERSION}"))
        .command("echo", echo)?
        .command("sum", sum)?
        .command("upper", upper)?
        .build()
}

fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(err) = result {
        eprintln!("failed to initialize logging: {err}");
    }
}

fn main() {
    init_tracing();

    let mut dispatcher =
        build_dispatcher().unwrap_or_else(|err| panic!("invalid command setup: {err}"));
    dispatcher.run().finish();
}
