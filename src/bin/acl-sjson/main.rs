//! acl-sjson - convert ACL tracks between binary and SJSON files.

mod options;

use std::io::IsTerminal;
use std::process;

use acl_sjson::Converter;
use options::{Action, Options, Verbosity};
use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::new(verbosity.directive());
    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .with(filter);
    // Keep an already installed subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn print_usage() {
    println!(
        "acl-sjson {} - ACL track converter (built {} {})",
        env!("ACL_SJSON_BUILD_ID"),
        env!("ACL_SJSON_BUILD_DATE"),
        env!("ACL_SJSON_BUILD_TIME")
    );
    println!();
    println!("USAGE:");
    println!("    acl-sjson --convert <input_file> <output_file> [--target <version>]");
    println!("    acl-sjson --info <input_file>");
    println!();
    println!("Human readable files end with the *.acl.sjson extension.");
    println!("Binary files end with the *.acl extension.");
    println!();
    println!("OPTIONS:");
    println!("    --target <version>   Output revision: 2.0 or 2.1 (default: input revision)");
    println!("    -v, --verbose        Show debug output");
    println!("    -vv, --trace         Show trace output (very verbose)");
    println!("    -q, --quiet          Only show errors");
    println!();
    println!("EXAMPLES:");
    println!("    acl-sjson --convert walk.acl.sjson walk.acl");
    println!("    acl-sjson --convert walk.acl walk_20.acl --target 2.0");
    println!("    acl-sjson --info walk.acl");
}

fn main() {
    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    init_logging(options.verbosity);
    for arg in &options.unknown {
        warn!("Unknown argument: {arg}");
    }

    let Some(action) = options.action else {
        print_usage();
        process::exit(1);
    };

    let converter = Converter::new();
    let result = match action {
        Action::Convert { input, output } => converter.convert(&input, &output, options.target),
        Action::Info { input } => converter.info(&input).map(|report| print!("{report}")),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
