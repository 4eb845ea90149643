mod args;
mod logging;
mod op;
mod ops;
mod state;

use std::io::Write;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Create, Creater, Delete, Exists, Get, GetAcl, Ls, Lsr, Rmr, Set, SetAcl, Version};

command_enum! {
    (Exists, Exists),
    (Get, Get),
    (Ls, Ls),
    (Lsr, Lsr),
    (Create, Create),
    (Creater, Creater),
    (Set, Set),
    (Delete, Delete),
    (Rmr, Rmr),
    (Getacl, GetAcl),
    (Setacl, SetAcl),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    logging::init_logging(logging::default_level(args.verbose, args.debug));

    let ctx = match op::OpContext::new(&args) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            let output = output.to_string();
            if !output.is_empty() {
                let mut stdout = std::io::stdout().lock();
                let written = if args.omit_newline {
                    write!(stdout, "{}", output)
                } else {
                    writeln!(stdout, "{}", output)
                };
                if let Err(e) = written.and_then(|_| stdout.flush()) {
                    tracing::error!("failed to write output: {}", e);
                    std::process::exit(1);
                }
            }
            std::process::exit(0);
        }
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
