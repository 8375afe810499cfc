//! landwatch CLI: land-use violation detection for regulated parcels.
//!
//! This binary provides the `landwatch` command with subcommands for
//! initialization, parcel registration, single-parcel classification,
//! encroachment checks, and batch runs. See `landwatch --help` for usage.

use clap::Parser;

mod cli_args;
mod commands;

use cli_args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let formatter: Box<dyn landwatch_output::OutputFormatter> = if cli.json {
        Box::new(landwatch_output::json::JsonFormatter)
    } else {
        Box::new(landwatch_output::human::HumanFormatter)
    };

    if !matches!(cli.command, Commands::Completion { .. }) {
        commands::workspace::init_logging(cli.verbose);
    }

    let exit_code = match cli.command {
        Commands::Init => commands::init::run(cli.verbose),
        Commands::Parcel(command) => commands::parcel::run(&*formatter, cli.verbose, command),
        Commands::Classify {
            parcel_id,
            observations,
            from,
            to,
        } => commands::classify::run(&*formatter, &parcel_id, &observations, from, to),
        Commands::Encroach {
            approved,
            detected,
            parcel_id,
        } => commands::encroach::run(&*formatter, &approved, &detected, &parcel_id),
        Commands::Run {
            parcels,
            from,
            to,
            job,
            observations,
            workers,
            created_by,
        } => commands::run::run(
            &*formatter,
            cli.verbose,
            commands::run::RunArgs {
                parcels,
                from,
                to,
                job,
                observations,
                workers,
                created_by,
            },
        ),
        Commands::Job(command) => commands::job::run(&*formatter, command),
        Commands::Verdicts { job, parcel } => commands::verdicts::run(&*formatter, job, parcel),
        Commands::Config { key, value } => commands::config::run(key, value),
        Commands::Completion { shell } => commands::completion::run(&shell),
    };

    std::process::exit(exit_code);
}
