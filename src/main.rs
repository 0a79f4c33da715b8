mod api;
mod auth;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod logging;
mod models;
mod named;
mod period;
mod settings;
mod summary;
mod transactions;

use clap::Parser;

use cli::{Cli, Commands, NamedCommands, TransactionsCommands};
use named::NamedKind;

fn run_named(kind: NamedKind, user: &str, command: NamedCommands) -> error::Result<()> {
    match command {
        NamedCommands::Add { name } => cli::named::add(kind, user, &name),
        NamedCommands::List => cli::named::list(kind, user),
        NamedCommands::Rename { name, new_name } => cli::named::rename(kind, user, &name, &new_name),
        NamedCommands::Delete { name } => cli::named::delete(kind, user, &name),
    }
}

fn main() {
    let cli = Cli::parse();
    let settings = settings::load_settings();
    logging::init_subscriber(&settings.log_level);
    let user = cli.user.unwrap_or(settings.user_id);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => run_named(NamedKind::Account, &user, command),
        Commands::Categories { command } => run_named(NamedKind::Category, &user, command),
        Commands::Transactions { command } => match command {
            TransactionsCommands::List { from, to, account } => {
                cli::transactions::list(&user, from.as_deref(), to.as_deref(), account.as_deref())
            }
            TransactionsCommands::Add(args) => cli::transactions::add(&user, &args),
            TransactionsCommands::Delete { id } => cli::transactions::delete(&user, &id),
        },
        Commands::Import(args) => cli::import::run(&user, &args),
        Commands::Summary { from, to, account } => {
            cli::summary::run(&user, from.as_deref(), to.as_deref(), account.as_deref())
        }
        Commands::Serve { host, port } => cli::serve::run(host, port),
        Commands::Token { hours } => cli::token::run(&user, hours),
        Commands::Status => cli::status::run(&user),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Demo => cli::demo::run(&user),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
