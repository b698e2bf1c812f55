use commands::command_argument_builder;
use dedata::handlers::{handle_init, handle_scan, handle_sites};
use dedata_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Banner goes to stdout, so keep it out of JSON runs and --quiet
    let json_scan = matches!(
        chosen_command.subcommand(),
        Some(("scan", scan)) if scan.get_one::<String>("format").is_some_and(|f| f != "text")
            && scan.get_one::<std::path::PathBuf>("output").is_none()
    );
    if !quiet && !json_scan {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("sites", primary_command)) => handle_sites(primary_command),
        Some(("scan", primary_command)) => handle_scan(primary_command, quiet).await,
        // No subcommand provided, just show the banner
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
