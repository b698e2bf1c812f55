use crate::CLAP_STYLING;
use clap::{arg, command};
use dedata_core::config::DEFAULT_CONFIG_PATH;
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("dedata")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("dedata")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .arg(
            arg!(-v --"verbose" "Log session activity to stderr")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes the default dedata configuration to your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location of the configuration file")
                        .default_value(DEFAULT_CONFIG_PATH),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrites any existing configuration at the specified location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("sites")
                .about("Lists the dashboards that a scan will visit")
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Configuration file (default: built-in site list)"),
                ),
        )
        .subcommand(
            command!("scan")
                .about(
                    "Opens every configured dashboard in a headless browser and reports the \
                data APIs it calls.",
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Configuration file (default: built-in site list)"),
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Scan this site instead of the configured ones (repeatable)")
                        .value_parser(clap::value_parser!(Url))
                        .action(clap::ArgAction::Append)
                        .conflicts_with("sites-file"),
                )
                .arg(
                    arg!(-H --"sites-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of site URLs to scan")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: text, api (flat JSON), page (grouped JSON)")
                        .value_parser(["text", "api", "page"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save output to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-site navigation timeout in seconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"chrome" <PATH>)
                        .required(false)
                        .help("Path to the Chromium executable")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"headful")
                        .required(false)
                        .help("Show the browser windows while scanning")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-sandbox")
                        .required(false)
                        .help("Launch Chromium without its sandbox (needed in some containers)")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
