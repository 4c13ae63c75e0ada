use crate::CLAP_STYLING;
use clap::{ArgGroup, arg, command};

fn crawl_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-u --"url" <URL>)
            .required(false)
            .help("Address of the first mantela document. Nothing is crawled without it."),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Per-document request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("10"),
    )
    .arg(
        arg!(--"max-documents" <NUM>)
            .required(false)
            .help("Stop after fetching this many addresses, failed ones included (default: crawl until the frontier is empty)")
            .value_parser(clap::value_parser!(usize)),
    )
    .arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Save report to file (default: display to screen)")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("mandala")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("mandala")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            crawl_args(
                command!("crawl")
                    .about("Crawl a mantela federation breadth-first and report its topology."),
            )
            .arg(
                arg!(-f --"format" <FORMAT>)
                    .required(false)
                    .help("Report format: text, json, dot")
                    .value_parser(["text", "json", "dot"])
                    .default_value("text"),
            ),
        )
        .subcommand(
            crawl_args(
                command!("route")
                    .about(
                        "Crawl a federation, then find the route (and number to dial) from a \
                    provider to an extension.",
                    ),
            )
            .arg(
                arg!(--"from" <PROVIDER_ID>)
                    .required(true)
                    .help("Identifier of the provider to start from"),
            )
            .arg(
                arg!(--"to" <NODE_ID>)
                    .required(false)
                    .help("Id of the target node, as shown in a json or dot report"),
            )
            .arg(
                arg!(-e --"extension" <NUMBER>)
                    .required(false)
                    .help("Extension number of the target, advertised by --provider")
                    .requires("provider"),
            )
            .arg(
                arg!(-p --"provider" <PROVIDER_ID>)
                    .required(false)
                    .help("Identifier of the provider advertising --extension")
                    .requires("extension"),
            )
            .group(
                ArgGroup::new("target")
                    .args(["to", "extension"])
                    .required(true)
                    .multiple(false),
            )
            .arg(
                arg!(--"max-provider-hops" <NUM>)
                    .required(false)
                    .help("Maximum number of providers a route may pass through")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("2"),
            )
            .arg(
                arg!(-f --"format" <FORMAT>)
                    .required(false)
                    .help("Report format: text, json, dot")
                    .value_parser(["text", "json", "dot"])
                    .default_value("text"),
            ),
        )
}
