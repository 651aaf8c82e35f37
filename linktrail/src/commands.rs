use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("linktrail")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linktrail")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v debug, -vv trace)")
                .required(false)
                .global(true)
                .action(clap::ArgAction::Count),
        )
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about(
                    "Audit every link on one or more pages, following redirect chains. \
                Optionally expands same-site pages breadth-first.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("A seed URL to audit (repeatable)")
                        .value_parser(clap::value_parser!(Url))
                        .action(clap::ArgAction::Append)
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed URLs")
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(--"request" <PATH>)
                        .required(false)
                        .help(
                            "Read a JSON audit request ('-' for stdin) and print the tagged \
                        outcome as JSON",
                        )
                        .conflicts_with_all(["url", "hosts-file", "format", "output"]),
                )
                .arg(
                    arg!(-r --"recursive")
                        .required(false)
                        .help("Expand internal links breadth-first instead of auditing only the seeds")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"max-urls" <COUNT>)
                        .required(false)
                        .help("Stop after this many link results")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(--"max-depth" <DEPTH>)
                        .required(false)
                        .help("Deepest page depth to expand when recursive (seeds are depth 0)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(--"rate-limit" <RPS>)
                        .required(false)
                        .help("Maximum page requests per second")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("2.0"),
                )
                .arg(
                    arg!(--"any-domain")
                        .required(false)
                        .help("Allow expansion to hosts other than the seeds' hosts")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"max-redirects" <HOPS>)
                        .required(false)
                        .help("Give up on a redirect chain after this many requests")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"throttle-hops")
                        .required(false)
                        .help("Apply the rate limit to every hop inside a redirect chain")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown", "md"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("resolve")
                .about("Follow the redirect chain of a single URL hop by hop")
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("The URL to resolve")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"max-redirects" <HOPS>)
                        .required(false)
                        .help("Give up after this many requests")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                ),
        )
}
