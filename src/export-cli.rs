//! A simple CLI tool for exporting votes from a data directory as CSV.
//! This reads the same JSON documents the server writes, so it can be run
//! against a backup or a stopped server.

use std::fmt::{Display, Formatter};
use std::path::Path;

use clap::{Arg, ArgAction, ArgMatches, Command};

use school_election_backend::model::{
    directory::{Directory, Settings},
    export::{to_csv, ExportBy},
    store::{Backend, JsonFileBackend, StoreError},
};

const PROGRAM_NAME: &str = "export-votes";

const ABOUT_TEXT: &str = "Export votes from a school election data directory as CSV.

EXIT CODES:
     0: Export succeeded.
   255: Ran successfully, but no votes matched.
 Other: Error.";

const DATA_DIR: &str = "DATA_DIR";
const BY: &str = "by";
const VALUE: &str = "value";
const YEAR: &str = "year";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(DATA_DIR)
                .help("The server's data directory, as configured by `data_dir`")
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(BY)
                .long(BY)
                .help("Attribute to filter votes on")
                .value_parser(["class", "dorm", "post"])
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(VALUE)
                .long(VALUE)
                .help("Class, dorm or post name to match, ignoring case")
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(YEAR)
                .long(YEAR)
                .help("Academic year to export [default: the server's current year]")
                .action(ArgAction::Set),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// The data directory could not be read.
    IO(String),
    /// A stored document is not valid JSON.
    Format(String),
    /// Nothing is stored for the requested academic year.
    MissingYear(String),
    /// No votes matched the filter.
    NoData,
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(err) => Self::IO(err.to_string()),
            StoreError::Format(err) => Self::Format(err.to_string()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IO(msg) => write!(f, "IO error: {msg}"),
            Self::Format(msg) => write!(f, "Invalid JSON: {msg}"),
            Self::MissingYear(year) => write!(f, "No data stored for academic year {year:?}"),
            Self::NoData => write!(f, "No data found"),
        }
    }
}

/// Load the requested year and render the matching votes as CSV.
async fn export(
    data_dir: &Path,
    by: ExportBy,
    value: &str,
    year: Option<&str>,
) -> Result<String, Error> {
    let backend = JsonFileBackend::new(data_dir);
    let settings = backend.load_settings().await?;
    let year = match (year, &settings) {
        (Some(year), _) => year.to_string(),
        (None, Some(settings)) => settings.academic_year.clone(),
        (None, None) => {
            return Err(Error::IO(format!(
                "{} is not a data directory",
                data_dir.display()
            )))
        }
    };

    let collections = backend
        .load_year(&year)
        .await?
        .ok_or_else(|| Error::MissingYear(year.clone()))?;
    let settings = settings.unwrap_or_else(|| Settings::new(&year));
    let directory = Directory::new(settings, collections);

    let rows = directory.export_votes(by, value);
    if rows.is_empty() {
        return Err(Error::NoData);
    }
    Ok(to_csv(&rows))
}

/// Run the export, print the result, and return the exit code.
async fn run(args: &ArgMatches) -> u8 {
    // Required arguments are guaranteed to be present.
    let data_dir: &String = args.get_one(DATA_DIR).unwrap();
    let by: &String = args.get_one(BY).unwrap();
    let value: &String = args.get_one(VALUE).unwrap();
    let year = args.get_one::<String>(YEAR).map(String::as_str);

    let by = match by.parse::<ExportBy>() {
        Ok(by) => by,
        Err(msg) => {
            println!("{msg}");
            return 2;
        }
    };

    match export(Path::new(data_dir), by, value, year).await {
        Ok(csv) => {
            print!("{csv}");
            0
        }
        Err(Error::NoData) => {
            println!("{}", Error::NoData);
            255
        }
        Err(err) => {
            println!("{err}");
            1
        }
    }
}

#[rocket::main]
async fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args).await;
    std::process::exit(exit_code.into())
}
