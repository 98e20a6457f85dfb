/*!
 Command line options for the application.
*/

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
};

use clap::{crate_version, Arg, ArgAction, ArgMatches, Command};

use plist_engine::util::options::DEFAULT_MAX_DEPTH;

use crate::app::error::RuntimeError;

// CLI Arg Names
pub const OPTION_INPUT: &str = "input";
pub const OPTION_FORMAT: &str = "format";
pub const OPTION_OUTPUT: &str = "output";
pub const OPTION_MAX_DEPTH: &str = "max-depth";
pub const OPTION_VERBOSE: &str = "verbose";
pub const OPTION_DETECT: &str = "detect";

// Other CLI Text
pub const SUPPORTED_FILE_TYPES: &str = "binary, xml, json, txt";
pub const ABOUT: &str = concat!(
    "The `plist-tool` binary converts binary, XML, and OpenStep property lists\n",
    "into binary, XML, JSON, or plain text documents."
);
/// The input name that stands for standard input
pub const STDIN_NAME: &str = "-";

/// The formats the application can export to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportType {
    Binary,
    Xml,
    Json,
    Txt,
}

impl ExportType {
    /// Parse the export type from the command line value
    pub fn from_cli(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "binary" => Some(Self::Binary),
            "xml" => Some(Self::Xml),
            "json" => Some(Self::Json),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

impl Display for ExportType {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            ExportType::Binary => write!(fmt, "binary"),
            ExportType::Xml => write!(fmt, "xml"),
            ExportType::Json => write!(fmt, "json"),
            ExportType::Txt => write!(fmt, "txt"),
        }
    }
}

/// Represents the options the user provided on the command line
#[derive(Debug, PartialEq, Eq)]
pub struct Options {
    /// Path to the property list to read, or `None` to read standard input
    pub input: Option<PathBuf>,
    /// The format to export to
    pub export_type: ExportType,
    /// Where to write the export, or `None` to write to standard output
    pub output: Option<PathBuf>,
    /// The deepest nesting of containers the decoder accepts
    pub max_depth: usize,
    /// If true, emit debug logs
    pub verbose: bool,
    /// If true, only report the detected input format
    pub detect: bool,
}

impl Options {
    pub fn from_args(args: &ArgMatches) -> Result<Self, RuntimeError> {
        let input = args.get_one::<String>(OPTION_INPUT);
        let export_type = args.get_one::<String>(OPTION_FORMAT);
        let output = args.get_one::<String>(OPTION_OUTPUT);
        let max_depth = args.get_one::<String>(OPTION_MAX_DEPTH);
        let verbose = args.get_flag(OPTION_VERBOSE);
        let detect = args.get_flag(OPTION_DETECT);

        // Ensure an input was provided
        let input = match input {
            Some(input) => input,
            None => {
                return Err(RuntimeError::InvalidOptions(format!(
                    "No input provided! Pass a file path or `{STDIN_NAME}` to read standard input."
                )))
            }
        };

        // Detection only prints the input format
        if detect && (output.is_some() || export_type.is_some()) {
            return Err(RuntimeError::InvalidOptions(format!(
                "Option --{OPTION_DETECT} cannot be used with --{OPTION_OUTPUT} or --{OPTION_FORMAT}"
            )));
        }

        // Ensure export type is allowed
        let export_type = match export_type {
            Some(export_type) => ExportType::from_cli(export_type).ok_or_else(|| {
                RuntimeError::InvalidOptions(format!(
                    "{export_type} is not a valid export type! Must be one of <{SUPPORTED_FILE_TYPES}>"
                ))
            })?,
            None => ExportType::Xml,
        };

        // Ensure the depth limit is usable
        let max_depth = match max_depth {
            Some(max_depth) => match max_depth.parse::<usize>() {
                Ok(0) | Err(_) => {
                    return Err(RuntimeError::InvalidOptions(format!(
                        "{max_depth} is not a valid depth limit! Must be a whole number greater than 0"
                    )))
                }
                Ok(depth) => depth,
            },
            None => DEFAULT_MAX_DEPTH,
        };

        Ok(Options {
            input: match input.as_str() {
                STDIN_NAME => None,
                path => Some(PathBuf::from(path)),
            },
            export_type,
            output: output.map(PathBuf::from),
            max_depth,
            verbose,
            detect,
        })
    }
}

/// Build the command line interface
pub fn get_command() -> Command {
    Command::new("plist-tool")
        .version(crate_version!())
        .about(ABOUT)
        .arg_required_else_help(true)
        .arg(
            Arg::new(OPTION_INPUT)
                .help(format!("Path to the property list to read, or `{STDIN_NAME}` for standard input\n"))
                .value_name("INPUT")
                .index(1),
        )
        .arg(
            Arg::new(OPTION_FORMAT)
                .short('f')
                .long(OPTION_FORMAT)
                .help("Specify a single file format to export the property list to\nIf omitted, the default is xml\n")
                .value_name(SUPPORTED_FILE_TYPES),
        )
        .arg(
            Arg::new(OPTION_OUTPUT)
                .short('o')
                .long(OPTION_OUTPUT)
                .help("Specify a file to write the export to\nIf omitted, the export is written to standard output\n")
                .value_name("path/to/output"),
        )
        .arg(
            Arg::new(OPTION_MAX_DEPTH)
                .short('m')
                .long(OPTION_MAX_DEPTH)
                .help(format!("The deepest nesting of arrays and dictionaries to accept\nIf omitted, the default is {DEFAULT_MAX_DEPTH}\n"))
                .value_name("depth"),
        )
        .arg(
            Arg::new(OPTION_VERBOSE)
                .short('v')
                .long(OPTION_VERBOSE)
                .help("Emit debug logs to standard error\n")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(OPTION_DETECT)
                .short('d')
                .long(OPTION_DETECT)
                .help("Print the format of the input and exit\n")
                .action(ArgAction::SetTrue),
        )
}
