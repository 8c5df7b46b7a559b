use clap::Parser;
use std::{fmt::Display, fmt::Formatter};

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    /// The log level that shows messages at this verbosity.
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Off,
            Verbosity::Errors => log::LevelFilter::Error,
            Verbosity::Warnings => log::LevelFilter::Warn,
            Verbosity::Info => log::LevelFilter::Info,
            Verbosity::Debug => log::LevelFilter::Debug,
            Verbosity::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Zip, Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// All user settable options that control program behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HzOpts {
    /// Vec of names of files to read for input. Empty means stdin.
    pub files: Vec<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl HzOpts {
    pub fn new() -> Self {
        Self {
            files: vec![],
            force_overwrite: false,
            keep_input_files: false,
            op_mode: Mode::Zip,
            output: Output::File,
            verbose: Verbosity::Errors,
        }
    }
}

impl Default for HzOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    name = "hzip",
    version,
    about = "A static Huffman coding file compressor",
    long_about = "
    hzip compresses each byte of its input with a Huffman code built from the byte
    frequencies of the whole input. The code table is stored at the front of the
    compressed stream.

    If no file names are given, hzip compresses or decompresses from standard input
    to standard output. Invoked as `hunzip', the default action is to decompress."
)]
pub struct Args {
    /// Files to process
    #[clap(value_parser)]
    files: Vec<String>,

    /// Force compression
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Force decompression
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Keep (don't delete) input files
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Overwrite existing output files
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Output to standard out
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Suppress noncritical error messages
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Be verbose (a 2nd -v gives more, up to -vvvv)
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Turn the parsed arguments into options. `default_mode` is used when none of -z, -d
    /// or -t was given.
    pub fn into_opts(self, default_mode: Mode) -> HzOpts {
        let mut opts = HzOpts::new();
        opts.op_mode = if self.test {
            Mode::Test
        } else if self.decompress {
            Mode::Unzip
        } else if self.compress {
            Mode::Zip
        } else {
            default_mode
        };
        opts.files = self.files;
        opts.keep_input_files = self.keep;
        opts.force_overwrite = self.force;
        // Without input files everything goes to stdout anyway
        if self.stdout || opts.files.is_empty() {
            opts.output = Output::Stdout;
        }
        opts.verbose = if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Errors,
                1 => Verbosity::Warnings,
                2 => Verbosity::Info,
                3 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        };
        opts
    }
}

/// The mode implied by the program name: `hunzip` decompresses, anything else compresses.
pub fn mode_from_program(program: Option<&str>) -> Mode {
    let stem = program
        .map(std::path::Path::new)
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str());
    match stem {
        Some("hunzip") => Mode::Unzip,
        _ => Mode::Zip,
    }
}

/// Parse the command line and set the log level to match.
pub fn hzopts_init() -> HzOpts {
    let program = std::env::args().next();
    let opts = Args::parse().into_opts(mode_from_program(program.as_deref()));
    log::set_max_level(opts.verbose.level_filter());
    opts
}
