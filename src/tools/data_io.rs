use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use log::{error, info, warn};

use super::cli::{HzOpts, Output};

/// Suffix added to compressed files.
pub const SUFFIX: &str = ".hz";

/// Name of the compressed file for path.
pub fn compressed_name(path: &str) -> String {
    format!("{}{}", path, SUFFIX)
}

/// Name of the decompressed file for path: the suffix is stripped, or ".out" is added when
/// there is no suffix to strip.
pub fn decompressed_name(path: &str) -> String {
    match path.strip_suffix(SUFFIX) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => {
            warn!("{} does not end in {}, writing to {}.out", path, SUFFIX, path);
            format!("{}.out", path)
        }
    }
}

/// Open an input file for buffered reading.
pub fn open_input(path: &str) -> io::Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) => {
            error!("Cannot read from the file {}", path);
            Err(e)
        }
    }
}

/// Open the output for an input file: the named file, or stdout when the options ask for it.
/// An existing file is only replaced with --force.
pub fn open_output(opts: &HzOpts, path: &str) -> io::Result<Box<dyn Write>> {
    if opts.output == Output::Stdout {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let mut options = OpenOptions::new();
    options.write(true);
    if opts.force_overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    match options.open(path) {
        Ok(file) => Ok(Box::new(BufWriter::new(file))),
        Err(e) => {
            if e.kind() == io::ErrorKind::AlreadyExists {
                error!("Output file {} already exists. Use -f to overwrite it.", path);
            } else {
                error!("Cannot write to the file {}", path);
            }
            Err(e)
        }
    }
}

/// Remove a partially written output file after a failure.
pub fn discard_output(opts: &HzOpts, path: &str) {
    if opts.output == Output::File && Path::new(path).exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove incomplete output {}: {}", path, e);
        }
    }
}

/// Remove the input file once it has been processed, unless it should be kept.
pub fn finish_input(opts: &HzOpts, path: &str) -> io::Result<()> {
    if opts.keep_input_files || opts.output == Output::Stdout {
        return Ok(());
    }
    info!("Removing {}", path);
    fs::remove_file(path)
}
