//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::io;

use hzip::compression::compress::compress;
use hzip::compression::decompress::{decompress, test_integrity};
use hzip::tools::cli::{hzopts_init, Mode};

use log::{debug, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> Result<(), std::io::Error> {
    // Log to stderr, stdout may be carrying the data. The real level is set from the options.
    TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let options = hzopts_init();
    debug!("{:?}", options);

    //----- Figure how what we need to do and go do it
    match options.op_mode {
        Mode::Zip => compress(&options),
        Mode::Unzip => decompress(&options),
        Mode::Test => test_integrity(&options),
    }
}
