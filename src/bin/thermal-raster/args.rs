use std::path::PathBuf;

use anyhow::{Context, Result};
use thermal_raster::{arg, args_parser, opt};
use thermal_raster::{batch, DeviceModel, TiffCompression};

pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub model: DeviceModel,
    pub compression: TiffCompression,
    pub batch: bool,
    pub recursive: bool,
    pub jobs: usize,
    pub sdk_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("thermal-raster")
            .about("Convert radiometric R-JPEGs from DJI thermal payloads to temperature TIFFs.")
            .arg(
                opt!("model")
                    .short("m")
                    .possible_values(&["M30T", "H20T", "H30T", "M2EA"])
                    .case_insensitive(true)
                    .help("Device model. Default is M30T"),
            )
            .arg(
                opt!("compression")
                    .short("c")
                    .possible_values(&["lzw", "zip", "none"])
                    .help("TIFF compression. Default is lzw"),
            )
            .arg(
                opt!("batch")
                    .short("b")
                    .takes_value(false)
                    .help("Treat input and output as directories and convert every candidate"),
            )
            .arg(
                opt!("recursive")
                    .short("r")
                    .takes_value(false)
                    .help("Descend into subdirectories (batch mode only)"),
            )
            .arg(
                opt!("jobs")
                    .short("j")
                    .help("Concurrent conversions in batch mode. Default is 4"),
            )
            .arg(opt!("sdk path").help("Vendor SDK library path override"))
            .arg(opt!("log level").help("Log filter. Default is info, or RUST_LOG when set"))
            .arg(arg!("input").required(true).help("Input R-JPEG file, or directory in batch mode"))
            .arg(
                arg!("output")
                    .required(true)
                    .help("Output TIFF file, or directory in batch mode"),
            )
            .get_matches();

        let input = PathBuf::from(matches.value_of("input").unwrap());
        let output = PathBuf::from(matches.value_of("output").unwrap());
        let model = matches
            .value_of("model")
            .unwrap_or("M30T")
            .parse::<DeviceModel>()?;
        let compression = matches
            .value_of("compression")
            .unwrap_or("lzw")
            .parse::<TiffCompression>()?;
        let jobs = match matches.value_of("jobs") {
            Some(jobs) => jobs
                .parse::<usize>()
                .with_context(|| format!("invalid job count `{}`", jobs))?,
            None => batch::DEFAULT_CONCURRENCY,
        };

        Ok(Args {
            input,
            output,
            model,
            compression,
            batch: matches.is_present("batch"),
            recursive: matches.is_present("recursive"),
            jobs,
            sdk_path: matches.value_of("sdk path").map(PathBuf::from),
            log_level: matches.value_of("log level").map(str::to_owned),
        })
    }
}
