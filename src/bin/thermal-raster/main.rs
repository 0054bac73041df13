mod args;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::{info, warn};

use thermal_raster::{batch, logger, ConversionJob, RadiometricSource};

use crate::args::Args;

fn main() -> Result<()> {
    let args = Args::from_cmd_line()?;
    logger::init(args.log_level.as_deref());

    let source = RadiometricSource::select(args.sdk_path.as_deref());
    let job = ConversionJob::new(source, args.model, args.compression);

    if args.batch {
        if !args.input.is_dir() {
            bail!("batch mode needs an input directory: `{}`", args.input.display());
        }
        let result = batch::run_batch(&job, &args.input, &args.output, args.recursive, args.jobs)?;
        if result.total == 0 {
            warn!(input = %args.input.display(), "no candidate radiometric images found");
        }
        eprintln!(
            "Converted {}/{} images ({} failed)",
            result.success, result.total, result.failed
        );
        if result.failed > 0 && result.success == 0 && result.total > 0 {
            bail!("all {} conversions failed", result.total);
        }
    } else {
        if !args.input.is_file() {
            bail!("input is not a file: `{}`", args.input.display());
        }
        let output = single_output_path(&args.input, &args.output);
        let metadata = job.run(&args.input, &output)?;
        info!(
            input = %args.input.display(),
            output = %output.display(),
            real_data = metadata.is_real_data,
            "done"
        );
        eprintln!("Converted `{}` -> `{}`", args.input.display(), output.display());
    }

    Ok(())
}

/// Normalizes the single-file output target: an existing directory
/// receives `<input stem>.tiff`, and any other extension is coerced to
/// the TIFF one.
fn single_output_path(input: &Path, output: &Path) -> PathBuf {
    if output.is_dir() {
        let stem = input.file_stem().unwrap_or_default();
        return output.join(stem).with_extension("tiff");
    }
    match output.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tiff") || ext.eq_ignore_ascii_case("tif") => {
            output.to_path_buf()
        }
        _ => output.with_extension("tiff"),
    }
}
