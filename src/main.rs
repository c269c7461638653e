use clap::Parser;
use std::path::Path;

use patient_redactor::logging;
use patient_redactor::ResultExt;

/// Remove the patient's name from the rendered text of a medical report PDF.
///
/// Writes `redacted_<file name>` into the current working directory; the
/// input file is never modified. Any failure aborts the run before an
/// output document is produced.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PDF file path
    input: String,
}

fn main() {
    logging::init_logging_infrastructure();
    let args = Args::parse();

    log::info!("Started patient_redactor");
    let output = patient_redactor::run(Path::new(&args.input))
        .expect_and_log("Redaction failed; no output document was written");
    println!("Redacted document written to: {}", output.display());
}
