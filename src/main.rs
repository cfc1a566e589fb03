use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use umkm_health::artifact::{ArtifactBundle, ArtifactStore};
use umkm_health::input::{CategoricalField, RawInput};
use umkm_health::pipeline::PipelineError;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ARTIFACT: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_INTERNAL: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Tsv,
}

#[derive(clap::Args, Debug)]
struct PredictArgs {
    /// Read the whole record from a JSON file instead of flags
    #[arg(short, long, conflicts_with_all = [
        "jenis_usaha", "marketplace", "status_legalitas", "laba", "biaya_karyawan",
        "omset", "aset", "tahun_berdiri", "tenaga_kerja_perempuan",
        "tenaga_kerja_laki_laki", "kapasitas_produksi", "jumlah_pelanggan",
    ])]
    input: Option<PathBuf>,

    /// Business type (defaults to the first known option)
    #[arg(long)]
    jenis_usaha: Option<String>,

    /// Main marketplace (defaults to the first known option)
    #[arg(long)]
    marketplace: Option<String>,

    /// Legal status (defaults to the first known option)
    #[arg(long)]
    status_legalitas: Option<String>,

    /// Profit in Rupiah (may be negative)
    #[arg(long, default_value_t = 5_000_000.0, allow_negative_numbers = true)]
    laba: f64,

    /// Payroll cost in Rupiah
    #[arg(long, default_value_t = 2_000_000.0)]
    biaya_karyawan: f64,

    /// Revenue in Rupiah
    #[arg(long, default_value_t = 30_000_000.0)]
    omset: f64,

    /// Total assets in Rupiah
    #[arg(long, default_value_t = 50_000_000.0)]
    aset: f64,

    /// Founding year
    #[arg(long, default_value_t = 2020)]
    tahun_berdiri: i32,

    /// Female workers
    #[arg(long, default_value_t = 3)]
    tenaga_kerja_perempuan: u32,

    /// Male workers
    #[arg(long, default_value_t = 3)]
    tenaga_kerja_laki_laki: u32,

    /// Production capacity per month
    #[arg(long, default_value_t = 500)]
    kapasitas_produksi: u64,

    /// Number of customers
    #[arg(long, default_value_t = 150)]
    jumlah_pelanggan: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one business record with the model and the business rules
    Predict(PredictArgs),
    /// List the known choices for each categorical field
    Options,
    /// Show a summary of the loaded artifact bundle
    Inspect,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "umkm-health")]
#[command(about = "UMKM financial health scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/umkm-health/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the artifact bundle (overrides the config file)
    #[arg(short, long, global = true)]
    artifact: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .format_timestamp(None)
        .init();

    // Init does not need an existing config or artifact
    if let Commands::Init { force } = cli.command {
        match umkm_health::config::write_default_config(cli.config.clone(), force) {
            Ok(path) => {
                println!("Wrote default config to {}", path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    // Load config
    let config = match umkm_health::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate rule config at startup
    let options = config.pipeline_options();
    if let Err(errors) = umkm_health::scoring::validate_rules(&options.rules) {
        eprintln!("Rule config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    // Load the artifact once, before any request is served
    let artifact_path = cli
        .artifact
        .clone()
        .or_else(|| config.artifact_path.clone())
        .unwrap_or_else(umkm_health::artifact::get_artifact_path);
    let store = ArtifactStore::new(artifact_path);
    let bundle = match store.load() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Artifact error: {}", e);
            if e.is_not_found() {
                eprintln!("Pass --artifact <path> or set artifact_path in the config file.");
            }
            std::process::exit(EXIT_ARTIFACT);
        }
    };

    for label in [options.rules.healthy_label(), options.rules.unhealthy_label()] {
        if bundle.label_encoder().transform(label).is_none() {
            log::warn!(
                "Rule label '{}' is not a model class ({}); the two verdicts can never agree on it",
                label,
                bundle.label_encoder().classes.join(", ")
            );
        }
    }

    let use_colors = umkm_health::output::should_use_colors();

    match cli.command {
        Commands::Options => {
            println!(
                "{}",
                umkm_health::output::format_options(bundle.reference_options(), use_colors)
            );
        }
        Commands::Inspect => {
            println!("Artifact: {}", store.path().display());
            println!("{}", umkm_health::output::format_bundle_summary(&bundle));
        }
        Commands::Predict(args) => {
            let format = args.format;
            let input = match read_input(args, &bundle) {
                Ok(input) => input,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            if let Err(errors) = umkm_health::input::validate_input(&input) {
                eprintln!("Invalid input:");
                for error in errors {
                    eprintln!("  - {}", error);
                }
                std::process::exit(EXIT_INPUT);
            }

            for warning in umkm_health::input::unknown_categories(&input, bundle.reference_options())
            {
                log::warn!("{}", warning);
            }

            let assessment = match umkm_health::pipeline::run(&input, &bundle, &options) {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("Prediction failed: {}", e);
                    std::process::exit(pipeline_exit_code(&e));
                }
            };

            match format {
                OutputFormat::Text => println!(
                    "{}",
                    umkm_health::output::format_assessment(&assessment, cli.verbose, use_colors)
                ),
                OutputFormat::Tsv => println!("{}", umkm_health::output::format_tsv(&assessment)),
                OutputFormat::Json => match umkm_health::output::format_json(&assessment) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize result: {}", e);
                        std::process::exit(EXIT_INTERNAL);
                    }
                },
            }
        }
        // Handled before the config is loaded
        Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

/// A rejected record is the caller's problem; a shape or class mismatch
/// means the artifact disagrees with itself.
fn pipeline_exit_code(err: &PipelineError) -> i32 {
    match err {
        PipelineError::Encoding(_) => EXIT_INPUT,
        PipelineError::ShapeMismatch { .. } | PipelineError::UnknownClassCode { .. } => {
            EXIT_ARTIFACT
        }
    }
}

/// Build the record from `--input` or from flags, filling categorical
/// defaults from the bundle's reference options.
fn read_input(args: PredictArgs, bundle: &ArtifactBundle) -> anyhow::Result<RawInput> {
    use anyhow::Context;

    if let Some(path) = args.input {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?;
        let input: RawInput = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse input JSON in {}", path.display()))?;
        return Ok(input);
    }

    let options = bundle.reference_options();
    let pick = |value: Option<String>, field: CategoricalField| -> anyhow::Result<String> {
        match value {
            Some(v) => Ok(v),
            None => options
                .first(field.name())
                .map(str::to_string)
                .with_context(|| {
                    format!(
                        "--{} is required: the artifact records no options for it",
                        field.name().replace('_', "-")
                    )
                }),
        }
    };

    Ok(RawInput {
        jenis_usaha: pick(args.jenis_usaha, CategoricalField::JenisUsaha)?,
        marketplace: pick(args.marketplace, CategoricalField::Marketplace)?,
        status_legalitas: pick(args.status_legalitas, CategoricalField::StatusLegalitas)?,
        laba: args.laba,
        biaya_karyawan: args.biaya_karyawan,
        omset: args.omset,
        aset: args.aset,
        tahun_berdiri: args.tahun_berdiri,
        tenaga_kerja_perempuan: args.tenaga_kerja_perempuan,
        tenaga_kerja_laki_laki: args.tenaga_kerja_laki_laki,
        kapasitas_produksi: args.kapasitas_produksi,
        jumlah_pelanggan: args.jumlah_pelanggan,
    })
}
