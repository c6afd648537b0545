mod error;

use clap::{Parser, Subcommand, ValueEnum};
use error::{CliError, CliResult};
use rom_case::{CaseDef, load_case, validate_boundary_count};
use rom_online::{BasisModes, PressureNorm, ReducedSteadyNs, inf_sup_constant};
use rom_operators::ReducedOperators;
use rom_results::FieldStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "rom-cli")]
#[command(about = "Reduced-order steady Navier-Stokes online solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file and the operators it references
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Run every online query of a case and write the reconstructed fields
    Solve {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Skip reconstruction even if the case has an output section
        #[arg(long)]
        no_export: bool,
    },
    /// Compute the reduced inf-sup constant of the case operators
    InfSup {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Pressure norm (defaults to the case setting)
        #[arg(long, value_enum)]
        norm: Option<NormArg>,
    },
    /// Show the manifest of the case's reconstructed fields
    ShowFields {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NormArg {
    L2,
    Laplacian,
}

impl From<NormArg> for PressureNorm {
    fn from(arg: NormArg) -> Self {
        match arg {
            NormArg::L2 => PressureNorm::L2,
            NormArg::Laplacian => PressureNorm::Laplacian,
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Solve {
            case_path,
            no_export,
        } => cmd_solve(&case_path, !no_export),
        Commands::InfSup { case_path, norm } => cmd_inf_sup(&case_path, norm.map(Into::into)),
        Commands::ShowFields { case_path } => cmd_show_fields(&case_path),
    }
}

fn case_dir(case_path: &Path) -> PathBuf {
    case_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Case with file paths resolved against its own directory.
fn load(case_path: &Path) -> CliResult<CaseDef> {
    let mut case = load_case(case_path)?;
    case.resolve_paths(&case_dir(case_path));
    Ok(case)
}

fn load_operators(case: &CaseDef) -> CliResult<ReducedOperators> {
    let ops = rom_operators::io::load_json(&case.operators)?;
    validate_boundary_count(case, ops.n_bc()).map_err(rom_case::CaseError::from)?;
    Ok(ops)
}

fn load_basis(case: &CaseDef) -> CliResult<BasisModes> {
    let path = case.basis.as_ref().ok_or_else(|| CliError::Usage {
        what: "case has no basis file".to_string(),
    })?;
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load(case_path)?;
    let ops = load_operators(&case)?;
    let counts = ops.counts();
    println!(
        "  Nu = {}, Np = {}, N_BC = {}",
        counts.n_u(),
        counts.n_p(),
        counts.n_bc()
    );
    if case.basis.is_some() {
        load_basis(&case)?.check(counts)?;
        println!("  basis matches operators");
    }
    // PPE needs D and G; building the driver checks them
    ReducedSteadyNs::new(Arc::new(ops), case.stabilization, case.online_settings())?;
    println!("✓ Case is valid");
    Ok(())
}

fn cmd_solve(case_path: &Path, export: bool) -> CliResult<()> {
    let case = load(case_path)?;
    let ops = Arc::new(load_operators(&case)?);
    let mut rom = ReducedSteadyNs::new(ops, case.stabilization, case.online_settings())?;

    println!(
        "Solving {} queries of '{}' ({})",
        case.queries.len(),
        case.name,
        case.stabilization
    );

    let start = Instant::now();
    let mut failed = 0;
    for (i, query) in case.queries.iter().enumerate() {
        rom.set_viscosity(query.viscosity.unwrap_or(case.viscosity))?;
        match rom.solve_online(&query.bc) {
            Ok(solution) => println!(
                "  [{}] iterations = {}, |F| = {:.3e}",
                i, solution.iterations, solution.residual_norm
            ),
            Err(e) => {
                failed += 1;
                println!("  [{}] failed: {}", i, e);
            }
        }
    }
    println!(
        "✓ {} of {} queries converged in {:.2?}",
        rom.history().len(),
        case.queries.len(),
        start.elapsed()
    );

    if export && let Some(output) = &case.output {
        let basis = load_basis(&case)?;
        let mut store = FieldStore::new(case_dir(case_path))?;
        let written = rom.export(&basis, &mut store, &output.folder, output.stride)?;
        println!("  wrote {} fields to {}", written, output.folder.display());
    }

    if failed > 0 {
        return Err(CliError::Usage {
            what: format!("{failed} queries did not converge"),
        });
    }
    Ok(())
}

fn cmd_inf_sup(case_path: &Path, norm: Option<PressureNorm>) -> CliResult<()> {
    let case = load(case_path)?;
    let ops = load_operators(&case)?;
    let norm = norm.unwrap_or(case.inf_sup_norm);
    let beta = inf_sup_constant(&ops, norm)?;
    println!("inf-sup constant ({:?}): {:.6e}", norm, beta);
    Ok(())
}

fn cmd_show_fields(case_path: &Path) -> CliResult<()> {
    let case = load(case_path)?;
    let output = case.output.as_ref().ok_or_else(|| CliError::Usage {
        what: "case has no output section".to_string(),
    })?;
    let store = FieldStore::new(case_dir(case_path))?;
    let manifest = store.load_manifest(&output.folder)?;

    println!("Reconstruction: {}", manifest.reconstruction_id);
    println!("  Timestamp: {}", manifest.timestamp);
    println!("  Fields: {}", manifest.field_count);
    println!("  Velocity length: {}", manifest.velocity_len);
    println!("  Pressure length: {}", manifest.pressure_len);
    Ok(())
}
