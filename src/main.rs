use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use spraykit::{
    configuration_from_import, import_dxf, init_logging, summarize, Config, ProgramFile,
    ProtocolEncoder, TransportSession, BUILD_DATE, VERSION,
};
use spraykit_communication::protocol::SAVE_STATUS_REGISTER;
use spraykit_core::units::{format_length_m, format_runtime_s};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "spraykit", version = VERSION, about = "Spray trajectory teaching tool")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a single-pass program from a DXF drawing
    Import {
        drawing: PathBuf,
        /// Program file to write
        #[arg(short, long)]
        output: PathBuf,
        /// Name of the spray pass
        #[arg(long, default_value = "Pass 1")]
        pass_name: String,
    },
    /// List the trajectories of a program
    Inspect { program: PathBuf },
    /// Encode a program and print the register summary
    Encode { program: PathBuf },
    /// Send a program to the spray controller
    Send {
        program: PathBuf,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Read a status register from the spray controller
    Status {
        #[arg(long, default_value_t = SAVE_STATUS_REGISTER)]
        address: u16,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_program(path: &Path) -> Result<ProgramFile> {
    ProgramFile::load_from_file(path)
        .with_context(|| format!("Failed to load program {}", path.display()))
}

fn run_import(config: &Config, drawing: &Path, output: &Path, pass_name: &str) -> Result<()> {
    let import = import_dxf(drawing)?;
    if import.is_empty() {
        bail!("{} contains no supported entities", drawing.display());
    }

    let configuration = configuration_from_import(&import, pass_name, config.resolution());
    let name = drawing
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| pass_name.to_string());
    let mut program = ProgramFile::new(name, configuration);
    program.metadata.source_drawing = Some(drawing.display().to_string());
    program.save_to_file(output)?;

    println!(
        "Wrote {} trajectories ({} skipped entities) to {}",
        program.configuration.trajectory_count(),
        import.skipped,
        output.display()
    );
    Ok(())
}

fn run_inspect(program: &Path) -> Result<()> {
    let program = load_program(program)?;
    println!("{} (format {})", program.metadata.name, program.version);

    let mut current_pass = None;
    for row in summarize(&program.configuration) {
        if current_pass != Some(row.pass) {
            let pass = program.configuration.pass(row.pass)?;
            println!("Pass {}: {}", row.pass + 1, pass.name);
            current_pass = Some(row.pass);
        }
        println!(
            "  {:>3} {:<24} {:<8} {:>10}  {:>9} (min {})  speed {:.4}  nozzles {:04}{}",
            row.index + 1,
            row.name,
            row.kind.to_string(),
            format_length_m(row.length_m),
            format_runtime_s(row.runtime),
            format_runtime_s(row.min_runtime),
            row.speed,
            row.nozzle_code,
            if row.reversed { "  reversed" } else { "" }
        );
    }
    Ok(())
}

fn run_encode(program: &Path) -> Result<()> {
    let program = load_program(program)?;
    let encoded = ProtocolEncoder::new()
        .encode(&program.configuration)
        .context("Program cannot be sent")?;

    println!("Control registers: {:?}", encoded.control);
    println!(
        "{} passes, {} primitives, {} floats ({} registers)",
        encoded.pass_count(),
        encoded.primitive_count(),
        encoded.payload.len(),
        encoded.payload_registers().len()
    );
    for index in 0..encoded.primitive_count() {
        if let Some(record) = encoded.primitive_record(index) {
            println!("  {:?}", record);
        }
    }
    Ok(())
}

fn connect(config: &Config, host: Option<String>, port: Option<u16>) -> Result<TransportSession> {
    let host = host.unwrap_or_else(|| config.connection.host.clone());
    let port = port.unwrap_or(config.connection.port);

    let mut session = TransportSession::new(config.session_config());
    session
        .connect(&host, port)
        .with_context(|| format!("Failed to connect to {}:{}", host, port))?;
    Ok(session)
}

fn run_send(config: &Config, program: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let program = load_program(program)?;
    let mut session = connect(config, host, port)?;
    let report = session.send_configuration(&program.configuration)?;
    session.disconnect();

    println!(
        "Sent {} passes, {} primitives in {} chunks; saved after {} polls ({:.2}s)",
        report.passes,
        report.primitives,
        report.chunks,
        report.poll_attempts,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

fn run_status(config: &Config, address: u16, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut session = connect(config, host, port)?;
    let value = session.read_status_register(address)?;
    session.disconnect();
    println!("Register {}: {}", address, value);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    tracing::debug!("spraykit {} built {}", VERSION, BUILD_DATE);

    let config = Config::load_or_default(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Command::Import {
            drawing,
            output,
            pass_name,
        } => run_import(&config, &drawing, &output, &pass_name),
        Command::Inspect { program } => run_inspect(&program),
        Command::Encode { program } => run_encode(&program),
        Command::Send {
            program,
            host,
            port,
        } => run_send(&config, &program, host, port),
        Command::Status {
            address,
            host,
            port,
        } => run_status(&config, address, host, port),
    }
}
