//! EyeRest CLI - Command-line interface for EyeRest Flux
//!
//! Commands:
//! - replay: Run recorded landmark frames through a monitoring session
//! - validate: Validate a landmark recording
//! - doctor: Diagnose configuration and environment
//! - schema: Print input and output schemas

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use eyerest_flux::{
    measure_frame, ComputeError, Frame, FrameWorker, LandmarkDetector, LandmarkSet,
    ManualClock, PipelineConfig, FLUX_VERSION, PRODUCER_NAME,
};

/// EyeRest - Eye-fatigue metrics from facial landmarks
#[derive(Parser)]
#[command(name = "eyerest")]
#[command(version = FLUX_VERSION)]
#[command(about = "Turn face-mesh landmark streams into eye-fatigue metrics", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded landmark frames through a monitoring session
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a landmark recording
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a pipeline configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// One replay frame per line
    Input,
    /// One outcome per line
    Output,
}

/// One line of a landmark recording
#[derive(Debug, Serialize, Deserialize)]
struct ReplayFrame {
    timestamp_ms: f64,
    #[serde(default)]
    landmarks: Option<LandmarkSet>,
}

/// Detector whose frames already carry the recorded landmarks
struct ReplayDetector;

impl LandmarkDetector for ReplayDetector {
    type Frame = Option<LandmarkSet>;

    fn load(&self) -> Result<(), ComputeError> {
        Ok(())
    }

    fn detect(&self, frame: &Self::Frame) -> Result<Option<LandmarkSet>, ComputeError> {
        Ok(frame.clone())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = fmt::layer().with_target(true).with_writer(io::stderr);

    // A subscriber may already be installed when embedded; keep the existing one
    let _ = Registry::default().with(env_filter).with(stderr_layer).try_init();
}

fn run(cli: Cli) -> Result<(), EyeRestCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            config,
        } => cmd_replay(&input, &output, config.as_deref()),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn open_input(input: &Path) -> Result<Box<dyn BufRead>, EyeRestCliError> {
    if input.to_string_lossy() == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(fs::File::open(input)?)))
    }
}

fn open_output(output: &Path) -> Result<Box<dyn Write>, EyeRestCliError> {
    if output.to_string_lossy() == "-" {
        Ok(Box::new(io::stdout()))
    } else {
        Ok(Box::new(io::BufWriter::new(fs::File::create(output)?)))
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, EyeRestCliError> {
    match path {
        Some(path) => Ok(PipelineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn parse_line(line: &str, line_number: usize) -> Result<ReplayFrame, EyeRestCliError> {
    serde_json::from_str(line)
        .map_err(|e| EyeRestCliError::ParseError(format!("line {}: {}", line_number, e)))
}

fn cmd_replay(input: &Path, output: &Path, config: Option<&Path>) -> Result<(), EyeRestCliError> {
    let config = load_config(config)?;
    let reader = open_input(input)?;
    let mut writer = open_output(output)?;

    let clock = Arc::new(ManualClock::new(0.0));
    let worker: FrameWorker<ReplayDetector> = FrameWorker::with_clock(clock.clone());
    worker.init(config, Arc::new(ReplayDetector))?;

    let mut started = false;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = parse_line(&line, index + 1)?;

        // The session clock follows the recording
        clock.set(frame.timestamp_ms);
        if !started {
            worker.start()?;
            started = true;
        }

        let outcome = worker.process(&Frame::new(frame.timestamp_ms, frame.landmarks));
        writeln!(writer, "{}", serde_json::to_string(&outcome)?)?;
    }

    if !started {
        return Err(EyeRestCliError::NoFrames);
    }

    if let Some(summary) = worker.stop() {
        let line = serde_json::json!({ "kind": "summary", "summary": summary });
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    worker.cleanup();

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), EyeRestCliError> {
    let mut input_data = String::new();
    open_input(input)?.read_to_string(&mut input_data)?;

    let mut total_frames = 0;
    let mut frames_without_face = 0;
    let mut errors = Vec::new();

    for (index, line) in input_data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        total_frames += 1;

        let line_number = index + 1;
        let frame = match serde_json::from_str::<ReplayFrame>(line) {
            Ok(frame) => frame,
            Err(e) => {
                errors.push(ValidationErrorDetail {
                    line: line_number,
                    timestamp_ms: None,
                    error: e.to_string(),
                });
                continue;
            }
        };

        match &frame.landmarks {
            None => frames_without_face += 1,
            Some(landmarks) => {
                if let Err(e) = measure_frame(landmarks) {
                    errors.push(ValidationErrorDetail {
                        line: line_number,
                        timestamp_ms: Some(frame.timestamp_ms),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    let report = ValidationReport {
        total_frames,
        valid_frames: total_frames - errors.len(),
        invalid_frames: errors.len(),
        frames_without_face,
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total frames:   {}", report.total_frames);
        println!("Valid frames:   {}", report.valid_frames);
        println!("Invalid frames: {}", report.invalid_frames);
        println!("Without face:   {}", report.frames_without_face);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                match err.timestamp_ms {
                    Some(t) => println!("  - Line {} (t={} ms): {}", err.line, t, err.error),
                    None => println!("  - Line {}: {}", err.line, err.error),
                }
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(EyeRestCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), EyeRestCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "flux_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("EyeRest Flux version {}", FLUX_VERSION),
    });

    match config {
        Some(path) if !path.exists() => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Config file does not exist, defaults will be used".to_string(),
        }),
        Some(path) => {
            let check = match fs::read_to_string(path) {
                Ok(content) => match PipelineConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid ({} fps, PERCLOS window {})",
                            config.target_fps, config.window_size
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            };
            checks.push(check);
        }
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "Using default config (15 fps, PERCLOS window 30)".to_string(),
        }),
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (replay from stdin ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: FLUX_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("EyeRest Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(EyeRestCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), EyeRestCliError> {
    let schema = match schema_type {
        SchemaType::Input => input_json_schema(),
        SchemaType::Output => output_json_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn point_schema() -> serde_json::Value {
    serde_json::json!({
        "oneOf": [
            {
                "type": "array",
                "items": { "type": "number" },
                "minItems": 2,
                "maxItems": 3
            },
            {
                "type": "object",
                "required": ["x", "y"],
                "properties": {
                    "x": { "type": "number" },
                    "y": { "type": "number" },
                    "z": { "type": "number", "default": 0 }
                }
            }
        ]
    })
}

fn input_json_schema() -> serde_json::Value {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "eyerest.replay_frame.v1",
        "description": "One camera frame's face-mesh landmarks (468 points, normalized coordinates)",
        "type": "object",
        "required": ["timestamp_ms"],
        "properties": {
            "timestamp_ms": { "type": "number", "description": "Monotonic capture time (ms)" },
            "landmarks": {
                "oneOf": [
                    { "type": "array", "items": point_schema() },
                    { "type": "null", "description": "No face detected" }
                ]
            }
        }
    })
}

fn output_json_schema() -> serde_json::Value {
    let head_pose = serde_json::json!({
        "type": "object",
        "properties": {
            "pitch": { "type": "number" },
            "yaw": { "type": "number" },
            "roll": { "type": "number" }
        }
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "eyerest.frame_outcome.v1",
        "description": "One line per replayed frame, followed by a session summary line",
        "type": "object",
        "required": ["kind"],
        "properties": {
            "kind": {
                "type": "string",
                "enum": ["metrics", "no_face", "dropped", "error", "summary"]
            },
            "record": {
                "type": "object",
                "properties": {
                    "blinkRate": { "type": "number", "description": "Blinks per minute" },
                    "fatigueIndex": { "type": "number", "minimum": 0, "maximum": 70 },
                    "fatigueLevel": { "type": "string", "enum": ["low", "moderate", "high"] },
                    "posture": {
                        "type": "string",
                        "enum": ["good", "forward", "tilted", "too_close", "too_far"]
                    },
                    "earValue": { "type": "number" },
                    "perclosValue": { "type": "number", "minimum": 0, "maximum": 100 },
                    "headPose": head_pose,
                    "timestamp": { "type": "number" }
                }
            },
            "timestamp_ms": { "type": "number" },
            "reason": { "type": "string", "enum": ["busy", "throttled", "cancelled"] },
            "code": { "type": "string" },
            "message": { "type": "string" },
            "summary": { "type": "object" }
        }
    })
}

// Error types

#[derive(Debug)]
enum EyeRestCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for EyeRestCliError {
    fn from(e: io::Error) -> Self {
        EyeRestCliError::Io(e)
    }
}

impl From<ComputeError> for EyeRestCliError {
    fn from(e: ComputeError) -> Self {
        EyeRestCliError::Compute(e)
    }
}

impl From<serde_json::Error> for EyeRestCliError {
    fn from(e: serde_json::Error) -> Self {
        EyeRestCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<EyeRestCliError> for CliError {
    fn from(e: EyeRestCliError) -> Self {
        match e {
            EyeRestCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            EyeRestCliError::Compute(e) => {
                let hint = match &e {
                    ComputeError::InvalidConfig(_) => "Run 'eyerest doctor --config <file>' for details",
                    _ => "Run 'eyerest validate' on the input for details",
                };
                CliError {
                    code: e.code().to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            EyeRestCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            EyeRestCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            EyeRestCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            EyeRestCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            EyeRestCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'eyerest schema input' for the expected line format".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_frames: usize,
    valid_frames: usize,
    invalid_frames: usize,
    frames_without_face: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    line: usize,
    timestamp_ms: Option<f64>,
    error: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
