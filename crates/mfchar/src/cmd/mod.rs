use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Subcommand, ValueEnum};
use mfchar_device::{BufferMode, DeviceConfig, Module, NodeRegistry, DEFAULT_DEVICE_NAME};

use crate::exit::{device_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod exchange;
pub mod info;
pub mod isolate;
pub mod probe;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the device and close it again.
    Probe,
    /// Write a payload and read it back.
    Exchange(ExchangeArgs),
    /// Exercise several handles at once and check each reads only its own payload.
    Isolate(IsolateArgs),
    /// Show device metadata.
    Info,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Probe => probe::run(device, format),
        Command::Exchange(args) => exchange::run(args, device, format),
        Command::Isolate(args) => isolate::run(args, device, format),
        Command::Info => info::run(device, format),
        Command::Version(args) => version::run(args, format),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ModeArg {
    /// Isolated slot per open handle.
    PerHandle,
    /// One slot shared by every handle (legacy).
    Shared,
}

impl From<ModeArg> for BufferMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PerHandle => BufferMode::PerHandle,
            ModeArg::Shared => BufferMode::Shared,
        }
    }
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Device node name (published as /dev/<NAME>).
    #[arg(
        long = "device",
        value_name = "NAME",
        env = "MFCHAR_DEVICE",
        default_value = DEFAULT_DEVICE_NAME,
        global = true
    )]
    pub name: String,

    /// Slot layout.
    #[arg(
        long,
        value_name = "MODE",
        env = "MFCHAR_BUFFER_MODE",
        default_value = "per-handle",
        global = true
    )]
    pub buffer_mode: ModeArg,

    /// Maximum simultaneously open handles.
    #[arg(
        long,
        value_name = "N",
        env = "MFCHAR_MAX_HANDLES",
        default_value_t = mfchar_device::DEFAULT_MAX_OPEN_HANDLES,
        global = true
    )]
    pub max_handles: usize,
}

impl DeviceArgs {
    pub fn config(&self) -> DeviceConfig {
        DeviceConfig::new(self.name.clone())
            .with_buffer_mode(self.buffer_mode.into())
            .with_max_open_handles(self.max_handles)
    }
}

/// A loaded module plus the registry callers open it through.
pub struct Loaded {
    pub registry: Arc<NodeRegistry>,
    pub module: Module,
}

impl Loaded {
    pub fn path(&self) -> String {
        self.module.device().config().node_path()
    }

    /// Unload the module, reporting a failure as a CLI error.
    pub fn unload(mut self) -> CliResult<()> {
        self.module
            .exit()
            .map_err(|err| device_error("unload failed", err))
    }
}

pub fn load(device: &DeviceArgs) -> CliResult<Loaded> {
    if device.max_handles == 0 {
        return Err(CliError::new(USAGE, "--max-handles must be greater than zero"));
    }

    let registry = Arc::new(NodeRegistry::new());
    let module = Module::init(registry.clone(), device.config())
        .map_err(|err| device_error("load failed", err))?;
    Ok(Loaded { registry, module })
}

#[derive(Args, Debug)]
pub struct ExchangeArgs {
    /// Payload to write.
    #[arg(long, conflicts_with = "file", default_value = "Hello Kernel!")]
    pub data: String,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Append a NUL terminator to the payload.
    #[arg(long)]
    pub nul: bool,
    /// Number of bytes to request when reading back.
    #[arg(long, value_name = "N", default_value_t = mfchar_slot::MAX_BUF_SIZE)]
    pub read_size: usize,
    /// Write only; do not read the payload back.
    #[arg(long)]
    pub no_read: bool,
}

#[derive(Args, Debug)]
pub struct IsolateArgs {
    /// Number of handles, one worker thread each.
    #[arg(long, default_value_t = 4)]
    pub handles: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
