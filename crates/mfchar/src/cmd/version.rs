use serde::Serialize;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    rustc: &'static str,
    git_hash: &'static str,
    slot_capacity: usize,
    default_device: String,
}

impl BuildInfo {
    fn collect() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            target: env!("MFCHAR_BUILD_TARGET"),
            rustc: option_env!("RUSTC_VERSION").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            slot_capacity: mfchar_slot::MAX_BUF_SIZE,
            default_device: mfchar_device::DeviceConfig::default().node_path(),
        }
    }
}

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    let info = BuildInfo::collect();
    if !args.extended {
        println!("{} {}", info.name, info.version);
        return Ok(SUCCESS);
    }

    match format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => print_table(&[
            ("name", info.name.to_string()),
            ("version", info.version.to_string()),
            ("target", info.target.to_string()),
            ("rustc", info.rustc.to_string()),
            ("git_hash", info.git_hash.to_string()),
            ("slot_capacity", info.slot_capacity.to_string()),
            ("default_device", info.default_device.clone()),
        ]),
    }

    Ok(SUCCESS)
}
