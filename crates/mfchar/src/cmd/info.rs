use serde::Serialize;

use crate::cmd::{load, DeviceArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    name: String,
    path: String,
    major: Option<u32>,
    minor: Option<u32>,
    buffer_mode: &'static str,
    capacity: usize,
    max_open_handles: usize,
    open_handles: usize,
}

pub fn run(device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let loaded = load(device)?;
    let char_device = loaded.module.device();
    let devnum = loaded.module.devnum();

    let out = InfoOutput {
        name: char_device.name().to_string(),
        path: loaded.path(),
        major: devnum.map(|d| d.major),
        minor: devnum.map(|d| d.minor),
        buffer_mode: char_device.buffer_mode().as_str(),
        capacity: char_device.capacity(),
        max_open_handles: char_device.config().max_open_handles,
        open_handles: char_device.open_handles(),
    };
    loaded.unload()?;

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => print_table(&[
            ("name", out.name.clone()),
            ("path", out.path.clone()),
            ("major", optional(out.major)),
            ("minor", optional(out.minor)),
            ("buffer_mode", out.buffer_mode.to_string()),
            ("capacity", out.capacity.to_string()),
            ("max_open_handles", out.max_open_handles.to_string()),
            ("open_handles", out.open_handles.to_string()),
        ]),
    }

    Ok(SUCCESS)
}

fn optional(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
