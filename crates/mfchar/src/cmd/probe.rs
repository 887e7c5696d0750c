use serde::Serialize;

use crate::cmd::{load, DeviceArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct ProbeOutput {
    path: String,
    devnum: Option<String>,
    handle: u64,
    opened: bool,
    closed: bool,
}

pub fn run(device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let loaded = load(device)?;
    let path = loaded.path();

    let file = loaded
        .registry
        .open(&path)
        .map_err(|err| device_error("open failed", err))?;
    let handle = file.handle().as_raw();
    file.close()
        .map_err(|err| device_error("close failed", err))?;

    let out = ProbeOutput {
        devnum: loaded.module.devnum().map(|d| d.to_string()),
        path,
        handle,
        opened: true,
        closed: true,
    };
    loaded.unload()?;

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(&[
            ("path", out.path.clone()),
            ("devnum", out.devnum.clone().unwrap_or_else(|| "-".into())),
            ("handle", out.handle.to_string()),
            ("opened", out.opened.to_string()),
            ("closed", out.closed.to_string()),
        ]),
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!("Device successfully opened.");
            println!("Device closed.");
        }
    }

    Ok(SUCCESS)
}
