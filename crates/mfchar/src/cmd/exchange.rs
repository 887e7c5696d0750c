use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::cmd::{load, DeviceArgs, ExchangeArgs};
use crate::exit::{device_error, io_error, CliResult, SUCCESS};
use crate::output::{payload_preview, print_json, print_raw, print_table, OutputFormat};

#[derive(Serialize)]
struct ExchangeOutput {
    path: String,
    handle: u64,
    requested: usize,
    accepted: usize,
    truncated: bool,
    delivered: Option<usize>,
    payload: Option<String>,
    second_read: Option<usize>,
}

pub fn run(args: ExchangeArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = load_payload(&args)?;
    let loaded = load(device)?;
    let path = loaded.path();

    let mut file = loaded
        .registry
        .open(&path)
        .map_err(|err| device_error("open failed", err))?;
    let handle = file.handle().as_raw();

    let accepted = file
        .write(&payload)
        .map_err(|err| device_error("write failed", err))?;
    debug!(handle, requested = payload.len(), accepted, "payload staged");

    let (received, second_read) = if args.no_read {
        (None, None)
    } else {
        let received = file
            .read(args.read_size)
            .map_err(|err| device_error("read failed", err))?;
        // The slot is consumed by the first read; a repeat read must come back empty.
        let again = file
            .read(args.read_size)
            .map_err(|err| device_error("read failed", err))?;
        (Some(received), Some(again.len()))
    };

    file.close()
        .map_err(|err| device_error("close failed", err))?;
    loaded.unload()?;

    if let OutputFormat::Raw = format {
        if let Some(received) = &received {
            print_raw(received);
        }
        return Ok(SUCCESS);
    }

    let out = ExchangeOutput {
        path,
        handle,
        requested: payload.len(),
        accepted,
        truncated: accepted < payload.len(),
        delivered: received.as_ref().map(Bytes::len),
        payload: received.as_deref().map(payload_preview),
        second_read,
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(&[
            ("path", out.path.clone()),
            ("handle", out.handle.to_string()),
            ("requested", out.requested.to_string()),
            ("accepted", out.accepted.to_string()),
            ("truncated", out.truncated.to_string()),
            ("delivered", optional(out.delivered)),
            ("payload", out.payload.clone().unwrap_or_else(|| "-".into())),
            ("second_read", optional(out.second_read)),
        ]),
        OutputFormat::Pretty => {
            println!("Device successfully opened.");
            println!("Wrote {} of {} bytes.", out.accepted, out.requested);
            if let (Some(delivered), Some(text)) = (out.delivered, &out.payload) {
                println!("Read {delivered} bytes: {text}");
            }
            println!("Device closed.");
        }
        OutputFormat::Raw => {}
    }

    Ok(SUCCESS)
}

fn load_payload(args: &ExchangeArgs) -> CliResult<Vec<u8>> {
    let mut payload = match &args.file {
        Some(path) => std::fs::read(path).map_err(|err| io_error("read payload file", err))?,
        None => args.data.as_bytes().to_vec(),
    };
    if args.nul {
        payload.push(0);
    }
    Ok(payload)
}

fn optional(value: Option<usize>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
