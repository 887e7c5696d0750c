use std::sync::Barrier;
use std::thread;

use bytes::Bytes;
use mfchar_device::OpenFile;
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd::{load, DeviceArgs, IsolateArgs};
use crate::exit::{device_error, io_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS, USAGE};
use crate::output::{payload_preview, print_grid, print_json, OutputFormat};

#[derive(Serialize)]
struct HandleReport {
    handle: u64,
    wrote: String,
    read: String,
    isolated: bool,
}

#[derive(Serialize)]
struct IsolateOutput {
    path: String,
    buffer_mode: &'static str,
    handles: Vec<HandleReport>,
    isolated: bool,
}

pub fn run(args: IsolateArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    if args.handles == 0 {
        return Err(CliError::new(USAGE, "--handles must be at least 1"));
    }

    let loaded = load(device)?;
    let path = loaded.path();

    // Open everything up front so a failed open cannot strand workers at the barrier.
    let mut files = Vec::with_capacity(args.handles);
    for _ in 0..args.handles {
        let file = loaded
            .registry
            .open(&path)
            .map_err(|err| device_error("open failed", err))?;
        files.push(file);
    }

    let barrier = Barrier::new(files.len());
    let results = thread::scope(|scope| {
        let workers = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                let barrier = &barrier;
                thread::Builder::new()
                    .name(format!("isolate-{index}"))
                    .spawn_scoped(scope, move || exercise(file, index, barrier))
                    .map_err(|err| io_error("spawn worker", err))
            })
            .collect::<CliResult<Vec<_>>>()?;

        workers
            .into_iter()
            .map(|worker| {
                worker
                    .join()
                    .map_err(|_| CliError::new(INTERNAL, "worker thread panicked"))?
            })
            .collect::<CliResult<Vec<_>>>()
    })?;

    let handles: Vec<HandleReport> = results
        .into_iter()
        .map(|(handle, wrote, read)| HandleReport {
            handle,
            isolated: read.as_ref() == wrote.as_slice(),
            wrote: payload_preview(&wrote),
            read: payload_preview(&read),
        })
        .collect();
    let isolated = handles.iter().all(|h| h.isolated);

    let out = IsolateOutput {
        path,
        buffer_mode: loaded.module.device().buffer_mode().as_str(),
        handles,
        isolated,
    };
    loaded.unload()?;

    if isolated {
        info!(handles = out.handles.len(), "every handle read back its own payload");
    } else {
        warn!(mode = out.buffer_mode, "handles observed each other's payloads");
    }

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => {
            let rows = out
                .handles
                .iter()
                .map(|h| {
                    vec![
                        h.handle.to_string(),
                        h.wrote.clone(),
                        h.read.clone(),
                        if h.isolated { "ok" } else { "MIXED" }.to_string(),
                    ]
                })
                .collect();
            print_grid(vec!["HANDLE", "WROTE", "READ", "STATUS"], rows);
        }
    }

    Ok(if isolated { SUCCESS } else { FAILURE })
}

/// Stage a handle-specific payload, wait for every worker to stage, then drain.
fn exercise(
    mut file: OpenFile,
    index: usize,
    barrier: &Barrier,
) -> CliResult<(u64, Vec<u8>, Bytes)> {
    let handle = file.handle().as_raw();
    let wrote = format!("payload from worker {index}").into_bytes();

    // Wait even on failure so the other workers are not stranded.
    let staged = file.write(&wrote);
    barrier.wait();
    staged.map_err(|err| device_error("write failed", err))?;

    let read = file
        .read(mfchar_slot::MAX_BUF_SIZE)
        .map_err(|err| device_error("read failed", err))?;

    file.close()
        .map_err(|err| device_error("close failed", err))?;
    Ok((handle, wrote, read))
}
