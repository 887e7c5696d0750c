use std::sync::{Arc, Barrier};
use std::thread;

use mfchar_device::{BufferMode, CharDevice, DeviceConfig, FileOperations, Module, NodeRegistry};

#[test]
fn concurrent_handles_drain_only_their_own_payload() {
    let dev = Arc::new(CharDevice::new(DeviceConfig::default()));
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let workers: Vec<_> = (0..threads)
        .map(|i| {
            let dev = Arc::clone(&dev);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let fh = dev.open().expect("open should succeed");
                let payload = format!("payload-from-thread-{i}");
                barrier.wait();

                for _ in 0..200 {
                    let accepted = dev.write_bytes(fh, payload.as_bytes()).unwrap();
                    assert_eq!(accepted, payload.len());
                    let got = dev.read_bytes(fh, 128).unwrap();
                    assert_eq!(got.as_ref(), payload.as_bytes());
                }

                dev.release(fh).unwrap();
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker should finish");
    }
    assert_eq!(dev.open_handles(), 0);
}

#[test]
fn same_handle_operations_never_observe_torn_payloads() {
    let dev = Arc::new(CharDevice::new(DeviceConfig::default()));
    let fh = dev.open().unwrap();
    let a = vec![b'a'; 128];
    let b = vec![b'b'; 128];

    let writers: Vec<_> = [a.clone(), b.clone()]
        .into_iter()
        .map(|payload| {
            let dev = Arc::clone(&dev);
            thread::spawn(move || {
                for _ in 0..500 {
                    dev.write_bytes(fh, &payload).unwrap();
                }
            })
        })
        .collect();

    let reader = {
        let dev = Arc::clone(&dev);
        thread::spawn(move || {
            for _ in 0..500 {
                let got = dev.read_bytes(fh, 128).unwrap();
                assert!(
                    got.is_empty() || got.as_ref() == a.as_slice() || got.as_ref() == b.as_slice(),
                    "read observed a mixed payload"
                );
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    reader.join().unwrap();
    dev.release(fh).unwrap();
}

#[test]
fn concurrent_open_and_release_through_registry() {
    let registry = Arc::new(NodeRegistry::new());
    let config = DeviceConfig::default().with_max_open_handles(64);
    let mut module = Module::init(registry.clone(), config).unwrap();

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for round in 0..50 {
                    let mut file = registry.open("/dev/mfchar").unwrap();
                    let payload = format!("{i}:{round}");
                    file.write(payload.as_bytes()).unwrap();
                    assert_eq!(file.read(128).unwrap().as_ref(), payload.as_bytes());
                    file.close().unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(module.device().open_handles(), 0);
    module.exit().unwrap();
}

#[test]
fn shared_mode_is_observable_across_threads() {
    let dev = Arc::new(CharDevice::new(
        DeviceConfig::default().with_buffer_mode(BufferMode::Shared),
    ));
    let writer_fh = dev.open().unwrap();
    let reader_fh = dev.open().unwrap();

    {
        let dev = Arc::clone(&dev);
        thread::spawn(move || dev.write_bytes(writer_fh, b"crosstalk").unwrap())
            .join()
            .unwrap();
    }

    assert_eq!(dev.read_bytes(reader_fh, 128).unwrap().as_ref(), b"crosstalk");
    dev.release(writer_fh).unwrap();
    dev.release(reader_fh).unwrap();
}
