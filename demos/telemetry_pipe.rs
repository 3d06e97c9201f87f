//! Batched hand-off of telemetry records between producer and worker threads.
//!
//! Producers fill fixed-size batches and push them with one reservation per
//! batch; workers drain whatever run of records is ready and stop once every
//! record has been seen.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use ticket_ring::MpmcQueue;

#[derive(Clone)]
struct Record {
    source: usize,
    value: u64,
}

const PRODUCERS: usize = 2;
const WORKERS: usize = 2;
const RECORDS: usize = 100_000;
const BATCH: usize = 64;

fn main() {
    let q = Arc::new(MpmcQueue::<Record>::new(1 << 12));
    let drained = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();

    for source in 0..PRODUCERS {
        let q = Arc::clone(&q);
        handles.push(thread::spawn(move || {
            let mut batch = Vec::with_capacity(BATCH);
            for i in 0..RECORDS {
                batch.push(Record {
                    source,
                    value: i as u64,
                });
                if batch.len() == BATCH {
                    q.push_slice(&batch);
                    batch.clear();
                }
            }
            if !batch.is_empty() {
                q.push_slice(&batch);
            }
        }));
    }

    for worker in 0..WORKERS {
        let q = Arc::clone(&q);
        let drained = Arc::clone(&drained);
        handles.push(thread::spawn(move || {
            let mut out = vec![
                Record {
                    source: 0,
                    value: 0,
                };
                32
            ];
            let mut seen = 0usize;
            let mut checksum = 0u64;
            loop {
                let got = q.pop_slice(&mut out);
                if got == 0 {
                    if drained.load(Ordering::Relaxed) >= PRODUCERS * RECORDS {
                        break;
                    }
                    thread::yield_now();
                    continue;
                }
                for record in &out[..got] {
                    checksum += record.value + record.source as u64;
                }
                seen += got;
                drained.fetch_add(got, Ordering::Relaxed);
            }
            println!("worker {worker}: {seen} records, checksum {checksum}");
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    println!("total drained: {}", drained.load(Ordering::Relaxed));
}
