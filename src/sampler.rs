//! Background CPU sampler producing one delta per interval.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::collector::procfs::system::SystemCollector;
use crate::collector::traits::FileSystem;
use crate::config::ProbeConfig;
use crate::model::Cpu;

/// Starts a sampling thread and returns its output and stop channels.
///
/// The first published value is the first raw counter sample; every value
/// after that is the delta against the previous fetch, one per elapsed
/// interval. Publishing is a rendezvous: the thread blocks until the
/// consumer takes the value, so a slow consumer delays samples rather than
/// dropping them.
///
/// Sending `()` on the stop channel ends the thread, as does dropping the
/// stop sender or the sample receiver. The stop check shares the interval
/// wait, so cancellation takes effect without waiting out a full tick.
/// Fetch failures are logged and the previous sample is retained, keeping
/// subsequent deltas anchored.
pub fn collect_cpu_samples<F>(
    fs: F,
    config: ProbeConfig,
    interval: Duration,
) -> (mpsc::Receiver<Cpu>, mpsc::Sender<()>)
where
    F: FileSystem + Send + 'static,
{
    let (sample_tx, sample_rx) = mpsc::sync_channel::<Cpu>(0);
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    thread::spawn(move || {
        let collector = SystemCollector::new(fs, config);

        let mut prev = match collector.collect_cpu() {
            Ok(cpu) => cpu,
            Err(err) => {
                warn!(%err, "initial cpu fetch failed");
                Cpu::default()
            }
        };
        if sample_tx.send(prev).is_err() {
            return;
        }

        loop {
            match stop_rx.recv_timeout(interval) {
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    match collector.collect_cpu() {
                        Ok(current) => {
                            let delta = current.delta(&prev);
                            prev = current;
                            if sample_tx.send(delta).is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!(%err, "cpu fetch failed, keeping previous sample"),
                    }
                }
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });

    (sample_rx, stop_tx)
}
