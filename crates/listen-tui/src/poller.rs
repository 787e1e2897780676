//! Asks the server for playback status on a fixed delay.
//!
//! Each cycle sends `playback`, then forwards whatever status frame the
//! session holds *at that moment*.  The reply to this cycle's request usually
//! lands after the forward, so the renderer shows the freshest value
//! available, which may belong to an earlier request.  Requests and replies
//! are never paired.

use std::time::Duration;

use listen_proto::protocol::{Command, StatusFrame};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::transport::CommandSink;

/// Cycles never run closer together than this.
pub const MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Read side of the latest-status cell.
pub trait StatusSource {
    fn latest_status(&self) -> Option<StatusFrame>;
}

/// What one poll cycle hands to the progress renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PollUpdate {
    pub cycle: u64,
    pub status: Option<StatusFrame>,
}

/// Run the poll loop until `cancel` fires or `updates` is dropped.
/// `interval` is raised to [`MIN_INTERVAL`].
pub fn spawn<S, T>(
    session: S,
    interval: Duration,
    updates: mpsc::Sender<T>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    S: CommandSink + StatusSource + Send + 'static,
    T: From<PollUpdate> + Send + 'static,
{
    if interval < MIN_INTERVAL {
        warn!("poll interval {:?} too short, using {:?}", interval, MIN_INTERVAL);
    }
    let interval = interval.max(MIN_INTERVAL);
    tokio::spawn(async move {
        let mut cycle = 0u64;
        while !cancel.is_cancelled() {
            if let Err(e) = session.send_command(Command::Playback) {
                debug!("poll {}: {}", cycle, e);
            }
            let update = PollUpdate {
                cycle,
                status: session.latest_status(),
            };
            trace!("poll {}: forwarding {:?}", cycle, update.status);
            if updates.send(T::from(update)).await.is_err() {
                break;
            }
            cycle += 1;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        debug!("poller stopped after {} cycles", cycle);
    })
}
