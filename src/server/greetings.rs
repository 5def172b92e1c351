use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

pub const GREETINGS: [&str; 3] = ["Hello", "Bonjour", "Ciao"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Emission {
    Idle,
    /// The greeting at this index was the last one sent.
    Emitting(usize),
    Done,
}

impl Emission {
    /// Advances one tick, returning the new state and the greeting to send, if any.
    fn tick(self) -> (Self, Option<&'static str>) {
        let next = match self {
            Self::Idle => 0,
            Self::Emitting(index) => index + 1,
            Self::Done => return (Self::Done, None),
        };

        match GREETINGS.get(next) {
            // The last greeting closes the sequence on the same tick.
            Some(&greeting) if next + 1 == GREETINGS.len() => (Self::Done, Some(greeting)),
            Some(&greeting) => (Self::Emitting(next), Some(greeting)),
            None => (Self::Done, None),
        }
    }
}

/// Starts a fresh greeting sequence, one greeting per `period`.
///
/// The stream ends after the last greeting. Dropping it stops the producer.
pub fn greetings(period: Duration) -> ReceiverStream<String> {
    let (tx, rx) = mpsc::channel(1);

    // `interval` panics on a zero period.
    let mut ticker = time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::spawn(async move {
        // The first tick of an interval completes immediately.
        ticker.tick().await;

        let mut state = Emission::Idle;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = tx.closed() => {
                    debug!("greeting subscriber went away");
                    return;
                }
            }

            let (next, greeting) = state.tick();
            state = next;

            if let Some(greeting) = greeting {
                debug!(greeting, "emitting greeting");
                if tx.send(greeting.to_owned()).await.is_err() {
                    debug!("greeting subscriber went away");
                    return;
                }
            }
            if state == Emission::Done {
                break;
            }
        }

        debug!("greetings done");
    });

    ReceiverStream::new(rx)
}
