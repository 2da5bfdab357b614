//! Playback on a background task
//!
//! The task owns its [`PlaybackDriver`], ticks it on a fixed interval and
//! applies commands as they arrive. Events are forwarded on a channel.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::{PlaybackCommand, PlaybackDriver, PlaybackEvent};
use crate::error::{VisualizerError, VisualizerResult};

const CHANNEL_CAPACITY: usize = 64;

/// Handle to a running playback task
pub struct PlaybackSession {
    commands: mpsc::Sender<PlaybackCommand>,
    events: mpsc::Receiver<PlaybackEvent>,
    task: JoinHandle<PlaybackDriver>,
}

impl PlaybackSession {
    /// Spawn a task driving `driver` every `tick_interval`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut driver: PlaybackDriver, tick_interval: Duration) -> Self {
        let (command_tx, mut command_rx) = mpsc::channel::<PlaybackCommand>(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<PlaybackEvent>(CHANNEL_CAPACITY);
        let period = tick_interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("Playback session started ({} ms tick)", period.as_millis());

            loop {
                let event = tokio::select! {
                    command = command_rx.recv() => match command {
                        Some(command) => {
                            debug!("Playback command: {:?}", command);
                            driver.apply(command, Instant::now())
                        }
                        None => break,
                    },
                    _ = ticker.tick() => driver.tick(Instant::now()),
                };

                if let Some(event) = event {
                    if event_tx.send(event).await.is_err() {
                        break;
                    }
                }
            }

            debug!("Playback session ended at index {}", driver.index());
            driver
        });

        Self {
            commands: command_tx,
            events: event_rx,
            task,
        }
    }

    /// Queue a control command
    pub async fn send(&self, command: PlaybackCommand) -> VisualizerResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| VisualizerError::SessionClosed)
    }

    /// Next event, or `None` once the task has exited
    pub async fn next_event(&mut self) -> Option<PlaybackEvent> {
        self.events.recv().await
    }

    /// Stop the task and hand back its driver
    pub async fn shutdown(self) -> VisualizerResult<PlaybackDriver> {
        let Self {
            commands,
            events,
            task,
        } = self;
        drop(commands);
        drop(events);
        task.await
            .map_err(|e| VisualizerError::TaskFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackState;

    #[tokio::test]
    async fn test_session_plays_to_completion() {
        let mut driver = PlaybackDriver::default();
        // 1 mm at 6000 mm/min: 10 ms
        driver.load("G1 X1 F6000\nM5\n");

        let mut session = PlaybackSession::spawn(driver, Duration::from_millis(2));
        session.send(PlaybackCommand::Play).await.unwrap();

        let mut last_x = 0.0;
        loop {
            match session.next_event().await {
                Some(PlaybackEvent::Position { position, .. }) => last_x = position.x,
                Some(PlaybackEvent::Finished) => break,
                None => panic!("session ended early"),
            }
        }
        assert_eq!(last_x, 1.0);

        let driver = session.shutdown().await.unwrap();
        assert!(driver.is_finished());
        assert_eq!(driver.state(), PlaybackState::Stopped);
    }

    #[tokio::test]
    async fn test_steps_while_stopped() {
        let mut driver = PlaybackDriver::default();
        driver.load("G0 X5\nG0 Y5\n");

        let mut session = PlaybackSession::spawn(driver, Duration::from_millis(5));
        session.send(PlaybackCommand::StepForward).await.unwrap();
        session.send(PlaybackCommand::StepForward).await.unwrap();

        let mut positions = Vec::new();
        for _ in 0..2 {
            if let Some(PlaybackEvent::Position { position, .. }) = session.next_event().await {
                positions.push((position.x, position.y));
            }
        }
        assert_eq!(positions, vec![(5.0, 0.0), (5.0, 5.0)]);

        let driver = session.shutdown().await.unwrap();
        assert_eq!(driver.index(), 2);
        assert_eq!(driver.state(), PlaybackState::Stopped);
    }
}
