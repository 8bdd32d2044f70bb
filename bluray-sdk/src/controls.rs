//! Control surfaces
//!
//! Thin adapters that turn user intents into coordinator commands with the
//! state each command should lead to. None of them write state; they all
//! read the coordinator's published snapshot.

use std::time::Duration;

use bluray_api::DeviceClient;
use bluray_state::{ConvergenceOutcome, Coordinator, PlaybackState, StateTarget};
use chrono::{DateTime, Utc};
use identity_store::IdentityStore;
use tracing::debug;

use crate::Result;

/// State a named IRCC command is expected to produce, if it is tracked
///
/// Commands without a target are sent without waiting for the player.
pub fn command_target(command: &str) -> Option<StateTarget> {
    match command {
        // Off goes to Idle, anything else to Off. The remote's power toggle
        // uses the same target, so waking from the remote waits for Idle
        // rather than the generic On state.
        "Power" => Some(StateTarget::power_toggle()),
        "Stop" | "Home" => Some(StateTarget::Fixed(PlaybackState::Idle)),
        "Play" | "Pause" | "Next" | "Prev" | "Advance" | "Replay" => {
            Some(StateTarget::Fixed(PlaybackState::Playing))
        }
        _ => None,
    }
}

/// Media player view of one player
pub struct MediaPlayer<C, S> {
    coordinator: Coordinator<C, S>,
}

impl<C: DeviceClient, S: IdentityStore> MediaPlayer<C, S> {
    pub fn new(coordinator: Coordinator<C, S>) -> Self {
        Self { coordinator }
    }

    pub fn name(&self) -> String {
        self.coordinator.client().nickname()
    }

    pub fn unique_id(&self) -> String {
        format!("{}_media_player", self.coordinator.client().host())
    }

    pub fn state(&self) -> PlaybackState {
        self.coordinator.state()
    }

    /// Title length in seconds
    pub fn media_duration(&self) -> Option<u64> {
        self.coordinator
            .snapshot()
            .position_info
            .map(|info| info.duration_secs)
    }

    pub fn media_position(&self) -> Option<u64> {
        self.coordinator
            .snapshot()
            .position_info
            .map(|info| info.position_secs)
    }

    /// When the reported position was read from the player
    pub fn media_position_updated_at(&self) -> Option<DateTime<Utc>> {
        self.coordinator
            .snapshot()
            .position_info
            .map(|info| info.observed_at)
    }

    pub async fn turn_on(&self) -> Result<ConvergenceOutcome> {
        self.send(PlaybackState::Idle, |c| c.power(true)).await
    }

    pub async fn turn_off(&self) -> Result<ConvergenceOutcome> {
        self.send(PlaybackState::Off, |c| c.power(false)).await
    }

    pub async fn play(&self) -> Result<ConvergenceOutcome> {
        self.send(PlaybackState::Playing, |c| c.play()).await
    }

    // Tracked as PLAYING, same as the other transport commands
    pub async fn pause(&self) -> Result<ConvergenceOutcome> {
        self.send(PlaybackState::Playing, |c| c.pause()).await
    }

    pub async fn play_pause(&self) -> Result<ConvergenceOutcome> {
        if self.state().is_playing() {
            self.pause().await
        } else {
            self.play().await
        }
    }

    pub async fn next(&self) -> Result<ConvergenceOutcome> {
        self.send(PlaybackState::Playing, |c| c.next()).await
    }

    pub async fn previous(&self) -> Result<ConvergenceOutcome> {
        self.send(PlaybackState::Playing, |c| c.prev()).await
    }

    pub async fn stop(&self) -> Result<ConvergenceOutcome> {
        self.send(PlaybackState::Idle, |c| c.stop()).await
    }

    async fn send<F>(&self, target: PlaybackState, action: F) -> Result<ConvergenceOutcome>
    where
        F: FnOnce(&C) -> bluray_api::Result<()> + Send + 'static,
    {
        Ok(self
            .coordinator
            .execute(StateTarget::Fixed(target), action)
            .await?)
    }
}

/// Remote control view of one player
pub struct Remote<C, S> {
    coordinator: Coordinator<C, S>,
}

impl<C: DeviceClient, S: IdentityStore> Remote<C, S> {
    pub fn new(coordinator: Coordinator<C, S>) -> Self {
        Self { coordinator }
    }

    /// `<mac without separators>_remote`, or `None` before the MAC is known
    pub fn unique_id(&self) -> Option<String> {
        self.coordinator
            .client()
            .identity()
            .clean_mac()
            .map(|mac| format!("{}_remote", mac))
    }

    pub fn state(&self) -> PlaybackState {
        self.coordinator.state()
    }

    pub async fn turn_on(&self) -> Result<ConvergenceOutcome> {
        Ok(self
            .coordinator
            .execute(StateTarget::Fixed(PlaybackState::Idle), |c| c.power(true))
            .await?)
    }

    pub async fn turn_off(&self) -> Result<ConvergenceOutcome> {
        Ok(self
            .coordinator
            .execute(StateTarget::Fixed(PlaybackState::Off), |c| c.power(false))
            .await?)
    }

    pub async fn toggle(&self) -> Result<ConvergenceOutcome> {
        if self.state().is_off() {
            self.turn_on().await
        } else {
            self.turn_off().await
        }
    }

    /// Send `commands` in order, `repeats` times, pausing `delay` after each
    ///
    /// Commands the player does not advertise are skipped without a pause.
    pub async fn send_command<I, T>(&self, commands: I, repeats: u32, delay: Duration) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let commands: Vec<String> = commands.into_iter().map(Into::into).collect();
        let identity = self.coordinator.client().identity();

        for _ in 0..repeats {
            for command in &commands {
                if !identity.supports(command) {
                    debug!("Skipping unsupported command {}", command);
                    continue;
                }

                send_named(&self.coordinator, command.clone()).await?;
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }
}

/// One button per advertised command
pub struct Button<C, S> {
    coordinator: Coordinator<C, S>,
    command: String,
}

impl<C: DeviceClient, S: IdentityStore> Button<C, S> {
    pub fn new(coordinator: Coordinator<C, S>, command: impl Into<String>) -> Self {
        Self {
            coordinator,
            command: command.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.command
    }

    pub fn unique_id(&self) -> String {
        format!("{}_{}", self.coordinator.client().host(), self.command)
    }

    /// Send the command; `None` when it is not tracked to a target state
    ///
    /// `Power` wakes the player when it is off and switches it off
    /// otherwise.
    pub async fn press(&self) -> Result<Option<ConvergenceOutcome>> {
        if self.command == "Power" {
            let power_on = self.coordinator.state().is_off();
            let outcome = self
                .coordinator
                .execute(StateTarget::power_toggle(), move |c| c.power(power_on))
                .await?;
            return Ok(Some(outcome));
        }

        send_named(&self.coordinator, self.command.clone()).await
    }
}

async fn send_named<C: DeviceClient, S: IdentityStore>(
    coordinator: &Coordinator<C, S>,
    command: String,
) -> Result<Option<ConvergenceOutcome>> {
    match command_target(&command) {
        Some(target) => {
            let outcome = coordinator
                .execute(target, move |c| c.send_command(&command))
                .await?;
            Ok(Some(outcome))
        }
        None => {
            coordinator
                .run_action(move |c| c.send_command(&command))
                .await?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Stop", Some(PlaybackState::Idle))]
    #[case("Home", Some(PlaybackState::Idle))]
    #[case("Play", Some(PlaybackState::Playing))]
    #[case("Pause", Some(PlaybackState::Playing))]
    #[case("Next", Some(PlaybackState::Playing))]
    #[case("Prev", Some(PlaybackState::Playing))]
    #[case("Advance", Some(PlaybackState::Playing))]
    #[case("Replay", Some(PlaybackState::Playing))]
    #[case("Eject", None)]
    #[case("Num5", None)]
    fn test_command_targets(#[case] command: &str, #[case] expected: Option<PlaybackState>) {
        let resolved = command_target(command).map(|target| target.resolve(PlaybackState::Off));
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_power_target_is_computed() {
        let target = command_target("Power").unwrap();
        assert_eq!(target.resolve(PlaybackState::Off), PlaybackState::Idle);
        assert_eq!(target.resolve(PlaybackState::Paused), PlaybackState::Off);
    }
}
