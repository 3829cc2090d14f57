//! Feeds a scenario into the dispatcher

use anyhow::Result;
use placement_core::{Notification, Viewport};
use placement_runtime::DispatcherHandle;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::ReplayConfig;
use crate::engine::{lock_world, SimWorld};
use crate::scenario::{Command, Scenario};

/// Replay every step of the scenario in order
pub async fn run(
    scenario: &Scenario,
    handle: &DispatcherHandle,
    world: &Arc<Mutex<SimWorld>>,
    viewport: Viewport,
    config: &ReplayConfig,
) -> Result<()> {
    info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        steps = scenario.len(),
        "Replaying scenario"
    );

    for (index, step) in scenario.steps.iter().enumerate() {
        let command = step.action.to_command(viewport)?;
        let delay = step.delay_ms.unwrap_or(config.step_delay_ms);

        for _ in 0..step.repeat {
            match &command {
                Command::Event(event) => {
                    debug!(step = index, event = event.name(), "Sending event");
                    handle.send(event.clone()).await?;
                }
                Command::AddSurface(patch) => {
                    // Events already queued must see the old world
                    handle.barrier().await?;
                    let mut world = lock_world(world);
                    world.add_patch(patch.clone());
                    debug!(
                        step = index,
                        rect = ?patch.rect,
                        visible = world.patch_count(),
                        "Surface now visible"
                    );
                }
                Command::ClearSurfaces => {
                    handle.barrier().await?;
                    lock_world(world).clear();
                    debug!(step = index, "Camera pointed away from all surfaces");
                }
            }
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }
    }

    handle.barrier().await?;
    Ok(())
}

/// Collect notifications until the dispatcher shuts down
pub async fn collect(mut rx: broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    loop {
        match rx.recv().await {
            Ok(notification) => seen.push(notification),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Notification collector fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    seen
}
