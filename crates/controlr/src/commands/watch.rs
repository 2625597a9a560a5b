//! `watch`: poll every heater and print state changes until Ctrl-C.
//!
//! The controller's renewal task keeps the session alive for as long as
//! the loop runs.

use std::collections::HashMap;
use std::time::Duration;

use owo_colors::OwoColorize;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use controlr_core::{Controller, HeaterStatus};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let accessories = controller.connect().await?;
    if !global.quiet {
        eprintln!(
            "Watching {} heater(s) every {}s -- Ctrl-C to stop",
            accessories.len(),
            args.interval
        );
    }

    let result = poll_loop(controller, &args, global).await;
    controller.shutdown().await;
    result
}

async fn poll_loop(
    controller: &Controller,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut last: HashMap<String, HeaterStatus> = HashMap::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls: u32 = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        if args.rediscover_every > 0 && polls > 0 && polls % args.rediscover_every == 0 {
            match controller.discover().await {
                Ok(diff) => {
                    for gone in &diff.removed {
                        last.remove(&gone.serial);
                    }
                }
                Err(e) if e.is_transient() => warn!(error = %e, "device re-listing failed"),
                Err(e) => return Err(e.into()),
            }
        }
        polls = polls.wrapping_add(1);

        for accessory in controller.accessories().await {
            let status = match controller.status(&accessory.serial).await {
                Ok(status) => status,
                Err(e) if e.is_transient() => {
                    warn!(serial = %accessory.serial, error = %e, "poll failed");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let previous = last.get(&accessory.serial);
            if previous != Some(&status) {
                print_change(&global.output, previous, &status, color)?;
                last.insert(accessory.serial.clone(), status);
            }
        }
    }
}

fn print_change(
    format: &OutputFormat,
    previous: Option<&HeaterStatus>,
    status: &HeaterStatus,
    color: bool,
) -> Result<(), CliError> {
    let line = match format {
        OutputFormat::Table | OutputFormat::Plain => change_line(previous, status, color),
        // One record per line so the stream stays parseable.
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            serde_json::to_string(status)?
        }
    };
    println!("{line}");
    Ok(())
}

fn change_line(previous: Option<&HeaterStatus>, s: &HeaterStatus, color: bool) -> String {
    let field = |label: &str, value: String, changed: bool| {
        let text = format!("{label}={value}");
        if color && changed {
            text.yellow().bold().to_string()
        } else {
            text
        }
    };
    let changed = |f: fn(&HeaterStatus) -> String| previous.is_some_and(|p| f(p) != f(s));

    let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
    let stamp = if color { stamp.dimmed().to_string() } else { stamp };

    [
        stamp,
        s.serial.clone(),
        field("active", s.active.to_string(), changed(|x| x.active.to_string())),
        field(
            "target",
            format!("{}°C", s.target_temperature_c),
            changed(|x| x.target_temperature_c.to_string()),
        ),
        field(
            "in_use",
            s.water_in_use.to_string(),
            changed(|x| x.water_in_use.to_string()),
        ),
        field(
            "ready",
            s.water_is_ready.to_string(),
            changed(|x| x.water_is_ready.to_string()),
        ),
    ]
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use controlr_core::{CurrentHeaterState, TargetHeaterState};

    fn status(active: bool, target: i32) -> HeaterStatus {
        HeaterStatus {
            serial: "AC0001".into(),
            active,
            current_state: CurrentHeaterState::from(active),
            target_state: TargetHeaterState::Heat,
            target_temperature_c: target,
            water_in_use: false,
            water_is_ready: false,
        }
    }

    #[test]
    fn change_line_lists_every_field() {
        let line = change_line(None, &status(true, 49), false);
        assert!(line.ends_with("AC0001 active=true target=49°C in_use=false ready=false"));
    }

    #[test]
    fn uncolored_line_has_no_escapes() {
        let before = status(false, 49);
        let line = change_line(Some(&before), &status(true, 49), false);
        assert!(!line.contains('\u{1b}'));
    }

    #[test]
    fn changed_field_is_highlighted() {
        let before = status(false, 49);
        let line = change_line(Some(&before), &status(true, 49), true);
        let active = line
            .split(' ')
            .find(|part| part.contains("active="))
            .unwrap_or_default();
        assert!(active.contains('\u{1b}'));
        assert!(line.contains("target=49°C"));
    }
}
