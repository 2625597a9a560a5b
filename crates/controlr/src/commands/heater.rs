//! Heater command handlers.

use controlr_core::{Characteristic, CharacteristicValue, Controller, HeaterStatus};
use serde_json::json;

use crate::cli::{GlobalOpts, HeaterArgs, HeaterCommand};
use crate::error::CliError;
use crate::output::{self, yes_no};

fn detail(s: &HeaterStatus) -> String {
    [
        format!("Serial:          {}", s.serial),
        format!("Recirculation:   {}", if s.active { "on" } else { "off" }),
        format!("State:           {}", s.current_state),
        format!("Target:          {} °C", s.target_temperature_c),
        format!("Water in use:    {}", yes_no(s.water_in_use)),
        format!("Hot water ready: {}", yes_no(s.water_is_ready)),
    ]
    .join("\n")
}

fn status_line(s: &HeaterStatus) -> String {
    format!(
        "{} active={} target={} in_use={} ready={}",
        s.serial, s.active, s.target_temperature_c, s.water_in_use, s.water_is_ready
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: HeaterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.sign_in().await?;

    match args.command {
        HeaterCommand::Status { serial } => {
            let status = controller.status(&serial).await?;
            let out = output::render_single(&global.output, &status, detail, status_line)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HeaterCommand::Get {
            serial,
            characteristic,
        } => {
            let value = controller.handle_get(&serial, characteristic).await?;
            let record = json!({
                "serial": serial,
                "characteristic": characteristic,
                "value": value,
            });
            let out = output::render_single(
                &global.output,
                &record,
                |_| value.to_string(),
                |_| value.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HeaterCommand::On { serial } => set_active(controller, &serial, true, global).await,
        HeaterCommand::Off { serial } => set_active(controller, &serial, false, global).await,

        HeaterCommand::Temp { serial, celsius } => {
            controller
                .handle_set(
                    &serial,
                    Characteristic::HeatingThresholdTemperature,
                    CharacteristicValue::Integer(celsius),
                )
                .await?;
            if !global.quiet {
                eprintln!("Target temperature set to {celsius} °C");
            }
            Ok(())
        }
    }
}

async fn set_active(
    controller: &Controller,
    serial: &str,
    active: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller
        .handle_set(
            serial,
            Characteristic::Active,
            CharacteristicValue::Bool(active),
        )
        .await?;
    if !global.quiet {
        let state = if active { "on" } else { "off" };
        eprintln!("Recirculation turned {state}");
    }
    Ok(())
}
