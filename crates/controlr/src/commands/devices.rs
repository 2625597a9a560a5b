//! Device command handlers.

use tabled::Tabled;

use controlr_core::{Accessory, Controller, Device};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccessoryRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Online")]
    online: &'static str,
}

impl From<&Accessory> for AccessoryRow {
    fn from(a: &Accessory) -> Self {
        Self {
            serial: a.serial.clone(),
            name: a.name.clone(),
            model: a.model.clone(),
            online: output::yes_no(a.online),
        }
    }
}

fn detail(d: &Device) -> String {
    [
        format!("Serial:     {}", d.dsn),
        format!("Name:       {}", d.product_name),
        format!("Model:      {}", d.model.as_deref().unwrap_or("-")),
        format!("OEM model:  {}", d.oem_model.as_deref().unwrap_or("-")),
        format!("Status:     {}", d.connection_status.as_deref().unwrap_or("-")),
        format!("LAN IP:     {}", d.lan_ip.as_deref().unwrap_or("-")),
        format!("MAC:        {}", d.mac.as_deref().unwrap_or("-")),
        format!("Firmware:   {}", d.sw_version.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let accessories = controller.connect().await?;
            let out = output::render_list(
                &global.output,
                &accessories,
                |a| AccessoryRow::from(a),
                |a| a.serial.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { serial } => {
            controller.sign_in().await?;
            let device = controller.device(&serial).await.map_err(|e| match e {
                controlr_core::CoreError::Api {
                    status: Some(404), ..
                } => CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: serial.clone(),
                    list_command: "devices list".into(),
                },
                other => other.into(),
            })?;
            let out = output::render_single(&global.output, &device, detail, |d| d.dsn.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
