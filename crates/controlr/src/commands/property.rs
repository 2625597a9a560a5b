//! Raw property command handlers.

use serde_json::{Value, json};

use controlr_core::Controller;

use crate::cli::{GlobalOpts, PropertyArgs, PropertyCommand};
use crate::error::CliError;
use crate::output;

/// Parse a CLI value as JSON, falling back to a bare string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

pub async fn handle(
    controller: &Controller,
    args: PropertyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.sign_in().await?;
    let adapter = controller.adapter();

    match args.command {
        PropertyCommand::Get { serial, name } => {
            let value = adapter.read_raw(&serial, &name).await?;
            let record = json!({ "serial": serial, "name": name, "value": value });
            let out = output::render_single(
                &global.output,
                &record,
                |_| value.to_string(),
                |_| value.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PropertyCommand::Set {
            serial,
            name,
            value,
        } => {
            let value = parse_value(&value);
            adapter.write_raw(&serial, &name, &value).await?;
            if !global.quiet {
                eprintln!("Set {name} = {value} on {serial}");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_parse_as_json_first() {
        assert_eq!(parse_value("1"), json!(1));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("\"on\""), json!("on"));
        assert_eq!(parse_value("on"), json!("on"));
    }
}
