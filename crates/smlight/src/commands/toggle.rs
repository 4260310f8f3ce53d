//! Setting toggle handler.

use smlight_api::{DeviceClient, Setting};

use crate::cli::{GlobalOpts, ToggleArgs, ToggleState};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &DeviceClient,
    args: ToggleArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let setting = Setting::from(args.setting);
    let enable = args.state == ToggleState::On;

    if !client.set_setting(setting, enable).await? {
        return Err(CliError::Rejected {
            command: format!("toggle {}", setting.sensor_field()),
        });
    }

    let state = if enable { "on" } else { "off" };
    output::print_output(&format!("{}: {state}", setting.sensor_field()), global.quiet);
    Ok(())
}
