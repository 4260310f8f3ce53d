//! Device command handler (reboot, Zigbee restart/bootloader/router).

use smlight_api::DeviceClient;

use crate::cli::{CmdArgs, DeviceCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &DeviceClient,
    args: CmdArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let commands = client.commands();
    let (name, accepted) = match args.command {
        DeviceCommand::Reboot => ("reboot", commands.reboot().await?),
        DeviceCommand::ZbRestart => ("zb-restart", commands.zb_restart().await?),
        DeviceCommand::ZbBootloader => ("zb-bootloader", commands.zb_bootloader().await?),
        DeviceCommand::ZbRouter => ("zb-router", commands.zb_router(args.idx).await?),
    };

    if !accepted {
        return Err(CliError::Rejected {
            command: name.into(),
        });
    }

    output::print_output(&format!("{name}: ok"), global.quiet);
    Ok(())
}
