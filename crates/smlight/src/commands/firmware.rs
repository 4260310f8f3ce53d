//! Firmware release listing.

use smlight_api::{DeviceClient, Firmware, FirmwareMode};

use crate::cli::{FirmwareArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn firmware_row(fw: &Firmware) -> String {
    let version = fw.ver.as_deref().or(fw.rev.as_deref()).unwrap_or("-");
    let channel = if fw.dev { "dev" } else { "stable" };
    let mut row = format!("{version:<12} {channel:<6}");
    if let Some(t) = fw.fw_type {
        row.push_str(&format!(" type={t}"));
    }
    if let Some(ref link) = fw.link {
        row.push(' ');
        row.push_str(link);
    }
    row
}

pub async fn handle(
    client: &DeviceClient,
    args: FirmwareArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mode = if args.zigbee {
        FirmwareMode::Zigbee
    } else {
        FirmwareMode::Esp
    };

    let device = match (mode, args.device) {
        (FirmwareMode::Zigbee, None) => client.get_info().await?.model,
        (_, device) => device,
    };

    let releases = client
        .get_firmware_version(
            args.channel.as_deref(),
            device.as_deref(),
            mode,
            args.zb_type,
            args.idx,
        )
        .await?
        .unwrap_or_default();

    let out = output::render_list(global.output, &releases, firmware_row)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
