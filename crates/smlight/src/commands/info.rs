//! Device info and sensor handlers.

use smlight_api::{DeviceClient, Info, Sensors};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn opt<T: ToString>(value: Option<&T>) -> Option<String> {
    value.map(ToString::to_string)
}

fn on_off(value: Option<bool>) -> Option<String> {
    value.map(|v| if v { "on" } else { "off" }.to_owned())
}

fn info_detail(info: &Info) -> String {
    let mut out = output::detail_lines(&[
        ("model", info.model.clone()),
        ("mac", info.mac.clone()),
        ("device_ip", info.device_ip.clone()),
        ("sw_version", info.sw_version.clone()),
        ("fw_channel", info.fw_channel.clone()),
        ("coord_mode", opt(info.coord_mode.as_ref())),
        ("zb_hw", info.zb_hw.clone()),
        ("zb_version", info.zb_version.clone()),
        ("zb_type", opt(info.zb_type.as_ref())),
        ("ram_total", opt(info.ram_total.as_ref())),
        ("fs_total", opt(info.fs_total.as_ref())),
    ]);

    if let Some(ref radios) = info.radios {
        for (i, radio) in radios.iter().enumerate() {
            let line = format!(
                "radio[{i}]: {} {} type={}",
                radio.zb_hw.as_deref().unwrap_or("-"),
                radio.zb_version.as_deref().unwrap_or("-"),
                radio
                    .zb_type
                    .map_or_else(|| "-".to_owned(), |t| t.to_string()),
            );
            out.push('\n');
            out.push_str(&line);
        }
    }
    out
}

fn sensors_detail(sensors: &Sensors) -> String {
    output::detail_lines(&[
        ("esp32_temp", Some(format!("{:.1}", sensors.esp32_temp))),
        ("zb_temp", Some(format!("{:.1}", sensors.zb_temp))),
        ("uptime", opt(sensors.uptime.as_ref())),
        ("socket_uptime", opt(sensors.socket_uptime.as_ref())),
        ("ram_usage", opt(sensors.ram_usage.as_ref())),
        ("fs_used", opt(sensors.fs_used.as_ref())),
        ("ethernet", on_off(Some(sensors.ethernet))),
        ("wifi_connected", on_off(Some(sensors.wifi_connected))),
        ("disable_leds", on_off(sensors.disable_leds)),
        ("night_mode", on_off(sensors.night_mode)),
        ("auto_zigbee", on_off(sensors.auto_zigbee)),
        ("vpn_enabled", on_off(sensors.vpn_enabled)),
    ])
}

pub async fn handle_info(client: &DeviceClient, global: &GlobalOpts) -> Result<(), CliError> {
    let info = client.get_info().await?;
    let out = output::render_single(global.output, &info, info_detail)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_sensors(client: &DeviceClient, global: &GlobalOpts) -> Result<(), CliError> {
    let sensors = client.get_sensors().await?;
    let out = output::render_single(global.output, &sensors, sensors_detail)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
