//! Authentication probe.

use serde::Serialize;
use smlight_api::DeviceClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct AuthStatus {
    auth_required: bool,
}

pub async fn handle(client: &DeviceClient, global: &GlobalOpts) -> Result<(), CliError> {
    let status = AuthStatus {
        auth_required: client.check_auth_needed(false).await?,
    };
    let out = output::render_single(global.output, &status, |s| {
        if s.auth_required {
            "authentication required".to_owned()
        } else {
            "no authentication required".to_owned()
        }
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
