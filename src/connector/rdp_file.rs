//! One-way codec for the `.rdp` settings-file artifact.
//!
//! The external RDP client consumes a disposable, line-oriented
//! `key:type:value` text file. Rendering is deterministic: the same profile
//! and overrides always produce byte-identical output, so artifacts can be
//! diffed and cached. There is no parser; the file is written, handed to
//! the client, and thrown away.

use std::path::Path;

use anyhow::{Context, Result};

use crate::error::LaunchError;
use crate::profile::types::{ConnectionSettings, Profile, RdpSettings};

/// Protocol-recommended defaults appended to every rendered file. These are
/// constants of the artifact format, not user-configurable settings.
const RECOMMENDED_PREFIX: &[&str] = &[
    "use multimon:i:0",
    "session bpp:i:32",
    "compression:i:1",
    "keyboardhook:i:2",
    "audiocapturemode:i:0",
    "videoplaybackmode:i:1",
    "connection type:i:7",
    "networkautodetect:i:1",
    "bandwidthautodetect:i:1",
    "displayconnectionbar:i:1",
    "enableworkspacereconnect:i:0",
    "disable wallpaper:i:0",
    "allow font smoothing:i:0",
    "allow desktop composition:i:0",
    "disable full window drag:i:1",
    "disable menu anims:i:1",
    "disable themes:i:0",
    "disable cursor setting:i:0",
    "bitmapcachepersistenable:i:1",
];

const RECOMMENDED_SUFFIX: &[&str] = &[
    "audiomode:i:1",
    "redirectprinters:i:1",
    "redirectcomports:i:0",
    "redirectsmartcards:i:1",
    "redirectclipboard:i:1",
    "redirectposdevices:i:0",
    "drivestoredirect:s:",
    "autoreconnection enabled:i:1",
    "authentication level:i:2",
    "prompt for credentials:i:0",
    "negotiate security layer:i:1",
    "remoteapplicationmode:i:0",
    "alternate shell:s:",
    "shell working directory:s:",
    "gatewayhostname:s:",
    "gatewayusagemethod:i:4",
    "gatewaycredentialssource:i:4",
    "gatewayprofileusagemethod:i:0",
    "promptcredentialonce:i:0",
    "gatewaybrokeringtype:i:0",
    "use redirection server name:i:0",
    "rdgiskdcproxy:i:0",
    "kdcproxyname:s:",
];

fn rdp_settings(profile: &Profile) -> Result<&RdpSettings, LaunchError> {
    match &profile.settings {
        ConnectionSettings::Rdp(settings) => Ok(settings),
        ConnectionSettings::Ssh(_) => Err(LaunchError::NotAnRdpProfile {
            profile: profile.name.clone(),
        }),
    }
}

/// Render the `.rdp` artifact for a profile.
///
/// `override_host` and `override_port` replace the profile's own endpoint
/// when a prerequisite tunnel moved the actual endpoint elsewhere (e.g., a
/// locally forwarded port). The port falls back to 3389 when neither the
/// profile nor the override supplies one. Optional screen dimensions are
/// omitted entirely when unset rather than written as zero.
///
/// # Errors
///
/// [`LaunchError::NotAnRdpProfile`] if the profile is not RDP-kind.
pub fn render(
    profile: &Profile,
    override_host: Option<&str>,
    override_port: Option<u16>,
) -> Result<String, LaunchError> {
    let settings = rdp_settings(profile)?;

    let host = override_host.unwrap_or(&profile.host);
    let port = override_port.or(profile.port).unwrap_or(3389);
    let username = profile.username.as_deref().unwrap_or("");

    let mut lines: Vec<String> = Vec::with_capacity(64);
    lines.push(format!(
        "screen mode id:i:{}",
        if settings.full_screen { 2 } else { 1 }
    ));
    if let Some(width) = settings.desktop_width {
        lines.push(format!("desktopwidth:i:{width}"));
    }
    if let Some(height) = settings.desktop_height {
        lines.push(format!("desktopheight:i:{height}"));
    }
    lines.push(format!("username:s:{username}"));
    lines.extend(RECOMMENDED_PREFIX.iter().map(|s| s.to_string()));
    lines.push(format!("full address:s:{host}:{port}"));
    lines.extend(RECOMMENDED_SUFFIX.iter().map(|s| s.to_string()));

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Render the artifact and write it to `path`.
pub fn save_as(
    profile: &Profile,
    path: &Path,
    override_host: Option<&str>,
    override_port: Option<u16>,
) -> Result<()> {
    let contents = render(profile, override_host, override_port)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write .rdp file to {path:?}"))?;
    log::info!("wrote .rdp artifact for '{}' to {path:?}", profile.name);
    Ok(())
}

/// Command-line arguments for launching the RDP client against a rendered
/// artifact. Admin-mode profiles get the console-session switch.
pub fn client_arguments(profile: &Profile, rdp_path: &Path) -> Result<Vec<String>, LaunchError> {
    let settings = rdp_settings(profile)?;
    let mut args = vec![rdp_path.display().to_string()];
    if settings.admin {
        args.push("/admin".to_string());
    }
    Ok(args)
}
