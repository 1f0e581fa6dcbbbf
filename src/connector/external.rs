//! External connector program definitions.
//!
//! SSH-kind steps are handed to a terminal program chosen by the user. A
//! definition names the executable and an argument template with `{host}`,
//! `{port}`, and `{username}` placeholders; canned definitions cover the
//! common Windows terminal clients, and [`ssh_command_args`] builds argv
//! for a plain OpenSSH client.

use serde::{Deserialize, Serialize};

use crate::connector::launch::Endpoint;
use crate::error::LaunchError;
use crate::profile::types::{ConnectionSettings, Profile};

/// Definition of an external terminal program used to execute SSH steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalProgramDefinition {
    /// Storage identity; None until committed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Display name of the program
    pub name: String,

    /// Path to the executable
    pub exe_path: String,

    /// Argument template; tokens may contain `{host}`, `{port}` and
    /// `{username}` placeholders
    pub argument_format: String,
}

impl ExternalProgramDefinition {
    /// Canned definition for Tera Term
    pub fn teraterm() -> Self {
        Self {
            id: None,
            name: "Tera Term".to_string(),
            exe_path: r"C:\Program Files (x86)\teraterm\ttermpro.exe".to_string(),
            argument_format: "{host}:{port} /ssh /2 /user={username}".to_string(),
        }
    }

    /// Canned definition for RLogin
    pub fn rlogin() -> Self {
        Self {
            id: None,
            name: "RLogin".to_string(),
            exe_path: r"C:\Program Files\RLogin\RLogin.exe".to_string(),
            argument_format: "{username}@{host}:{port}".to_string(),
        }
    }

    /// Expand the argument template against an endpoint and username.
    ///
    /// The template is split with shell rules first, then placeholders are
    /// substituted per token, so a hostname can never smuggle extra
    /// arguments in.
    pub fn build_arguments(&self, endpoint: &Endpoint, username: Option<&str>) -> Vec<String> {
        let tokens = shell_words::split(&self.argument_format).unwrap_or_else(|_| {
            log::warn!(
                "unbalanced quoting in argument template of '{}'; splitting on whitespace",
                self.name
            );
            self.argument_format
                .split_whitespace()
                .map(str::to_string)
                .collect()
        });

        tokens
            .into_iter()
            .map(|token| {
                token
                    .replace("{host}", &endpoint.host)
                    .replace("{port}", &endpoint.port.to_string())
                    .replace("{username}", username.unwrap_or(""))
            })
            .collect()
    }
}

/// Build argv for a plain OpenSSH client connecting an SSH profile to the
/// given endpoint.
///
/// The port flag is elided at the default port 22; an identity file adds
/// `-i`; extra arguments from the profile are split with shell rules.
///
/// # Errors
///
/// [`LaunchError::NotAnSshProfile`] if the profile is not SSH-kind.
pub fn ssh_command_args(
    profile: &Profile,
    endpoint: &Endpoint,
) -> Result<Vec<String>, LaunchError> {
    let settings = match &profile.settings {
        ConnectionSettings::Ssh(settings) => settings,
        ConnectionSettings::Rdp(_) => {
            return Err(LaunchError::NotAnSshProfile {
                profile: profile.name.clone(),
            });
        }
    };

    let mut args = Vec::new();
    if endpoint.port != 22 {
        args.push("-p".to_string());
        args.push(endpoint.port.to_string());
    }
    if let Some(identity) = &settings.identity_file {
        args.push("-i".to_string());
        args.push(identity.clone());
    }
    if let Some(extra) = &settings.extra_args {
        match shell_words::split(extra) {
            Ok(words) => args.extend(words),
            Err(_) => {
                log::warn!(
                    "unbalanced quoting in extra ssh args of '{}'; ignoring them",
                    profile.name
                );
            }
        }
    }

    let target = if let Some(user) = &profile.username {
        format!("{}@{}", user, endpoint.host)
    } else {
        endpoint.host.clone()
    };
    args.push(target);

    Ok(args)
}
