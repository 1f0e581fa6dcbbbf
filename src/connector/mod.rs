//! Connection hand-off to external connector programs
//!
//! par-connect resolves *what* to connect and in *which order*; the actual
//! sessions are opened by external programs (an RDP client, a terminal
//! emulator, OpenSSH). This module produces everything those programs
//! need: the ordered launch plan, the disposable `.rdp` artifact, and the
//! command lines for SSH-capable terminals.

pub mod external;
pub mod launch;
pub mod rdp_file;

pub use external::{ExternalProgramDefinition, ssh_command_args};
pub use launch::{Endpoint, LaunchStep, resolve_launch_plan};
