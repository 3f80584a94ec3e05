use std::{
    io,
    os::unix::process::CommandExt,
    process::{Command, Stdio},
};

use log::{error, info};

use crate::state::Action;

const LOGINCTL: &str = "loginctl";

/// Starts the command performing an action.
///
/// Launching is fire-and-forget: implementations never report failures back.
pub trait Launcher {
    fn launch(&mut self, action: Action);
}

/// Runs actions through `loginctl`, detached from this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loginctl;

impl Launcher for Loginctl {
    fn launch(&mut self, action: Action) {
        let args = arguments(action, current_uid());
        info!("Running {action}: `{LOGINCTL} {}`", args.join(" "));

        match Command::new(LOGINCTL)
            .args(&args)
            .stdin(Stdio::null())
            .process_group(0)
            .spawn()
        {
            // SIGCHLD is ignored, so the kernel reaps the child for us
            Ok(child) => drop(child),
            Err(e) => error!("Failed to start {LOGINCTL}: {e}"),
        }
    }
}

/// Arguments given to `loginctl` to perform `action`.
pub fn arguments(action: Action, uid: u32) -> Vec<String> {
    match action {
        Action::Reboot => vec!["reboot".to_owned()],
        Action::Shutdown => vec!["poweroff".to_owned()],
        Action::Suspend => vec!["suspend".to_owned()],
        Action::Logout => vec!["terminate-user".to_owned(), uid.to_string()],
    }
}

pub fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail
    unsafe { libc::getuid() }
}

/// Lets the kernel reap terminated children, so launched commands never become zombies.
///
/// Must be called once, before any action is launched.
pub fn ignore_children() -> io::Result<()> {
    // SAFETY: SIG_IGN is a valid disposition for SIGCHLD and no handler code runs
    let previous = unsafe { libc::signal(libc::SIGCHLD, libc::SIG_IGN) };
    if previous == libc::SIG_ERR {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
