//! Power commands: poweroff, reboot, suspend.

use ttygreet_types::error::Result;

use crate::commands::manual;
use crate::interpreter::{Command, CommandRegistry, ExecutionResult, SessionContext};

/// Register power commands.
pub fn register_system_commands(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(Box::new(PoweroffCmd))?;
    reg.register(Box::new(RebootCmd))?;
    reg.register(Box::new(SuspendCmd))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// poweroff
// ---------------------------------------------------------------------------

struct PoweroffCmd;
impl Command for PoweroffCmd {
    fn name(&self) -> &str {
        "poweroff"
    }
    fn description(&self) -> &str {
        "Power off the machine."
    }
    fn usage(&self) -> &str {
        "poweroff"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, _args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        log::info!("Shutdown requested");
        ctx.authenticator.shutdown()?;
        Ok(ExecutionResult::silent())
    }
}

// ---------------------------------------------------------------------------
// reboot
// ---------------------------------------------------------------------------

struct RebootCmd;
impl Command for RebootCmd {
    fn name(&self) -> &str {
        "reboot"
    }
    fn description(&self) -> &str {
        "Reboot the machine."
    }
    fn usage(&self) -> &str {
        "reboot"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, _args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        log::info!("Restart requested");
        ctx.authenticator.restart()?;
        Ok(ExecutionResult::silent())
    }
}

// ---------------------------------------------------------------------------
// suspend
// ---------------------------------------------------------------------------

struct SuspendCmd;
impl Command for SuspendCmd {
    fn name(&self) -> &str {
        "suspend"
    }
    fn description(&self) -> &str {
        "Suspend the machine."
    }
    fn usage(&self) -> &str {
        "suspend"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, _args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        log::info!("Suspend requested");
        ctx.authenticator.suspend()?;
        Ok(ExecutionResult::silent())
    }
}

#[cfg(test)]
mod tests {
    use ttygreet_types::config::{DirectoryConfig, TerminalConfig};

    use super::*;
    use crate::directory::{PowerAction, StaticDirectory};
    use crate::session::SessionEngine;
    use crate::test_support::{FakeAuthenticator, RecordingSink};

    fn config() -> TerminalConfig {
        TerminalConfig {
            echo_input: false,
            show_motd: false,
            ..TerminalConfig::default()
        }
    }

    fn registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        register_system_commands(&mut reg).unwrap();
        reg
    }

    #[test]
    fn power_commands_reach_authenticator() {
        let mut e = SessionEngine::new(
            registry(),
            FakeAuthenticator::new(),
            RecordingSink::default(),
            "box",
            config(),
        );
        e.submit("poweroff");
        e.submit("reboot");
        e.submit("suspend");
        assert_eq!(e.authenticator().calls, vec!["shutdown", "restart", "suspend"]);
        assert!(e.sink().events.is_empty());
    }

    #[test]
    fn directory_records_last_power_action() {
        let mut e = SessionEngine::new(
            registry(),
            StaticDirectory::new(&DirectoryConfig::default()),
            RecordingSink::default(),
            "box",
            config(),
        );
        e.submit("reboot");
        assert_eq!(e.authenticator().power_action(), Some(PowerAction::Restart));
    }

    #[test]
    fn power_commands_have_manual_pages() {
        let reg = registry();
        for name in ["poweroff", "reboot", "suspend"] {
            let page = reg.get(name).and_then(|c| c.help()).unwrap();
            assert!(page.contains(name));
        }
    }
}
