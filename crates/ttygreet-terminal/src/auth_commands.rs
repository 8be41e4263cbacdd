//! Authentication commands: login, passwd.
//!
//! Both start an attempt with the external authenticator and ask for a
//! masked secret. The secret is not checked here; it is queued for the
//! authenticator and the verdict arrives through the completion channel.

use ttygreet_types::error::{GreeterError, Result};

use crate::commands::manual;
use crate::interpreter::{
    Challenge, ChallengeResult, Command, CommandRegistry, ExecutionResult, SessionContext,
};

/// Queue the secret for the attempt in progress, or reject it if the
/// authenticator is not waiting for one.
fn forward_secret(secret: &str, ctx: &mut SessionContext<'_>) -> ChallengeResult {
    if ctx.authenticator.in_authentication() {
        ctx.schedule_response(secret);
        ChallengeResult::Pending
    } else {
        log::debug!("Secret submitted with no authentication in progress");
        ChallengeResult::Rejected
    }
}

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

struct LoginCmd;
impl Command for LoginCmd {
    fn name(&self) -> &str {
        "login"
    }
    fn description(&self) -> &str {
        "Login using the given username."
    }
    fn usage(&self) -> &str {
        "login [USER]"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        let Some(&name) = args.first() else {
            return Ok(ExecutionResult::failure("usage: login [USER]"));
        };
        let Some(user) = ctx.authenticator.users().into_iter().find(|u| u.name == name) else {
            return Err(GreeterError::Lookup(format!("no such user: {name}")));
        };
        if ctx.session.is_none() {
            *ctx.session = user
                .session
                .clone()
                .or_else(|| ctx.authenticator.default_session());
        }
        ctx.begin_authentication(&user.name)?;
        Ok(ExecutionResult::NeedsSecret(None))
    }
    fn challenge(&self) -> Option<&dyn Challenge> {
        Some(self)
    }
}

impl Challenge for LoginCmd {
    fn respond(
        &self,
        secret: &str,
        _prior: &ExecutionResult,
        ctx: &mut SessionContext<'_>,
    ) -> ChallengeResult {
        forward_secret(secret, ctx)
    }
}

// ---------------------------------------------------------------------------
// passwd
// ---------------------------------------------------------------------------

struct PasswdCmd;
impl Command for PasswdCmd {
    fn name(&self) -> &str {
        "passwd"
    }
    fn description(&self) -> &str {
        "Login to an existing session."
    }
    fn usage(&self) -> &str {
        "passwd"
    }
    fn help(&self) -> Option<String> {
        Some(manual(self))
    }
    fn execute(&self, _args: &[&str], ctx: &mut SessionContext<'_>) -> Result<ExecutionResult> {
        let Some(user) = ctx.authenticator.users().into_iter().find(|u| u.logged_in) else {
            return Err(GreeterError::Lookup("no sessions exist".into()));
        };
        *ctx.session = user
            .session
            .clone()
            .or_else(|| ctx.authenticator.default_session());
        ctx.begin_authentication(&user.name)?;
        Ok(ExecutionResult::NeedsSecret(None))
    }
    fn challenge(&self) -> Option<&dyn Challenge> {
        Some(self)
    }
}

impl Challenge for PasswdCmd {
    fn respond(
        &self,
        secret: &str,
        _prior: &ExecutionResult,
        ctx: &mut SessionContext<'_>,
    ) -> ChallengeResult {
        forward_secret(secret, ctx)
    }
}

/// Register authentication commands.
pub fn register_auth_commands(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(Box::new(LoginCmd))?;
    reg.register(Box::new(PasswdCmd))?;
    Ok(())
}
