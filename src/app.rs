// One invocation of the adapter, from parsed arguments to return code

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::actions::{dispatch, ActionContext, Mode, ReturnCode};
use crate::executor::PlaybookRunner;
use crate::payload::Payload;

/// What the command line asked for
#[derive(Debug, Clone)]
pub struct Invocation {
    /// `--execute` was given
    pub execute: bool,
    pub mode: String,
    pub ssm_region: String,
    /// Raw arguments, for the audit log
    pub args: Vec<String>,
}

/// Read the payload from `input`, run the requested mode and log the outcome.
///
/// Nothing is read from `input` unless `--execute` was given.
pub async fn run<R>(invocation: &Invocation, mut input: R, runner: &dyn PlaybookRunner) -> ReturnCode
where
    R: AsyncRead + Unpin,
{
    if !invocation.execute {
        tracing::error!(
            "Unsupported execution mode (expected --execute flag) :: {:?}",
            invocation.args
        );
        return ReturnCode::Failure;
    }

    let mut text = String::new();
    if let Err(e) = input.read_to_string(&mut text).await {
        tracing::error!("Failed to read payload from stdin: {}", e);
        return ReturnCode::Failure;
    }

    let payload = match Payload::from_json(&text) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("{}", e);
            if let Some(hint) = e.hint() {
                tracing::error!("Hint: {}", hint);
            }
            return ReturnCode::Failure;
        }
    };

    tracing::info!("Args: {:?} -- {}", invocation.args, payload.redacted_json());

    let code = match invocation.mode.parse::<Mode>() {
        Ok(mode) => {
            let ctx = ActionContext {
                runner,
                ssm_region: invocation.ssm_region.clone(),
            };
            dispatch(mode, &payload.configuration, &ctx).await
        }
        Err(_) => {
            tracing::error!("Unknown mode {}", invocation.mode);
            ReturnCode::Failure
        }
    };

    match code {
        ReturnCode::Success => tracing::info!("Return Code: {}", code.code()),
        ReturnCode::Failure => tracing::error!("Return Code: {}", code.code()),
    }
    code
}
