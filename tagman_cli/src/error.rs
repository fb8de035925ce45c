//! Exit-code mapping for the CLI
//!
//! Three codes: success, failure (usage errors and other fatal
//! conditions such as an unknown container), and authentication failure.

/// Semantic exit codes for the CLI
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// Usage errors and other fatal failures
    pub const FAILURE: i32 = 1;
    /// Missing, expired, or rejected credentials
    pub const AUTH: i32 = 2;
}

/// Pick the process exit code for a fatal error.
///
/// Walks the cause chain so an auth failure keeps its code even after
/// context wrapping.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(core) = cause.downcast_ref::<tagman_client_core::Error>() {
            if core.is_auth() {
                return exit_code::AUTH;
            }
        }
    }
    exit_code::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn auth_errors_map_to_their_own_code_through_context() {
        let err = anyhow::Error::from(tagman_client_core::Error::auth("no cached token"))
            .context("Authentication required");
        assert_eq!(exit_code_for(&err), exit_code::AUTH);
    }

    #[test]
    fn other_errors_map_to_general_failure() {
        let err = anyhow::Error::from(tagman_client_core::Error::ContainerNotFound {
            name: "greetings".to_string(),
        });
        assert_eq!(exit_code_for(&err), exit_code::FAILURE);
    }
}
