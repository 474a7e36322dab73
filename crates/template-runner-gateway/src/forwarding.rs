//! Request normalization before delegation to the engine.

use template_runner_engine::{
    DeviceSearch, ForwardedCredential, RequestType, SearchCriteria, TemplateRunnerRequest,
};

use crate::error::ApiError;

/// Settle which targets the engine receives.
///
/// An explicit device list always wins; any search criteria sent alongside it
/// are dropped.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when the device list is empty and the
/// criteria are absent or empty.
pub fn resolve_targets(
    device_list: &[DeviceSearch],
    search_criteria: &mut Option<SearchCriteria>,
) -> Result<(), ApiError> {
    if !device_list.is_empty() {
        if search_criteria.take().is_some() {
            tracing::debug!(
                devices = device_list.len(),
                "Device list supplied, ignoring search criteria"
            );
        }
        return Ok(());
    }

    if search_criteria.as_ref().map_or(true, SearchCriteria::is_empty) {
        tracing::error!("Request has neither a device list nor search criteria");
        return Err(ApiError::Validation(
            "Either device_list or search_criteria must be provided".to_string(),
        ));
    }

    Ok(())
}

/// Substitute the caller's session token into a run request.
///
/// Lookup runs always use the session token. Passthru runs use it only when
/// no device username was supplied; otherwise the supplied username and
/// password go through untouched.
pub fn apply_session_credential(request: &mut TemplateRunnerRequest, session_token: &str) {
    let use_session = match request.request_type {
        RequestType::TemplateLookup => true,
        RequestType::SshPassthru => !request.has_device_username(),
    };

    if use_session {
        request.jwt = Some(session_token.to_string());
    }

    match request.forwarded_credential() {
        ForwardedCredential::Token(token) => {
            tracing::debug!(has_token = token.is_some(), "Forwarding session token");
        }
        ForwardedCredential::Password { username, password } => {
            tracing::debug!(
                username,
                has_password = password.is_some(),
                "Forwarding supplied device credentials"
            );
        }
    }
}
