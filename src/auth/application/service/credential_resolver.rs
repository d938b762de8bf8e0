use crate::{
    auth::application::source::{CredentialSource, field},
    core::domain::{
        error::{ProxmoxError, ProxmoxResult},
        model::credentials::{
            Credentials, DEFAULT_PORT, DEFAULT_REALM, DEFAULT_SYSTEM, ResolvedFields,
        },
    },
};
use std::collections::HashMap;

/// Fields that make password (ticket) authentication possible.
pub const PASSWORD_KEYS: [&str; 3] = [field::HOSTNAME, field::USERNAME, field::PASSWORD];
/// Fields that make API token authentication possible.
pub const TOKEN_KEYS: [&str; 3] = [field::HOSTNAME, field::TOKEN_ID, field::TOKEN_SECRET];

/// Turns any [`CredentialSource`] into [`Credentials`].
///
/// Resolution succeeds when every key of at least one of [`PASSWORD_KEYS`]
/// and [`TOKEN_KEYS`] is present. Optional fields then fall back to
/// `realm = "pam"`, `port = "8006"`, `system = "pve"` and empty token fields.
///
/// # Examples
///
/// ```
/// use proxmox_api::CredentialResolver;
/// use std::collections::HashMap;
///
/// let raw = HashMap::from([
///     ("hostname", "some.proxmox.tld"),
///     ("username", "root"),
///     ("password", "x"),
/// ]);
/// let credentials = CredentialResolver::resolve(&raw).unwrap();
/// assert_eq!(credentials.port(), "8006");
/// assert_eq!(credentials.realm(), "pam");
/// assert_eq!(credentials.system(), "pve");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialResolver;

impl CredentialResolver {
    /// # Errors
    /// Returns `ProxmoxError::MalformedCredentials` when neither key set is complete.
    pub fn resolve<S: CredentialSource + ?Sized>(source: &S) -> ProxmoxResult<Credentials> {
        let mut found: HashMap<&'static str, String> = field::ALL
            .iter()
            .filter_map(|name| source.field(name).map(|value| (*name, value)))
            .collect();

        let missing = |keys: &[&'static str]| -> Vec<&'static str> {
            keys.iter()
                .copied()
                .filter(|key| !found.contains_key(key))
                .collect()
        };
        let missing_password = missing(&PASSWORD_KEYS[..]);
        let missing_token = missing(&TOKEN_KEYS[..]);

        if !missing_password.is_empty() && !missing_token.is_empty() {
            tracing::debug!(
                ?missing_password,
                ?missing_token,
                "credential source has no complete key set"
            );
            return Err(ProxmoxError::MalformedCredentials(format!(
                "Need {} or {} (missing {} / {})",
                PASSWORD_KEYS.join(", "),
                TOKEN_KEYS.join(", "),
                missing_password.join(", "),
                missing_token.join(", "),
            )));
        }

        let mut take = |name: &'static str, default: &str| {
            found.remove(name).unwrap_or_else(|| default.to_string())
        };

        let fields = ResolvedFields {
            hostname: take(field::HOSTNAME, ""),
            port: take(field::PORT, DEFAULT_PORT),
            username: take(field::USERNAME, ""),
            password: take(field::PASSWORD, ""),
            realm: take(field::REALM, DEFAULT_REALM),
            system: take(field::SYSTEM, DEFAULT_SYSTEM),
            token_id: take(field::TOKEN_ID, ""),
            token_secret: take(field::TOKEN_SECRET, ""),
        };

        let credentials = Credentials::from_resolved(fields);
        tracing::debug!(
            hostname = credentials.hostname(),
            port = credentials.port(),
            system = credentials.system(),
            using_api_token = credentials.using_api_token(),
            "credentials resolved"
        );
        Ok(credentials)
    }
}
