//! The canonical, immutable credential record a client session owns.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Port used when none is supplied and none is embedded in the hostname.
pub const DEFAULT_PORT: &str = "8006";
/// Realm used when none is supplied.
pub const DEFAULT_REALM: &str = "pam";
/// Product variant used when none is supplied.
pub const DEFAULT_SYSTEM: &str = "pve";

/// Connection target and authentication material for one Proxmox product.
///
/// Built by [`CredentialResolver`](crate::CredentialResolver) and read-only
/// afterwards. When both `token_id` and `token_secret` are non-empty the
/// session authenticates with the API token and never logs in.
pub struct Credentials {
    hostname: String,
    port: String,
    username: String,
    password: SecretString,
    realm: String,
    system: String,
    token_id: String,
    token_secret: SecretString,
    using_api_token: bool,
}

/// Raw field values after defaults were applied, before the host/port split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolvedFields {
    pub hostname: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub realm: String,
    pub system: String,
    pub token_id: String,
    pub token_secret: String,
}

impl Credentials {
    pub(crate) fn from_resolved(fields: ResolvedFields) -> Self {
        // An embedded port always wins over an explicit one.
        let (hostname, port) = match fields.hostname.split_once(':') {
            Some((host, rest)) => {
                let embedded = rest.split(':').next().unwrap_or_default();
                (host.to_string(), embedded.to_string())
            }
            None => (fields.hostname, fields.port),
        };

        let using_api_token = !fields.token_id.is_empty() && !fields.token_secret.is_empty();

        Self {
            hostname,
            port,
            username: fields.username,
            password: SecretString::from(fields.password),
            realm: fields.realm,
            system: fields.system,
            token_id: fields.token_id,
            token_secret: SecretString::from(fields.token_secret),
            using_api_token,
        }
    }

    /// Returns the base URL of the API, e.g. `https://pve.example.com:8006/api2`.
    pub fn api_url(&self) -> String {
        self.api_url_with_scheme(true)
    }

    pub(crate) fn api_url_with_scheme(&self, secure: bool) -> String {
        let scheme = if secure { "https" } else { "http" };
        format!("{}://{}:{}/api2", scheme, self.hostname, self.port)
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// One of `pve`, `pbs` or `pmg`; any other value behaves like `pve`.
    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    pub fn token_secret(&self) -> &str {
        self.token_secret.expose_secret()
    }

    /// True iff both token fields are non-empty.
    pub fn using_api_token(&self) -> bool {
        self.using_api_token
    }

    /// The product-specific prefix of the `Authorization` header.
    pub fn token_header_name(&self) -> &'static str {
        match self.system.as_str() {
            "pbs" => "PBSAPIToken",
            _ => "PVEAPIToken",
        }
    }

    /// The full `Authorization` header value: `<name>=<token id>=<token secret>`.
    pub fn token(&self) -> String {
        format!(
            "{}={}={}",
            self.token_header_name(),
            self.token_id,
            self.token_secret.expose_secret()
        )
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Host: {}:{}], [Username: {}@{}].",
            self.hostname, self.port, self.username, self.realm
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("realm", &self.realm)
            .field("system", &self.system)
            .field("token_id", &self.token_id)
            .field("token_secret", &"[REDACTED]")
            .field("using_api_token", &self.using_api_token)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(hostname: &str) -> ResolvedFields {
        ResolvedFields {
            hostname: hostname.to_string(),
            port: DEFAULT_PORT.to_string(),
            username: "root".to_string(),
            password: "I was here".to_string(),
            realm: DEFAULT_REALM.to_string(),
            system: DEFAULT_SYSTEM.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_api_url() {
        let credentials = Credentials::from_resolved(fields("some.proxmox.tld"));
        assert_eq!(credentials.api_url(), "https://some.proxmox.tld:8006/api2");
        assert_eq!(
            credentials.api_url_with_scheme(false),
            "http://some.proxmox.tld:8006/api2"
        );
    }

    #[test]
    fn test_embedded_port_overrides_explicit_port() {
        let mut raw = fields("some.proxmox.tld:443");
        raw.port = "9999".to_string();
        let credentials = Credentials::from_resolved(raw);
        assert_eq!(credentials.hostname(), "some.proxmox.tld");
        assert_eq!(credentials.port(), "443");
    }

    #[test]
    fn test_extra_separators_after_port_are_dropped() {
        let credentials = Credentials::from_resolved(fields("host:8007:junk"));
        assert_eq!(credentials.hostname(), "host");
        assert_eq!(credentials.port(), "8007");
    }

    #[test]
    fn test_token_selection_requires_both_fields() {
        let mut raw = fields("host");
        raw.token_id = "root@pam!ci".to_string();
        assert!(!Credentials::from_resolved(raw.clone()).using_api_token());

        raw.token_secret = "5f2c".to_string();
        assert!(Credentials::from_resolved(raw).using_api_token());
    }

    #[test]
    fn test_token_header_per_system() {
        let mut raw = fields("host");
        raw.token_id = "root@pam!ci".to_string();
        raw.token_secret = "5f2c".to_string();

        for (system, expected) in [
            ("pve", "PVEAPIToken=root@pam!ci=5f2c"),
            ("pmg", "PVEAPIToken=root@pam!ci=5f2c"),
            ("pbs", "PBSAPIToken=root@pam!ci=5f2c"),
            ("anything", "PVEAPIToken=root@pam!ci=5f2c"),
        ] {
            raw.system = system.to_string();
            let credentials = Credentials::from_resolved(raw.clone());
            assert_eq!(credentials.token(), expected, "system {}", system);
        }
    }

    #[test]
    fn test_display() {
        let credentials = Credentials::from_resolved(fields("some.proxmox.tld"));
        assert_eq!(
            credentials.to_string(),
            "[Host: some.proxmox.tld:8006], [Username: root@pam]."
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut raw = fields("host");
        raw.token_secret = "token-secret-value".to_string();
        let debug = format!("{:?}", Credentials::from_resolved(raw));
        assert!(!debug.contains("I was here"));
        assert!(!debug.contains("token-secret-value"));
    }
}
