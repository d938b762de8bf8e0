//! Where raw credentials come from.
//!
//! A [`CredentialSource`] answers one question: "what is the value of this
//! field, if you have one?". The resolver only ever asks for the names in
//! [`field`], so any type that can answer that can feed a client.

mod dynamic;
mod env;
mod fields;
mod layered;
mod map;

pub use dynamic::FnSource;
pub use env::EnvSource;
pub use fields::CredentialFields;
pub use layered::{CredentialSourceExt, Layered};

/// The field names a source is queried for.
pub mod field {
    pub const HOSTNAME: &str = "hostname";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const REALM: &str = "realm";
    pub const PORT: &str = "port";
    pub const SYSTEM: &str = "system";
    pub const TOKEN_ID: &str = "token-id";
    pub const TOKEN_SECRET: &str = "token-secret";

    pub const ALL: [&str; 8] = [
        HOSTNAME,
        USERNAME,
        PASSWORD,
        REALM,
        PORT,
        SYSTEM,
        TOKEN_ID,
        TOKEN_SECRET,
    ];
}

/// A provider of raw credential fields.
///
/// Returning `Some("")` means the field is present but empty, which is not
/// the same as `None`: presence is all the resolver checks.
pub trait CredentialSource {
    fn field(&self, name: &str) -> Option<String>;
}

impl<T: CredentialSource + ?Sized> CredentialSource for &T {
    fn field(&self, name: &str) -> Option<String> {
        (**self).field(name)
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for Box<T> {
    fn field(&self, name: &str) -> Option<String> {
        (**self).field(name)
    }
}
