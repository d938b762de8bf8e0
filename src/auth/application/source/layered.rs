use super::CredentialSource;

/// Two sources tried in order, field by field: the first one that has a
/// value for a field wins.
#[derive(Debug, Clone)]
pub struct Layered<A, B> {
    primary: A,
    fallback: B,
}

impl<A, B> Layered<A, B> {
    pub fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

impl<A: CredentialSource, B: CredentialSource> CredentialSource for Layered<A, B> {
    fn field(&self, name: &str) -> Option<String> {
        self.primary
            .field(name)
            .or_else(|| self.fallback.field(name))
    }
}

pub trait CredentialSourceExt: CredentialSource + Sized {
    /// Falls back to `other` for every field this source does not have.
    fn or<B: CredentialSource>(self, other: B) -> Layered<Self, B> {
        Layered::new(self, other)
    }
}

impl<T: CredentialSource> CredentialSourceExt for T {}
