use super::CredentialSource;
use std::fmt;

/// Dynamic lookup: every field is answered by a closure.
///
/// Useful for adapting configuration objects that only expose a
/// `get(name)`-style accessor.
pub struct FnSource<F> {
    lookup: F,
}

impl<F> FnSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

impl<F> CredentialSource for FnSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn field(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSource")
    }
}
