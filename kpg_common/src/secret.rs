use std::{
    fmt,
    fmt::{Debug, Display},
};

/// Holds gateway credentials (the API key secret and the webhook signing secret) so that they never reach the logs.
/// `Debug` and `Display` both print `****`, so configuration structs holding a `Secret` can be logged as a whole.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Access the raw value, e.g. to key an HMAC or build an auth header.
    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl Secret<String> {
    /// Unset credentials come through as empty strings.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
