//! Serialization helpers for prefixes.

use super::types::{Prefix, PrefixRef};

impl std::fmt::Display for PrefixRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.raw)
    }
}

impl From<PrefixRef<'_>> for Prefix {
    fn from(p: PrefixRef<'_>) -> Self {
        p.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::PrefixRef;

    #[test]
    fn test_display_matches_raw() {
        let p = PrefixRef::parse("nick!user@host");
        assert_eq!(p.to_string(), "nick!user@host");
    }
}
