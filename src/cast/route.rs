//! URL state of the cast editor: `<base>/<cast uuid>`.

/// The editor's current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastRoute {
    base: String,
    cast_uuid: Option<String>,
}

impl CastRoute {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_matches('/').to_string(),
            cast_uuid: None,
        }
    }

    /// Reads the cast UUID out of a path such as `/cast/abc` or `cast/abc/`.
    /// Returns `None` when the path is not under `base` or names no cast.
    pub fn parse(base: &str, path: &str) -> Option<String> {
        let base = base.trim_matches('/');
        let rest = path.trim_matches('/').strip_prefix(base)?;
        let uuid = rest.strip_prefix('/')?.trim_matches('/');
        if uuid.is_empty() || uuid.contains('/') {
            None
        } else {
            Some(uuid.to_string())
        }
    }

    /// Points the route at a cast, replacing any previous one.
    pub fn replace_cast(&mut self, uuid: impl Into<String>) {
        self.cast_uuid = Some(uuid.into());
    }

    pub fn cast_uuid(&self) -> Option<&str> {
        self.cast_uuid.as_deref()
    }

    /// The path to show in the address bar.
    pub fn path(&self) -> String {
        match &self.cast_uuid {
            Some(uuid) => format!("{}/{}", self.base, uuid),
            None => format!("{}/", self.base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(CastRoute::parse("cast", "/cast/c-1"), Some("c-1".to_string()));
        assert_eq!(CastRoute::parse("/cast/", "cast/c-1/"), Some("c-1".to_string()));
        assert_eq!(CastRoute::parse("cast", "/cast"), None);
        assert_eq!(CastRoute::parse("cast", "/cast/"), None);
        assert_eq!(CastRoute::parse("cast", "/segments/s-1"), None);
        assert_eq!(CastRoute::parse("cast", "/castle/c-1"), None);
        assert_eq!(CastRoute::parse("cast", "/cast/a/b"), None);
    }

    #[test]
    fn test_replace_cast() {
        let mut route = CastRoute::new("/cast/");
        assert_eq!(route.path(), "cast/");
        route.replace_cast("c-1");
        route.replace_cast("c-2");
        assert_eq!(route.path(), "cast/c-2");
        assert_eq!(route.cast_uuid(), Some("c-2"));
    }
}
