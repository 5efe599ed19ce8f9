//! Per-handler field lists.

use std::collections::HashMap;

/// Field names to act on, keyed by handler name.
///
/// Handler names are matched case-insensitively: they are lower-cased on
/// construction and on lookup. Field order is preserved; repeated field names
/// within one handler keep their first position only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldConfig {
    handlers: HashMap<String, Vec<String>>,
}

impl FieldConfig {
    /// Build a config from `(handler, fields)` pairs.
    ///
    /// Handlers that collide after lower-casing have their field lists merged
    /// in iteration order.
    pub fn new<I, H, F, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (H, F)>,
        H: AsRef<str>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut handlers: HashMap<String, Vec<String>> = HashMap::new();
        for (handler, fields) in entries {
            let list = handlers
                .entry(normalize_handler(handler.as_ref()))
                .or_default();
            for field in fields {
                let field = field.into();
                if !list.contains(&field) {
                    list.push(field);
                }
            }
        }
        Self { handlers }
    }

    /// Field list for `handler`, or `None` when no policy is configured.
    pub fn fields_for(&self, handler: &str) -> Option<&[String]> {
        self.handlers
            .get(&normalize_handler(handler))
            .map(Vec::as_slice)
    }

    pub fn contains_handler(&self, handler: &str) -> bool {
        self.handlers.contains_key(&normalize_handler(handler))
    }

    /// Number of configured handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Normalized handler names.
    pub fn handlers(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl<H, F, S> FromIterator<(H, F)> for FieldConfig
where
    H: AsRef<str>,
    F: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (H, F)>>(iter: I) -> Self {
        FieldConfig::new(iter)
    }
}

/// Handlers that collide after lower-casing are merged in sorted key order,
/// so the result does not depend on the map's iteration order.
impl From<HashMap<String, Vec<String>>> for FieldConfig {
    fn from(map: HashMap<String, Vec<String>>) -> Self {
        let mut entries: Vec<_> = map.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        FieldConfig::new(entries)
    }
}

/// Lower-case a handler name for lookup.
pub fn normalize_handler(handler: &str) -> String {
    handler.to_lowercase()
}
