//! Variable map: normalized token names to replacement values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Normalize a token or key name: trimmed, NFC, uppercase.
pub fn normalize_name(name: &str) -> String {
    name.trim().nfc().collect::<String>().to_uppercase()
}

/// The space/underscore twin of a normalized name, if it has one.
fn variant_of(name: &str) -> Option<String> {
    if name.contains(' ') {
        Some(name.replace(' ', "_"))
    } else if name.contains('_') {
        Some(name.replace('_', " "))
    } else {
        None
    }
}

/// Mapping from token name to value.
///
/// Every inserted key also answers to its space/underscore twin
/// (`NOMBRE CURSO` and `NOMBRE_CURSO`). A key inserted explicitly always
/// wins over a twin generated from another key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, serde_json::Value>",
    into = "BTreeMap<String, String>"
)]
pub struct VariableMap {
    explicit: BTreeMap<String, String>,
    variants: BTreeMap<String, String>,
}

impl VariableMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.insert(key, value);
        }
        map
    }

    /// Parse a JSON object of variables.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| Error::InvalidVariables(e.to_string()))?;
        Self::from_json_value(value)
    }

    /// Convert a JSON object into a map.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(object) => {
                Ok(object.into_iter().collect::<BTreeMap<_, _>>().into())
            }
            other => Err(Error::InvalidVariables(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse a JSON array of variable objects (one per generated document).
    pub fn records_from_json_str(json: &str) -> Result<Vec<Self>> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| Error::InvalidVariables(e.to_string()))?;
        match value {
            serde_json::Value::Array(items) => items.into_iter().map(Self::from_json_value).collect(),
            other => Err(Error::InvalidVariables(format!(
                "expected a JSON array of objects, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Insert a value. The key is normalized.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = normalize_name(key.as_ref());
        let value = value.into();
        if let Some(variant) = variant_of(&key) {
            self.variants.insert(variant, value.clone());
        }
        self.explicit.insert(key, value);
    }

    /// Look up a normalized name, exact key or generated twin.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.explicit
            .get(name)
            .or_else(|| self.variants.get(name))
            .map(String::as_str)
    }

    /// Check if a name resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Resolve a token name to its replacement value.
    ///
    /// Tries the name as is, then with spaces as underscores, then with
    /// underscores as spaces.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let name = normalize_name(name);
        self.get(&name)
            .or_else(|| self.get(&name.replace(' ', "_")))
            .or_else(|| self.get(&name.replace('_', " ")))
    }

    /// Resolve like [`VariableMap::resolve`], uppercasing the value of
    /// person-name tokens (names mentioning `NOMBRE` but not `CURSO` or
    /// `EVENTO`) when `uppercase_names` is set.
    pub fn resolve_cased(&self, name: &str, uppercase_names: bool) -> Option<String> {
        let value = self.resolve(name)?;
        if uppercase_names && is_person_name(&normalize_name(name)) {
            Some(value.to_uppercase())
        } else {
            Some(value.to_string())
        }
    }

    /// Number of explicitly inserted keys.
    pub fn len(&self) -> usize {
        self.explicit.len()
    }

    /// Check if no keys were inserted.
    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty()
    }

    /// Iterate over explicitly inserted keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.explicit.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn is_person_name(name: &str) -> bool {
    name.contains("NOMBRE") && !name.contains("CURSO") && !name.contains("EVENTO")
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl From<BTreeMap<String, serde_json::Value>> for VariableMap {
    fn from(values: BTreeMap<String, serde_json::Value>) -> Self {
        Self::from_pairs(values.into_iter().map(|(key, value)| {
            let text = match value {
                serde_json::Value::Null => String::new(),
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        }))
    }
}

impl From<VariableMap> for BTreeMap<String, String> {
    fn from(map: VariableMap) -> Self {
        map.explicit
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for VariableMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  nombre curso "), "NOMBRE CURSO");
        // Decomposed "é" composes before uppercasing.
        assert_eq!(normalize_name("fecha de emisio\u{301}n"), "FECHA DE EMISIÓN");
    }

    #[test]
    fn test_space_underscore_variants() {
        let vars = VariableMap::from_pairs([("nombre curso", "Taller"), ("TIPO_EVENTO", "Curso")]);
        assert_eq!(vars.get("NOMBRE_CURSO"), Some("Taller"));
        assert_eq!(vars.get("TIPO EVENTO"), Some("Curso"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_explicit_key_wins_over_variant() {
        let vars = VariableMap::from_pairs([
            ("FECHA FIN", "20 de septiembre del 2025"),
            ("FECHA_FIN", "20 de Septiembre de 2025"),
        ]);
        assert_eq!(vars.get("FECHA FIN"), Some("20 de septiembre del 2025"));
        assert_eq!(vars.get("FECHA_FIN"), Some("20 de Septiembre de 2025"));
    }

    #[test]
    fn test_resolve_order() {
        let vars = VariableMap::from_pairs([("NOMBRE CURSO", "Rust básico")]);
        assert_eq!(vars.resolve("nombre_curso"), Some("Rust básico"));
        assert_eq!(vars.resolve(" NOMBRE CURSO "), Some("Rust básico"));
        assert_eq!(vars.resolve("NOEXISTE"), None);
    }

    #[test]
    fn test_resolve_cased_person_names() {
        let vars = VariableMap::from_pairs([
            ("NOMBRES", "Juan Pérez"),
            ("NOMBRE_EVENTO", "Taller Python"),
            ("NOMBRE CURSO", "Rust básico"),
        ]);
        assert_eq!(vars.resolve_cased("nombres", true).as_deref(), Some("JUAN PÉREZ"));
        assert_eq!(vars.resolve_cased("nombres", false).as_deref(), Some("Juan Pérez"));
        assert_eq!(vars.resolve_cased("NOMBRE EVENTO", true).as_deref(), Some("Taller Python"));
        assert_eq!(vars.resolve_cased("NOMBRE_CURSO", true).as_deref(), Some("Rust básico"));
    }

    #[test]
    fn test_from_json() {
        let vars =
            VariableMap::from_json_str(r#"{"nombres": "Ana", "horas": 40, "activo": true, "nota": null}"#)
                .unwrap();
        assert_eq!(vars.get("HORAS"), Some("40"));
        assert_eq!(vars.get("ACTIVO"), Some("true"));
        assert_eq!(vars.get("NOTA"), Some(""));

        assert!(matches!(
            VariableMap::from_json_str("[1, 2]"),
            Err(Error::InvalidVariables(_))
        ));
    }

    #[test]
    fn test_records_from_json() {
        let records = VariableMap::records_from_json_str(r#"[{"a": "1"}, {"a": "2"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("A"), Some("2"));
        assert!(VariableMap::records_from_json_str(r#"{"a": "1"}"#).is_err());
    }

    #[test]
    fn test_serde_roundtrip_keeps_explicit_keys() {
        let vars = VariableMap::from_pairs([("NOMBRE CURSO", "Taller")]);
        let json = serde_json::to_string(&vars).unwrap();
        assert_eq!(json, r#"{"NOMBRE CURSO":"Taller"}"#);
        let back: VariableMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vars);
    }
}
