//! The JSON variant of the exchange package: one nested document,
//! `module → bundle → key → locale → text`. Export only; ingest is not
//! implemented for this variant.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::io::JsonExportOptions;
use crate::pack::ResourcePack;

/// Converts a resource pack into a single nested JSON document, applying
/// the same inclusion filter as the tabular exporter.
pub struct JsonExporter<'a> {
    options: &'a JsonExportOptions,
}

impl<'a> JsonExporter<'a> {
    pub fn new(options: &'a JsonExportOptions) -> Self {
        JsonExporter { options }
    }

    /// Modules and bundles with no included entries are left out of the
    /// document entirely.
    pub fn export(&self, pack: &ResourcePack) -> Value {
        let mut root = Map::new();

        for module in pack.modules() {
            let mut module_map = Map::new();
            for bundle in module.bundles() {
                let mut bundle_map = Map::new();
                for entry in bundle.entries() {
                    if !self.options.includes(entry) {
                        continue;
                    }
                    let mut locale_map = Map::new();
                    for locale in entry.locales() {
                        locale_map.insert(
                            locale.to_string(),
                            Value::String(entry.translation_or(locale, "").to_string()),
                        );
                    }
                    bundle_map.insert(entry.key().to_string(), Value::Object(locale_map));
                }
                if !bundle_map.is_empty() {
                    module_map.insert(bundle.name().to_string(), Value::Object(bundle_map));
                }
            }
            if !module_map.is_empty() {
                root.insert(module.name().to_string(), Value::Object(module_map));
            }
        }

        Value::Object(root)
    }
}

/// Placeholder for the structured-document ingest path.
pub struct JsonParser;

impl JsonParser {
    pub fn parse(&self, _document: &Value) -> Result<ResourcePack, Error> {
        Err(Error::UnsupportedFormat(
            "json package ingest is not implemented".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ExportOptions;
    use crate::properties::Property;
    use serde_json::json;

    fn props(pairs: &[(&str, &str)]) -> Vec<Property> {
        pairs
            .iter()
            .map(|(key, value)| Property {
                key: key.to_string(),
                value: value.to_string(),
                span: None,
            })
            .collect()
    }

    #[test]
    fn test_export_nests_module_bundle_key_locale() {
        let mut pack = ResourcePack::new();
        pack.add_properties("app", "checkout", "default", props(&[("pay", "Pay")]));
        pack.add_properties("app", "checkout", "fr", props(&[("pay", "Payer")]));

        let options = ExportOptions::default();
        let value = JsonExporter::new(&options).export(&pack);
        assert_eq!(
            value,
            json!({
                "app": {
                    "checkout": {
                        "pay": { "default": "Pay", "fr": "Payer" }
                    }
                }
            })
        );
    }

    #[test]
    fn test_export_drops_filtered_entries_and_empty_containers() {
        let mut pack = ResourcePack::new();
        pack.add_properties("app", "done", "fr", props(&[("k", "fini")]));

        let options = ExportOptions {
            out_name: String::new(),
            if_not_locales: vec!["fr".to_string()],
        };
        let value = JsonExporter::new(&options).export(&pack);
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_json_parse_is_unsupported() {
        let result = JsonParser.parse(&json!({}));
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
