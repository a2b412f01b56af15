use proptest::prelude::*;
use respack::io::tabular::{TabularOptions, escape_field};
use respack::properties::{self, PropertiesEditor};

fn default_format() -> TabularOptions {
    TabularOptions {
        eol: "\n".to_string(),
        ..TabularOptions::default()
    }
}

/// Parses one escaped field back through the csv reader configured the same
/// way the ingest path configures it.
fn parse_single_field(content: &str, format: &TabularOptions) -> String {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.separator as u8)
        .quote(format.quote as u8)
        .double_quote(true)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    reader
        .records()
        .next()
        .and_then(|record| record.ok())
        .and_then(|record| record.get(0).map(str::to_string))
        .unwrap_or_default()
}

fn field_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ -~\\n]{0,32}").expect("valid field regex")
}

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9._]{0,15}").expect("valid key regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    // a trailing odd backslash run would read as a line continuation
    proptest::string::string_regex("([!-~][ -~]{0,30})?")
        .expect("valid value regex")
        .prop_filter("no continuation tail", |value| {
            value.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0
        })
}

proptest! {
    #[test]
    fn escape_then_parse_is_identity(field in field_strategy()) {
        let format = default_format();
        let escaped = escape_field(&field, &format);
        prop_assert_eq!(parse_single_field(&escaped, &format), field);
    }

    #[test]
    fn escaped_fields_never_leak_a_bare_separator(field in field_strategy()) {
        let format = default_format();
        let escaped = escape_field(&field, &format);
        if field.contains(format.separator) {
            prop_assert!(escaped.starts_with(format.quote));
            prop_assert!(escaped.ends_with(format.quote));
        }
    }

    #[test]
    fn editor_upsert_then_parse_returns_value(key in key_strategy(), value in value_strategy()) {
        let mut editor = PropertiesEditor::new("# generated\nexisting=kept\n");
        editor.upsert(&key, &value);
        let parsed = properties::parse(&editor.serialize());
        let found = parsed.iter().find(|property| property.key == key);
        prop_assert_eq!(found.map(|property| property.value.as_str()), Some(value.as_str()));
    }
}
