//! Generic value to XML serialization.
//!
//! Any `Serialize` value goes through `serde_json::Value` first, so the
//! shape rules only have to deal with JSON's six cases:
//!
//! | value       | output                                                  |
//! |-------------|---------------------------------------------------------|
//! | null        | `<tag/>`                                                |
//! | scalar      | `<tag>escaped text</tag>`                               |
//! | object      | `<tag>` with one child per key, in insertion order      |
//! | array at K  | one `<K>` sibling per item                              |
//! | other array | `<tag>` wrapping `<array-item key="i">` per item        |
//!
//! "Array at K" means an array that is the value of key `K` of an object.
//! The root value and arrays nested directly in arrays have no key to
//! repeat, so their items become `array-item` elements.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

/// Element name for items of an array that has no key of its own.
pub const ARRAY_ITEM: &str = "array-item";

/// Output layout for [`xmlize_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlizeOptions {
    /// Indentation unit. `None` writes the document on one line.
    pub indent: Option<String>,
    /// Prepend `<?xml version="1.0"?>`.
    pub declaration: bool,
}

impl XmlizeOptions {
    /// Indented output, three spaces per level.
    pub fn pretty() -> Self {
        Self {
            indent: Some("   ".to_string()),
            declaration: false,
        }
    }
}

/// Serialize `value` as a document whose root element is `tag_name`.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Book {
///     chapters: Vec<&'static str>,
///     editor: &'static str,
/// }
///
/// let book = Book { chapters: vec!["Fall", "Epilogue"], editor: "M & B" };
/// assert_eq!(
///     xmlkit::xmlize::xmlize(&book, "book").unwrap(),
///     "<book><chapters>Fall</chapters><chapters>Epilogue</chapters><editor>M &amp; B</editor></book>"
/// );
/// ```
///
/// # Errors
///
/// Returns `Error::Serialization` if the value cannot be represented as
/// JSON (for example a map with non-string keys).
pub fn xmlize<T: Serialize + ?Sized>(value: &T, tag_name: &str) -> Result<String> {
    xmlize_with(value, tag_name, &XmlizeOptions::default())
}

pub fn xmlize_with<T: Serialize + ?Sized>(
    value: &T,
    tag_name: &str,
    options: &XmlizeOptions,
) -> Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(xmlize_value_with(&value, tag_name, options))
}

/// [`xmlize`] for a value that is already a `serde_json::Value`; cannot fail.
pub fn xmlize_value(value: &Value, tag_name: &str) -> String {
    xmlize_value_with(value, tag_name, &XmlizeOptions::default())
}

pub fn xmlize_value_with(value: &Value, tag_name: &str, options: &XmlizeOptions) -> String {
    let mut writer = Writer {
        out: String::new(),
        indent: options.indent.as_deref(),
    };
    if options.declaration {
        writer.out.push_str("<?xml version=\"1.0\"?>");
    }
    writer.element(value, &Name::Tag(tag_name), 0);
    writer.out
}

/// Replace each of `< > & ' "` with its predefined entity.
///
/// ```
/// assert_eq!(xmlkit::xmlize::escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
/// ```
pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Resolve predefined entities and character references.
///
/// Text with an unknown or malformed reference is returned unchanged.
pub fn unescape(text: &str) -> Cow<'_, str> {
    match quick_xml::escape::unescape(text) {
        Ok(unescaped) => unescaped,
        Err(err) => {
            tracing::trace!(error = %err, "leaving text with unresolvable reference as is");
            Cow::Borrowed(text)
        }
    }
}

enum Name<'a> {
    Tag(&'a str),
    ArrayItem(usize),
}

struct Writer<'a> {
    out: String,
    indent: Option<&'a str>,
}

impl Writer<'_> {
    fn element(&mut self, value: &Value, name: &Name<'_>, depth: usize) {
        self.new_line(depth);
        self.out.push('<');
        match name {
            Name::Tag(tag) => self.out.push_str(tag),
            Name::ArrayItem(index) => {
                self.out.push_str(ARRAY_ITEM);
                self.out.push_str(" key=\"");
                self.out.push_str(&index.to_string());
                self.out.push('"');
            }
        }

        match value {
            Value::Null => {
                self.out.push_str("/>");
                return;
            }
            Value::Bool(b) => {
                self.out.push('>');
                self.out.push_str(if *b { "true" } else { "false" });
            }
            Value::Number(n) => {
                self.out.push('>');
                self.out.push_str(&n.to_string());
            }
            Value::String(s) => {
                self.out.push('>');
                self.out.push_str(&escape(s));
            }
            Value::Array(items) => {
                if items.is_empty() {
                    self.out.push_str("/>");
                    return;
                }
                self.out.push('>');
                for (index, item) in items.iter().enumerate() {
                    self.element(item, &Name::ArrayItem(index), depth + 1);
                }
                self.new_line(depth);
            }
            Value::Object(map) => {
                if map.is_empty() {
                    self.out.push_str("/>");
                    return;
                }
                self.out.push('>');
                for (key, child) in map {
                    match child {
                        Value::Array(items) => {
                            for item in items {
                                self.element(item, &Name::Tag(key), depth + 1);
                            }
                        }
                        _ => self.element(child, &Name::Tag(key), depth + 1),
                    }
                }
                self.new_line(depth);
            }
        }

        self.out.push_str("</");
        match name {
            Name::Tag(tag) => self.out.push_str(tag),
            Name::ArrayItem(_) => self.out.push_str(ARRAY_ITEM),
        }
        self.out.push('>');
    }

    fn new_line(&mut self, depth: usize) {
        if let Some(unit) = self.indent {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            for _ in 0..depth {
                self.out.push_str(unit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn book() -> Value {
        json!({
            "chapters": [
                "Kingdom of fools",
                "Fall",
                "Final battle",
                "Characters that need to be escaped: << << \"' \"\"\"&&'' < > & ' \" ",
                "Epilogue"
            ],
            "editor": "Manos Batsis",
            "publisher": { "name": "Some Publisher" }
        })
    }

    #[test]
    fn test_book_compact() {
        let xml = xmlize_value(&book(), "book");
        assert_eq!(xml.matches("<chapters>").count(), 5);
        assert!(xml.starts_with("<book><chapters>Kingdom of fools</chapters>"));
        assert!(xml.ends_with("<publisher><name>Some Publisher</name></publisher></book>"));
    }

    #[test]
    fn test_book_pretty() {
        insta::assert_snapshot!(xmlize_value_with(&book(), "book", &XmlizeOptions::pretty()), @r#"
        <book>
           <chapters>Kingdom of fools</chapters>
           <chapters>Fall</chapters>
           <chapters>Final battle</chapters>
           <chapters>Characters that need to be escaped: &lt;&lt; &lt;&lt; &quot;&apos; &quot;&quot;&quot;&amp;&amp;&apos;&apos; &lt; &gt; &amp; &apos; &quot; </chapters>
           <chapters>Epilogue</chapters>
           <editor>Manos Batsis</editor>
           <publisher>
              <name>Some Publisher</name>
           </publisher>
        </book>
        "#);
    }

    #[test]
    fn test_chapters_keep_order() {
        let xml = xmlize_value(&book(), "book");
        let fall = xml.find("Fall").unwrap();
        let battle = xml.find("Final battle").unwrap();
        let epilogue = xml.find("Epilogue").unwrap();
        assert!(fall < battle && battle < epilogue);
    }

    #[test]
    fn test_root_array_uses_array_items() {
        insta::assert_snapshot!(
            xmlize_value(&json!(["a", null, [1, 2]]), "list"),
            @r#"<list><array-item key="0">a</array-item><array-item key="1"/><array-item key="2"><array-item key="0">1</array-item><array-item key="1">2</array-item></array-item></list>"#
        );
    }

    #[test]
    fn test_nested_array_under_key() {
        assert_eq!(
            xmlize_value(&json!({"row": [[1], [2, 3]]}), "table"),
            r#"<table><row><array-item key="0">1</array-item></row><row><array-item key="0">2</array-item><array-item key="1">3</array-item></row></table>"#
        );
    }

    #[test]
    fn test_scalars_and_null() {
        assert_eq!(xmlize_value(&json!(42), "n"), "<n>42</n>");
        assert_eq!(xmlize_value(&json!(1.5), "n"), "<n>1.5</n>");
        assert_eq!(xmlize_value(&json!(false), "b"), "<b>false</b>");
        assert_eq!(xmlize_value(&json!(null), "nothing"), "<nothing/>");
        assert_eq!(xmlize_value(&json!({"a": null}), "r"), "<r><a/></r>");
        assert_eq!(xmlize_value(&json!({}), "r"), "<r/>");
        assert_eq!(xmlize_value(&json!({"k": []}), "r"), "<r></r>");
    }

    #[test]
    fn test_declaration() {
        let options = XmlizeOptions {
            indent: None,
            declaration: true,
        };
        assert_eq!(
            xmlize_value_with(&json!("x"), "t", &options),
            "<?xml version=\"1.0\"?><t>x</t>"
        );
        let pretty = XmlizeOptions {
            declaration: true,
            ..XmlizeOptions::pretty()
        };
        assert_eq!(
            xmlize_value_with(&json!({"a": 1}), "t", &pretty),
            "<?xml version=\"1.0\"?>\n<t>\n   <a>1</a>\n</t>"
        );
    }

    #[test]
    fn test_xmlize_rejects_non_string_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(vec![1u8], "v");
        assert!(xmlize(&map, "m").is_err());
    }

    #[test]
    fn test_unescape_unknown_entity_is_kept() {
        assert_eq!(unescape("&lt;a&gt; &amp; &#65;"), "<a> & A");
        assert_eq!(unescape("&nbsp;"), "&nbsp;");
    }

    proptest! {
        #[test]
        fn escaping_replaces_each_reserved_char_once(s in ".*") {
            let escaped = escape(&s);
            prop_assert!(!escaped.contains(['<', '>', '"', '\'']));
            prop_assert_eq!(escaped.matches("&lt;").count(), s.matches('<').count());
            prop_assert_eq!(escaped.matches("&gt;").count(), s.matches('>').count());
            prop_assert_eq!(escaped.matches("&quot;").count(), s.matches('"').count());
            prop_assert_eq!(escaped.matches("&apos;").count(), s.matches('\'').count());
            prop_assert_eq!(escaped.matches('&').count(), s.chars().filter(|c| "<>&'\"".contains(*c)).count());
            prop_assert_eq!(unescape(&escaped), s.as_str());
        }

        #[test]
        fn scalar_is_wrapped_in_tag(s in ".*") {
            let xml = xmlize_value(&Value::String(s.clone()), "t");
            prop_assert_eq!(xml, format!("<t>{}</t>", escape(&s)));
        }
    }
}
