//! Field naming conventions and wire type names.

use std::borrow::Cow;

/// Naming convention applied to attribute field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldNaming {
    /// Field names are written as declared
    Identity,
    /// `store_sku`
    #[default]
    LowerCaseWithUnderscores,
    /// `store-sku`
    LowerCaseWithDashes,
    /// `store.sku`
    LowerCaseWithDots,
    /// `storeSku`
    LowerCamelCase,
    /// `StoreSku`
    UpperCamelCase,
    /// `Store Sku`
    UpperCamelCaseWithSpaces,
}

impl FieldNaming {
    pub fn apply<'a>(&self, field: &'a str) -> Cow<'a, str> {
        match self {
            FieldNaming::Identity => Cow::Borrowed(field),
            FieldNaming::LowerCaseWithUnderscores => lower_joined(field, "_"),
            FieldNaming::LowerCaseWithDashes => lower_joined(field, "-"),
            FieldNaming::LowerCaseWithDots => lower_joined(field, "."),
            FieldNaming::LowerCamelCase => {
                let mut out = String::with_capacity(field.len());
                for (i, w) in split_words(field).iter().enumerate() {
                    if i == 0 {
                        out.push_str(&w.to_lowercase());
                    } else {
                        push_capitalized(&mut out, w);
                    }
                }
                Cow::Owned(out)
            }
            FieldNaming::UpperCamelCase => {
                let mut out = String::with_capacity(field.len());
                for w in split_words(field) {
                    push_capitalized(&mut out, w);
                }
                Cow::Owned(out)
            }
            FieldNaming::UpperCamelCaseWithSpaces => {
                let mut out = String::with_capacity(field.len() + 4);
                for (i, w) in split_words(field).iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    push_capitalized(&mut out, w);
                }
                Cow::Owned(out)
            }
        }
    }
}

fn lower_joined<'a>(field: &'a str, sep: &str) -> Cow<'a, str> {
    let words = split_words(field);
    let joined = words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(sep);
    if joined == field {
        Cow::Borrowed(field)
    } else {
        Cow::Owned(joined)
    }
}

fn push_capitalized(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(&chars.as_str().to_lowercase());
    }
}

/// Split an identifier into words on `_`, `-`, `.`, spaces and case changes.
///
/// Runs of capitals are kept together as one word (`HTTPServer` splits into
/// `HTTP` and `Server`).
fn split_words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let chars: Vec<(usize, char)> = s.char_indices().collect();
    let mut start: Option<usize> = None;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if let Some(st) = start.take() {
                words.push(&s[st..pos]);
            }
            continue;
        }
        match start {
            None => start = Some(pos),
            Some(st) if c.is_uppercase() => {
                let prev = chars[i - 1].1;
                let next_is_lower = chars.get(i + 1).is_some_and(|&(_, n)| n.is_lowercase());
                if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                    words.push(&s[st..pos]);
                    start = Some(pos);
                }
            }
            Some(_) => {}
        }
    }
    if let Some(st) = start {
        words.push(&s[st..]);
    }
    words
}

/// Wire type token for a Rust type: the simple type name in lower_underscore form.
///
/// `shop::StoreProduct` becomes `store_product`; generic arguments are ignored.
pub fn type_name_of<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    let simple = base.rsplit("::").next().unwrap_or(base);
    to_lower_underscore(simple)
}

/// Convert an UpperCamel kind name to its lower_underscore wire token.
pub fn to_lower_underscore(kind: &str) -> String {
    FieldNaming::LowerCaseWithUnderscores.apply(kind).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StoreProduct;

    mod shop {
        pub struct Store<T>(pub T);
    }

    #[test]
    fn kind_names_become_lower_underscore() {
        assert_eq!(to_lower_underscore("StoreProduct"), "store_product");
        assert_eq!(to_lower_underscore("Store"), "store");
        assert_eq!(to_lower_underscore("HTTPServer"), "http_server");
        assert_eq!(to_lower_underscore("Person2Address"), "person2_address");
    }

    #[test]
    fn type_name_uses_simple_name() {
        assert_eq!(type_name_of::<StoreProduct>(), "store_product");
        assert_eq!(type_name_of::<shop::Store<u8>>(), "store");
    }

    #[test]
    fn conventions_from_snake_case_fields() {
        let f = "short_description";
        assert_eq!(FieldNaming::Identity.apply(f), "short_description");
        assert_eq!(FieldNaming::LowerCaseWithUnderscores.apply(f), "short_description");
        assert_eq!(FieldNaming::LowerCaseWithDashes.apply(f), "short-description");
        assert_eq!(FieldNaming::LowerCaseWithDots.apply(f), "short.description");
        assert_eq!(FieldNaming::LowerCamelCase.apply(f), "shortDescription");
        assert_eq!(FieldNaming::UpperCamelCase.apply(f), "ShortDescription");
        assert_eq!(FieldNaming::UpperCamelCaseWithSpaces.apply(f), "Short Description");
    }

    #[test]
    fn camel_case_fields_are_split_too() {
        assert_eq!(FieldNaming::LowerCaseWithUnderscores.apply("storeSku"), "store_sku");
        assert!(matches!(
            FieldNaming::LowerCaseWithUnderscores.apply("title"),
            Cow::Borrowed("title")
        ));
    }
}
