use std::io::{self, Write};

use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};

use crate::error::Container;
use crate::options::Options;
use crate::stream::{Scalar, TokenWriter};
use crate::{Error, Result};

/// Widest indentation unit `--pretty` output supports.
pub const MAX_INDENT: usize = 16;

static SPACES: [u8; MAX_INDENT] = [b' '; MAX_INDENT];

/// Output layout: serde_json's compact or pretty formatter.
pub enum JsonFormatter {
    Compact(CompactFormatter),
    Pretty(PrettyFormatter<'static>),
}

impl JsonFormatter {
    pub fn compact() -> Self {
        JsonFormatter::Compact(CompactFormatter)
    }

    /// Pretty layout indenting by `indent` spaces (at most [`MAX_INDENT`]).
    pub fn pretty(indent: usize) -> Self {
        JsonFormatter::Pretty(PrettyFormatter::with_indent(&SPACES[..indent.min(MAX_INDENT)]))
    }
}

macro_rules! delegate {
    ($self:ident, $f:ident => $call:expr) => {
        match $self {
            JsonFormatter::Compact($f) => $call,
            JsonFormatter::Pretty($f) => $call,
        }
    };
}

impl Formatter for JsonFormatter {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        delegate!(self, f => f.begin_array(writer))
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        delegate!(self, f => f.end_array(writer))
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        delegate!(self, f => f.begin_array_value(writer, first))
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        delegate!(self, f => f.end_array_value(writer))
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        delegate!(self, f => f.begin_object(writer))
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        delegate!(self, f => f.end_object(writer))
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        delegate!(self, f => f.begin_object_key(writer, first))
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        delegate!(self, f => f.begin_object_value(writer))
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        delegate!(self, f => f.end_object_value(writer))
    }
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Object { expect_name: bool, first: bool },
    Array { first: bool },
}

/// Plain JSON [`TokenWriter`] over any [`std::io::Write`] sink.
///
/// Rejects token sequences JSON syntax does not allow: names outside objects,
/// two names in a row, values without a name, mismatched closes and more than
/// one top-level value. Layout and escaping are serde_json's.
pub struct JsonWriter<W: Write> {
    out: W,
    formatter: JsonFormatter,
    stack: Vec<Scope>,
    complete: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_formatter(out, JsonFormatter::compact())
    }

    pub fn with_formatter(out: W, formatter: JsonFormatter) -> Self {
        Self {
            out,
            formatter,
            stack: Vec::new(),
            complete: false,
        }
    }

    pub fn with_options(out: W, options: &Options) -> Self {
        let formatter = if options.pretty {
            JsonFormatter::pretty(options.indent)
        } else {
            JsonFormatter::compact()
        };
        Self::with_formatter(out, formatter)
    }

    /// Whether exactly one complete top-level value has been written.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Check the document is complete and flush the sink.
    pub fn finish(&mut self) -> Result<()> {
        if !self.complete {
            return Err(Error::illegal_state("incomplete JSON document"));
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn before_value(&mut self) -> Result<()> {
        match self.stack.last_mut() {
            None if self.complete => Err(Error::illegal_state(
                "JSON document already contains a top-level value",
            )),
            None => Ok(()),
            Some(Scope::Object { expect_name: true, .. }) => {
                Err(Error::illegal_state("expected a member name before the value"))
            }
            Some(Scope::Object { expect_name, .. }) => {
                *expect_name = true;
                Ok(())
            }
            Some(Scope::Array { first }) => {
                let was_first = core::mem::replace(first, false);
                self.formatter.begin_array_value(&mut self.out, was_first)?;
                Ok(())
            }
        }
    }

    fn after_value(&mut self) -> Result<()> {
        match self.stack.last() {
            None => self.complete = true,
            Some(Scope::Object { .. }) => self.formatter.end_object_value(&mut self.out)?,
            Some(Scope::Array { .. }) => self.formatter.end_array_value(&mut self.out)?,
        }
        Ok(())
    }

    fn close(&mut self, container: Container) -> Result<()> {
        let scope = match self.stack.last() {
            None => {
                return Err(Error::StackUnderflow {
                    section: "json",
                    container,
                });
            }
            Some(scope) => *scope,
        };
        match (scope, container) {
            (Scope::Object { expect_name: false, .. }, _) => {
                return Err(Error::illegal_state(
                    "member name is still waiting for its value",
                ));
            }
            (Scope::Object { .. }, Container::Object) | (Scope::Array { .. }, Container::Array) => {}
            (_, Container::Object) => {
                return Err(Error::illegal_state("end_object called inside an array"));
            }
            (_, Container::Array) => {
                return Err(Error::illegal_state("end_array called inside an object"));
            }
        }
        self.stack.pop();
        match container {
            Container::Object => self.formatter.end_object(&mut self.out)?,
            Container::Array => self.formatter.end_array(&mut self.out)?,
        }
        self.after_value()
    }
}

impl<W: Write> TokenWriter for JsonWriter<W> {
    fn begin_object(&mut self) -> Result<()> {
        self.before_value()?;
        self.formatter.begin_object(&mut self.out)?;
        self.stack.push(Scope::Object {
            expect_name: true,
            first: true,
        });
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        self.close(Container::Object)
    }

    fn begin_array(&mut self) -> Result<()> {
        self.before_value()?;
        self.formatter.begin_array(&mut self.out)?;
        self.stack.push(Scope::Array { first: true });
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        self.close(Container::Array)
    }

    fn name(&mut self, name: &str) -> Result<()> {
        let was_first = match self.stack.last_mut() {
            Some(Scope::Object { expect_name, first }) if *expect_name => {
                *expect_name = false;
                core::mem::replace(first, false)
            }
            Some(Scope::Object { .. }) => {
                return Err(Error::illegal_state(format!(
                    "member name `{name}` follows another name without a value"
                )));
            }
            _ => {
                return Err(Error::illegal_state(format!(
                    "member name `{name}` written outside of an object"
                )));
            }
        };
        self.formatter.begin_object_key(&mut self.out, was_first)?;
        serde_json::to_writer(&mut self.out, name)?;
        self.formatter.end_object_key(&mut self.out)?;
        self.formatter.begin_object_value(&mut self.out)?;
        Ok(())
    }

    fn value(&mut self, value: Scalar<'_>) -> Result<()> {
        if let Scalar::F64(f) = value {
            if !f.is_finite() {
                return Err(Error::illegal_state(format!(
                    "{f} cannot be represented in JSON"
                )));
            }
        }
        self.before_value()?;
        match value {
            Scalar::Null => self.formatter.write_null(&mut self.out)?,
            Scalar::Bool(b) => self.formatter.write_bool(&mut self.out, b)?,
            Scalar::I64(n) => self.formatter.write_i64(&mut self.out, n)?,
            Scalar::U64(n) => self.formatter.write_u64(&mut self.out, n)?,
            Scalar::F64(f) => self.formatter.write_f64(&mut self.out, f)?,
            Scalar::Str(s) => serde_json::to_writer(&mut self.out, s)?,
        }
        self.after_value()
    }

    fn raw_value(&mut self, json: &str) -> Result<()> {
        serde_json::from_str::<serde::de::IgnoredAny>(json)?;
        self.before_value()?;
        self.formatter.write_raw_fragment(&mut self.out, json.trim())?;
        self.after_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(w: JsonWriter<Vec<u8>>) -> String {
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn compact_nested_document() {
        let mut w = JsonWriter::new(Vec::new());
        w.begin_object().unwrap();
        w.name("a").unwrap();
        w.begin_array().unwrap();
        w.value(1i64.into()).unwrap();
        w.value("x".into()).unwrap();
        w.value(Scalar::Null).unwrap();
        w.value(1.5f64.into()).unwrap();
        w.end_array().unwrap();
        w.name("b").unwrap();
        w.begin_object().unwrap();
        w.end_object().unwrap();
        w.end_object().unwrap();
        w.finish().unwrap();
        assert_eq!(written(w), r#"{"a":[1,"x",null,1.5],"b":{}}"#);
    }

    #[test]
    fn pretty_output_matches_serde_json() {
        let opts = Options::pretty();
        let mut w = JsonWriter::with_options(Vec::new(), &opts);
        w.begin_object().unwrap();
        w.name("data").unwrap();
        w.begin_object().unwrap();
        w.name("id").unwrap();
        w.value("1".into()).unwrap();
        w.name("tags").unwrap();
        w.begin_array().unwrap();
        w.value(true.into()).unwrap();
        w.end_array().unwrap();
        w.name("empty").unwrap();
        w.begin_array().unwrap();
        w.end_array().unwrap();
        w.end_object().unwrap();
        w.end_object().unwrap();
        let expected = serde_json::to_string_pretty(
            &serde_json::json!({"data": {"id": "1", "tags": [true], "empty": []}}),
        )
        .unwrap();
        assert_eq!(written(w), expected);
    }

    #[test]
    fn strings_escape_like_serde_json() {
        let text = "say \"hi\"\n\u{1}\\ ünï";
        let mut w = JsonWriter::new(Vec::new());
        w.begin_object().unwrap();
        w.name("tab\tkey").unwrap();
        w.value(text.into()).unwrap();
        w.end_object().unwrap();
        let expected = serde_json::to_string(&serde_json::json!({"tab\tkey": text})).unwrap();
        assert_eq!(written(w), expected);
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let mut w = JsonWriter::new(Vec::new());
        w.begin_array().unwrap();
        assert!(matches!(w.value(f64::NAN.into()), Err(Error::IllegalState(_))));
    }

    #[test]
    fn raw_fragments_are_checked() {
        let mut w = JsonWriter::new(Vec::new());
        w.begin_array().unwrap();
        w.raw_value(r#"{"a":1}"#).unwrap();
        assert!(matches!(w.raw_value("{oops"), Err(Error::SerdeJson(_))));
    }
}
