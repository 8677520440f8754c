use indexmap::IndexMap;
use log::debug;

use crate::encode::writer::JsonWriter;
use crate::stream::{
    DefaultJsonApiWriter, JsonApiWriter, NestingCounter, ResourceRelationshipWriter, Scalar,
    TokenWriter,
};
use crate::{Error, Result};

type CaptureSink = NestingCounter<JsonWriter<Vec<u8>>>;

enum CaptureWriter {
    Relationship(ResourceRelationshipWriter<CaptureSink>),
    Included(CaptureSink),
}

impl CaptureWriter {
    fn tokens(&mut self) -> &mut dyn TokenWriter {
        match self {
            CaptureWriter::Relationship(w) => w,
            CaptureWriter::Included(w) => w,
        }
    }

    fn sink(&self) -> &CaptureSink {
        match self {
            CaptureWriter::Relationship(w) => w.get_ref(),
            CaptureWriter::Included(w) => w,
        }
    }

    fn into_json(self) -> Result<String> {
        let sink = match self {
            CaptureWriter::Relationship(w) => w.into_inner(),
            CaptureWriter::Included(w) => w,
        };
        String::from_utf8(sink.into_inner().into_inner()).map_err(|e| Error::Message(e.to_string()))
    }
}

struct Capture {
    key: String,
    writer: CaptureWriter,
}

/// [`JsonApiWriter`] that holds relationships and included resources back.
///
/// Between `begin_relationship` and `end_relationship` every token goes to a
/// separate, grammar-checked buffer keyed by the member name that was pending
/// when the relationship began. `write_relationships` then emits all of them
/// as one `"relationships"` object. Included resources work the same way and
/// come out as an `"included"` array from `write_included`.
///
/// Closing the object a capture was started in while captures are still
/// unwritten is an error.
pub struct BufferedJsonApiWriter<W> {
    base: DefaultJsonApiWriter<W>,
    capture: Option<Capture>,
    relationships: IndexMap<String, String>,
    relationships_level: Option<usize>,
    included: IndexMap<String, String>,
    included_level: Option<usize>,
}

impl<W: TokenWriter> BufferedJsonApiWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            base: DefaultJsonApiWriter::new(inner),
            capture: None,
            relationships: IndexMap::new(),
            relationships_level: None,
            included: IndexMap::new(),
            included_level: None,
        }
    }

    /// Relationships captured and not yet written.
    pub fn pending_relationships(&self) -> usize {
        self.relationships.len()
    }

    /// Included resources captured and not yet written.
    pub fn pending_included(&self) -> usize {
        self.included.len()
    }

    pub fn get_ref(&self) -> &W {
        self.base.get_ref()
    }

    pub fn into_inner(self) -> W {
        self.base.into_inner()
    }

    fn start_capture(&mut self, section: &'static str, writer: CaptureWriter) -> Result<()> {
        if self.capture.is_some() {
            return Err(Error::illegal_state(format!(
                "cannot begin a {section} entry while another entry is being captured"
            )));
        }
        let key = self.base.take_deferred_name().ok_or_else(|| {
            Error::illegal_state(format!("a {section} entry needs a pending member name as its key"))
        })?;
        let taken = match section {
            "relationships" => self.relationships.contains_key(&key),
            _ => self.included.contains_key(&key),
        };
        if taken {
            return Err(Error::DuplicateMember {
                name: key,
                section,
                remaining: None,
            });
        }
        debug!("capturing {section} entry `{key}`");
        self.capture = Some(Capture { key, writer });
        Ok(())
    }

    fn finish_capture(&mut self, relationship: bool) -> Result<(String, String)> {
        let capture = match self.capture.take() {
            Some(c) if matches!(c.writer, CaptureWriter::Relationship(_)) == relationship => c,
            other => {
                self.capture = other;
                return Err(Error::illegal_state(if relationship {
                    "end_relationship without a matching begin_relationship"
                } else {
                    "end_included without a matching begin_included"
                }));
            }
        };
        if !capture.writer.sink().get_ref().is_complete() {
            let key = capture.key.clone();
            self.capture = Some(capture);
            return Err(Error::illegal_state(format!(
                "captured entry `{key}` is not a complete JSON value"
            )));
        }
        let json = capture.writer.into_json()?;
        Ok((capture.key, json))
    }

    fn check_flushed(&self, level: usize) -> Result<()> {
        if !self.relationships.is_empty() && self.relationships_level == Some(level) {
            return Err(Error::UnflushedSection {
                section: "relationships",
                count: self.relationships.len(),
            });
        }
        if !self.included.is_empty() && self.included_level == Some(level) {
            return Err(Error::UnflushedSection {
                section: "included",
                count: self.included.len(),
            });
        }
        Ok(())
    }

    fn ensure_not_capturing(&self, action: &str) -> Result<()> {
        match &self.capture {
            Some(c) => Err(Error::illegal_state(format!(
                "cannot {action} while `{}` is still being captured",
                c.key
            ))),
            None => Ok(()),
        }
    }
}

fn capture_sink() -> CaptureSink {
    NestingCounter::new(JsonWriter::new(Vec::new()))
}

impl<W: TokenWriter> TokenWriter for BufferedJsonApiWriter<W> {
    fn begin_object(&mut self) -> Result<()> {
        match &mut self.capture {
            Some(c) => c.writer.tokens().begin_object(),
            None => self.base.begin_object(),
        }
    }

    fn end_object(&mut self) -> Result<()> {
        if let Some(c) = &mut self.capture {
            return c.writer.tokens().end_object();
        }
        self.check_flushed(self.base.nesting_level())?;
        self.base.end_object()
    }

    fn begin_array(&mut self) -> Result<()> {
        match &mut self.capture {
            Some(c) => c.writer.tokens().begin_array(),
            None => self.base.begin_array(),
        }
    }

    fn end_array(&mut self) -> Result<()> {
        match &mut self.capture {
            Some(c) => c.writer.tokens().end_array(),
            None => self.base.end_array(),
        }
    }

    fn name(&mut self, name: &str) -> Result<()> {
        match &mut self.capture {
            Some(c) => c.writer.tokens().name(name),
            None => self.base.name(name),
        }
    }

    fn value(&mut self, value: Scalar<'_>) -> Result<()> {
        match &mut self.capture {
            Some(c) => c.writer.tokens().value(value),
            None => self.base.value(value),
        }
    }

    fn raw_value(&mut self, json: &str) -> Result<()> {
        match &mut self.capture {
            Some(c) => c.writer.tokens().raw_value(json),
            None => self.base.raw_value(json),
        }
    }
}

impl<W: TokenWriter> JsonApiWriter for BufferedJsonApiWriter<W> {
    fn nesting_level(&self) -> usize {
        match &self.capture {
            Some(c) => c.writer.sink().depth(),
            None => self.base.nesting_level(),
        }
    }

    fn defers_relationships(&self) -> bool {
        true
    }

    fn begin_relationship(&mut self) -> Result<()> {
        let writer = CaptureWriter::Relationship(ResourceRelationshipWriter::new(capture_sink()));
        self.start_capture("relationships", writer)
    }

    fn end_relationship(&mut self) -> Result<()> {
        let (key, json) = self.finish_capture(true)?;
        self.relationships_level.get_or_insert(self.base.nesting_level());
        self.relationships.insert(key, json);
        Ok(())
    }

    fn begin_included(&mut self) -> Result<()> {
        self.start_capture("included", CaptureWriter::Included(capture_sink()))
    }

    fn end_included(&mut self) -> Result<()> {
        let (key, json) = self.finish_capture(false)?;
        self.included_level.get_or_insert(self.base.nesting_level());
        self.included.insert(key, json);
        Ok(())
    }

    fn write_relationships(&mut self) -> Result<()> {
        self.ensure_not_capturing("write relationships")?;
        if self.relationships.is_empty() {
            return Ok(());
        }
        debug!("writing {} buffered relationships", self.relationships.len());
        let relationships = std::mem::take(&mut self.relationships);
        self.relationships_level = None;
        self.base.name("relationships")?;
        self.base.begin_object()?;
        for (key, json) in &relationships {
            self.base.name(key)?;
            self.base.raw_value(json)?;
        }
        self.base.end_object()
    }

    fn write_included(&mut self) -> Result<()> {
        self.ensure_not_capturing("write included resources")?;
        if self.included.is_empty() {
            return Ok(());
        }
        debug!("writing {} buffered included resources", self.included.len());
        let included = std::mem::take(&mut self.included);
        self.included_level = None;
        self.base.name("included")?;
        self.base.begin_array()?;
        for json in included.values() {
            self.base.raw_value(json)?;
        }
        self.base.end_array()
    }
}
