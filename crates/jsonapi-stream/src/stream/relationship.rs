//! Grammar checking for JSON:API v1 relationship objects.
//!
//! A relationship object contains at least one of:
//!
//! - `links`: a links object with `self` (the relationship link) and/or
//!   `related` (a related resource link)
//! - `data`: resource linkage
//! - `meta`: free-form non-standard meta information
//!
//! Whether at least one of them is present is not checked; only disallowed and
//! repeated names and illegal nesting are rejected.

use std::collections::HashSet;

use log::trace;

use crate::error::Container;
use crate::stream::{Scalar, TokenWriter};
use crate::{Error, Result};

/// A structural section of a relationship object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipSection {
    TopLevelRoot,
    Links,
    Data,
    Meta,
    Array,
}

struct SectionRules {
    restricts_names: bool,
    nested_objects: bool,
    nested_arrays: bool,
    allowed_names: &'static [&'static str],
}

impl RelationshipSection {
    fn rules(self) -> &'static SectionRules {
        const TOP_LEVEL_ROOT: SectionRules = SectionRules { restricts_names: true,  nested_objects: true,  nested_arrays: false, allowed_names: &["links", "data", "meta"] };
        const LINKS: SectionRules          = SectionRules { restricts_names: true,  nested_objects: false, nested_arrays: false, allowed_names: &["self", "related"] };
        const DATA: SectionRules           = SectionRules { restricts_names: true,  nested_objects: false, nested_arrays: true,  allowed_names: &["type", "id"] };
        const META: SectionRules           = SectionRules { restricts_names: false, nested_objects: true,  nested_arrays: false, allowed_names: &[] };
        const ARRAY: SectionRules          = SectionRules { restricts_names: false, nested_objects: true,  nested_arrays: false, allowed_names: &[] };

        match self {
            RelationshipSection::TopLevelRoot => &TOP_LEVEL_ROOT,
            RelationshipSection::Links => &LINKS,
            RelationshipSection::Data => &DATA,
            RelationshipSection::Meta => &META,
            RelationshipSection::Array => &ARRAY,
        }
    }

    pub fn has_restricted_names(self) -> bool {
        self.rules().restricts_names
    }

    pub fn allows_nested_objects(self) -> bool {
        self.rules().nested_objects
    }

    pub fn allows_nested_arrays(self) -> bool {
        self.rules().nested_arrays
    }

    /// Names legal in this section; empty when names are unrestricted.
    pub fn allowed_names(self) -> &'static [&'static str] {
        self.rules().allowed_names
    }

    pub fn json_name(self) -> &'static str {
        match self {
            RelationshipSection::TopLevelRoot => "top_level_root",
            RelationshipSection::Links => "links",
            RelationshipSection::Data => "data",
            RelationshipSection::Meta => "meta",
            RelationshipSection::Array => "array",
        }
    }

    /// The section a member name introduces, if any.
    pub fn by_json_name(name: &str) -> Option<Self> {
        match name {
            "links" => Some(RelationshipSection::Links),
            "data" => Some(RelationshipSection::Data),
            "meta" => Some(RelationshipSection::Meta),
            _ => None,
        }
    }
}

struct SectionFrame {
    section: RelationshipSection,
    seen: HashSet<String>,
}

impl SectionFrame {
    fn new(section: RelationshipSection) -> Self {
        Self {
            section,
            seen: HashSet::new(),
        }
    }
}

/// Wraps a [`TokenWriter`] and rejects output that breaks the relationship
/// object grammar, at the call that breaks it.
///
/// A writer that returned an error must not be written to again.
pub struct ResourceRelationshipWriter<W> {
    inner: W,
    frames: Vec<SectionFrame>,
    next_section: RelationshipSection,
}

impl<W: TokenWriter> ResourceRelationshipWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            frames: Vec::new(),
            next_section: RelationshipSection::TopLevelRoot,
        }
    }

    /// The innermost open section, if any.
    pub fn current_section(&self) -> Option<RelationshipSection> {
        self.frames.last().map(|f| f.section)
    }

    /// Number of open sections; back to 0 once the relationship object closes.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn in_metadata(&self) -> bool {
        self.current_section() == Some(RelationshipSection::Meta)
    }

    fn push_section(&mut self, section: RelationshipSection) {
        trace!("entering relationship section `{}`", section.json_name());
        self.frames.push(SectionFrame::new(section));
    }

    fn pop_section(&mut self, container: Container) -> Result<()> {
        match self.frames.pop() {
            Some(frame) => {
                trace!("leaving relationship section `{}`", frame.section.json_name());
                Ok(())
            }
            None => Err(Error::StackUnderflow {
                section: "relationship",
                container,
            }),
        }
    }

    fn validate_and_track_name(&mut self, name: &str) -> Result<()> {
        let frame = self.frames.last_mut().ok_or_else(|| {
            Error::illegal_state(format!(
                "member name `{name}` written before the relationship object was opened"
            ))
        })?;
        let section = frame.section;
        let allowed = section.allowed_names();

        if section.has_restricted_names() && !allowed.iter().any(|a| *a == name) {
            return Err(Error::InvalidMemberName {
                name: name.to_string(),
                section: section.json_name(),
                allowed: allowed.to_vec(),
            });
        }

        if frame.seen.contains(name) {
            let remaining = section.has_restricted_names().then(|| {
                allowed
                    .iter()
                    .copied()
                    .filter(|n| !frame.seen.contains(*n))
                    .collect()
            });
            return Err(Error::DuplicateMember {
                name: name.to_string(),
                section: section.json_name(),
                remaining,
            });
        }

        frame.seen.insert(name.to_string());
        Ok(())
    }

    fn queue_up_next_section(&mut self, name: &str) {
        if !self.in_metadata() {
            if let Some(next) = RelationshipSection::by_json_name(name) {
                self.next_section = next;
            }
        }
    }

    fn validate_can_nest(&self, container: Container) -> Result<()> {
        let (section, allowed) = match (self.current_section(), container) {
            // Before the relationship object itself is opened.
            (None, Container::Object) => return Ok(()),
            (None, Container::Array) => (RelationshipSection::TopLevelRoot, false),
            (Some(s), Container::Object) => (s, s.allows_nested_objects()),
            (Some(s), Container::Array) => (s, s.allows_nested_arrays()),
        };
        if allowed {
            Ok(())
        } else {
            Err(Error::IllegalNesting {
                section: section.json_name(),
                container,
            })
        }
    }
}

impl<W: TokenWriter> TokenWriter for ResourceRelationshipWriter<W> {
    fn name(&mut self, name: &str) -> Result<()> {
        self.validate_and_track_name(name)?;
        self.inner.name(name)?;
        self.queue_up_next_section(name);
        Ok(())
    }

    fn begin_object(&mut self) -> Result<()> {
        self.validate_can_nest(Container::Object)?;
        self.inner.begin_object()?;
        // Everything below a meta member stays meta, whatever its key.
        let section = if self.in_metadata() {
            RelationshipSection::Meta
        } else {
            self.next_section
        };
        self.push_section(section);
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        self.inner.end_object()?;
        self.pop_section(Container::Object)
    }

    fn begin_array(&mut self) -> Result<()> {
        if self.in_metadata() {
            return self.inner.begin_array();
        }
        self.validate_can_nest(Container::Array)?;
        self.inner.begin_array()?;
        self.push_section(RelationshipSection::Array);
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        self.inner.end_array()?;
        if self.in_metadata() {
            Ok(())
        } else {
            self.pop_section(Container::Array)
        }
    }

    fn value(&mut self, value: Scalar<'_>) -> Result<()> {
        self.inner.value(value)
    }

    fn raw_value(&mut self, json: &str) -> Result<()> {
        self.inner.raw_value(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_table() {
        use RelationshipSection::*;
        assert_eq!(TopLevelRoot.allowed_names(), &["links", "data", "meta"]);
        assert!(TopLevelRoot.allows_nested_objects() && !TopLevelRoot.allows_nested_arrays());
        assert!(!Links.allows_nested_objects() && !Links.allows_nested_arrays());
        assert!(!Data.allows_nested_objects() && Data.allows_nested_arrays());
        assert!(!Meta.has_restricted_names() && Meta.allows_nested_objects());
        assert!(!Array.has_restricted_names() && !Array.allows_nested_arrays());
    }

    #[test]
    fn only_root_members_introduce_sections() {
        use RelationshipSection::*;
        for s in [Links, Data, Meta] {
            assert_eq!(RelationshipSection::by_json_name(s.json_name()), Some(s));
        }
        assert_eq!(RelationshipSection::by_json_name("self"), None);
        assert_eq!(RelationshipSection::by_json_name("array"), None);
        assert_eq!(RelationshipSection::by_json_name("top_level_root"), None);
    }
}
