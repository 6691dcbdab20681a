//! Text emission helpers shared by the C++ backends.

use string_builder::Builder as StringBuilder;

use crate::error::{Error, Result};
use crate::iir::{DoMethod, Stage};
use crate::sir::field::LocationType;
use crate::sir::interval::{Interval, Level};

/// An indentation-aware accumulator for generated sources.
pub(crate) struct SourceWriter {
    /// Text accumulated so far.
    builder: StringBuilder,
    /// Current indentation depth.
    indent: usize,
}

impl SourceWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self {
            builder: StringBuilder::default(),
            indent: 0,
        }
    }

    /// Appends one line at the current indentation.
    pub fn line(&mut self, line: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.builder.append("  ");
        }
        self.builder.append(line.as_ref());
        self.builder.append("\n");
    }

    /// Appends preformatted text verbatim.
    pub fn raw(&mut self, text: impl AsRef<str>) {
        self.builder.append(text.as_ref());
    }

    /// Appends an empty line.
    pub fn blank(&mut self) {
        self.builder.append("\n");
    }

    /// Appends a line and indents what follows, typically `... {`.
    pub fn open(&mut self, line: impl AsRef<str>) {
        self.line(line);
        self.indent += 1;
    }

    /// Dedents and appends a closing line, typically `}`.
    pub fn close(&mut self, line: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(line);
    }

    /// Closes a block and opens another on the same line, typically
    /// `} else {` or an access specifier.
    pub fn reopen(&mut self, line: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(line);
        self.indent += 1;
    }

    /// Hands back the accumulated text.
    pub fn finish(self) -> Result<String> {
        self.builder
            .string()
            .map_err(|err| Error::CodeGen(err.to_string()))
    }
}

/// Renders one interval bound as C++, given the spelling of the level count.
///
/// `Start` and literal levels fold their offset into a plain integer. `End`
/// stays symbolic because the level count is only known at run time.
pub(crate) fn interval_bound(level: Level, offset: i32, k_size: &str) -> String {
    match level {
        Level::Start => offset.to_string(),
        Level::At(level) => (level + offset).to_string(),
        Level::End => format!("( {k_size} == 0 ? 0 : ({k_size} - 1)) + {offset}"),
    }
}

/// Renders the lower bound of `interval`.
pub(crate) fn lower_bound(interval: &Interval, k_size: &str) -> String {
    interval_bound(interval.lower, interval.lower_offset, k_size)
}

/// Renders the upper bound of `interval`.
pub(crate) fn upper_bound(interval: &Interval, k_size: &str) -> String {
    interval_bound(interval.upper, interval.upper_offset, k_size)
}

/// Appends a signed level shift to a vertical coordinate expression.
pub(crate) fn shifted(base: impl Into<String>, shift: i32) -> String {
    let base = base.into();
    match shift {
        0 => base,
        shift if shift > 0 => format!("{base} + {shift}"),
        shift => format!("{base} - {}", -shift),
    }
}

/// The plural spelling of a location, as the runtime interfaces use it
/// (`getCells`, `NumCells`).
pub(crate) fn location_plural(location: LocationType) -> &'static str {
    match location {
        LocationType::Cell => "Cells",
        LocationType::Edge => "Edges",
        LocationType::Vertex => "Vertices",
    }
}

/// A run of consecutive do-methods sharing one interval: the unit one
/// vertical loop covers.
pub(crate) struct IntervalGroup<'a> {
    /// Interval the loop runs over.
    pub interval: Interval,
    /// Bodies executed inside the loop, in order, with their stage.
    pub bodies: Vec<(&'a Stage, &'a DoMethod)>,
}

/// Chunks the bodies of a multistage into consecutive runs sharing one
/// interval.
///
/// Splitting a multistage into one vertical loop per run preserves its
/// semantics because all its cross-stage dependencies are pointwise: the
/// mergers only ever fuse bodies whose exchanges stay on the iteration
/// point.
pub(crate) fn interval_groups(stages: &[Stage]) -> Vec<IntervalGroup<'_>> {
    let mut groups: Vec<IntervalGroup> = vec![];
    for stage in stages {
        for do_method in &stage.do_methods {
            match groups.last_mut() {
                Some(group) if group.interval == do_method.interval => {
                    group.bodies.push((stage, do_method));
                }
                _ => groups.push(IntervalGroup {
                    interval: do_method.interval,
                    bodies: vec![(stage, do_method)],
                }),
            }
        }
    }
    groups
}

/// The location of a stage, or the error asking for the locating pass.
pub(crate) fn stage_location(stage: &Stage) -> Result<LocationType> {
    stage.location.ok_or_else(|| {
        Error::CodeGen(
            "stages have no location, SetStageLocationType must run before code generation"
                .to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sir::interval::interval;

    #[test]
    fn writer_indents_by_two_spaces() {
        let mut writer = SourceWriter::new();
        writer.open("void run() {");
        writer.line("return;");
        writer.close("}");
        assert_eq!(writer.finish().unwrap(), "void run() {\n  return;\n}\n");
    }

    #[test]
    fn reopen_stays_at_the_outer_depth() {
        let mut writer = SourceWriter::new();
        writer.open("if(c) {");
        writer.line("a;");
        writer.reopen("} else {");
        writer.line("b;");
        writer.close("}");
        assert_eq!(
            writer.finish().unwrap(),
            "if(c) {\n  a;\n} else {\n  b;\n}\n"
        );
    }

    #[test]
    fn bounds_resolve_to_integers_when_they_can() {
        let column = interval(Level::Start, Level::End, 1, -1);
        assert_eq!(lower_bound(&column, "m_k_size"), "1");
        assert_eq!(
            upper_bound(&column, "m_k_size"),
            "( m_k_size == 0 ? 0 : (m_k_size - 1)) + -1"
        );
    }

    #[test]
    fn literal_levels_fold_their_offset() {
        assert_eq!(interval_bound(Level::At(4), 2, "kSize"), "6");
    }

    #[test]
    fn shifts_render_signed() {
        assert_eq!(shifted("k", 0), "k");
        assert_eq!(shifted("k", 2), "k + 2");
        assert_eq!(shifted("k", -1), "k - 1");
    }
}
