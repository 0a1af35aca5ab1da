//! LTX line scanner.
//!
//! The scanner walks the text once, keeping two pieces of state: the stack of
//! files currently being included and, when inside a `key = <<END` block, the
//! text collected so far. `#include` recurses into the scanner with the
//! included file as the new base for relative paths.
//!
//! # Usage
//!
//! ```ignore
//! use ltx::Document;
//!
//! let mut doc = Document::new("system.ltx");
//! doc.read_file("config/system.ltx")?;
//! let cost = doc.get_uint("wpn_pm", "cost")?;
//! ```

mod decode;
mod line;

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{Document, FieldValue, Section};
use crate::error::ParseError;
use crate::gamedata::{absolutize, resolve_plain_include};

pub use decode::decode;
pub use line::{classify, strip_comment, Line, BLOCK_CLOSE, BLOCK_OPEN};

/// Read a file from disk and decode it to text.
pub fn read_source(path: &Path) -> Result<String, ParseError> {
    let bytes = fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode(&bytes))
}

/// Parse `raw` into `doc`. `source` is the file the text came from; it is
/// needed to resolve `#include` and names the origin of every section.
pub(crate) fn parse_into(
    doc: &mut Document,
    raw: &str,
    source: Option<&Path>,
) -> Result<(), ParseError> {
    let mut scanner = Scanner {
        doc,
        stack: source.map(absolutize).into_iter().collect(),
    };
    scanner.scan(raw, source)
}

struct Scanner<'d> {
    doc: &'d mut Document,
    stack: Vec<PathBuf>,
}

/// An open `key = <<END` block.
struct Block {
    field: String,
    buffer: String,
    line: usize,
}

impl Scanner<'_> {
    fn scan(&mut self, raw: &str, source: Option<&Path>) -> Result<(), ParseError> {
        let file = source.map(Path::to_path_buf).unwrap_or_default();
        let origin = source
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut block: Option<Block> = None;

        for (index, text) in raw.lines().enumerate() {
            let line = index + 1;

            if let Some(open) = block.as_mut() {
                if strip_comment(text) == BLOCK_CLOSE {
                    if let Some(done) = block.take() {
                        self.close_block(done);
                    }
                } else {
                    open.buffer.push_str(text);
                    open.buffer.push('\n');
                }
                continue;
            }

            match classify(strip_comment(text)) {
                Line::Blank => {}
                Line::Include(target) => self.include(target, source, line)?,
                Line::Header(id) => {
                    let id = id.to_lowercase();
                    self.ensure_new(&id, &file, line)?;
                    self.doc.push_section(Section::new(id, origin.as_str()));
                }
                Line::Inherit { id, parents } => {
                    let id = id.to_lowercase();
                    self.ensure_new(&id, &file, line)?;
                    if parents.is_empty() {
                        return Err(ParseError::NoParents {
                            id,
                            file: file.clone(),
                            line,
                        });
                    }
                    let mut section = Section::new(id, origin.as_str());
                    for parent in parents {
                        match self.doc.get_section(&parent) {
                            Some(found) => section.overwrite(found),
                            None => {
                                return Err(ParseError::UnknownParent {
                                    parent,
                                    file: file.clone(),
                                    line,
                                })
                            }
                        }
                    }
                    self.doc.push_section(section);
                }
                Line::MalformedHeader(header) => {
                    return Err(ParseError::MalformedHeader {
                        header: header.to_string(),
                        file: file.clone(),
                        line,
                    });
                }
                Line::Field { key, value } => {
                    let section = self.current_section(&file, line)?;
                    if value == BLOCK_OPEN {
                        section.set(key, FieldValue::Value(String::new()));
                        block = Some(Block {
                            field: key.to_string(),
                            buffer: String::new(),
                            line,
                        });
                    } else {
                        section.set(key, FieldValue::from(value));
                    }
                }
                Line::Flag(key) => {
                    self.current_section(&file, line)?
                        .set(key, FieldValue::Flag);
                }
            }
        }

        match block {
            Some(open) => Err(ParseError::UnterminatedBlock {
                field: open.field,
                file,
                line: open.line,
            }),
            None => Ok(()),
        }
    }

    fn ensure_new(&self, id: &str, file: &Path, line: usize) -> Result<(), ParseError> {
        if self.doc.section_exist(id) {
            return Err(ParseError::DuplicateSection {
                id: id.to_string(),
                file: file.to_path_buf(),
                line,
            });
        }
        Ok(())
    }

    fn current_section(&mut self, file: &Path, line: usize) -> Result<&mut Section, ParseError> {
        self.doc
            .last_section_mut()
            .ok_or_else(|| ParseError::RedundantText {
                file: file.to_path_buf(),
                line,
            })
    }

    fn close_block(&mut self, block: Block) {
        if let Some(section) = self.doc.last_section_mut() {
            section.set(block.field, FieldValue::Value(block.buffer));
        }
    }

    fn include(
        &mut self,
        target: &str,
        source: Option<&Path>,
        line: usize,
    ) -> Result<(), ParseError> {
        let from = source.ok_or(ParseError::IncludeWithoutSource { line })?;
        let path = match self.doc.gamedata() {
            Some(gamedata) => gamedata.resolve_include(from, target)?,
            None => resolve_plain_include(from, target)?,
        };
        if self.stack.contains(&path) {
            return Err(ParseError::IncludeCycle { path });
        }
        log::trace!("#include \"{}\" -> {}", target, path.display());

        let raw = read_source(&path)?;
        self.stack.push(path.clone());
        let result = self.scan(&raw, Some(&path));
        self.stack.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamedata::Gamedata;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn parse(raw: &str) -> Result<Document, ParseError> {
        let mut doc = Document::new("test");
        parse_into(&mut doc, raw, None)?;
        Ok(doc)
    }

    fn values(section: &Section) -> Vec<(&str, Option<&str>)> {
        section.fields().map(|(k, v)| (k, v.as_str())).collect()
    }

    #[test]
    fn test_parse_basic() {
        let doc = parse(
            "; header comment\n\
             [Wpn_PM]\n\
             cost = 500 ; price\n\
             quest_item\n\
             \n\
             [ammo_9x18_fmj]\n\
             box_size = 8\n",
        )
        .unwrap();

        assert_eq!(doc.ids().collect::<Vec<_>>(), vec!["wpn_pm", "ammo_9x18_fmj"]);
        let pm = doc.section("wpn_pm").unwrap();
        assert_eq!(values(pm), vec![("cost", Some("500")), ("quest_item", None)]);
    }

    #[test]
    fn test_inheritance_later_parent_wins() {
        let doc = parse(
            "[a]\n\
             f = from_a\n\
             only_a = 1\n\
             [b]\n\
             f = from_b\n\
             only_b = 2\n\
             [c]:a,b\n\
             own = 3\n",
        )
        .unwrap();

        let c = doc.section("c").unwrap();
        assert_eq!(
            values(c),
            vec![
                ("f", Some("from_b")),
                ("only_a", Some("1")),
                ("only_b", Some("2")),
                ("own", Some("3")),
            ]
        );
    }

    #[test]
    fn test_child_lines_override_parent() {
        let doc = parse("[a]\nf = 1\ng = 2\n[c]:a\nf = 9\n").unwrap();
        let c = doc.section("c").unwrap();
        assert_eq!(values(c), vec![("f", Some("9")), ("g", Some("2"))]);
    }

    #[test]
    fn test_duplicate_section() {
        let err = parse("[x]\n[X]\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateSection { ref id, line: 2, .. } if id == "x"));

        let err = parse("[y]\n[x]\n[x]:y\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateSection { .. }));
    }

    #[test]
    fn test_forward_parent_reference() {
        let err = parse("[x]:y\n[y]\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownParent { ref parent, line: 1, .. } if parent == "y"));
    }

    #[test]
    fn test_empty_parent_list() {
        let err = parse("[x]:\n").unwrap_err();
        assert!(matches!(err, ParseError::NoParents { .. }));
    }

    #[test]
    fn test_empty_parent_name() {
        let err = parse("[a]\n[c]:a,\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownParent { ref parent, line: 2, .. } if parent.is_empty()));

        let err = parse("[a]\n[b]\n[c]:a,,b\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownParent { ref parent, .. } if parent.is_empty()));
    }

    #[test]
    fn test_redundant_text() {
        let err = parse("cost = 1\n[x]\n").unwrap_err();
        assert!(matches!(err, ParseError::RedundantText { line: 1, .. }));
    }

    #[test]
    fn test_malformed_header() {
        let err = parse("[bad id]\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { .. }));
    }

    #[test]
    fn test_custom_data_block() {
        let doc = parse(
            "[obj]\n\
             custom_data = <<END\n\
             foo\n\
             bar ; kept\n\
             END\n\
             after = 1\n",
        )
        .unwrap();

        let obj = doc.section("obj").unwrap();
        assert_eq!(obj.get_string("custom_data").unwrap(), "foo\nbar ; kept\n");
        assert_eq!(obj.get_string("after").unwrap(), "1");
    }

    #[test]
    fn test_block_terminator_with_comment() {
        let doc = parse(
            "[obj]\n\
             custom_data = <<END\n\
             foo\n\
             END ; done\n\
             after = 1\n",
        )
        .unwrap();

        let obj = doc.section("obj").unwrap();
        assert_eq!(obj.get_string("custom_data").unwrap(), "foo\n");
        assert_eq!(obj.get_string("after").unwrap(), "1");
    }

    #[test]
    fn test_empty_block() {
        let doc = parse("[obj]\ncustom_data = <<END\nEND\n").unwrap();
        assert_eq!(doc.section("obj").unwrap().get_string("custom_data").unwrap(), "");
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse("[obj]\ncustom_data = <<END\nfoo\n").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedBlock { line: 2, .. }));
    }

    #[test]
    fn test_include_without_source() {
        let err = parse("#include \"other.ltx\"\n").unwrap_err();
        assert!(matches!(err, ParseError::IncludeWithoutSource { line: 1 }));
    }

    #[test]
    fn test_include_relative_to_file() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("weapons")).unwrap();
        fs::write(
            dir.path().join("system.ltx"),
            "#include \"weapons\\w_pm.ltx\"\n[after]\n",
        )
        .unwrap();
        fs::write(dir.path().join("weapons/w_pm.ltx"), "[wpn_pm]\ncost = 500\n").unwrap();

        let mut doc = Document::new("system");
        doc.read_file(dir.path().join("system.ltx")).unwrap();

        assert_eq!(doc.ids().collect::<Vec<_>>(), vec!["wpn_pm", "after"]);
        assert_eq!(doc.section("wpn_pm").unwrap().source(), "w_pm.ltx");
        assert_eq!(doc.section("after").unwrap().source(), "system.ltx");
    }

    #[test]
    fn test_include_cycle() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ltx"), "#include \"b.ltx\"\n").unwrap();
        fs::write(dir.path().join("b.ltx"), "#include \"a.ltx\"\n").unwrap();

        let mut doc = Document::new("a");
        let err = doc.read_file(dir.path().join("a.ltx")).unwrap_err();
        assert!(matches!(err, ParseError::IncludeCycle { .. }));
    }

    #[test]
    fn test_include_missing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ltx"), "#include \"nope.ltx\"\n").unwrap();

        let mut doc = Document::new("a");
        let err = doc.read_file(dir.path().join("a.ltx")).unwrap_err();
        assert!(matches!(err, ParseError::IncludeNotFound { .. }));
    }

    #[test]
    fn test_gamedata_override_inside_include() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("mod");
        let alt = dir.path().join("orig");
        fs::create_dir_all(main.join("config")).unwrap();
        fs::create_dir_all(alt.join("config")).unwrap();
        fs::write(alt.join("config/system.ltx"), "#include \"items.ltx\"\n").unwrap();
        fs::write(alt.join("config/items.ltx"), "[bread]\ncost = 10\n").unwrap();
        fs::write(main.join("config/items.ltx"), "[bread]\ncost = 20\n").unwrap();

        let mut doc = Document::with_gamedata("system", Gamedata::new(&main, Some(alt)));
        doc.read_gamedata("config/system.ltx").unwrap();

        assert_eq!(doc.get_uint("bread", "cost").unwrap(), 20);
    }
}
