//! Line-based parser
//!
//! Walks the [FileToken] stream with a stateful cursor. Structure comes from the token kinds
//! alone: `Block`/`EndStruct` and `Namespace`/`EndNamespace` pairs nest, `Since`/`EndSince`
//! gate, and docs attach to the declaration they abut.
//!
//! Doc attachment
//!
//!     Consecutive doc tokens with no gap between them merge. When the merged doc abuts a
//!     declaration (or the template signature of one) it becomes that entry's doc. The first
//!     doc that does not abut anything is the file doc; a `/// @}` doc marks the end of the
//!     entries region. Trailing docs (`/**<`) attach to the declaration just before them.
//!
//! Namespaces are flattened into the enclosing entries.

use super::builder;
use super::{HeaderParser, ParseOptions};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::lexer::{self, BlockKeyword, FileToken, TokenKind};
use crate::model::{ApiEntries, ApiEntry, ApiFile, Doc, EntryKind, Since};

pub struct LinebasedParser;

impl HeaderParser for LinebasedParser {
    fn parse(&self, name: &str, source: &str, _options: &ParseOptions, diagnostics: &Diagnostics) -> Result<ApiFile> {
        let tokens = lexer::tokenize(name, source, diagnostics)?;
        assemble(name, &tokens)
    }
}

/// Build the file model from a token stream.
pub fn assemble(name: &str, tokens: &[FileToken]) -> Result<ApiFile> {
    let mut cursor = Cursor::new(name, tokens);
    let mut entries = ApiEntries::new();
    cursor.entries(&mut entries, Until::Eof, 0)?;
    Ok(cursor.finish(entries))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Until {
    Eof,
    Namespace,
    Block,
}

/// Doc and template waiting for the declaration they precede.
#[derive(Debug, Default)]
struct Pending {
    doc: Option<String>,
    template: Option<String>,
    begin: Option<usize>,
}

#[derive(Debug)]
struct Gate {
    since: Since,
    depth: usize,
    begin: usize,
    /// End of the `#if` line while no entry has claimed it yet.
    unclaimed_end: Option<usize>,
}

struct Closing {
    name: Option<String>,
    end: usize,
}

struct Cursor<'a> {
    file: &'a str,
    tokens: &'a [FileToken],
    index: usize,
    pending: Pending,
    gates: Vec<Gate>,
    file_doc: Option<(String, usize, usize)>,
    namespace_end: Option<usize>,
    entries_end: Option<usize>,
    includes: Vec<String>,
    local_includes: Vec<String>,
    stopped: bool,
}

impl<'a> Cursor<'a> {
    fn new(file: &'a str, tokens: &'a [FileToken]) -> Self {
        Self {
            file,
            tokens,
            index: 0,
            pending: Pending::default(),
            gates: Vec::new(),
            file_doc: None,
            namespace_end: None,
            entries_end: None,
            includes: Vec::new(),
            local_includes: Vec::new(),
            stopped: false,
        }
    }

    fn finish(self, entries: ApiEntries) -> ApiFile {
        let mut file = ApiFile::new(self.file);
        let doc_end = self.file_doc.as_ref().map(|(_, _, end)| *end);
        file.entries_begin = match (self.namespace_end, doc_end) {
            (Some(namespace), Some(doc)) => Some(namespace.max(doc)),
            (namespace, doc) => namespace.or(doc),
        };
        if let Some((text, begin, end)) = self.file_doc {
            file.doc = Some(Doc::Raw(text));
            file.doc_begin = Some(begin);
            file.doc_end = Some(end);
        }
        file.entries_end = self.entries_end;
        file.entries = entries;
        file.includes = self.includes;
        file.local_includes = self.local_includes;
        file
    }

    fn peek(&self) -> Option<&'a FileToken> {
        self.tokens.get(self.index)
    }

    /// Parse entries until the closer `until` expects. Returns the block closer, if any.
    fn entries(&mut self, entries: &mut ApiEntries, until: Until, depth: usize) -> Result<Option<Closing>> {
        let mut last: Option<String> = None;
        while let Some(token) = self.peek() {
            if self.stopped {
                break;
            }
            self.index += 1;
            match &token.kind {
                TokenKind::Doc { text, trailing: true } => {
                    if let Some(name) = &last {
                        builder::attach_trailing_doc(entries, name, text.clone(), Some(token.end));
                    }
                }
                TokenKind::Doc { .. } => self.leading_doc(token, depth),
                TokenKind::Template { parameters } => {
                    match self.peek() {
                        Some(next) if next.kind.is_declaration() && !matches!(next.kind, TokenKind::Enumerator { .. }) => {}
                        _ => {
                            return Err(Error::parse(
                                self.file,
                                token.begin,
                                "template signature is not followed by a declaration",
                            ))
                        }
                    }
                    self.pending.template = Some(parameters.clone());
                    self.pending.begin.get_or_insert(token.begin);
                }
                TokenKind::Include { path, local } => {
                    if *local {
                        self.local_includes.push(path.clone());
                    } else {
                        self.includes.push(path.clone());
                    }
                }
                TokenKind::Since(since) => self.gates.push(Gate {
                    since: since.clone(),
                    depth,
                    begin: token.begin,
                    unclaimed_end: Some(token.end),
                }),
                TokenKind::EndSince => {
                    self.gates.pop();
                    if let Some(entry) = last.as_deref().and_then(|name| builder::last_variant_mut(entries, name)) {
                        if entry.end == Some(token.begin) {
                            entry.end = Some(token.end);
                        }
                    }
                }
                TokenKind::Namespace { .. } => {
                    self.namespace_end.get_or_insert(token.end);
                    self.entries(entries, Until::Namespace, depth)?;
                }
                TokenKind::EndNamespace => {
                    if until == Until::Namespace {
                        self.entries_end.get_or_insert(token.begin);
                        return Ok(None);
                    }
                    return Err(Error::parse(self.file, token.begin, "unexpected end of namespace"));
                }
                TokenKind::EndStruct { name } => {
                    if until == Until::Block {
                        return Ok(Some(Closing {
                            name: name.clone(),
                            end: token.end,
                        }));
                    }
                    return Err(Error::parse(self.file, token.begin, "unexpected end of struct"));
                }
                TokenKind::ImplMarker => {
                    self.entries_end.get_or_insert(token.begin);
                    self.stopped = true;
                }
                TokenKind::Block { keyword, name, base, .. } => {
                    if let Some(name) = self.block(entries, token, *keyword, name, base.clone(), depth)? {
                        last = Some(name);
                    }
                }
                TokenKind::Enumerator { name, value } => {
                    let entry = builder::enumerator_entry(name, value.as_ref(), "");
                    last = Some(self.insert(entries, entry, token, depth));
                }
                kind => {
                    if let Some(entry) = builder::entry_from_token(kind) {
                        last = Some(self.insert(entries, entry, token, depth));
                    }
                }
            }
        }
        match until {
            Until::Block if !self.stopped => {
                let line = self.tokens.last().map_or(0, |token| token.begin);
                Err(Error::parse(self.file, line, "unterminated struct"))
            }
            _ => Ok(None),
        }
    }

    /// Attach a doc run to the declaration it abuts, or record it as a floating doc.
    fn leading_doc(&mut self, first: &'a FileToken, depth: usize) {
        let mut texts = vec![doc_text(first)];
        let mut end = first.end;
        while let Some(next) = self.peek() {
            match &next.kind {
                TokenKind::Doc { text, trailing: false } if next.begin == end => {
                    texts.push(text.as_str());
                    end = next.end;
                    self.index += 1;
                }
                _ => break,
            }
        }
        let text = texts.join("\n");

        let abuts = self
            .peek()
            .is_some_and(|next| next.begin == end && (next.kind.is_declaration() || matches!(next.kind, TokenKind::Template { .. })));
        if abuts {
            self.pending.doc = Some(text);
            self.pending.begin = Some(first.begin);
        } else if builder::is_group_closer(&text) {
            if depth == 0 {
                self.entries_end.get_or_insert(first.begin);
            }
        } else if self.file_doc.is_none() {
            self.file_doc = Some((builder::strip_group_opener(&text), first.begin, end));
        } else {
            tracing::trace!(file = self.file, line = first.begin, "dropping floating doc");
        }
    }

    /// Finish an entry: pending doc and template, gate, lines. Returns the entry name.
    fn insert(&mut self, entries: &mut ApiEntries, mut entry: ApiEntry, token: &FileToken, depth: usize) -> String {
        self.complete(&mut entry, token.begin, token.end, depth);
        let name = entry.name.clone();
        builder::insert_entry(entries, entry);
        name
    }

    fn complete(&mut self, entry: &mut ApiEntry, decl: usize, end: usize, depth: usize) {
        let pending = std::mem::take(&mut self.pending);
        if let Some(text) = pending.doc {
            entry.doc = Some(Doc::Raw(text));
        }
        if let Some(template) = pending.template {
            builder::set_template(entry, template);
        }
        let mut begin = pending.begin.unwrap_or(decl);
        if let Some(gate) = self.gates.last_mut().filter(|gate| gate.depth == depth) {
            entry.since = Some(gate.since.clone());
            if gate.unclaimed_end.take() == Some(begin) {
                begin = gate.begin;
            }
        }
        entry.begin = Some(begin);
        entry.decl = Some(decl);
        entry.end = Some(end);
    }

    fn block(
        &mut self,
        entries: &mut ApiEntries,
        opener: &'a FileToken,
        keyword: BlockKeyword,
        name: &str,
        base: Option<String>,
        depth: usize,
    ) -> Result<Option<String>> {
        // The block's own doc and template must not leak into its members.
        let pending = std::mem::take(&mut self.pending);
        let mut children = ApiEntries::new();
        let closing = self.entries(&mut children, Until::Block, depth + 1)?;
        let end = closing.as_ref().map_or(opener.end, |closing| closing.end);
        let name = closing.and_then(|closing| closing.name).unwrap_or_else(|| name.to_string());

        if keyword == BlockKeyword::Enum {
            for child in children.values_mut() {
                if let EntryKind::Var(var) = &mut child.kind {
                    var.ty = name.clone();
                }
            }
        }
        if name.is_empty() {
            for (_, child) in children {
                builder::insert_entry(entries, child);
            }
            return Ok(None);
        }

        self.pending = pending;
        let mut entry = builder::block_entry(keyword, &name, base, children);
        self.complete(&mut entry, opener.begin, end, depth);
        builder::insert_entry(entries, entry);
        Ok(Some(name))
    }
}

fn doc_text(token: &FileToken) -> &str {
    match &token.kind {
        TokenKind::Doc { text, .. } => text,
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;

    fn parse(source: &str) -> ApiFile {
        LinebasedParser
            .parse("test.h", source, &ParseOptions::tracking_lines(), &Diagnostics::silent())
            .unwrap()
    }

    #[test]
    fn test_file_doc_and_entry_docs() {
        let source = "\
/**
 * # CategoryInit
 *
 * Init things.
 */

#include <SDL3/SDL_stdinc.h>
#include \"SDL3pp_error.h\"

/**
 * Initialize.
 */
extern SDL_DECLSPEC bool SDLCALL SDL_Init(SDL_InitFlags flags);

void SDL_Quit(void);
";
        let file = parse(source);
        assert_eq!(file.doc, Some(Doc::Raw("# CategoryInit\n\nInit things.".to_string())));
        assert_eq!((file.doc_begin, file.doc_end), (Some(1), Some(6)));
        assert_eq!(file.includes, vec!["SDL3/SDL_stdinc.h"]);
        assert_eq!(file.local_includes, vec!["SDL3pp_error.h"]);

        let init = &file.entries["SDL_Init"];
        assert_eq!(init.doc, Some(Doc::Raw("Initialize.".to_string())));
        assert_eq!((init.begin, init.decl, init.end), (Some(10), Some(13), Some(14)));
        let function = init.as_function().unwrap();
        assert_eq!(function.ty.as_deref(), Some("bool"));
        assert_eq!(function.parameters, vec![Parameter::new("flags", "SDL_InitFlags")]);
        assert!(function.proto);

        assert_eq!(file.entries["SDL_Quit"].doc, None);
    }

    #[test]
    fn test_doc_separated_by_blank_line_does_not_attach() {
        let file = parse("/** File. */\n\n/** Lost. */\n\nint x;\n");
        assert_eq!(file.doc, Some(Doc::Raw("File.".to_string())));
        assert_eq!(file.entries["x"].doc, None);
    }

    #[test]
    fn test_typedef_struct_takes_closing_name() {
        let source = "\
/**
 * A point.
 */
typedef struct SDL_Point
{
    int x; /**< The x */
    int y; /**< The y */
} SDL_Point;
";
        let file = parse(source);
        let point = &file.entries["SDL_Point"];
        assert_eq!((point.begin, point.decl, point.end), (Some(1), Some(4), Some(9)));
        let EntryKind::Struct(aggregate) = &point.kind else {
            panic!("expected struct, got {:?}", point.kind);
        };
        assert_eq!(aggregate.entries.len(), 2);
        assert_eq!(aggregate.entries["x"].doc, Some(Doc::Raw("The x".to_string())));
    }

    #[test]
    fn test_enum_entries_are_typed_vars() {
        let source = "typedef enum SDL_Color\n{\n    SDL_RED, /**< red */\n    SDL_GREEN = 2\n} SDL_Color;\n";
        let file = parse(source);
        let EntryKind::Enum { entries } = &file.entries["SDL_Color"].kind else {
            panic!("expected enum");
        };
        let EntryKind::Var(red) = &entries["SDL_RED"].kind else {
            panic!("expected var");
        };
        assert_eq!(red.ty, "SDL_Color");
        assert_eq!(entries["SDL_RED"].doc, Some(Doc::Raw("red".to_string())));
        let EntryKind::Var(green) = &entries["SDL_GREEN"].kind else {
            panic!("expected var");
        };
        assert_eq!(green.value.as_deref(), Some("2"));
    }

    #[test]
    fn test_overloads_keep_first_doc() {
        let source = "/**\n * First.\n */\nvoid F(int a);\n\n/**\n * Second.\n */\nvoid F(float a);\n";
        let file = parse(source);
        let f = &file.entries["F"];
        assert_eq!(f.variants().count(), 2);
        assert_eq!(f.doc, Some(Doc::Raw("First.".to_string())));
        assert_eq!(f.chain_end(), Some(10));
    }

    #[test]
    fn test_namespace_is_flattened_and_regions_tracked() {
        let source = "\
namespace SDL {

/**
 * @defgroup CategoryInit Init
 *
 * @{
 */

/**
 * Quit.
 */
inline void Quit() { SDL_Quit(); }

/// @}

} // namespace SDL
";
        let file = parse(source);
        assert_eq!(file.doc, Some(Doc::Raw("@defgroup CategoryInit Init".to_string())));
        assert_eq!(file.entries_begin, Some(8));
        assert_eq!(file.entries_end, Some(14));
        let quit = &file.entries["Quit"];
        assert!(!quit.as_function().unwrap().proto);
        assert_eq!((quit.begin, quit.end), (Some(9), Some(13)));
    }

    #[test]
    fn test_version_gate_wraps_entry_lines() {
        let source = "#if SDL_VERSION_ATLEAST(3, 2, 0)\n/**\n * New.\n */\nvoid F();\n#endif // SDL_VERSION_ATLEAST(3, 2, 0)\n";
        let file = parse(source);
        let f = &file.entries["F"];
        assert_eq!(f.since, Some(Since::new(3, 2, 0)));
        assert_eq!((f.begin, f.decl, f.end), (Some(1), Some(5), Some(7)));
    }

    #[test]
    fn test_template_attaches_to_declaration() {
        let source = "template<class T>\nstruct Box {\n  T value;\n};\n";
        let file = parse(source);
        let EntryKind::Struct(aggregate) = &file.entries["Box"].kind else {
            panic!("expected struct");
        };
        assert_eq!(aggregate.template.as_deref(), Some("class T"));
        assert_eq!(file.entries["Box"].begin, Some(1));
    }

    #[test]
    fn test_dangling_template_is_an_error() {
        let result =
            LinebasedParser.parse("t.h", "template<class T>\n", &ParseOptions::default(), &Diagnostics::silent());
        assert!(matches!(result, Err(Error::Parse { line: 1, .. })));
    }

    #[test]
    fn test_unterminated_struct_is_an_error() {
        let result = LinebasedParser.parse("t.h", "struct A {\n  int x;\n", &ParseOptions::default(), &Diagnostics::silent());
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_impl_marker_ends_entries() {
        let source = "namespace SDL {\n\nvoid F();\n\n#pragma region impl\n\nvoid G();\n";
        let file = parse(source);
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.entries_end, Some(5));
    }
}
