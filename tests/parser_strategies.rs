//! Both header parsers over the same C headers

use headergen::model::{ApiFile, Doc, EntryKind, Parameter};
use headergen::parser::{parse_header, ParseOptions, ParserKind};
use headergen::{Diagnostics, Error};
use rstest::rstest;

const RECT_H: &str = "\
/**
 * # CategoryRect
 *
 * Rectangle helpers.
 */

#ifndef SDL_rect_h_
#define SDL_rect_h_

#include <SDL3/SDL_stdinc.h>

#ifdef __cplusplus
extern \"C\" {
#endif

/**
 * A point.
 */
typedef struct SDL_Point
{
    int x;  /**< x coordinate */
    int y;  /**< y coordinate */
} SDL_Point;

#define SDL_RECT_MAX 10 /**< max */

/**
 * Check a point.
 */
extern SDL_DECLSPEC bool SDLCALL SDL_PointInRect(const SDL_Point *p, const SDL_Rect *r);

extern SDL_DECLSPEC void SDLCALL SDL_ResetRects(void);

#ifdef __cplusplus
}
#endif

#endif /* SDL_rect_h_ */
";

fn parse(kind: ParserKind, source: &str, options: &ParseOptions) -> ApiFile {
    parse_header("SDL_rect.h", source, kind, options, &Diagnostics::silent()).unwrap()
}

#[rstest]
#[case::linebased(ParserKind::Linebased)]
#[case::grammar(ParserKind::Grammar)]
fn test_c_header_entries(#[case] kind: ParserKind) {
    let file = parse(kind, RECT_H, &ParseOptions::default());

    assert_eq!(file.doc, Some(Doc::Raw("# CategoryRect\n\nRectangle helpers.".to_string())));
    assert_eq!(file.includes, vec!["SDL3/SDL_stdinc.h"]);
    let names: Vec<&str> = file.entries.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["SDL_Point", "SDL_RECT_MAX", "SDL_PointInRect", "SDL_ResetRects"]);

    let EntryKind::Struct(point) = &file.entries["SDL_Point"].kind else {
        panic!("expected struct");
    };
    assert_eq!(point.entries["y"].doc, Some(Doc::Raw("y coordinate".to_string())));
    assert_eq!(file.entries["SDL_RECT_MAX"].doc, Some(Doc::Raw("max".to_string())));

    let function = file.entries["SDL_PointInRect"].as_function().unwrap();
    assert_eq!(function.ty.as_deref(), Some("bool"));
    assert_eq!(
        function.parameters,
        vec![Parameter::new("p", "const SDL_Point *"), Parameter::new("r", "const SDL_Rect *")]
    );
    assert!(file.entries["SDL_ResetRects"].as_function().unwrap().parameters.is_empty());
}

#[rstest]
#[case::linebased(ParserKind::Linebased)]
#[case::grammar(ParserKind::Grammar)]
fn test_lines_are_tracked_on_request(#[case] kind: ParserKind) {
    let file = parse(kind, RECT_H, &ParseOptions::tracking_lines());
    let point = &file.entries["SDL_Point"];
    assert_eq!((point.begin, point.decl, point.end), (Some(16), Some(19), Some(24)));
    assert_eq!(file.doc_begin, Some(1));

    let untracked = parse(kind, RECT_H, &ParseOptions::default());
    assert_eq!(untracked.entries["SDL_Point"].begin, None);
    assert_eq!(untracked.doc_begin, None);
}

#[rstest]
#[case::linebased(ParserKind::Linebased)]
#[case::grammar(ParserKind::Grammar)]
fn test_docs_are_parsed_with_the_configured_lexicon(#[case] kind: ParserKind) {
    let source = "/**\n * @brief Quit.\n */\nvoid SDL_Quit(void);\n";
    let mut options = ParseOptions {
        parse_docs: true,
        ..ParseOptions::default()
    };
    let plain = parse(kind, source, &options);
    let Some(Doc::Parsed(blocks)) = &plain.entries["SDL_Quit"].doc else {
        panic!("expected a parsed doc");
    };
    assert_eq!(serde_json::to_value(blocks).unwrap(), serde_json::json!(["@brief Quit."]));

    options.lexicon.block_tags.push("brief".to_string());
    let tagged = parse(kind, source, &options);
    let Some(Doc::Parsed(blocks)) = &tagged.entries["SDL_Quit"].doc else {
        panic!("expected a parsed doc");
    };
    assert_eq!(
        serde_json::to_value(blocks).unwrap(),
        serde_json::json!([{"tag": "@brief", "content": "Quit."}])
    );
}

#[rstest]
#[case::linebased(ParserKind::Linebased)]
#[case::grammar(ParserKind::Grammar)]
fn test_unterminated_struct_is_fatal(#[case] kind: ParserKind) {
    let result = parse_header(
        "broken.h",
        "struct SDL_Broken {\n    int x;\n",
        kind,
        &ParseOptions::default(),
        &Diagnostics::silent(),
    );
    assert!(matches!(result, Err(Error::Parse { .. })));
}

#[test]
fn test_strategies_agree() {
    for options in [ParseOptions::default(), ParseOptions::tracking_lines()] {
        let linebased = parse(ParserKind::Linebased, RECT_H, &options);
        let grammar = parse(ParserKind::Grammar, RECT_H, &options);
        assert_eq!(linebased, grammar);
    }
}

#[test]
fn test_model_json_round_trips() {
    let file = parse(ParserKind::Linebased, RECT_H, &ParseOptions::tracking_lines());
    let json = serde_json::to_string(&file).unwrap();
    let back: ApiFile = serde_json::from_str(&json).unwrap();
    assert_eq!(back, file);
}
