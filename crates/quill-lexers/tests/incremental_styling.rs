//! End-to-end tests of the incremental styling engine through the
//! registry: full-restyle equivalence under random edits, lazy styling via
//! the watermark, fold reconvergence, and the completion flow.

use quill_core::{Document, fold_level_number};
use quill_lexers::{completion, registry, wasm};
use rand::Rng;

const WASM_KEYWORDS: &[&str] = &[
    "data export func global import local memory module param result table type",
    "externref f32 f64 funcref i32 i64 v128",
    "call call_indirect drop f32.add f64.mul i32.add i32.const i32.eq i32.sub \
     i64.add i64.const local.get local.set local.tee memory.grow nop return unreachable",
];

fn wasm_document(text: &str) -> Document {
    let module = registry::find("wasm").unwrap();
    let mut doc = Document::new(text);
    doc.set_styler(Some(module.instantiate(WASM_KEYWORDS)));
    doc
}

fn full_restyle_snapshot(text: &str) -> (Vec<(usize, usize, u8)>, Vec<i32>, Vec<i32>) {
    let mut doc = wasm_document(text);
    doc.ensure_styled_to(doc.len());
    snapshot(&doc)
}

fn snapshot(doc: &Document) -> (Vec<(usize, usize, u8)>, Vec<i32>, Vec<i32>) {
    (
        doc.style_runs().collect(),
        (0..doc.line_count()).map(|l| doc.line_state(l)).collect(),
        (0..doc.line_count()).map(|l| doc.fold_level(l)).collect(),
    )
}

const SAMPLE: &str = "\
;; sample module\n\
(module\n\
  (memory (export \"mem\") 1)\n\
  (; shared state (; nested note ;) ;)\n\
  (func $add (param i32 i32) (result i32)\n\
    local.get 0\n\
    local.get 1\n\
    i32.add\n\
  )\n\
)\n";

#[test]
fn incremental_editing_matches_full_restyle() {
    let mut rng = rand::thread_rng();
    let snippets: &[&str] = &[
        "(; c ;)",
        ";; note\n",
        "\"str\"",
        "i32.const 7 ",
        "(func)",
        "\n",
        "x",
        "(; open ",
        ";) ",
    ];

    for _ in 0..30 {
        let mut doc = wasm_document(SAMPLE);
        doc.ensure_styled_to(doc.len());

        // A handful of random edits, restyling after each.
        for _ in 0..8 {
            if rng.gen_range(0..4) > 0 || doc.len() < 4 {
                let snippet = snippets[rng.gen_range(0..snippets.len())];
                let pos = rng.gen_range(0..=doc.len());
                doc.insert_string(pos, snippet).unwrap();
            } else {
                let pos = rng.gen_range(0..doc.len() - 2);
                let len = rng.gen_range(1..=(doc.len() - pos).min(5));
                doc.delete_chars(pos, len).unwrap();
            }
            doc.ensure_styled_to(doc.len());

            // The incrementally-maintained state must equal a from-scratch
            // restyle of the same text.
            let text = doc.text();
            assert_eq!(snapshot(&doc), full_restyle_snapshot(&text), "text: {:?}", text);
        }
    }
}

#[test]
fn watermark_defers_styling_to_requests() {
    let mut doc = wasm_document(SAMPLE);
    assert_eq!(doc.end_styled(), 0);

    // Style only the first two lines.
    let line2 = doc.line_start(2);
    doc.ensure_styled_to(line2);
    assert!(doc.end_styled() >= line2);
    assert!(doc.end_styled() < doc.len());

    // Bytes beyond the watermark have not been touched yet.
    doc.ensure_styled_to(doc.len());
    assert_eq!(doc.end_styled(), doc.len());
    assert_eq!(doc.style_at(0), wasm::STYLE_COMMENT_LINE);
}

#[test]
fn edit_far_from_start_restyles_only_a_suffix() {
    use std::sync::{Arc, Mutex};

    let restyles = Arc::new(Mutex::new(Vec::new()));
    let sink = restyles.clone();
    let mut doc = wasm_document(SAMPLE);
    doc.add_listener(Box::new(move |ev| {
        if let quill_core::ModifyEvent::Restyled { start, end } = ev {
            sink.lock().unwrap().push((*start, *end));
        }
    }));
    doc.ensure_styled_to(doc.len());

    // Edit inside the function body (line 5).
    let pos = doc.line_start(5) + 4;
    doc.insert_string(pos, "nop ").unwrap();
    doc.ensure_styled_to(doc.len());

    let restyles = restyles.lock().unwrap();
    let (start, _) = *restyles.last().unwrap();
    // The restyle began at the edited line, not at the top of the file.
    assert_eq!(start, doc.line_start(5));
}

#[test]
fn closing_a_comment_ripples_to_end_of_document() {
    let mut doc = wasm_document("(; swallow\n(func $a)\n(func $b)\n");
    doc.ensure_styled_to(doc.len());
    for line in 0..3 {
        assert_eq!(doc.line_state(line) >> 1, 1, "line {} inside comment", line);
    }

    // Close the comment on line 0; every following line must reconverge.
    let eol0 = doc.line_start(1) - 1;
    doc.insert_string(eol0, " ;)").unwrap();
    doc.ensure_styled_to(doc.len());
    for line in 0..3 {
        assert_eq!(doc.line_state(line) >> 1, 0, "line {} reconverged", line);
    }
    let f = doc.line_start(1) + 1;
    assert_eq!(doc.style_at(f), wasm::STYLE_KEYWORD);
}

#[test]
fn brace_insertion_updates_following_fold_levels() {
    let mut doc = wasm_document("(module\n(func)\n(func)\n)\n");
    doc.ensure_styled_to(doc.len());
    let base = fold_level_number(doc.fold_level(1));

    // Open a new group on line 1: lines after it sit one level deeper.
    let pos = doc.line_start(1);
    doc.insert_string(pos, "(\n").unwrap();
    doc.ensure_styled_to(doc.len());
    assert_eq!(fold_level_number(doc.fold_level(2)), base + 1);
    assert_eq!(fold_level_number(doc.fold_level(3)), base + 1);
}

#[test]
fn unknown_language_falls_back_to_plain() {
    let module = registry::find_or_plain("not-a-language");
    assert_eq!(module.language, registry::PLAIN_LANGUAGE);

    let mut doc = Document::new("(module)\n");
    doc.set_styler(Some(module.instantiate(&[])));
    doc.ensure_styled_to(doc.len());
    let runs: Vec<_> = doc.style_runs().collect();
    assert_eq!(runs, vec![(0, doc.len(), 0)]);
}

#[test]
fn completion_flow_over_wasm_keywords() {
    let module = registry::find("wasm").unwrap();
    let lists = module.build_word_lists(WASM_KEYWORDS);

    let hits = completion::candidates(&lists, module.word_lists, "mem", false);
    assert_eq!(hits, vec!["memory", "memory.grow"]);

    let hits = completion::candidates(&lists, module.word_lists, "memory.", false);
    assert_eq!(hits, vec!["memory.grow"]);
    let sole = completion::sole_candidate(&hits, "memory.", false).unwrap();

    let mut doc = wasm_document("(memory.)");
    let caret = 8;
    let new_caret = completion::apply_completion(&mut doc, caret, 7, &sole).unwrap();
    assert_eq!(doc.text(), "(memory.grow)");
    assert_eq!(new_caret, 12);
    // One undo reverts the completion as a unit.
    doc.undo().unwrap();
    assert_eq!(doc.text(), "(memory.)");
}

#[test]
fn graphviz_and_wasm_coexist_in_registry() {
    let dot = registry::find("dot").unwrap();
    let mut doc = Document::new("digraph g { a -> b; }\n");
    doc.set_styler(Some(doc_styler(dot)));
    doc.ensure_styled_to(doc.len());
    assert_eq!(
        doc.style_at(0),
        quill_lexers::graphviz::STYLE_KEYWORD,
        "dot keywords style through the registry"
    );
}

fn doc_styler(module: &quill_lexers::LexerModule) -> Box<dyn quill_core::Styler> {
    module.instantiate(&["digraph edge graph node strict subgraph"])
}
