use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;
use strictdown_engine::{BoundedSink, Converter, Options, Renderer, convert, to_html};
use strictdown_syntax::tape::DEFAULT_MAX_ENTRIES;
use strictdown_syntax::{Chain, InputWindow, ParseResult};

fn fixture(name: &str, ext: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.{ext}",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn all_fixtures() -> String {
    ["inline", "blocks", "lists", "underlines"]
        .map(|name| fixture(name, "md"))
        .join("\n")
}

/// Converts `input` fed in pieces of `chunk` characters.
fn chunked(input: &str, chunk: usize, options: &Options) -> String {
    let mut converter = Converter::new(options);
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::new();
    for piece in chars.chunks(chunk) {
        converter.feed(&piece.iter().collect::<String>(), &mut out);
    }
    converter.finish(&mut out);
    out
}

#[rstest]
#[case("inline")]
#[case("blocks")]
#[case("lists")]
#[case("underlines")]
fn fixture_converts(#[case] name: &str) {
    let html = to_html(&fixture(name, "md"));
    assert_eq!(html.trim_end(), fixture(name, "html").trim_end());
}

#[test]
fn underlines_leave_other_blocks_alone() {
    assert_snapshot!(to_html(&fixture("underlines", "md")), @r#"
    <pre><code class="language-yaml">---
    key: v
    </code></pre>
    <h1>Title</h1>
    <hr>
    <h1>Real heading</h1>
    "#);
}

#[rstest]
#[case("```yaml\n---\nkey: v\n```\n", "<pre><code class=\"language-yaml\">---\nkey: v\n</code></pre>\n")]
#[case("# Title\n---\n", "<h1>Title</h1>\n<hr>\n")]
#[case("- a\n---\n", "<ul><li>a\n</li></ul><hr>\n")]
#[case("> q\n===\n", "<blockquote><p>q\n</p></blockquote><p>===\n</p>")]
fn underline_after_block_opener(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(to_html(input), expected);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(10)]
#[case(127)]
fn chunk_boundaries_do_not_change_output(#[case] chunk: usize) {
    let input = all_fixtures();
    assert_eq!(chunked(&input, chunk, &Options::default()), to_html(&input));
}

#[test]
fn compacting_between_renders_does_not_change_output() {
    let input = all_fixtures();
    let expected = to_html(&input);

    let mut window = InputWindow::new();
    let mut chain = Chain::new(DEFAULT_MAX_ENTRIES);
    let mut renderer = Renderer::default();
    let mut out = String::new();
    for line in input.split_inclusive('\n') {
        window.push_str(line);
        while chain.parse_next(&mut window) != ParseResult::Void {}
        renderer.render(chain.tape(), &window, &mut out);
        let cutoff = chain.compact(window.position());
        let origin = renderer.compact(chain.tape_mut(), cutoff);
        window.compact(origin);
    }
    window.end_of_input();
    while chain.parse_next(&mut window) != ParseResult::Void {}
    chain.end_block(window.position());
    renderer.render(chain.tape(), &window, &mut out);

    assert_eq!(out, expected);
}

#[rstest]
#[case(BoundedSink::MIN_CAPACITY)]
#[case(33)]
#[case(41)]
#[case(57)]
#[case(1000)]
fn bounded_output_matches_growable(#[case] capacity: usize) {
    let input = all_fixtures();
    let options = Options {
        output_capacity: capacity,
        chunk_size: 7,
        ..Options::default()
    };
    let bytes = convert(input.as_bytes(), Vec::new(), &options).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), to_html(&input));
}

#[test]
fn small_tape_keeps_output_balanced() {
    let input = "- **a *b ~~c __d `e` f__ g~~ h* i** [j](k) ![l](m)\n  1. x\n     > y *z*\n\n";
    for max in [64, 65, 70, 80, 100] {
        let html = chunked(
            input,
            4,
            &Options {
                max_tape_entries: max,
                ..Options::default()
            },
        );
        for tag in ["ul", "li", "ol", "blockquote", "p", "b", "i", "s", "u", "code", "a"] {
            assert_eq!(
                html.matches(&format!("<{tag}>")).count() + html.matches(&format!("<{tag} ")).count(),
                html.matches(&format!("</{tag}>")).count(),
                "unbalanced <{tag}> with ceiling {max}: {html}"
            );
        }
    }
}

#[test]
fn malformed_markup_degrades_to_text() {
    assert_eq!(
        to_html("an [unclosed link and a lone ] bracket\n\n"),
        "<p>an [unclosed link and a lone ] bracket\n</p>"
    );
}
