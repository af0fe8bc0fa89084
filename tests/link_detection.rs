use html_link_lsp::{
    collect_links, find_document_links, DocumentContext, LinkSettings, ReferenceError,
    TextDocument, UriResolver,
};
use html_link_lsp::scanner::Scanner;
use rstest::rstest;

fn link_target(base: &str, reference: &str) -> Option<String> {
    let doc = TextDocument::new(base, "html", 0, format!(r#"<a href="{reference}">"#));
    find_document_links(&doc, &UriResolver)
        .into_iter()
        .next()
        .and_then(|link| link.target)
}

fn link_starts(text: &str) -> Vec<u32> {
    let doc = TextDocument::new("test://test/test.html", "html", 0, text);
    find_document_links(&doc, &UriResolver)
        .iter()
        .map(|link| link.range.start.character)
        .collect()
}

#[rstest]
#[case("http://model/1", "javascript:void;", None)]
#[case("http://model/1", " \tjavascript:alert(7);", None)]
#[case("http://model/1", " #relative", None)]
#[case("http://model/1", "file:///C:\\Alex\\src\\path\\to\\file.txt", Some("file:///C:\\Alex\\src\\path\\to\\file.txt"))]
#[case("http://model/1", "http://www.microsoft.com/", Some("http://www.microsoft.com/"))]
#[case("http://model/1", "https://www.microsoft.com/", Some("https://www.microsoft.com/"))]
#[case("http://model/1", "//www.microsoft.com/", Some("http://www.microsoft.com/"))]
#[case("http://model/x/1", "a.js", Some("http://model/x/a.js"))]
#[case("http://model/x/1", "./a2.js", Some("http://model/x/a2.js"))]
#[case("http://model/x/1", "/b.js", Some("http://model/b.js"))]
#[case("http://model/x/y/1", "../../c.js", Some("http://model/c.js"))]
#[case("file:///C:/Alex/src/path/to/file.txt", "javascript:void;", None)]
#[case("file:///C:/Alex/src/path/to/file.txt", " \tjavascript:alert(7);", None)]
#[case("file:///C:/Alex/src/path/to/file.txt", " #relative", None)]
#[case("file:///C:/Alex/src/path/to/file.txt", "file:///C:\\Alex\\src\\path\\to\\file.txt", Some("file:///C:\\Alex\\src\\path\\to\\file.txt"))]
#[case("file:///C:/Alex/src/path/to/file.txt", "http://www.microsoft.com/", Some("http://www.microsoft.com/"))]
#[case("file:///C:/Alex/src/path/to/file.txt", "https://www.microsoft.com/", Some("https://www.microsoft.com/"))]
#[case("file:///C:/Alex/src/path/to/file.txt", "  //www.microsoft.com/", Some("http://www.microsoft.com/"))]
#[case("file:///C:/Alex/src/path/to/file.txt", "a.js", Some("file:///C:/Alex/src/path/to/a.js"))]
#[case("file:///C:/Alex/src/path/to/file.txt", "/a.js", Some("file:///a.js"))]
#[case("https://www.test.com/path/to/file.txt", "file:///C:\\Alex\\src\\path\\to\\file.txt", Some("file:///C:\\Alex\\src\\path\\to\\file.txt"))]
#[case("https://www.test.com/path/to/file.txt", "//www.microsoft.com/", Some("https://www.microsoft.com/"))]
#[case("https://www.test.com/path/to/file.txt", "%", None)]
#[case("file:///c:/Alex/working_dir/18314-link-detection/test.html", "/class/class.js", Some("file:///class/class.js"))]
fn link_creation(#[case] base: &str, #[case] reference: &str, #[case] expected: Option<&str>) {
    assert_eq!(link_target(base, reference).as_deref(), expected);
}

#[rstest]
#[case(r#"<img src="foo.png">"#, vec![10])]
#[case(r#"<a href="http://server/foo.html">"#, vec![9])]
#[case(r#"<img src="">"#, vec![])]
#[case(r#"<LINK HREF="a.html">"#, vec![12])]
#[case("<LINK HREF=\"a.html\n>\n", vec![])]
fn link_detection(#[case] text: &str, #[case] expected: Vec<u32>) {
    assert_eq!(link_starts(text), expected);
}

#[test]
fn invalid_reference_is_reported_without_target() {
    let doc = TextDocument::new("https://www.test.com/path/to/file.txt", "html", 0, r#"<a href="%">"#);
    let links = find_document_links(&doc, &UriResolver);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target, None);
}

#[test]
fn ranges_are_in_bounds_and_ordered() {
    let text = "<a href='a'>\n<img src=\"b\" alt=x>\n<!-- <a href='c'> -->\n<a\n href=d\n>\u{e9}<link href='e'>";
    let doc = TextDocument::new("http://model/", "html", 0, text);
    let links = find_document_links(&doc, &UriResolver);
    assert_eq!(links.len(), 4);

    let end = doc.position_at(text.len());
    let mut previous = None;
    for link in &links {
        assert!(link.range.start <= link.range.end);
        assert!(link.range.end <= end);
        if let Some(prev) = previous {
            assert!(prev <= link.range.start);
        }
        previous = Some(link.range.start);
    }
}

#[test]
fn caller_supplied_context() {
    struct Prefix(&'static str);

    impl DocumentContext for Prefix {
        fn resolve_reference(&self, reference: &str, _base: &str) -> Result<String, ReferenceError> {
            Ok(format!("{}{reference}", self.0))
        }
    }

    let doc = TextDocument::new("", "html", 0, r#"<a href="x.html"><a href="">"#);
    let links = collect_links(
        &doc,
        Scanner::new(doc.text()),
        &Prefix("mem:/"),
        &LinkSettings::default(),
    );
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target.as_deref(), Some("mem:/x.html"));
}
