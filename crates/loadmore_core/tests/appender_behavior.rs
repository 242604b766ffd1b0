use loadmore_core::{
    AppendError, AppenderConfig, ArticleFragment, ButtonClickAppender, DocumentHost,
    MemoryDocument, NodeId, Selector, FRAGMENT_HEADING, FRAGMENT_PARAGRAPH,
};
use pretty_assertions::assert_eq;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>News</title></head>
<body>
  <header><h1>Daily News</h1></header>
  <div class="news-container">
    <article class="tease-card"><h2>Headline 1</h2><p>First story.</p></article>
    <article class="tease-card"><h2>Headline 2</h2><p>Second story.</p></article>
    <article class="tease-card"><h2>Headline 3</h2><p>Third story.</p></article>
  </div>
  <button id="loadMore">Load More</button>
</body>
</html>"#;

fn container_selector() -> Selector {
    Selector::parse(".news-container").unwrap()
}

fn setup() -> (MemoryDocument, ButtonClickAppender) {
    let mut document = MemoryDocument::parse(PAGE);
    let appender = ButtonClickAppender::attach(&mut document, AppenderConfig::default()).unwrap();
    (document, appender)
}

fn container_children(document: &MemoryDocument) -> Vec<NodeId> {
    let container = document.query_selector(&container_selector()).unwrap();
    document.element_children(container)
}

fn click_n(document: &mut MemoryDocument, trigger: NodeId, times: usize) {
    for _ in 0..times {
        assert_eq!(document.click(trigger).unwrap(), 1);
    }
}

#[test]
fn zero_clicks_leave_container_unchanged() {
    let (document, _appender) = setup();
    assert_eq!(container_children(&document).len(), 3);
}

#[test]
fn three_clicks_append_three_identical_articles() {
    let (mut document, appender) = setup();
    click_n(&mut document, appender.trigger(), 3);

    let children = container_children(&document);
    assert_eq!(children.len(), 6);

    let appended = &children[3..];
    for article in appended {
        assert_eq!(document.tag_name(*article), Some("article"));
        assert_eq!(document.class_list(*article), vec!["tease-card"]);
        let parts = document.element_children(*article);
        assert_eq!(parts.len(), 2);
        assert_eq!(document.tag_name(parts[0]), Some("h2"));
        assert_eq!(document.text_content(parts[0]), FRAGMENT_HEADING);
        assert_eq!(document.tag_name(parts[1]), Some("p"));
        assert_eq!(document.text_content(parts[1]), FRAGMENT_PARAGRAPH);
    }

    let first = document.outer_html(appended[0]).unwrap();
    for article in &appended[1..] {
        assert_eq!(document.outer_html(*article).unwrap(), first);
    }
}

#[test]
fn container_grows_by_exactly_one_per_click() {
    let (mut document, appender) = setup();
    for expected in 4..=12 {
        click_n(&mut document, appender.trigger(), 1);
        assert_eq!(container_children(&document).len(), expected);
    }
}

#[test]
fn appended_article_is_last_child_of_container() {
    let (mut document, appender) = setup();
    click_n(&mut document, appender.trigger(), 1);

    let children = container_children(&document);
    let last = *children.last().unwrap();
    assert_eq!(
        document.outer_html(last).unwrap(),
        "<article class=\"tease-card\"><h2>Headline 4: New Discoveries!</h2>\
         <p>Scientists are making new discoveries every day.</p></article>"
    );
}

#[test]
fn missing_container_makes_click_a_silent_no_op() {
    let (mut document, appender) = setup();
    let container = document.query_selector(&container_selector()).unwrap();
    document.remove(container).unwrap();
    let before = document.to_html();

    click_n(&mut document, appender.trigger(), 2);

    assert_eq!(document.to_html(), before);
    assert_eq!(document.element_children(container).len(), 3);
}

#[test]
fn replaced_container_receives_later_fragments() {
    let (mut document, appender) = setup();
    click_n(&mut document, appender.trigger(), 1);

    let old = document.query_selector(&container_selector()).unwrap();
    document.remove(old).unwrap();
    let body = document.body().unwrap();
    let replacement = document.create_element("section").unwrap();
    document.add_class(replacement, "news-container").unwrap();
    document.append_child(body, replacement).unwrap();

    click_n(&mut document, appender.trigger(), 2);

    assert_eq!(document.element_children(old).len(), 4);
    assert_eq!(document.element_children(replacement).len(), 2);
}

#[test]
fn content_outside_container_is_untouched() {
    let (mut document, appender) = setup();
    let header = Selector::parse("header").unwrap();
    let header_node = document.query_selector(&header).unwrap();
    let header_before = document.outer_html(header_node).unwrap();

    click_n(&mut document, appender.trigger(), 5);

    assert_eq!(document.outer_html(header_node).unwrap(), header_before);
    let button = document.get_element_by_id("loadMore").unwrap();
    assert_eq!(document.text_content(button), "Load More");
}

#[test]
fn attach_without_trigger_fails_to_initialize() {
    let mut document = MemoryDocument::parse("<body><div class=\"news-container\"></div></body>");
    let err = ButtonClickAppender::attach(&mut document, AppenderConfig::default()).unwrap_err();
    assert!(matches!(err, AppendError::ElementNotFound { .. }));
    assert_eq!(err.to_string(), "required element not found: #loadMore");
}

#[test]
fn detached_appender_stops_appending() {
    let (mut document, appender) = setup();
    let trigger = appender.trigger();
    click_n(&mut document, trigger, 1);
    appender.detach(&mut document).unwrap();

    assert_eq!(document.click(trigger).unwrap(), 0);
    assert_eq!(container_children(&document).len(), 4);
}

#[test]
fn custom_config_targets_other_elements() {
    let mut document = MemoryDocument::parse(
        "<body><ul id=\"feed\" class=\"feed\"></ul><a id=\"more\">more</a></body>",
    );
    let config = AppenderConfig::new(
        "more",
        "ul.feed",
        ArticleFragment::tease_card("Custom", "Body"),
    )
    .unwrap();
    let appender = ButtonClickAppender::attach(&mut document, config).unwrap();

    click_n(&mut document, appender.trigger(), 2);

    let feed = document.get_element_by_id("feed").unwrap();
    let items = document.element_children(feed);
    assert_eq!(items.len(), 2);
    assert_eq!(document.text_content(items[1]), "CustomBody");
}
