use integration_tests::harness::TestServer;
use integration_tests::harness::fixtures::{A_TXT, APP_JS, BIG_FILE_LEN, INDEX_HTML, big_body, gzip};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use reqwest::header::{
    ACCEPT_ENCODING, ACCEPT_RANGES, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
    ETAG, IF_NONE_MATCH, LOCATION, RANGE, VARY,
};

#[test]
fn serves_index_html_for_root() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv.get("/").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(
        content_type.starts_with("text/html"),
        "unexpected content type: {content_type}"
    );
    assert_eq!(res.text().unwrap(), INDEX_HTML);
}

#[test]
fn serves_file_with_validators_and_accept_ranges() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv.get("/docs/a.txt").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(ETAG));
    assert!(res.headers().contains_key("last-modified"));
    assert_eq!(res.headers()[ACCEPT_RANGES], "bytes");
    assert_eq!(
        res.headers()[CONTENT_LENGTH].to_str().unwrap(),
        A_TXT.len().to_string()
    );
    assert_eq!(res.text().unwrap(), A_TXT);
}

#[test]
fn consecutive_gets_return_identical_tags_and_bodies() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let first = srv.get("/docs/a.txt").send().unwrap();
    let first_tag = first.headers()[ETAG].clone();
    let first_body = first.bytes().unwrap();

    let second = srv.get("/docs/a.txt").send().unwrap();
    let second_tag = second.headers()[ETAG].clone();
    let second_body = second.bytes().unwrap();

    // Assert
    assert_eq!(first_tag, second_tag);
    assert_eq!(first_body, second_body);
}

#[test]
fn matching_if_none_match_yields_304_with_empty_body() {
    // Arrange
    let srv = TestServer::start_default();
    let tag = srv.get("/docs/a.txt").send().unwrap().headers()[ETAG].clone();

    // Act
    let res = srv
        .get("/docs/a.txt")
        .header(IF_NONE_MATCH, tag.clone())
        .send()
        .unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(res.headers()[ETAG], tag);
    assert!(res.bytes().unwrap().is_empty());
}

#[test]
fn stale_if_none_match_serves_full_body() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv
        .get("/docs/a.txt")
        .header(IF_NONE_MATCH, "\"not-the-tag\"")
        .send()
        .unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().unwrap(), A_TXT);
}

#[test]
fn prefix_range_yields_206() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv
        .get("/docs/a.txt")
        .header(RANGE, "bytes=0-4")
        .send()
        .unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(res.headers()[CONTENT_LENGTH], "5");
    assert_eq!(
        res.headers()[CONTENT_RANGE].to_str().unwrap(),
        format!("bytes 0-4/{}", A_TXT.len())
    );
    assert_eq!(res.text().unwrap(), "alpha");
}

#[test]
fn range_beyond_size_yields_416() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv
        .get("/docs/a.txt")
        .header(RANGE, format!("bytes={}-", A_TXT.len()))
        .send()
        .unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(
        res.headers()[CONTENT_RANGE].to_str().unwrap(),
        format!("bytes */{}", A_TXT.len())
    );
    assert!(res.bytes().unwrap().is_empty());
}

#[test]
fn large_file_streams_in_full() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv.get("/big.bin").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[CONTENT_LENGTH].to_str().unwrap(),
        BIG_FILE_LEN.to_string()
    );
    let body = res.bytes().unwrap();
    assert!(body.as_ref() == big_body().as_slice(), "large body differs");
}

#[test]
fn large_file_range_streams_the_window() {
    // Arrange
    let srv = TestServer::start_default();
    let start = 100_000;
    let end = 200_000;

    // Act
    let res = srv
        .get("/big.bin")
        .header(RANGE, format!("bytes={start}-{end}"))
        .send()
        .unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        res.headers()[CONTENT_RANGE].to_str().unwrap(),
        format!("bytes {start}-{end}/{BIG_FILE_LEN}")
    );
    let body = res.bytes().unwrap();
    assert!(
        body.as_ref() == &big_body()[start..=end],
        "range body differs"
    );
}

#[test]
fn head_sends_headers_without_body() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv.head("/docs/a.txt").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[CONTENT_LENGTH].to_str().unwrap(),
        A_TXT.len().to_string()
    );
    assert!(res.bytes().unwrap().is_empty());
}

#[test]
fn directory_without_slash_redirects() {
    // Arrange
    let srv = TestServer::start(|opts| opts.auto_index = false);

    // Act
    let res = srv.get("/docs?sort=name").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[LOCATION], "/docs/?sort=name");
}

#[test]
fn listing_contains_files_and_hides_dotfiles() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv.get("/docs/").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().unwrap();
    assert!(body.contains("a.txt"), "listing misses a.txt: {body}");
    assert!(!body.contains(".hidden"), "listing leaks .hidden: {body}");
}

#[test]
fn listing_disabled_yields_404() {
    // Arrange
    let srv = TestServer::start(|opts| opts.show_dir = false);

    // Act
    let res = srv.get("/docs/").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn missing_file_yields_404_without_proxy() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv.get("/nope.txt").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn file_with_trailing_slash_yields_404() {
    // Arrange
    let srv = TestServer::start_default();

    // Act
    let res = srv.get("/docs/a.txt/").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn default_extension_resolves_extensionless_paths() {
    // Arrange
    let srv = TestServer::start(|opts| opts.ext = Some("txt".to_string()));

    // Act
    let res = srv.get("/docs/a").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().unwrap(), A_TXT);
}

#[test]
fn gzip_sibling_is_served_when_accepted() {
    // Arrange
    let srv = TestServer::start(|opts| opts.gzip = true);

    // Act
    let res = srv
        .get("/app.js")
        .header(ACCEPT_ENCODING, "gzip, deflate")
        .send()
        .unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_ENCODING], "gzip");
    assert_eq!(res.headers()[VARY], "Accept-Encoding");
    let body = res.bytes().unwrap();
    assert_eq!(body.as_ref(), gzip(APP_JS.as_bytes()).as_slice());
}

#[test]
fn identity_is_served_when_gzip_not_accepted() {
    // Arrange
    let srv = TestServer::start(|opts| opts.gzip = true);

    // Act
    let res = srv.get("/app.js").send().unwrap();

    // Assert
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.headers().contains_key(CONTENT_ENCODING));
    assert_eq!(res.text().unwrap(), APP_JS);
}

#[test]
fn cache_header_follows_configured_max_age() {
    // Arrange
    let srv = TestServer::start(|opts| opts.cache = 60);

    // Act
    let res = srv.get("/docs/a.txt").send().unwrap();

    // Assert
    assert_eq!(res.headers()["cache-control"], "max-age=60");
}

#[test]
fn negative_cache_disables_caching() {
    // Arrange
    let srv = TestServer::start(|opts| opts.cache = -1);

    // Act
    let res = srv.get("/docs/a.txt").send().unwrap();

    // Assert
    assert_eq!(res.headers()["cache-control"], "no-cache, no-store, must-revalidate");
}
