use super::test_helpers::{body_bytes, config, header, mtime, set_mtime, write};
use crate::static_files::render::render_file;
use crate::static_files::{ConditionalHeaders, StaticBody};
use http::{StatusCode, header};
use pretty_assertions::assert_eq;
use std::io::Read;
use tempfile::tempdir;

const HELLO: &[u8] = b"hello, burrow!\n";

fn range(value: &str) -> ConditionalHeaders {
    ConditionalHeaders {
        range: Some(value.to_string()),
        ..ConditionalHeaders::default()
    }
}

#[tokio::test]
async fn full_response_carries_validators_and_cache_headers() {
    // Arrange
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "hello.txt", HELLO);

    // Act
    let resp = render_file(&path, &ConditionalHeaders::default(), &cfg)
        .await
        .unwrap();

    // Assert
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(header(&resp, header::CONTENT_LENGTH), Some("15"));
    assert_eq!(
        header(&resp, header::CONTENT_TYPE),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(header(&resp, header::ACCEPT_RANGES), Some("bytes"));
    assert_eq!(header(&resp, header::CACHE_CONTROL), Some("max-age=3600"));
    assert!(header(&resp, header::ETAG).unwrap().starts_with("W/\""));
    assert!(header(&resp, header::LAST_MODIFIED).is_some());
    assert!(header(&resp, header::VARY).is_none());
    assert_eq!(body_bytes(resp).as_ref(), HELLO);
}

#[tokio::test]
async fn negative_cache_disables_caching() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| o.cache = -1);
    let path = write(&cfg.root, "hello.txt", HELLO);

    let resp = render_file(&path, &ConditionalHeaders::default(), &cfg)
        .await
        .unwrap();

    assert_eq!(
        header(&resp, header::CACHE_CONTROL),
        Some("no-cache, no-store, must-revalidate")
    );
}

#[tokio::test]
async fn unknown_extension_uses_default_content_type() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "blob.zzqx", b"\x00\x01");

    let resp = render_file(&path, &ConditionalHeaders::default(), &cfg)
        .await
        .unwrap();

    assert_eq!(
        header(&resp, header::CONTENT_TYPE),
        Some("application/octet-stream")
    );
}

#[tokio::test]
async fn repeated_requests_are_identical() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "hello.txt", HELLO);

    let first = render_file(&path, &ConditionalHeaders::default(), &cfg)
        .await
        .unwrap();
    let second = render_file(&path, &ConditionalHeaders::default(), &cfg)
        .await
        .unwrap();

    assert_eq!(
        header(&first, header::ETAG).map(str::to_string),
        header(&second, header::ETAG).map(str::to_string)
    );
    assert_eq!(body_bytes(first), body_bytes(second));
}

//-----------------------------------------------------------------------------
// Conditional requests
//-----------------------------------------------------------------------------
#[tokio::test]
async fn matching_etag_yields_not_modified() {
    // Arrange
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "hello.txt", HELLO);
    let first = render_file(&path, &ConditionalHeaders::default(), &cfg)
        .await
        .unwrap();
    let etag = header(&first, header::ETAG).unwrap().to_string();

    // Act
    let conditional = ConditionalHeaders {
        if_none_match: Some(etag.clone()),
        ..ConditionalHeaders::default()
    };
    let resp = render_file(&path, &conditional, &cfg).await.unwrap();

    // Assert
    assert_eq!(resp.status, StatusCode::NOT_MODIFIED);
    assert_eq!(header(&resp, header::ETAG), Some(etag.as_str()));
    assert!(header(&resp, header::CONTENT_LENGTH).is_none());
    assert!(matches!(resp.body, StaticBody::Empty));
}

#[tokio::test]
async fn fresh_if_modified_since_yields_not_modified() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "hello.txt", HELLO);
    let conditional = ConditionalHeaders {
        if_modified_since: Some(httpdate::fmt_http_date(mtime(&path))),
        ..ConditionalHeaders::default()
    };

    let resp = render_file(&path, &conditional, &cfg).await.unwrap();

    assert_eq!(resp.status, StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn stale_etag_yields_full_body() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "hello.txt", HELLO);
    let conditional = ConditionalHeaders {
        if_none_match: Some("W/\"0-0\"".to_string()),
        ..ConditionalHeaders::default()
    };

    let resp = render_file(&path, &conditional, &cfg).await.unwrap();

    assert_eq!(resp.status, StatusCode::OK);
}

//-----------------------------------------------------------------------------
// Ranges
//-----------------------------------------------------------------------------
#[tokio::test]
async fn prefix_range_yields_partial_content() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "hello.txt", HELLO);

    let resp = render_file(&path, &range("bytes=0-4"), &cfg).await.unwrap();

    assert_eq!(resp.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&resp, header::CONTENT_LENGTH), Some("5"));
    assert_eq!(header(&resp, header::CONTENT_RANGE), Some("bytes 0-4/15"));
    assert_eq!(body_bytes(resp).as_ref(), b"hello");
}

#[tokio::test]
async fn suffix_range_yields_tail() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "hello.txt", HELLO);

    let resp = render_file(&path, &range("bytes=-8"), &cfg).await.unwrap();

    assert_eq!(resp.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&resp, header::CONTENT_RANGE), Some("bytes 7-14/15"));
    assert_eq!(body_bytes(resp).as_ref(), b"burrow!\n");
}

#[tokio::test]
async fn range_beyond_size_is_not_satisfiable() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = write(&cfg.root, "hello.txt", HELLO);

    let resp = render_file(&path, &range("bytes=15-"), &cfg).await.unwrap();

    assert_eq!(resp.status, StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header(&resp, header::CONTENT_RANGE), Some("bytes */15"));
    assert!(matches!(resp.body, StaticBody::Empty));
}

#[tokio::test]
async fn large_file_range_is_streamed() {
    // Arrange
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let data = vec![b'x'; 300 * 1024];
    let path = write(&cfg.root, "video.bin", &data);

    // Act
    let full = render_file(&path, &ConditionalHeaders::default(), &cfg)
        .await
        .unwrap();
    let partial = render_file(&path, &range("bytes=1000-1999"), &cfg)
        .await
        .unwrap();

    // Assert
    assert!(matches!(
        full.body,
        StaticBody::RangedFile { remaining, .. } if remaining == 300 * 1024
    ));
    assert_eq!(partial.status, StatusCode::PARTIAL_CONTENT);
    assert!(matches!(
        partial.body,
        StaticBody::RangedFile { remaining: 1000, .. }
    ));
}

//-----------------------------------------------------------------------------
// Encodings
//-----------------------------------------------------------------------------
#[tokio::test]
async fn fresh_gzip_sibling_is_served() {
    // Arrange
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| o.gzip = true);
    let source = write(&cfg.root, "app.js", b"console.log('hello');");
    let sibling = write(&cfg.root, "app.js.gz", b"pretend-gzip");
    set_mtime(&sibling, mtime(&source), 10);
    let conditional = ConditionalHeaders {
        accept_encoding: Some("gzip, deflate".to_string()),
        ..ConditionalHeaders::default()
    };

    // Act
    let resp = render_file(&source, &conditional, &cfg).await.unwrap();

    // Assert
    assert_eq!(header(&resp, header::CONTENT_ENCODING), Some("gzip"));
    assert_eq!(header(&resp, header::VARY), Some("Accept-Encoding"));
    assert_eq!(header(&resp, header::CONTENT_LENGTH), Some("12"));
    assert_eq!(body_bytes(resp).as_ref(), b"pretend-gzip");
}

#[tokio::test]
async fn sibling_is_ignored_when_gzip_is_disabled() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let source = write(&cfg.root, "app.js", b"console.log('hello');");
    let sibling = write(&cfg.root, "app.js.gz", b"pretend-gzip");
    set_mtime(&sibling, mtime(&source), 10);
    let conditional = ConditionalHeaders {
        accept_encoding: Some("gzip".to_string()),
        ..ConditionalHeaders::default()
    };

    let resp = render_file(&source, &conditional, &cfg).await.unwrap();

    assert!(header(&resp, header::CONTENT_ENCODING).is_none());
    assert_eq!(body_bytes(resp).as_ref(), b"console.log('hello');");
}

#[tokio::test]
async fn on_the_fly_gzip_round_trips() {
    // Arrange
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| {
        o.gzip = true;
        o.compress = true;
    });
    let text = "The quick brown fox jumps over the lazy dog.\n".repeat(100);
    let path = write(&cfg.root, "fox.txt", text.as_bytes());
    let conditional = ConditionalHeaders {
        accept_encoding: Some("gzip".to_string()),
        ..ConditionalHeaders::default()
    };

    // Act
    let resp = render_file(&path, &conditional, &cfg).await.unwrap();

    // Assert
    assert_eq!(header(&resp, header::CONTENT_ENCODING), Some("gzip"));
    let compressed = body_bytes(resp);
    let mut decoded = String::new();
    flate2::read::GzDecoder::new(compressed.as_ref())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, text);
}

#[tokio::test]
async fn range_applies_to_chosen_representation() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| o.gzip = true);
    let source = write(&cfg.root, "app.js", b"console.log('hello');");
    let sibling = write(&cfg.root, "app.js.gz", b"pretend-gzip");
    set_mtime(&sibling, mtime(&source), 10);
    let conditional = ConditionalHeaders {
        accept_encoding: Some("gzip".to_string()),
        range: Some("bytes=0-6".to_string()),
        ..ConditionalHeaders::default()
    };

    let resp = render_file(&source, &conditional, &cfg).await.unwrap();

    assert_eq!(header(&resp, header::CONTENT_RANGE), Some("bytes 0-6/12"));
    assert_eq!(body_bytes(resp).as_ref(), b"pretend");
}
