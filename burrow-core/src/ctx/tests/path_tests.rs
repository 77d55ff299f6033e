use crate::ctx::{PathRejection, normalize_path};
use std::path::PathBuf;

fn assert_normalized(raw: &str, expected: &str) {
    // Act
    let outcome = normalize_path(raw);

    // Assert
    match outcome {
        Ok(path) => assert_eq!(path.display(), expected),
        Err(other) => panic!("Expected Ok, got {:?}", other),
    }
}

fn assert_rejected(raw: &str, reason: PathRejection) {
    // Act
    let outcome = normalize_path(raw);

    // Assert
    match outcome {
        Err(r) => assert_eq!(r, reason),
        Ok(other) => panic!("Expected rejection, got {:?}", other),
    }
}

//-----------------------------------------------------------------------------
// Valid paths
//-----------------------------------------------------------------------------
#[test]
fn root_is_root() {
    let path = normalize_path("/").unwrap();

    assert!(path.is_root());
    assert_eq!(path.display(), "/");
}

#[test]
fn simple_path_is_unchanged() {
    assert_normalized("/foo/bar", "/foo/bar");
}

#[test]
fn trailing_slash_is_preserved() {
    let path = normalize_path("/docs/").unwrap();

    assert!(path.has_trailing_slash());
    assert_eq!(path.display(), "/docs/");
}

#[test]
fn repeated_slashes_collapse() {
    assert_normalized("//a///b", "/a/b");
}

#[test]
fn dot_segments_are_removed() {
    assert_normalized("/a/./b/.", "/a/b");
}

#[test]
fn parent_segments_pop() {
    assert_normalized("/a/b/../c", "/a/c");
}

#[test]
fn percent_encoding_is_decoded_once() {
    assert_normalized("/read%20me.txt", "/read me.txt");
    assert_normalized("/100%2525", "/100%25");
}

#[test]
fn encoded_parent_segment_pops_like_a_plain_one() {
    assert_normalized("/a/%2e%2e/b", "/b");
}

#[test]
fn relative_path_joins_segments() {
    let path = normalize_path("/a/b/c.txt").unwrap();

    assert_eq!(path.relative_path(), PathBuf::from("a").join("b").join("c.txt"));
    assert_eq!(path.last_segment(), Some("c.txt"));
}

#[test]
fn uri_path_re_encodes_segments() {
    let path = normalize_path("/read%20me/").unwrap();

    assert_eq!(path.to_uri_path(), "/read%20me/");
}

#[test]
fn with_trailing_slash_appends_slash() {
    let path = normalize_path("/docs").unwrap().with_trailing_slash();

    assert_eq!(path.to_uri_path(), "/docs/");
}

//-----------------------------------------------------------------------------
// Rejections
//-----------------------------------------------------------------------------
#[test]
fn climbing_above_root_is_traversal() {
    assert_rejected("/../etc/passwd", PathRejection::Traversal);
    assert_rejected("/a/../../etc/passwd", PathRejection::Traversal);
}

#[test]
fn encoded_climb_above_root_is_traversal() {
    assert_rejected("/%2e%2e/secret", PathRejection::Traversal);
    assert_rejected("/%2E%2E/%2E%2E/secret", PathRejection::Traversal);
}

#[test]
fn encoded_separator_is_malformed() {
    assert_rejected("/a%2f..%2f..%2fetc", PathRejection::Malformed);
    assert_rejected("/a%5csecret", PathRejection::Malformed);
}

#[test]
fn nul_byte_is_malformed() {
    assert_rejected("/a%00b", PathRejection::Malformed);
}

#[test]
fn invalid_utf8_is_malformed() {
    assert_rejected("/%ff%fe", PathRejection::Malformed);
}
