use crate::ctx::RequestPath;

pub const ROBOTS_BODY: &str = "User-agent: *\nDisallow: /\n";

pub fn is_robots_request(path: &RequestPath) -> bool {
    path.segments().len() == 1 && path.last_segment() == Some("robots.txt")
}
