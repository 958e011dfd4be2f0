//! Video reference parsing
//!
//! Only YouTube links are accepted as video content.

use url::Url;

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];
const SHORT_HOST: &str = "youtu.be";

/// Extract the video id from an absolute YouTube URL.
///
/// Accepted shapes: `youtube.com/watch?v=ID`, `youtube.com/embed/ID`,
/// `youtube.com/shorts/ID` (with `www.` or `m.`), and `youtu.be/ID`.
pub fn video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = if host == SHORT_HOST {
        segments.next().map(str::to_string)
    } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed") | Some("shorts") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}

/// Player URL for a video reference; unrecognized URLs come back unchanged
pub fn embed_url(raw: &str) -> String {
    match video_id(raw) {
        Some(id) => format!("https://www.youtube.com/embed/{}", id),
        None => raw.to_string(),
    }
}
