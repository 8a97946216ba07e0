// Rewrites root-relative media paths returned by the backend into absolute URLs

use chrono::{DateTime, Utc};
use serde_json::Value;

const MEDIA_PREFIX: &str = "/media/";

#[derive(Debug, Clone)]
pub struct MediaResolver {
    media_base_url: String,
}

impl MediaResolver {
    pub fn new(media_base_url: &str) -> Self {
        Self {
            media_base_url: media_base_url.trim_end_matches('/').to_string(),
        }
    }

    // Empty stays empty, absolute URLs pass through, everything else is joined
    // onto the media base with any leading `/` and `media/` stripped
    pub fn image_url(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if path.starts_with("http") {
            return path.to_string();
        }
        let clean = path.strip_prefix('/').unwrap_or(path);
        let clean = clean.strip_prefix("media/").unwrap_or(clean);
        format!("{}/{}", self.media_base_url, clean)
    }

    // Same as `image_url` with a `?t=<millis>` suffix so freshly uploaded
    // images are not served from a browser or CDN cache
    pub fn image_url_busted(&self, path: &str, now: DateTime<Utc>) -> String {
        let url = self.image_url(path);
        if url.is_empty() {
            return url;
        }
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{}{}t={}", url, separator, now.timestamp_millis())
    }

    // Walks a response body and rewrites every `/media/...` string in place.
    // Returns how many values were rewritten.
    pub fn rewrite(&self, value: &mut Value) -> usize {
        match value {
            Value::String(s) if s.starts_with(MEDIA_PREFIX) => {
                *s = self.image_url(s);
                1
            }
            Value::Array(items) => items.iter_mut().map(|v| self.rewrite(v)).sum(),
            Value::Object(map) => map.values_mut().map(|v| self.rewrite(v)).sum(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("", "" ; "empty")]
    #[test_case("/media/hotel_images/a.jpg", "http://localhost:8000/hotel_images/a.jpg" ; "root relative")]
    #[test_case("media/room_images/b.png", "http://localhost:8000/room_images/b.png" ; "media prefix")]
    #[test_case("profile_pictures/c.jpg", "http://localhost:8000/profile_pictures/c.jpg" ; "bare path")]
    #[test_case("https://tripffer.s3.eu-north-1.amazonaws.com/x.jpg", "https://tripffer.s3.eu-north-1.amazonaws.com/x.jpg" ; "absolute")]
    fn test_image_url(path: &str, expected: &str) {
        let resolver = MediaResolver::new("http://localhost:8000/");
        assert_eq!(resolver.image_url(path), expected);
    }

    #[test]
    fn test_cache_busting_suffix() {
        let resolver = MediaResolver::new("http://localhost:8000");
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            resolver.image_url_busted("/media/a.jpg", now),
            format!("http://localhost:8000/a.jpg?t={}", now.timestamp_millis())
        );
        assert_eq!(resolver.image_url_busted("", now), "");
    }

    #[test]
    fn test_rewrite_nested_payload() {
        let resolver = MediaResolver::new("https://cdn.example.com");
        let mut body = json!({
            "name": "Seaside Inn",
            "address": "1 Beach Road",
            "images": [{"id": 1, "image": "/media/hotel_images/a.jpg"}],
            "rooms": [{"images": [{"id": 2, "image": "/media/room_images/b.jpg"}]}],
            "website": "https://seaside.example.com",
            "photo_url": null
        });

        let rewritten = resolver.rewrite(&mut body);

        assert_eq!(rewritten, 2);
        assert_eq!(body["images"][0]["image"], "https://cdn.example.com/hotel_images/a.jpg");
        assert_eq!(
            body["rooms"][0]["images"][0]["image"],
            "https://cdn.example.com/room_images/b.jpg"
        );
        assert_eq!(body["website"], "https://seaside.example.com");
    }
}
