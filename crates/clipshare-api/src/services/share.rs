//! Share page rendering
//!
//! Produces a static HTML document whose OpenGraph and Twitter card tags let
//! chat clients unfurl a playable preview, with an inline `<video>` element
//! for anyone who opens the link in a browser.

use clipshare_core::constants::content_type_for_extension;
use clipshare_core::validation::file_extension;

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the public share page for one video.
///
/// `video_url` must be the absolute raw-stream URL; relative URLs break
/// OpenGraph scrapers.
pub fn render_share_page(filename: &str, video_url: &str) -> String {
    let title = escape_html(filename);
    let url = escape_html(video_url);
    let mime = content_type_for_extension(&file_extension(filename).unwrap_or_default());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta property="og:type" content="video.other">
<meta property="og:title" content="{title}">
<meta property="og:description" content="Shared video clip">
<meta property="og:video" content="{url}">
<meta property="og:video:secure_url" content="{url}">
<meta property="og:video:type" content="{mime}">
<meta property="og:video:width" content="1280">
<meta property="og:video:height" content="720">
<meta name="twitter:card" content="player">
<meta name="twitter:title" content="{title}">
<meta name="twitter:player:stream" content="{url}">
<meta name="twitter:player:width" content="1280">
<meta name="twitter:player:height" content="720">
<style>
body {{ margin: 0; background: #111; color: #eee; font-family: sans-serif; display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; }}
video {{ max-width: 90vw; max-height: 80vh; }}
h1 {{ font-size: 1rem; font-weight: normal; color: #aaa; }}
</style>
</head>
<body>
<video controls autoplay muted playsinline src="{url}"></video>
<h1>{title}</h1>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_carries_opengraph_video_tags() {
        let page = render_share_page(
            "2026-08-25T14-03-07.412Z.mp4",
            "https://clips.example/uploads/alice_example_com/2026-08-25T14-03-07.412Z.mp4",
        );
        assert!(page.contains(r#"property="og:video""#));
        assert!(page.contains(
            "https://clips.example/uploads/alice_example_com/2026-08-25T14-03-07.412Z.mp4"
        ));
        assert!(page.contains(r#"content="video/mp4""#));
        assert!(page.contains("<video"));
    }

    #[test]
    fn test_filename_is_escaped() {
        let page = render_share_page("<script>.mp4", "https://clips.example/v.mp4");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unknown_extension_falls_back_to_octet_stream() {
        let page = render_share_page("clip.xyz", "https://clips.example/clip.xyz");
        assert!(page.contains("application/octet-stream"));
    }
}
