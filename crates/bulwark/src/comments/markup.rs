//! Comment form markup with the challenge widget.
//!
//! Only the site key ever reaches this module. It is stored by an admin,
//! so it is escaped like any other untrusted value.

use bulwark_common::CaptchaProvider;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_widget(provider: CaptchaProvider, site_key: &str) -> String {
    format!(
        concat!(
            "<script src=\"{script}\" async defer></script>\n",
            "<div class=\"{class}\" data-sitekey=\"{key}\"></div>\n",
        ),
        script = provider.script_url(),
        class = provider.widget_class(),
        key = escape_html(site_key),
    )
}

/// Render the comment form posting to `action`.
///
/// Without a site key the widget is left out; submissions from such a form
/// carry no token and the gate turns them away.
pub fn render_comment_form(provider: CaptchaProvider, site_key: Option<&str>, action: &str) -> String {
    let widget = site_key
        .filter(|key| !key.trim().is_empty())
        .map(|key| render_widget(provider, key))
        .unwrap_or_default();

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head><meta charset=\"utf-8\"><title>Leave a comment</title></head>\n",
            "<body>\n",
            "<form method=\"post\" action=\"{action}\">\n",
            "<p><label for=\"author\">Name</label>\n",
            "<input id=\"author\" name=\"author\" type=\"text\" required></p>\n",
            "<p><label for=\"content\">Comment</label>\n",
            "<textarea id=\"content\" name=\"content\" rows=\"8\" required></textarea></p>\n",
            "{widget}",
            "<p><button type=\"submit\">Post Comment</button></p>\n",
            "</form>\n",
            "</body>\n",
            "</html>\n",
        ),
        action = escape_html(action),
        widget = widget,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("10000000-ffff"), "10000000-ffff");
    }

    #[test]
    fn form_embeds_escaped_site_key() {
        let html = render_comment_form(
            CaptchaProvider::HCaptcha,
            Some(r#""><script>alert(1)</script>"#),
            "/comments",
        );

        assert!(html.contains("class=\"h-captcha\""));
        assert!(html.contains("https://js.hcaptcha.com/1/api.js"));
        assert!(html.contains("data-sitekey=\"&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;\""));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn form_uses_provider_widget() {
        let html = render_comment_form(CaptchaProvider::Turnstile, Some("0x4AAA"), "/comments");
        assert!(html.contains("class=\"cf-turnstile\" data-sitekey=\"0x4AAA\""));
    }

    #[test]
    fn form_without_site_key_has_no_widget() {
        let html = render_comment_form(CaptchaProvider::ReCaptcha, None, "/comments");
        assert!(!html.contains("g-recaptcha"));
        assert!(!html.contains("data-sitekey"));
        assert!(html.contains("name=\"content\""));
    }
}
