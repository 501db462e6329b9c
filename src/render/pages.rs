//! Page templates
//!
//! Plain `format!` templates. Dynamic values are escaped at the call sites in
//! this file and nowhere else; the style blocks are static.

use super::escape::escape_html;
use crate::profile::{Account, Button};

/// Example shown on the `/linktree` prompt page
pub const PROMPT_EXAMPLE: &str = "/linktree?BIS=1";

const BASE_STYLE: &str = r"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
            background: #f5f5f7;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            padding: 20px;
        }
        .message-container {
            text-align: center;
            background: white;
            padding: 40px;
            border-radius: 12px;
            box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1);
            max-width: 500px;
        }
        h1 { color: #dc3545; margin-bottom: 16px; }
        p { color: #86868b; margin-bottom: 24px; }
        code { background: #eef; padding: 2px 6px; border-radius: 4px; }
        a { color: #667eea; text-decoration: none; }
        a:hover { text-decoration: underline; }
";

const LANDING_STYLE: &str = r"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }
        .container {
            background: white;
            border-radius: 24px;
            padding: 60px 40px;
            max-width: 600px;
            width: 100%;
            text-align: center;
            box-shadow: 0 20px 60px rgba(0, 0, 0, 0.3);
        }
        .logo {
            font-size: 64px;
            font-weight: 700;
            color: #667eea;
            margin-bottom: 24px;
        }
        h1 { font-size: 24px; color: #1d1d1f; margin-bottom: 16px; }
        p { font-size: 16px; color: #86868b; margin-bottom: 40px; }
        .search-input {
            width: 100%;
            padding: 16px;
            border: 2px solid #e5e5e7;
            border-radius: 12px;
            font-size: 16px;
            margin-bottom: 12px;
        }
        .search-input:focus { outline: none; border-color: #667eea; }
        .search-btn {
            width: 100%;
            padding: 16px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            border: none;
            border-radius: 12px;
            font-size: 16px;
            cursor: pointer;
        }
";

const PROFILE_STYLE: &str = r"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
            background: #f5f5f7;
            min-height: 100vh;
            display: flex;
            justify-content: center;
            padding: 40px 20px;
        }
        .splash {
            position: fixed;
            inset: 0;
            background: white;
            display: flex;
            align-items: center;
            justify-content: center;
            z-index: 10;
            transition: opacity 0.3s;
        }
        .splash img { max-width: 160px; max-height: 160px; }
        .page { max-width: 680px; width: 100%; text-align: center; }
        .banner { width: 100%; max-height: 240px; object-fit: cover; border-radius: 16px; margin-bottom: 24px; }
        h1 { font-size: 26px; color: #1d1d1f; margin-bottom: 32px; }
        .links { display: flex; flex-direction: column; gap: 14px; }
        .link-btn {
            display: flex;
            align-items: center;
            justify-content: center;
            gap: 10px;
            padding: 16px 20px;
            background: white;
            color: #1d1d1f;
            border-radius: 12px;
            box-shadow: 0 2px 10px rgba(0, 0, 0, 0.08);
            text-decoration: none;
            font-size: 16px;
            font-weight: 500;
        }
        .link-btn:hover { transform: translateY(-2px); }
        .link-icon { width: 24px; height: 24px; object-fit: contain; }
        .empty { color: #86868b; }
";

/// Built-in search page for requests without an identifier
pub fn landing_page(site_name: &str) -> String {
    let site = escape_html(site_name);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{site} - Home</title>
    <style>{LANDING_STYLE}</style>
</head>
<body>
    <div class="container">
        <div class="logo">{site}</div>
        <h1>Welcome</h1>
        <p>Enter a BIS number to view a link tree</p>
        <form action="/" method="get">
            <input type="text" name="BIS" class="search-input" placeholder="Enter BIS (e.g., BIS00001)" maxlength="50" required>
            <button type="submit" class="search-btn">View Link Tree</button>
        </form>
    </div>
</body>
</html>"#
    )
}

/// `/linktree` without an identifier
pub fn prompt_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Link Tree - BIS Required</title>
    <style>{BASE_STYLE}</style>
</head>
<body>
    <div class="message-container">
        <h1>BIS Required</h1>
        <p>Please provide a BIS parameter, for example <code>{PROMPT_EXAMPLE}</code></p>
        <a href="{PROMPT_EXAMPLE}">Try {PROMPT_EXAMPLE}</a>
    </div>
</body>
</html>"#
    )
}

/// Deterministic splash image location for one identifier
pub fn loading_image_url(base: &str, bis: &str) -> String {
    format!(
        "{}/{}.png",
        base.trim_end_matches('/'),
        urlencoding::encode(bis)
    )
}

/// Account page: banner, name and the sorted, active buttons
pub fn profile_page(account: &Account, bis: &str, loading_image_base: &str, site_name: &str) -> String {
    let name = escape_html(&account.name);
    let site = escape_html(site_name);
    let splash_src = escape_html(&loading_image_url(loading_image_base, bis));

    let banner = account
        .visible_banner()
        .map(|url| {
            format!(
                r#"<img class="banner" src="{}" alt="{name}" onerror="this.remove()">"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    let buttons = account.sorted_buttons();
    let links = if buttons.is_empty() {
        r#"<p class="empty">No links available yet.</p>"#.to_string()
    } else {
        let items: Vec<String> = buttons.into_iter().map(render_button).collect();
        format!(r#"<div class="links">{}</div>"#, items.join("\n            "))
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name} | {site}</title>
    <style>{PROFILE_STYLE}</style>
    <noscript><style>.splash {{ display: none; }}</style></noscript>
</head>
<body>
    <div class="splash" id="splash">
        <img src="{splash_src}" alt="" onerror="document.getElementById('splash').remove()">
    </div>
    <div class="page">
        {banner}
        <h1>{name}</h1>
        {links}
    </div>
    <script>
        window.addEventListener('load', function () {{
            var splash = document.getElementById('splash');
            if (splash) {{ splash.style.opacity = '0'; setTimeout(function () {{ splash.remove(); }}, 300); }}
        }});
    </script>
</body>
</html>"#
    )
}

fn render_button(button: &Button) -> String {
    let icon = button
        .icon_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(|url| {
            format!(
                r#"<img class="link-icon" src="{}" alt="" onerror="this.remove()">"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<a class="link-btn" href="{}" target="_blank" rel="noopener noreferrer">{icon}<span>{}</span></a>"#,
        escape_html(&button.link),
        escape_html(&button.label)
    )
}

/// No account for this identifier
pub fn not_found_page(bis: &str) -> String {
    message_page(
        "Link Tree - Not Found",
        "Link Tree Not Found",
        &format!(
            "No active link tree account found with BIS={}",
            escape_html(bis)
        ),
    )
}

/// Upstream rejected our credentials or endpoint
pub fn configuration_error_page() -> String {
    message_page(
        "Error",
        "Configuration Error",
        "This service is temporarily misconfigured. Please try again later.",
    )
}

/// Upstream failed or answered with something unexpected
pub fn retry_later_page() -> String {
    message_page(
        "Error",
        "Error",
        "Unable to load link tree. Please try again later.",
    )
}

/// Unknown path outside the resolver routes
pub fn page_not_found() -> String {
    message_page("Not Found", "Page Not Found", "The page you requested does not exist.")
}

/// `message` must already be escaped
fn message_page(title: &str, heading: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{BASE_STYLE}</style>
</head>
<body>
    <div class="message-container">
        <h1>{heading}</h1>
        <p>{message}</p>
        <a href="/">&larr; Back to Home</a>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTILE: &str = r#"<script>alert("x")</script>&'"#;

    fn button(label: &str, link: &str, order: Option<i64>) -> Button {
        Button {
            label: label.to_string(),
            link: link.to_string(),
            icon_url: None,
            order,
            is_active: None,
        }
    }

    fn account(buttons: Vec<Button>) -> Account {
        Account {
            name: "Harbour Cafe".to_string(),
            banner_url: None,
            is_banner_hidden: false,
            is_redirection_enabled: false,
            redirection_url: None,
            buttons,
        }
    }

    #[test]
    fn test_profile_page_escapes_every_field() {
        let mut acc = account(vec![Button {
            label: HOSTILE.to_string(),
            link: format!("https://example.com/?q={HOSTILE}"),
            icon_url: Some(format!("https://cdn.example.com/{HOSTILE}.svg")),
            order: None,
            is_active: None,
        }]);
        acc.name = HOSTILE.to_string();
        acc.banner_url = Some(format!("https://cdn.example.com/{HOSTILE}.png"));

        let html = profile_page(&acc, HOSTILE, "/loading", HOSTILE);

        assert!(!html.contains("<script>alert"));
        assert!(!html.contains(r#"alert("x")"#));
        assert!(!html.contains("&'"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;&amp;&#39;"));
    }

    #[test]
    fn test_profile_page_orders_buttons() {
        let acc = account(vec![
            button("Third", "https://example.com/3", Some(5)),
            button("First", "https://example.com/1", None),
            button("Second", "https://example.com/2", Some(0)),
        ]);
        let html = profile_page(&acc, "BIS1", "/loading", "kochi.one");

        let first = html.find("First").unwrap();
        let second = html.find("Second").unwrap();
        let third = html.find("Third").unwrap();
        assert!(first < second && second < third);
        assert!(!html.contains("No links available yet."));
    }

    #[test]
    fn test_profile_page_empty_state() {
        let mut inactive = button("Gone", "https://example.com/gone", None);
        inactive.is_active = Some(false);
        let html = profile_page(&account(vec![inactive]), "BIS1", "/loading", "kochi.one");

        assert!(html.contains("No links available yet."));
        assert!(!html.contains("Gone"));
    }

    #[test]
    fn test_profile_page_banner_visibility() {
        let mut acc = account(vec![]);
        acc.banner_url = Some("https://cdn.example.com/banner.png".to_string());
        let html = profile_page(&acc, "1", "/loading", "kochi.one");
        assert!(html.contains(r#"class="banner" src="https://cdn.example.com/banner.png""#));

        acc.is_banner_hidden = true;
        let html = profile_page(&acc, "1", "/loading", "kochi.one");
        assert!(!html.contains("banner.png"));
    }

    #[test]
    fn test_loading_image_url_is_deterministic() {
        assert_eq!(loading_image_url("/loading/", "BIS 7"), "/loading/BIS%207.png");
        assert_eq!(
            loading_image_url("https://cdn.example.com/splash", "BIS7"),
            loading_image_url("https://cdn.example.com/splash", "BIS7")
        );

        let html = profile_page(&account(vec![]), "BIS7", "/loading", "kochi.one");
        assert!(html.contains(r#"src="/loading/BIS7.png""#));
        assert!(html.contains("onerror=\"document.getElementById('splash').remove()\""));
    }

    #[test]
    fn test_profile_page_hides_splash_without_scripts() {
        let html = profile_page(&account(vec![]), "BIS7", "/loading", "kochi.one");
        let noscript = html.find("<noscript><style>.splash { display: none; }</style></noscript>").unwrap();
        assert!(noscript < html.find("</head>").unwrap());
    }

    #[test]
    fn test_not_found_page_names_identifier() {
        let html = not_found_page("BIS<42>");
        assert!(html.contains("Link Tree Not Found"));
        assert!(html.contains("BIS=BIS&lt;42&gt;"));
        assert!(!html.contains("BIS<42>"));
    }

    #[test]
    fn test_prompt_page_shows_example() {
        let html = prompt_page();
        assert!(html.contains("/linktree?BIS=1"));
    }

    #[test]
    fn test_landing_page_has_search_form() {
        let html = landing_page("kochi.one");
        assert!(html.contains(r#"name="BIS""#));
        assert!(html.contains("kochi.one"));
    }
}
