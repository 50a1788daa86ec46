//! Server-rendered HTML pages

use axum::http::StatusCode;

use crate::auth::User;
use crate::uploads::models::{UploadPageData, UploadReceipt, UPLOAD_TIME_FORMAT};

const APP_NAME: &str = "Google S3 Uploader";

pub fn escape_html(input: &str) -> String {
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

/// Anchor for http(s) URLs, escaped text for anything else
fn link_or_text(url: &str) -> String {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        format!(
            r#"<a href="{url}" target="_blank" rel="noopener">{url}</a>"#,
            url = escape_html(url)
        )
    } else {
        escape_html(url)
    }
}

/// `10240` -> `10.0 KB`
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn layout(title: &str, user: Option<&User>, logout_url: &str, content: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<div class="nav-user">
                    <span class="user-info">Hello, {name}!</span>
                    <a href="{logout}" class="nav-link">Logout</a>
                </div>"#,
            name = escape_html(user.display_name()),
            logout = escape_html(logout_url),
        ),
        None => r#"<a href="/login" class="nav-link">Login</a>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link href="/static/css/style.css" rel="stylesheet">
</head>
<body>
    <header class="header">
        <nav class="navbar">
            <div class="nav-brand"><a href="/">{app}</a></div>
            <div class="nav-menu">
                {nav}
            </div>
        </nav>
    </header>
    <main class="main-content">
{content}
    </main>
    <footer class="footer">
        <p>{app}</p>
    </footer>
    <script src="/static/js/upload.js"></script>
</body>
</html>"#,
        title = escape_html(title),
        app = APP_NAME,
        nav = nav,
        content = content,
    )
}

pub fn login_page(user: Option<&User>) -> String {
    let content = match user {
        Some(user) => format!(
            r#"        <div class="login-card">
            <h1>Already signed in</h1>
            <p>You are signed in as {email}.</p>
            <a href="/" class="btn btn-primary">Continue</a>
            <a href="/logout" class="btn btn-secondary">Sign out</a>
        </div>"#,
            email = escape_html(&user.email),
        ),
        None => r#"        <div class="login-card">
            <h1>Sign in</h1>
            <p>Sign in with your Google account to upload files to S3.</p>
            <a href="/auth/google" class="btn btn-google">Sign in with Google</a>
        </div>"#
            .to_string(),
    };

    layout(&format!("Login - {}", APP_NAME), user, "/logout", &content)
}

pub fn home_page(user: &User, auth_server_url: &str) -> String {
    let logout_url = format!("{}/logout", auth_server_url.trim_end_matches('/'));

    let avatar = if user.picture.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="" class="avatar">"#,
            escape_html(&user.picture)
        )
    };

    let content = format!(
        r#"        <div class="home-container">
            <div class="welcome-section">
                {avatar}
                <h1>Welcome, {name}</h1>
                <p>Upload images, PDFs and ZIP archives straight to AWS S3.</p>
            </div>
            <div class="action-card">
                <h2>Ready to upload</h2>
                <a href="/upload" class="btn btn-primary">Go to upload page</a>
            </div>
        </div>"#,
        avatar = avatar,
        name = escape_html(user.display_name()),
    );

    layout(APP_NAME, Some(user), &logout_url, &content)
}

pub fn upload_page(user: &User, data: &UploadPageData) -> String {
    let types = data
        .allowed_types
        .iter()
        .map(|t| format!("<li><code>{}</code></li>", escape_html(t)))
        .collect::<Vec<_>>()
        .join("\n                    ");

    let content = format!(
        r#"        <div class="upload-card">
            <h1>Upload a file</h1>
            <div class="upload-info">
                <p>Maximum file size: {max_mb} MB</p>
                <p>Destination bucket: <code>{bucket}</code></p>
                <p>Allowed types:</p>
                <ul class="allowed-types">
                    {types}
                </ul>
            </div>
            <form action="/upload" method="post" enctype="multipart/form-data" id="uploadForm"
                  data-max-size="{max_bytes}" data-allowed-types="{allowed}">
                <input type="file" id="file" name="file" required accept="{allowed}">
                <p class="form-error" id="formError" hidden></p>
                <button type="submit" class="btn btn-primary" id="uploadButton">Upload</button>
            </form>
        </div>"#,
        max_mb = data.max_file_size / (1024 * 1024),
        bucket = escape_html(&data.bucket),
        types = types,
        max_bytes = data.max_file_size,
        allowed = escape_html(&data.allowed_types.join(",")),
    );

    layout(&format!("Upload - {}", APP_NAME), Some(user), "/logout", &content)
}

pub fn success_page(user: &User, receipt: &UploadReceipt) -> String {
    let content = format!(
        r#"        <div class="success-card">
            <h1>Upload complete</h1>
            <dl class="file-details">
                <dt>File name</dt><dd>{filename}</dd>
                <dt>Size</dt><dd>{size} bytes ({human})</dd>
                <dt>Content type</dt><dd>{content_type}</dd>
                <dt>Uploaded at</dt><dd>{time}</dd>
                <dt>URL</dt><dd>{url}</dd>
            </dl>
            <a href="/upload" class="btn btn-primary">Upload another file</a>
            <a href="/" class="btn btn-secondary">Home</a>
        </div>"#,
        filename = escape_html(&receipt.filename),
        size = receipt.size,
        human = human_size(receipt.size),
        content_type = escape_html(&receipt.content_type),
        time = receipt.uploaded_at.format(UPLOAD_TIME_FORMAT),
        url = link_or_text(&receipt.url),
    );

    layout(&format!("Upload complete - {}", APP_NAME), Some(user), "/logout", &content)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let content = format!(
        r#"        <div class="error-card">
            <h1>{code} {reason}</h1>
            <p>{message}</p>
            <a href="/" class="btn btn-secondary">Back to start</a>
        </div>"#,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = escape_html(message),
    );

    layout("Error", None, "/logout", &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn user() -> User {
        User {
            id: "1".to_string(),
            name: "<b>Ada</b>".to_string(),
            email: "ada@example.com".to_string(),
            picture: String::new(),
            provider: "google".to_string(),
            created: Utc::now(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(10_240), "10.0 KB");
        assert_eq!(human_size(52_428_800), "50.0 MB");
    }

    #[test]
    fn test_home_page_escapes_name() {
        let html = home_page(&user(), "http://localhost:8081");
        assert!(html.contains("&lt;b&gt;Ada&lt;/b&gt;"));
        assert!(html.contains(r#"href="http://localhost:8081/logout""#));
    }

    #[test]
    fn test_success_page_echoes_receipt() {
        let receipt = UploadReceipt {
            filename: "cat.png".to_string(),
            size: 10_240,
            content_type: "image/png".to_string(),
            url: "https://bucket.s3.ap-northeast-1.amazonaws.com/uploads/1/1_cat.png".to_string(),
            uploaded_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        };

        let html = success_page(&user(), &receipt);
        assert!(html.contains("cat.png"));
        assert!(html.contains("10240 bytes (10.0 KB)"));
        assert!(html.contains("2024-05-01 09:30:00"));
        assert!(html.contains(&format!(r#"<a href="{}""#, receipt.url)));
    }

    #[test]
    fn test_only_http_urls_become_links() {
        assert!(link_or_text("http://localhost:9000/b/k").starts_with(r#"<a href="http://localhost:9000/b/k""#));
        assert!(link_or_text("HTTPS://bucket.example/k").starts_with("<a href="));

        for url in [
            "javascript:alert(document.domain)",
            " JavaScript:alert(1)",
            "data:text/html,<script>alert(1)</script>",
            "//evil.example/x",
        ] {
            let rendered = link_or_text(url);
            assert!(!rendered.contains("<a"), "{} rendered as a link", url);
            assert!(!rendered.contains("<script"));
        }
        assert_eq!(
            link_or_text("data:text/html,<script>"),
            "data:text/html,&lt;script&gt;"
        );
    }

    #[test]
    fn test_error_page() {
        let html = error_page(StatusCode::BAD_REQUEST, "Invalid state parameter");
        assert!(html.contains("400 Bad Request"));
        assert!(html.contains("Invalid state parameter"));
    }
}
