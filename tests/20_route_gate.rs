mod common;

use std::path::PathBuf;

use anyhow::Result;
use reqwest::{header, StatusCode};

use common::{location, test_config, TestServer};

/// Page directory holding a protected dashboard page and a public pricing page
fn page_dir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("contentdeck-pages-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dir.join("dashboard"))?;
    std::fs::write(dir.join("dashboard/index.html"), "<h1>dashboard</h1>")?;
    std::fs::write(dir.join("pricing.html"), "<h1>pricing</h1>")?;
    Ok(dir)
}

#[tokio::test]
async fn signed_in_visitor_is_sent_away_from_auth_pages() -> Result<()> {
    let server = TestServer::start().await?;
    let cookie = server.signed_in("Ada", "ada@example.com").await?;

    for page in ["/login", "/register"] {
        let res = server.get(page, Some(&cookie)).await?;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT, "{page}");
        assert_eq!(location(&res).as_deref(), Some("/dashboard"), "{page}");
    }
    Ok(())
}

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login_with_return_path() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.get("/dashboard/settings", None).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/login?from=%2Fdashboard%2Fsettings"));

    let res = server.get("/content/42?tab=drafts", None).await?;
    assert_eq!(
        location(&res).as_deref(),
        Some("/login?from=%2Fcontent%2F42%3Ftab%3Ddrafts")
    );

    let res = server.get("/workspace", None).await?;
    assert_eq!(location(&res).as_deref(), Some("/login?from=%2Fworkspace"));
    Ok(())
}

#[tokio::test]
async fn public_pages_pass_through_in_either_state() -> Result<()> {
    let server = TestServer::start().await?;
    let cookie = server.signed_in("Ada", "ada@example.com").await?;

    for cookie in [None, Some(cookie.as_str())] {
        let res = server.get("/pricing", cookie).await?;
        // No static directory configured, so the page itself is a 404
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(location(&res).is_none());
    }
    Ok(())
}

#[tokio::test]
async fn anonymous_visitor_reaches_auth_pages_and_signed_in_visitor_reaches_dashboard() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.get("/login", None).await?;
    assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT);

    let cookie = server.signed_in("Ada", "ada@example.com").await?;
    let res = server.get("/dashboard/settings", Some(&cookie)).await?;
    assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    Ok(())
}

#[tokio::test]
async fn forged_or_garbage_tokens_count_as_signed_out() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.get("/dashboard", Some("session=not.a.jwt")).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/login?from=%2Fdashboard"));

    let res = server.get("/login", Some("session=not.a.jwt")).await?;
    assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    Ok(())
}

#[tokio::test]
async fn encoded_paths_to_static_pages_are_still_gated() -> Result<()> {
    let dir = page_dir()?;
    let mut config = test_config();
    config.api.static_dir = Some(dir.to_string_lossy().into_owned());
    let server = TestServer::start_with(config).await?;

    for path in ["/dashboard/index.html", "/%64ashboard/index.html", "/dashboard%2Findex.html"] {
        let res = server.get(path, None).await?;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert!(location(&res).is_some_and(|l| l.starts_with("/login?from=")), "{path}");
    }

    let cookie = server.signed_in("Ada", "ada@example.com").await?;
    let res = server.get("/%64ashboard/index.html", Some(&cookie)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "<h1>dashboard</h1>");

    let res = server.get("/pricing.html", None).await?;
    assert_eq!(res.status(), StatusCode::OK);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[tokio::test]
async fn cors_preflight_is_answered_before_the_gate() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/api/dashboard/overview"))
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );

    // Simple requests from unknown origins get no CORS grant
    let res = server
        .client
        .get(server.url("/health"))
        .header(header::ORIGIN, "https://evil.example")
        .send()
        .await?;
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    Ok(())
}
