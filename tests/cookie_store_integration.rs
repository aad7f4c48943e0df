//! Integration tests for the on-disk cookie store.

use epub_downloader::auth::{Cookie, CookieStore, SameSite, parse_cookies_json};
use tempfile::TempDir;

fn browser_export() -> &'static str {
    r#"[
        {
            "name": "orm-jwt",
            "value": "eyJhbGciOi",
            "domain": ".oreilly.com",
            "path": "/",
            "expires": 1767225600,
            "httpOnly": true,
            "secure": true,
            "sameSite": "Lax"
        },
        {
            "name": "groot_sessionid",
            "value": "abc123",
            "domain": "learning.oreilly.com",
            "sameSite": "unspecified"
        },
        {"value": "orphan"}
    ]"#
}

#[test]
fn test_imported_cookies_survive_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let store = CookieStore::new(temp_dir.path().join("nested/dir/cookies.json"));

    let imported = parse_cookies_json(browser_export()).unwrap();
    assert_eq!(imported.len(), 2);
    store.save(&imported).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].name, "orm-jwt");
    assert_eq!(loaded[0].value(), "eyJhbGciOi");
    assert_eq!(loaded[0].domain, ".oreilly.com");
    assert!(loaded[0].secure);
    assert!(loaded[0].http_only);
    assert_eq!(loaded[0].same_site, SameSite::Lax);
    assert_eq!(loaded[1].same_site, SameSite::Default);
}

#[test]
fn test_saved_file_uses_import_format() {
    let temp_dir = TempDir::new().unwrap();
    let store = CookieStore::new(temp_dir.path().join("cookies.json"));
    store
        .save(&[Cookie::new("orm-jwt", "token").with_domain(".oreilly.com")])
        .unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value[0];
    assert_eq!(record["name"], "orm-jwt");
    assert_eq!(record["value"], "token");
    assert_eq!(record["domain"], ".oreilly.com");
    assert_eq!(record["sameSite"], "Default");
    assert!(raw.contains('\n'), "file should be pretty-printed");
}

#[test]
fn test_save_replaces_previous_cookies() {
    let temp_dir = TempDir::new().unwrap();
    let store = CookieStore::new(temp_dir.path().join("cookies.json"));

    store.save(&[Cookie::new("a", "1"), Cookie::new("b", "2")]).unwrap();
    store.save(&[Cookie::new("c", "3")]).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "c");
}

#[test]
fn test_corrupted_file_is_invalid_cookie_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cookies.json");
    std::fs::write(&path, b"{\"truncated\": ").unwrap();

    let err = CookieStore::new(&path).load().unwrap_err();
    assert_eq!(err.code(), "AUTH_004");
}

#[test]
fn test_delete_then_load_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = CookieStore::new(temp_dir.path().join("cookies.json"));
    store.save(&[Cookie::new("a", "1")]).unwrap();

    store.delete().unwrap();
    store.delete().unwrap();
    assert!(!store.exists());
    assert_eq!(store.load().unwrap_err().code(), "STOR_002");
}

#[cfg(unix)]
#[test]
fn test_saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let store = CookieStore::new(temp_dir.path().join("cookies.json"));
    store.save(&[Cookie::new("a", "1")]).unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
