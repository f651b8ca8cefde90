// Cookie-backed session: the caller's current upload and one-shot flash messages
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const CURRENT_UPLOAD_COOKIE: &str = "current_upload";
pub const FLASH_COOKIE: &str = "flash";

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

pub fn current_upload(jar: &CookieJar) -> Option<String> {
    jar.get(CURRENT_UPLOAD_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub fn set_current_upload(jar: CookieJar, stored_name: &str) -> CookieJar {
    jar.add(session_cookie(CURRENT_UPLOAD_COOKIE, stored_name.to_string()))
}

pub fn set_flash(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(session_cookie(
        FLASH_COOKIE,
        urlencoding::encode(message).into_owned(),
    ))
}

/// Read the pending flash message and clear it.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar
        .get(FLASH_COOKIE)
        .and_then(|c| urlencoding::decode(c.value()).ok())
        .map(|m| m.into_owned())
        .filter(|m| !m.is_empty());

    match message {
        Some(message) => (jar.remove(removal_cookie(FLASH_COOKIE)), Some(message)),
        None => (jar, None),
    }
}
