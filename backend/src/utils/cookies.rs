pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const ACCESS_COOKIE_PATH: &str = "/";

pub fn build_clear_cookie(name: &str, path: &str, secure: bool) -> String {
    let mut cookie = format!("{}=; Path={}; Max-Age=0; HttpOnly; SameSite=Lax", name, path);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}
