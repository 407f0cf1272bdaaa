//! Page returned to the login popup after a successful code exchange.
//!
//! The inline script hands the access token to the admin panel that opened
//! the popup. The popup keeps announcing itself with `authorizing:<provider>`
//! until the opener echoes the handshake back, then posts the success message
//! to the origin that answered and closes itself. No token is ever written to
//! browser storage.

use axum::{
    http::header,
    response::{Html, IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::AccessToken;
use rand::RngCore;
use serde_json::Value;

use super::github::PROVIDER;

/// Interval between handshake announcements.
pub const HANDSHAKE_RETRY_MS: u32 = 250;
/// Give up waiting for the opener after this long.
pub const HANDSHAKE_TIMEOUT_MS: u32 = 10_000;
/// Delay between delivering the token and closing the popup.
pub const CLOSE_DELAY_MS: u32 = 1_000;
/// Show the manual close notice if the popup is still open after this long.
pub const FALLBACK_NOTICE_MS: u32 = 3_000;

pub fn handshake_message() -> String {
    format!("authorizing:{PROVIDER}")
}

/// `authorization:github:success:{"token":"<T>","provider":"github"}`
pub fn success_message(token: &AccessToken) -> String {
    let token = Value::from(token.secret().as_str());
    format!(r#"authorization:{PROVIDER}:success:{{"token":{token},"provider":"{PROVIDER}"}}"#)
}

/// Encode `value` as a single-quoted JavaScript string literal that is also
/// safe to place inside an HTML `<script>` element.
pub fn js_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Rendered delivery page together with the nonce its CSP allows.
pub struct DeliveryPage {
    html: String,
    nonce: String,
}

impl DeliveryPage {
    /// Render the page for `token`. When `allowed_origins` is empty the token
    /// is posted to whichever origin the opener answers from.
    pub fn render(token: &AccessToken, allowed_origins: &[String]) -> Self {
        let nonce = generate_nonce();
        let origins = allowed_origins
            .iter()
            .map(|origin| js_string_literal(origin))
            .collect::<Vec<_>>()
            .join(", ");

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="referrer" content="no-referrer">
<title>Signing in</title>
<style nonce="{nonce}">
  body {{ display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; font-family: sans-serif; background: #f8f9fa; }}
  #status {{ text-align: center; color: #495057; }}
</style>
</head>
<body>
<div id="status"><h2>Signing in</h2><p>Returning to the admin panel, please wait...</p></div>
<script nonce="{nonce}">
(function () {{
  var HANDSHAKE = {handshake};
  var MESSAGE = {message};
  var ALLOWED_ORIGINS = [{origins}];
  var status = document.getElementById("status");

  function show(title, text) {{
    status.querySelector("h2").textContent = title;
    status.querySelector("p").textContent = text;
  }}

  var opener = window.opener;
  if (!opener || opener.closed) {{
    show("Unable to finish sign-in",
      "This window was not opened by the admin panel. Close it and start the login again from the admin page.");
    return;
  }}

  var delivered = false;
  var retry = null;
  var timeout = null;

  function stop() {{
    clearInterval(retry);
    clearTimeout(timeout);
    window.removeEventListener("message", receive, false);
  }}

  function receive(event) {{
    if (delivered || event.source !== opener || event.data !== HANDSHAKE) {{
      return;
    }}
    if (ALLOWED_ORIGINS.length > 0 && ALLOWED_ORIGINS.indexOf(event.origin) === -1) {{
      return;
    }}
    delivered = true;
    stop();
    opener.postMessage(MESSAGE, event.origin);
    show("Signed in", "Returning to the admin panel...");
    setTimeout(function () {{ window.close(); }}, {close_delay});
    setTimeout(function () {{
      show("Sign-in complete",
        "If this window did not close by itself, close it manually and return to the admin panel.");
    }}, {fallback_delay});
  }}

  function announce() {{
    opener.postMessage(HANDSHAKE, "*");
  }}

  window.addEventListener("message", receive, false);
  announce();
  retry = setInterval(announce, {retry_interval});
  timeout = setTimeout(function () {{
    stop();
    show("The admin panel did not respond",
      "Close this window and start the login again from the admin page.");
  }}, {handshake_timeout});
}})();
</script>
</body>
</html>
"#,
            handshake = js_string_literal(&handshake_message()),
            message = js_string_literal(&success_message(token)),
            close_delay = CLOSE_DELAY_MS,
            fallback_delay = FALLBACK_NOTICE_MS,
            retry_interval = HANDSHAKE_RETRY_MS,
            handshake_timeout = HANDSHAKE_TIMEOUT_MS,
        );

        Self { html, nonce }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn content_security_policy(&self) -> String {
        format!(
            "default-src 'none'; script-src 'nonce-{0}'; style-src 'nonce-{0}'; base-uri 'none'; form-action 'none'",
            self.nonce
        )
    }
}

impl IntoResponse for DeliveryPage {
    fn into_response(self) -> Response {
        let csp = self.content_security_policy();
        (
            [
                (header::CACHE_CONTROL, "no-store".to_string()),
                (header::PRAGMA, "no-cache".to_string()),
                (header::REFERRER_POLICY, "no-referrer".to_string()),
                (header::CONTENT_SECURITY_POLICY, csp),
            ],
            Html(self.html),
        )
            .into_response()
    }
}
