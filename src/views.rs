//! Minimal HTML for the login, registration and home views.

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

pub fn login_page(failed: bool) -> String {
    let banner = if failed {
        "<p class=\"error\">Invalid email or password.</p>\n"
    } else {
        ""
    };
    layout(
        "Login",
        &format!(
            r#"<h1>Login</h1>
{banner}<form method="post" action="/login">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Log in</button>
</form>
<p><a href="/register">Create an account</a></p>"#
        ),
    )
}

pub fn register_page(error: Option<&str>) -> String {
    let banner = match error {
        Some("exists") => "<p class=\"error\">That email is already registered.</p>\n",
        Some(_) => "<p class=\"error\">Please enter a name, a valid email and a password.</p>\n",
        None => "",
    };
    layout(
        "Register",
        &format!(
            r#"<h1>Register</h1>
{banner}<form method="post" action="/register">
  <label>Name <input type="text" name="name" required></label>
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Register</button>
</form>
<p><a href="/login">Already registered? Log in</a></p>"#
        ),
    )
}

pub fn home_page(name: &str) -> String {
    let name = escape_html(name);
    layout(
        "Home",
        &format!(
            r#"<h1>Welcome, {name}</h1>
<form method="post" action="/logout"><button type="submit">Log out</button></form>"#
        ),
    )
}

pub fn error_page() -> String {
    layout(
        "Error",
        "<h1>Something went wrong</h1>\n<p>Please try again later.</p>",
    )
}
