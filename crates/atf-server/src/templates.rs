//! Server-rendered HTML pages.
//!
//! The availability flow renders a handful of small pages: the yes/no
//! choice form, the confirmation variants, the expired-token pages and the
//! error pages. Facility data is escaped before interpolation; error pages
//! never include internal detail outside development mode.

use atf_core::AuthorisedTestingFacility;

use crate::viewhelpers::format_date;

/// Shared CSS for all pages. GOV.UK-flavoured, inlined so the pages have no
/// asset dependencies.
const SHARED_STYLES: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: "GDS Transport", Arial, sans-serif;
    color: #0b0c0c;
    line-height: 1.5;
}

.header {
    background: #0b0c0c;
    color: #ffffff;
    padding: 0.75rem 1rem;
    font-weight: 700;
    border-bottom: 10px solid #1d70b8;
}

.container {
    max-width: 640px;
    margin: 0 auto;
    padding: 2rem 1rem;
}

h1 {
    font-size: 2rem;
    margin-bottom: 1rem;
}

p {
    margin-bottom: 1rem;
}

.panel {
    background: #00703c;
    color: #ffffff;
    padding: 2rem 1rem;
    text-align: center;
    margin-bottom: 1.5rem;
}

.panel h1 {
    margin-bottom: 0.5rem;
}

.error-summary {
    border: 5px solid #d4351c;
    padding: 1rem;
    margin-bottom: 1.5rem;
}

.error-summary h2 {
    color: #d4351c;
    margin-bottom: 0.5rem;
}

.error-summary a {
    color: #d4351c;
}

.error-message {
    color: #d4351c;
    font-weight: 700;
    margin-bottom: 0.5rem;
}

.radios label {
    display: block;
    font-size: 1.1875rem;
    margin-bottom: 0.75rem;
}

.button {
    background: #00703c;
    color: #ffffff;
    border: 0;
    padding: 0.6rem 1.2rem;
    font-size: 1.1875rem;
    cursor: pointer;
    margin-top: 1rem;
}

a.button {
    display: inline-block;
    text-decoration: none;
}
"#;

fn html_page(title: &str, content: &str) -> String {
    let mut html = String::with_capacity(2048 + content.len());
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("    <title>");
    html.push_str(&html_escape(title));
    html.push_str(" - MOT booking availability</title>\n");
    html.push_str("    <style>");
    html.push_str(SHARED_STYLES);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<div class=\"header\">MOT booking availability</div>\n");
    html.push_str("<div class=\"container\">\n");
    html.push_str(content);
    html.push_str("\n</div>\n</body>\n</html>");
    html
}

/// Validation error payload for the choice form.
pub struct FormError {
    pub heading: String,
    pub field: String,
    pub message: String,
}

/// The error shown when the choice form is submitted without a choice.
pub fn default_choice_error() -> FormError {
    FormError {
        heading: "There is a problem".to_string(),
        field: "availability".to_string(),
        message: "Select yes if you can take more MOT bookings".to_string(),
    }
}

/// Renders the yes/no choice form. `action_uri` already carries the token
/// and correlation id as query parameters so they survive the POST.
pub fn render_choice_page(
    atf: &AuthorisedTestingFacility,
    action_uri: &str,
    error: Option<&FormError>,
) -> String {
    let until = atf
        .availability
        .as_ref()
        .map(|a| format_date(&a.end_date))
        .unwrap_or_default();

    let mut content = String::with_capacity(2048);

    if let Some(e) = error {
        content.push_str("<div class=\"error-summary\" role=\"alert\">\n<h2>");
        content.push_str(&html_escape(&e.heading));
        content.push_str("</h2>\n<a href=\"#");
        content.push_str(&html_escape(&e.field));
        content.push_str("\">");
        content.push_str(&html_escape(&e.message));
        content.push_str("</a>\n</div>\n\n");
    }

    content.push_str("<h1>Can ");
    content.push_str(&html_escape(&atf.name));
    content.push_str(" take more MOT bookings?</h1>\n");
    if !until.is_empty() {
        content.push_str("<p>Your current availability runs until ");
        content.push_str(&html_escape(&until));
        content.push_str(".</p>\n");
    }

    content.push_str("<form method=\"POST\" action=\"");
    content.push_str(&html_escape(action_uri));
    content.push_str("\">\n");

    if let Some(e) = error {
        content.push_str("<p class=\"error-message\">");
        content.push_str(&html_escape(&e.message));
        content.push_str("</p>\n");
    }

    content.push_str("<div class=\"radios\" id=\"availability\">\n");
    content.push_str(
        "<label><input type=\"radio\" name=\"availability\" value=\"true\"> Yes</label>\n",
    );
    content.push_str(
        "<label><input type=\"radio\" name=\"availability\" value=\"false\"> No</label>\n",
    );
    content.push_str("</div>\n");
    content.push_str("<button type=\"submit\" class=\"button\">Continue</button>\n");
    content.push_str("</form>");

    html_page("Can you take more MOT bookings?", &content)
}

/// Renders the confirmation page, yes or no variant.
pub fn render_confirmation(atf: &AuthorisedTestingFacility, is_available: bool) -> String {
    let until = atf
        .availability
        .as_ref()
        .map(|a| format_date(&a.end_date))
        .unwrap_or_default();

    let (title, body) = if is_available {
        (
            "You can take more MOT bookings",
            "We will keep offering your test facility to lorry, bus and trailer operators.",
        )
    } else {
        (
            "You cannot take more MOT bookings",
            "We will stop offering your test facility to lorry, bus and trailer operators.",
        )
    };

    let mut content = String::with_capacity(1024);
    content.push_str("<div class=\"panel\">\n<h1>");
    content.push_str(title);
    content.push_str("</h1>\n<p>");
    content.push_str(&html_escape(&atf.name));
    content.push_str("</p>\n</div>\n");
    content.push_str("<p>");
    content.push_str(body);
    content.push_str("</p>\n");
    if !until.is_empty() {
        content.push_str("<p>This applies until ");
        content.push_str(&html_escape(&until));
        content.push_str(". We will email you before then to check again.</p>");
    }

    html_page(title, &content)
}

/// Renders the expired-token page. The plain variant tells the facility a
/// fresh link is on its way; the retry variant is shown when they have
/// already asked for another one.
pub fn render_expired_token(
    atf: &AuthorisedTestingFacility,
    reissue_uri: &str,
    retry: bool,
) -> String {
    let mut content = String::with_capacity(1024);
    content.push_str("<h1>This link has expired</h1>\n");

    if retry {
        content.push_str("<p>We have sent another email with a new link to ");
    } else {
        content.push_str("<p>We have emailed a new link to ");
    }
    match atf.email {
        Some(ref email) => {
            content.push_str(&html_escape(email));
            content.push_str(".</p>\n");
        }
        None => {
            content.push_str("the address we hold for ");
            content.push_str(&html_escape(&atf.name));
            content.push_str(".</p>\n");
        }
    }
    content.push_str("<p>The new link is valid for 7 days.</p>\n");
    content.push_str("<p>Not received it? <a class=\"button\" href=\"");
    content.push_str(&html_escape(reissue_uri));
    content.push_str("\">Send the email again</a></p>");

    html_page("This link has expired", &content)
}

pub fn render_not_found() -> String {
    let content = "<h1>Page not found</h1>\n\
                   <p>If you typed the web address, check it is correct.</p>\n\
                   <p>If you followed a link from an email, check you used the full link.</p>";
    html_page("Page not found", content)
}

/// Renders the generic failure page. `detail` is only passed in
/// development mode; production deployments never leak internals.
pub fn render_service_unavailable(detail: Option<&str>) -> String {
    let mut content = String::with_capacity(512);
    content.push_str("<h1>Sorry, the service is unavailable</h1>\n");
    content.push_str("<p>Try again later. Your availability has not been changed.</p>");
    if let Some(detail) = detail {
        content.push_str("\n<p><code>");
        content.push_str(&html_escape(detail));
        content.push_str("</code></p>");
    }
    html_page("Sorry, the service is unavailable", &content)
}

pub fn render_privacy() -> String {
    let content = "<h1>Privacy notice</h1>\n\
                   <p>This service holds the contact details and booking availability of \
                   Authorised Testing Facilities. Records are kept by the booking service; \
                   this site stores nothing beyond its request logs.</p>";
    html_page("Privacy notice", content)
}

pub fn render_accessibility() -> String {
    let content = "<h1>Accessibility statement</h1>\n\
                   <p>This service is designed to be usable with screen readers, keyboard \
                   navigation and browser zoom up to 300%. Contact the service desk if any \
                   part of it is not accessible to you.</p>";
    html_page("Accessibility statement", content)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
