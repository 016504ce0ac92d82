//! Self-contained HTML result pages for the browser side of the flow.
//!
//! Every callback outcome renders one of these with status 200; the person
//! at the browser always gets a complete explanation and can retry from
//! Discord. No templating engine: the pages are static shells around a
//! heading and a couple of lines.

use axum::response::Html;

fn page(title: &str, heading: &str, lines: &[&str]) -> Html<String> {
    let body = lines
        .iter()
        .map(|line| format!("        <p>{line}</p>"))
        .collect::<Vec<_>>()
        .join("\n");

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
        }}
        .container {{
            text-align: center;
            background: white;
            padding: 40px;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
        }}
        h1 {{ margin: 0 0 20px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{heading}</h1>
{body}
    </div>
</body>
</html>
"#
    ))
}

/// Missing or empty callback parameters.
pub fn invalid_params() -> Html<String> {
    page(
        "Error",
        "❌ Error",
        &["Invalid parameters. Please try again from Discord."],
    )
}

/// Unknown, already-consumed, or aged-out state token.
pub fn session_expired() -> Html<String> {
    page(
        "Error",
        "❌ Error",
        &["Session expired or invalid. Please try again from Discord."],
    )
}

/// The Roblox account is already linked.
pub fn already_linked() -> Html<String> {
    page(
        "Error",
        "❌ Error",
        &["This Roblox account is already linked to another Discord account."],
    )
}

/// Provider or store failure; deliberately detail-free.
pub fn verification_failed() -> Html<String> {
    page(
        "Error",
        "❌ Error",
        &["Something went wrong during verification. Please try again."],
    )
}

/// The terminal success page.
pub fn success() -> Html<String> {
    page(
        "Verification Successful",
        "✅ Verified!",
        &[
            "Your Roblox account has been linked successfully.",
            "You can close this window and return to Discord.",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_page_is_a_complete_document() {
        for page in [
            invalid_params(),
            session_expired(),
            already_linked(),
            verification_failed(),
            success(),
        ] {
            assert!(page.0.starts_with("<!DOCTYPE html>"));
            assert!(page.0.contains("</html>"));
        }
    }

    #[test]
    fn error_pages_carry_their_messages() {
        assert!(invalid_params().0.contains("Invalid parameters"));
        assert!(session_expired().0.contains("Session expired or invalid"));
        assert!(
            already_linked()
                .0
                .contains("already linked to another Discord account")
        );
    }

    #[test]
    fn failure_page_reveals_no_detail() {
        let page = verification_failed().0;
        assert!(page.contains("Something went wrong"));
        assert!(!page.contains("token"));
        assert!(!page.contains("secret"));
    }

    #[test]
    fn success_page_points_back_to_discord() {
        let page = success().0;
        assert!(page.contains("✅ Verified!"));
        assert!(page.contains("return to Discord"));
    }
}
