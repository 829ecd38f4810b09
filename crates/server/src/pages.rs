//! Server-rendered pages for the form front end.

use askama::Template;
use axum::response::Html;
use shared::domain::Language;
use tracing::error;

struct LanguageOption {
    label: &'static str,
    value: &'static str,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>worddeck</title>
    <style>
      body { font-family: sans-serif; max-width: 28rem; margin: 3rem auto; }
      form { display: flex; flex-direction: column; gap: 0.8rem; }
      .languages { position: relative; cursor: pointer; }
      .selected { padding: 0.4rem 0.8rem; border: 1px solid #888; border-radius: 4px; }
      .options { display: none; list-style: none; margin: 0; padding: 0; border: 1px solid #888; }
      .languages.open .options { display: block; }
      .options li { padding: 0.4rem 0.8rem; }
      .options li:hover { background: #eee; }
      #result.success { color: #2e7d32; }
      #result.error { color: #c62828; }
    </style>
  </head>
  <body>
    <main>
      <h1>worddeck</h1>
      <form id="language">
        <input type="text" id="word" name="word" placeholder="Word to add" autocomplete="off" />
        <div class="languages" tabindex="0">
          <div class="selected" data-value="">Select language</div>
          <ul class="options">
{% for option in languages %}            <li data-value="{{ option.value }}">{{ option.label }}</li>
{% endfor %}          </ul>
        </div>
        <input type="hidden" id="dropdownValue" name="dropdownValue" value="" />
        <button type="submit">Add note</button>
      </form>
      <div id="result"></div>
      <p>Submissions travel as JSON to <code>POST /api/addnote</code>.</p>
    </main>
  </body>
</html>
"#,
    ext = "html"
)]
struct HomeTemplate {
    languages: Vec<LanguageOption>,
}

pub fn home_page() -> Html<String> {
    let template = HomeTemplate {
        languages: Language::ALL
            .iter()
            .map(|language| LanguageOption {
                label: language.display_label(),
                value: language.wire_token(),
            })
            .collect(),
    };
    Html(template.render().unwrap_or_else(|err| {
        error!("failed to render home page: {err}");
        "<h1>worddeck</h1>".to_string()
    }))
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Not Found</title>
  </head>
  <body>
    <main>
      <h1>404</h1>
      <p>This page does not exist. The form lives at <a href="/">/</a>.</p>
    </main>
  </body>
</html>
"#,
    ext = "html"
)]
struct NotFoundTemplate;

pub fn not_found_page() -> Html<String> {
    Html(NotFoundTemplate.render().unwrap_or_else(|err| {
        error!("failed to render not-found page: {err}");
        "404".to_string()
    }))
}
