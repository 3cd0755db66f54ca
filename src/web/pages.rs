//! Embedded HTML pages, rendered with minijinja (auto-escaped `.html` templates).

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::{Environment, context};

use crate::types::Session;

const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}FLS Dashboard{% endblock %}</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f9; color: #1f2933; }
    header { display: flex; justify-content: space-between; align-items: center; padding: .75rem 1.5rem; background: #fff; border-bottom: 1px solid #e4e7eb; }
    main { display: flex; min-height: calc(100vh - 3.5rem); }
    .centered { margin: auto; max-width: 28rem; text-align: center; }
    .viewer { flex: 1; display: flex; }
    .viewer iframe { flex: 1; border: 0; }
    .panel { width: 20rem; padding: 1.5rem; background: #fff; border-left: 1px solid #e4e7eb; }
    .panel button, .panel select, .panel input { width: 100%; margin: .25rem 0; padding: .5rem; }
    .error { color: #b42318; }
    #notice { min-height: 1.5rem; font-size: .875rem; }
  </style>
</head>
<body>
{% block body %}{% endblock %}
</body>
</html>"#;

const LOGIN: &str = r#"{% extends "layout.html" %}
{% block title %}Login - FLS Dashboard{% endblock %}
{% block body %}
<main>
  <div class="centered">
    <h1>Authenticate with Speckle</h1>
    <p>You must already be signed in to Speckle in this browser for authentication to work.</p>
    {% if error %}<p class="error">{{ error }}</p>{% endif %}
    <p><a href="/login/start"><button>Authenticate</button></a></p>
  </div>
</main>
{% endblock %}"#;

const DASHBOARD: &str = r#"{% extends "layout.html" %}
{% block body %}
<header>
  <strong>FLS Dashboard</strong>
  <form method="post" action="/logout">{{ display_name or email }} <button>Log out</button></form>
</header>
<main>
  <section class="viewer">
    {% if model_url %}
    <iframe src="{{ model_url }}" title="Speckle 3D Model Viewer" allowfullscreen></iframe>
    {% else %}
    <div class="centered">
      <h2>Enter Speckle Model URL</h2>
      <input id="model-url" placeholder="https://speckle.example.com/projects/xxx/models/yyy">
      <button onclick="loadModel()">Load Model</button>
    </div>
    {% endif %}
  </section>
  <aside class="panel">
    <h3>FLS Automation</h3>
    <button onclick="run('/api/run/grid')">Generate Grid</button>
    <button onclick="computePaths()">Compute Paths</button>
    <h3>Select Code PDF</h3>
    <select id="pdf">
      {% for pdf in pdfs %}<option value="{{ pdf }}">{{ pdf }}</option>{% else %}<option value="" disabled>No PDFs available</option>{% endfor %}
    </select>
    <input id="upload" type="file" accept=".pdf,application/pdf" onchange="upload(this.files[0])">
    <button onclick="runFls()">Run FLS Check</button>
    {% if model_url %}<button onclick="changeModel()">Change Model</button>{% endif %}
    <p id="notice"></p>
  </aside>
</main>
<script>
async function call(url, options) {
  const res = await fetch(url, options);
  const body = res.status === 204 ? null : await res.json();
  if (body && body.title) document.getElementById('notice').textContent = body.title + ': ' + body.description;
  if (res.status === 401) location.href = '/login';
  return { ok: res.ok, body };
}
const run = (url) => call(url, { method: 'POST' });
function runFls() {
  const id = document.getElementById('pdf').value;
  run('/api/run/fls?pdf_id=' + encodeURIComponent(id));
}
async function upload(file) {
  if (!file) return;
  const form = new FormData();
  form.append('pdf', file);
  const { ok } = await call('/api/pdfs', { method: 'POST', body: form });
  if (ok) location.reload();
}
async function computePaths() {
  const res = await fetch('/api/floors');
  const body = await res.json();
  if (!res.ok) { document.getElementById('notice').textContent = body.title + ': ' + body.description; return; }
  const inputs = {};
  for (const [i, floor] of body.floors.entries()) {
    const step = 'Floor ' + floor + ' (' + (i + 1) + ' of ' + body.floors.length + ')';
    const doors = prompt(step + ': Door IDs (comma-separated)');
    if (doors === null) return;
    const stairs = prompt(step + ': Stair IDs (comma-separated)');
    if (stairs === null) return;
    inputs[floor] = { doors, stairs };
  }
  call('/api/run/paths', { method: 'POST', headers: { 'content-type': 'application/json' }, body: JSON.stringify(inputs) });
}
async function loadModel() {
  const url = document.getElementById('model-url').value;
  const { ok } = await call('/api/model', { method: 'POST', headers: { 'content-type': 'application/json' }, body: JSON.stringify({ url }) });
  if (ok) location.reload();
}
async function changeModel() {
  await call('/api/model', { method: 'DELETE' });
  location.reload();
}
</script>
{% endblock %}"#;

const NOT_FOUND: &str = r#"{% extends "layout.html" %}
{% block title %}Not Found - FLS Dashboard{% endblock %}
{% block body %}
<main><div class="centered"><h1>404</h1><p>Page not found.</p><a href="/">Return to dashboard</a></div></main>
{% endblock %}"#;

fn template_env() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("layout.html", LAYOUT)?;
    env.add_template("login.html", LOGIN)?;
    env.add_template("dashboard.html", DASHBOARD)?;
    env.add_template("not_found.html", NOT_FOUND)?;
    Ok(env)
}

fn render(name: &str, ctx: minijinja::Value) -> Response {
    let rendered = template_env().and_then(|env| {
        let template = env.get_template(name)?;
        template.render(ctx)
    });
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(template = name, error = %e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

pub(super) fn login(error: Option<&str>) -> Response {
    render("login.html", context! { error })
}

pub(super) fn dashboard(session: &Session, pdfs: &[String], model_url: Option<&str>) -> Response {
    render(
        "dashboard.html",
        context! {
            email => &session.email,
            display_name => &session.display_name,
            pdfs,
            model_url,
        },
    )
}

pub(super) fn not_found() -> Response {
    (StatusCode::NOT_FOUND, render("not_found.html", context! {})).into_response()
}
