use std::sync::Arc;

use crate::data::store::{Snapshot, StoreState};
use crate::search::view::messages;
use crate::server::api;
use crate::server::AppState;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn json(payload: String) -> Self {
        HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body: payload,
        }
    }
}

pub fn route_request(state: &AppState, method: &str, path: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/status") => match api::status_payload(&state.store) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/municipalities") => with_snapshot(state, |snapshot| {
            match api::municipalities_payload(snapshot) {
                Ok(payload) => HttpResponse::json(payload),
                Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
            }
        }),
        ("GET", "/api/regionals") => with_snapshot(state, |snapshot| {
            match api::regionals_payload(snapshot) {
                Ok(payload) => HttpResponse::json(payload),
                Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
            }
        }),
        ("GET", "/api/contacts") => with_snapshot(state, |snapshot| {
            search_response(api::contacts_payload(snapshot, path))
        }),
        ("GET", "/api/regionals/search") => with_snapshot(state, |snapshot| {
            search_response(api::regional_payload(snapshot, path))
        }),
        ("POST", "/api/reload") => match state.store.reload_blocking(state.source.as_ref()) {
            Ok(snapshot) => {
                let body = serde_json::json!({
                    "status": "ok",
                    "message": messages::LOADED,
                    "report": snapshot.report(),
                });
                match serde_json::to_string_pretty(&body) {
                    Ok(payload) => HttpResponse::json(payload),
                    Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
                }
            }
            Err(err) => error_response(
                502,
                "Bad Gateway",
                &format!("{} ({err})", messages::LOAD_FAILED),
            ),
        },
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

/// Run `handler` against the current snapshot, or answer 503 before the first
/// successful load.
fn with_snapshot(state: &AppState, handler: impl FnOnce(&Snapshot) -> HttpResponse) -> HttpResponse {
    let StoreState {
        snapshot,
        last_error,
    } = state.store.state();
    match snapshot {
        Some(snapshot) => handler(Arc::as_ref(&snapshot)),
        None => {
            let message = if last_error.is_some() {
                messages::LOAD_FAILED
            } else {
                messages::LOADING
            };
            error_response(503, "Service Unavailable", message)
        }
    }
}

fn search_response(result: Result<String, api::SearchPayloadError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(api::SearchPayloadError::Criteria(message)) => {
            error_response(400, "Bad Request", message)
        }
        Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Contatos Defesa Civil</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input, select { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 180px; }
  </style>
</head>
<body>
  <h1>Contatos Defesa Civil</h1>
  <p id="status">Carregando dados da planilha...</p>

  <div class="card">
    <strong>Coordenador / Município</strong>
    <label for="name">Nome</label>
    <input id="name" />
    <label for="city">Município</label>
    <select id="city"><option value="">Selecione um Município</option></select>
    <div><button id="search-btn">Buscar</button></div>
  </div>

  <div class="card">
    <strong>Regional</strong>
    <label for="regional">REPDEC</label>
    <select id="regional"><option value="">Selecione uma Regional</option></select>
  </div>

  <pre id="output">Pronto para buscar.</pre>

  <script>
    const output = document.getElementById('output');
    const statusEl = document.getElementById('status');

    async function fill(path, key, select) {
      const response = await fetch(path);
      if (!response.ok) return;
      const data = await response.json();
      data[key].forEach(value => select.add(new Option(value, value)));
    }

    async function show(path) {
      const response = await fetch(path);
      output.textContent = 'HTTP ' + response.status + '\n' + await response.text();
    }

    fetch('/api/status').then(r => r.json()).then(s => { statusEl.textContent = s.message; });
    fill('/api/municipalities', 'municipalities', document.getElementById('city'));
    fill('/api/regionals', 'regionals', document.getElementById('regional'));

    document.getElementById('search-btn').addEventListener('click', () => {
      const name = encodeURIComponent(document.getElementById('name').value);
      const city = encodeURIComponent(document.getElementById('city').value);
      show('/api/contacts?name=' + name + '&city=' + city);
    });
    document.getElementById('regional').addEventListener('change', event => {
      show('/api/regionals/search?key=' + encodeURIComponent(event.target.value));
    });
  </script>
</body>
</html>
"#
    .to_string()
}
