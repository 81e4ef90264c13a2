//! JSON-lines session: requests on one stream, results and events on another.
//!
//! Each input line is either an action request, `{"action": .., "args": {..}}`,
//! or a simulated user input, `{"simulate": .., "id": ..}`. Each output line is
//! a result, `{"type": "result", ..}`, or an event, `{"type": "event", ..}`.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use traybridge_bridge::{ActionResult, ExtensionEvent, TrayExtension};
use traybridge_card::HeadlessPresenter;
use traybridge_tray::HeadlessTray;

use crate::config::Config;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Request {
    Simulate {
        simulate: String,
        #[serde(default)]
        id: Option<String>,
    },
    Action {
        action: String,
        #[serde(default)]
        args: Value,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Output {
    Result {
        action: Option<String>,
        #[serde(flatten)]
        result: ActionResult,
    },
    Event {
        name: String,
        payload: Value,
    },
}

impl From<ExtensionEvent> for Output {
    fn from(event: ExtensionEvent) -> Self {
        Output::Event {
            name: event.name,
            payload: event.payload,
        }
    }
}

/// Runs a session on stdin/stdout until EOF, `dispose` or Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let session = Session::new(&config);
    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        tracing::info!("SIGINT received, shutting down");
    };

    tracing::info!("host ready");
    session.serve(input, &mut output, shutdown).await
}

/// One extension wired to headless backends.
struct Session {
    ext: TrayExtension<HeadlessTray>,
    native: HeadlessTray,
    presenter: HeadlessPresenter,
}

impl Session {
    fn new(config: &Config) -> Self {
        let native = HeadlessTray::new();
        let presenter = HeadlessPresenter::new();
        presenter.set_attached(config.headless_attached);
        let ext = TrayExtension::new(
            native.clone(),
            presenter.clone(),
            config.extension.clone(),
        );
        Self {
            ext,
            native,
            presenter,
        }
    }

    /// Serves requests from `input` until it ends, the extension is disposed
    /// or `shutdown` resolves. Disposes the extension and flushes the
    /// remaining events before returning.
    async fn serve<R, W>(
        &self,
        input: R,
        output: &mut W,
        shutdown: impl Future<Output = ()>,
    ) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut events = self.ext.subscribe();
        let mut lines = input.lines();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if !line.trim().is_empty() {
                            let reply = self.handle_line(&line).await;
                            write_line(output, &reply).await?;
                        }
                        if self.ext.is_disposed() {
                            break;
                        }
                    }
                    None => {
                        tracing::info!("input closed");
                        break;
                    }
                },
                event = events.recv() => match event {
                    Ok(event) => write_line(output, &Output::from(event)).await?,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event output lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => break,
            }
        }

        self.ext.dispose().await;
        loop {
            match events.recv().await {
                Ok(event) => write_line(output, &Output::from(event)).await?,
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
        output.flush().await?;
        Ok(())
    }

    async fn handle_line(&self, line: &str) -> Output {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "invalid request line");
                return Output::Result {
                    action: None,
                    result: ActionResult::error(format!("invalid request: {e}")),
                };
            }
        };

        match request {
            Request::Action { action, args } => {
                let result = self.ext.dispatch(&action, args).await;
                Output::Result {
                    action: Some(action),
                    result,
                }
            }
            Request::Simulate { simulate, id } => {
                let result = self.simulate(&simulate, id.as_deref());
                Output::Result {
                    action: Some(format!("simulate:{simulate}")),
                    result,
                }
            }
        }
    }

    fn simulate(&self, what: &str, id: Option<&str>) -> ActionResult {
        let handled = match (what, id) {
            ("tray_click", _) => self.native.click_icon(),
            ("menu_click", Some(id)) => self.native.click_menu_item(id),
            ("card_action", Some(id)) => self.presenter.click_action(id),
            ("card_dismiss", _) => self.presenter.click_outside(),
            ("menu_click" | "card_action", None) => {
                return ActionResult::error(format!("simulate {what} needs an id"));
            }
            _ => return ActionResult::error(format!("unknown simulation: {what}")),
        };

        if handled {
            ActionResult::success()
        } else {
            ActionResult::error(format!("nothing handled {what}"))
        }
    }
}

async fn write_line<W, T>(output: &mut W, value: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn run_script(config: &Config, script: &[Value]) -> Vec<Value> {
        let session = Session::new(config);
        let input: String = script.iter().map(|line| format!("{line}\n")).collect();
        let mut output = Vec::new();

        session
            .serve(input.as_bytes(), &mut output, std::future::pending())
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn results(lines: &[Value]) -> Vec<&Value> {
        lines.iter().filter(|l| l["type"] == "result").collect()
    }

    fn events(lines: &[Value]) -> Vec<&Value> {
        lines.iter().filter(|l| l["type"] == "event").collect()
    }

    #[tokio::test]
    async fn menu_click_session() {
        let lines = run_script(
            &Config::default(),
            &[
                json!({"action": "init", "args": {"icon": "a.png"}}),
                json!({"action": "set_menu", "args": {"items": [{"id": "quit", "label": "Quit"}]}}),
                json!({"simulate": "menu_click", "id": "quit"}),
            ],
        )
        .await;

        let results = results(&lines);
        assert_eq!(results.len(), 3);
        assert_eq!(*results[0], json!({"type": "result", "action": "init", "ok": true}));
        assert!(results.iter().all(|r| r["ok"] == true));

        assert_eq!(
            events(&lines),
            vec![&json!({"type": "event", "name": "menu_item_click", "payload": {"id": "quit"}})]
        );
    }

    #[tokio::test]
    async fn invalid_line_does_not_end_session() {
        let session = Session::new(&Config::default());
        let input = "not json\n{\"action\": \"popup_menu\"}\n";
        let mut output = Vec::new();
        session
            .serve(input.as_bytes(), &mut output, std::future::pending())
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["ok"], false);
        assert!(lines[0]["action"].is_null());
        assert!(
            lines[0]["error"]
                .as_str()
                .unwrap()
                .starts_with("invalid request")
        );
        assert_eq!(lines[1], json!({"type": "result", "action": "popup_menu", "ok": true}));
    }

    #[tokio::test]
    async fn dispose_ends_session() {
        let lines = run_script(
            &Config::default(),
            &[
                json!({"action": "init", "args": {"icon": "a.png"}}),
                json!({"action": "destroy"}),
                json!({"action": "init", "args": {"icon": "b.png"}}),
            ],
        )
        .await;
        assert_eq!(results(&lines).len(), 2);
    }

    #[tokio::test]
    async fn simulated_card_interaction() {
        let lines = run_script(
            &Config::default(),
            &[
                json!({"action": "show_card", "args": {"actions": [{"id": "ok", "label": "OK"}]}}),
                json!({"simulate": "card_action", "id": "ok"}),
                json!({"simulate": "card_dismiss"}),
            ],
        )
        .await;

        let results = results(&lines);
        assert_eq!(results[0]["data"], json!({"shown": true}));
        assert_eq!(results[1]["ok"], true);
        // The action already hid the card.
        assert_eq!(results[2]["error"], "nothing handled card_dismiss");
        assert_eq!(
            events(&lines),
            vec![&json!({"type": "event", "name": "card_action", "payload": {"id": "ok", "label": "OK"}})]
        );
    }

    #[tokio::test]
    async fn detached_presenter_from_config() {
        let config = Config {
            headless_attached: false,
            ..Config::default()
        };
        let lines = run_script(
            &config,
            &[json!({"action": "show_card", "args": {"title": "Hi"}})],
        )
        .await;
        assert_eq!(results(&lines)[0]["data"], json!({"shown": false}));
    }

    #[tokio::test]
    async fn simulate_errors() {
        let lines = run_script(
            &Config::default(),
            &[
                json!({"simulate": "menu_click"}),
                json!({"simulate": "wiggle"}),
                json!({"simulate": "tray_click"}),
            ],
        )
        .await;

        let results = results(&lines);
        assert_eq!(results[0]["error"], "simulate menu_click needs an id");
        assert_eq!(results[1]["error"], "unknown simulation: wiggle");
        // No icon yet, so nothing receives the click.
        assert_eq!(results[2]["error"], "nothing handled tray_click");
    }
}
