//! The tray extension: action handlers plus the event forwarder.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use traybridge_card::{ActionCallback, CardOverlayHost, CardPresenter};
use traybridge_model::{CardConfig, TrayEvent, parse_menu};
use traybridge_tray::{EventSink, NativeTray, TrayEvents, TrayManager, TrayStatus};

use crate::BridgeError;
use crate::args::{InitArgs, SetIconArgs, SetMenuArgs, SetTooltipArgs, decode};
use crate::config::ExtensionConfig;
use crate::registry::ActionRegistry;
use crate::result::ActionResult;
use crate::stream::{EventStream, ExtensionEvent};

/// Legacy camelCase action names and the actions they map to.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("setIcon", "set_icon"),
    ("setTooltip", "set_tooltip"),
    ("setMenu", "set_menu"),
    ("showMenu", "popup_menu"),
    ("destroy", "dispose"),
];

/// State shared between the extension and its action handlers.
struct Shared<B: NativeTray> {
    config: ExtensionConfig,
    tray: tokio::sync::Mutex<TrayManager<B>>,
    sink: EventSink,
    card: CardOverlayHost,
    stream: Arc<EventStream>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl<B: NativeTray> Shared<B> {
    /// Tray first (closes the internal stream), then the card, then wait for
    /// the forwarder to drain before closing the outbound stream.
    async fn dispose(&self) {
        self.tray.lock().await.dispose();
        self.card.hide();

        let forwarder = self
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = forwarder
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "event forwarder ended abnormally");
        }

        if self.stream.close() {
            tracing::info!(extension = %self.config.name, "tray extension disposed");
        }
    }

    /// Fails once `dispose` has started: the event stream is closed for good,
    /// so nothing done afterwards could reach the host.
    fn ensure_live(&self, action: &'static str) -> Result<(), BridgeError> {
        if self.sink.is_closed() || self.stream.is_closed() {
            return Err(BridgeError::Disposed { action });
        }
        Ok(())
    }

    fn card_callback(&self) -> ActionCallback {
        let sink = self.sink.clone();
        Arc::new(move |event: TrayEvent| {
            sink.emit(event);
        })
    }
}

/// Moves every tray event onto the outbound stream until the tray closes it.
async fn forward(mut events: TrayEvents, stream: Arc<EventStream>) {
    tracing::debug!("event forwarder started");
    while let Some(event) = events.recv().await {
        tracing::debug!(name = event.name(), id = %event.id, "forwarding tray event");
        stream.emit(event.into());
    }
    tracing::debug!("event forwarder stopped");
}

/// The tray extension as a host sees it.
///
/// Owns one [`TrayManager`] and one [`CardOverlayHost`], exposes them as named
/// actions, and republishes their events on a broadcast stream.
pub struct TrayExtension<B: NativeTray> {
    registry: ActionRegistry,
    shared: Arc<Shared<B>>,
}

impl<B: NativeTray> TrayExtension<B> {
    /// Builds the extension and starts its event forwarder.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(backend: B, presenter: impl CardPresenter, config: ExtensionConfig) -> Self {
        let (tray, events) = TrayManager::new(backend);
        let stream = Arc::new(EventStream::new(config.event_capacity));
        let forwarder = tokio::spawn(forward(events, Arc::clone(&stream)));

        let shared = Arc::new(Shared {
            sink: tray.event_sink(),
            tray: tokio::sync::Mutex::new(tray),
            card: CardOverlayHost::new(presenter),
            stream,
            forwarder: Mutex::new(Some(forwarder)),
            config,
        });

        let mut registry = ActionRegistry::new();
        register_actions(&mut registry, &shared);
        for (alias, target) in LEGACY_ALIASES {
            registry.alias(*alias, target);
        }

        tracing::debug!(extension = %shared.config.name, "tray extension created");
        Self { registry, shared }
    }

    /// Extension name the host imports.
    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    pub fn config(&self) -> &ExtensionConfig {
        &self.shared.config
    }

    /// Runs the action `name` with `args`. Never fails; see [`ActionResult`].
    pub async fn dispatch(&self, name: &str, args: Value) -> ActionResult {
        self.registry.dispatch(name, args).await
    }

    /// Subscribes to outbound events.
    pub fn subscribe(&self) -> broadcast::Receiver<ExtensionEvent> {
        self.shared.stream.subscribe()
    }

    /// Publishes an event directly on the outbound stream.
    ///
    /// Returns `false` once the extension is disposed.
    pub fn emit(&self, event: ExtensionEvent) -> bool {
        self.shared.stream.emit(event)
    }

    /// Registered action names, legacy aliases included.
    pub fn action_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub async fn tray_status(&self) -> TrayStatus {
        self.shared.tray.lock().await.status()
    }

    pub fn card(&self) -> &CardOverlayHost {
        &self.shared.card
    }

    /// Whether the outbound stream has been closed by `dispose`.
    pub fn is_disposed(&self) -> bool {
        self.shared.stream.is_closed()
    }

    /// Same as dispatching `dispose`.
    pub async fn dispose(&self) {
        self.shared.dispose().await;
    }
}

fn register_actions<B: NativeTray>(registry: &mut ActionRegistry, shared: &Arc<Shared<B>>) {
    let s = Arc::clone(shared);
    registry.register("init", move |args| {
        let s = Arc::clone(&s);
        async move {
            s.ensure_live("init")?;
            let args: InitArgs = decode("init", args)?;
            let tooltip = args.tooltip.or_else(|| s.config.default_tooltip.clone());
            s.tray
                .lock()
                .await
                .initialize(&args.icon, tooltip, args.is_template)
                .map_err(|source| BridgeError::Tray {
                    action: "init",
                    source,
                })?;
            Ok(None)
        }
    });

    let s = Arc::clone(shared);
    registry.register("set_menu", move |args| {
        let s = Arc::clone(&s);
        async move {
            s.ensure_live("set_menu")?;
            let args: SetMenuArgs = decode("set_menu", args)?;
            let items = parse_menu(&args.items).map_err(|source| BridgeError::Model {
                action: "set_menu",
                source,
            })?;
            s.tray
                .lock()
                .await
                .set_menu(items)
                .map_err(|source| BridgeError::Tray {
                    action: "set_menu",
                    source,
                })?;
            Ok(None)
        }
    });

    let s = Arc::clone(shared);
    registry.register("set_tooltip", move |args| {
        let s = Arc::clone(&s);
        async move {
            s.ensure_live("set_tooltip")?;
            let args: SetTooltipArgs = decode("set_tooltip", args)?;
            s.tray
                .lock()
                .await
                .set_tooltip(args.tooltip)
                .map_err(|source| BridgeError::Tray {
                    action: "set_tooltip",
                    source,
                })?;
            Ok(None)
        }
    });

    let s = Arc::clone(shared);
    registry.register("set_icon", move |args| {
        let s = Arc::clone(&s);
        async move {
            s.ensure_live("set_icon")?;
            let args: SetIconArgs = decode("set_icon", args)?;
            s.tray
                .lock()
                .await
                .set_icon(&args.icon, args.is_template)
                .map_err(|source| BridgeError::Tray {
                    action: "set_icon",
                    source,
                })?;
            Ok(None)
        }
    });

    let s = Arc::clone(shared);
    registry.register("popup_menu", move |_| {
        let s = Arc::clone(&s);
        async move {
            s.ensure_live("popup_menu")?;
            s.tray
                .lock()
                .await
                .popup_menu()
                .map_err(|source| BridgeError::Tray {
                    action: "popup_menu",
                    source,
                })?;
            Ok(None)
        }
    });

    let s = Arc::clone(shared);
    registry.register("show_card", move |args| {
        let s = Arc::clone(&s);
        async move {
            s.ensure_live("show_card")?;
            let mut card = CardConfig::parse(&args).map_err(|source| BridgeError::Model {
                action: "show_card",
                source,
            })?;
            if args.get("auto_close_ms").is_none()
                && let Some(ms) = s.config.default_card_auto_close_ms.filter(|ms| *ms > 0)
            {
                card.auto_close = Some(Duration::from_millis(ms));
            }

            let shown = s.card.show_card(card, s.card_callback());
            if !shown {
                tracing::warn!("card has no attachment point, not shown");
            }
            Ok(Some(json!({ "shown": shown })))
        }
    });

    let s = Arc::clone(shared);
    registry.register("dispose", move |_| {
        let s = Arc::clone(&s);
        async move {
            s.dispose().await;
            Ok(None)
        }
    });
}
