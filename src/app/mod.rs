use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};

use crate::domain::{Snapshot, load_snapshot};

mod graph;
mod highlight;
mod physics;
mod render_utils;
mod ui;
mod viewport;

use graph::{GraphEvent, GraphView};
pub(crate) use physics::SimulationConfig;

type LoadResult = Result<Snapshot, String>;

pub struct ConstellationApp {
    snapshot_path: PathBuf,
    config: SimulationConfig,
    initial_selection: Option<String>,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    snapshot: Snapshot,
    graph: GraphView,
    search: String,
    connecting_from: Option<String>,
    pending_connection: Option<(String, String)>,
    reload_error: Option<String>,
}

impl ConstellationApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        snapshot_path: PathBuf,
        config: SimulationConfig,
        initial_selection: Option<String>,
    ) -> Self {
        let state = Self::start_load(snapshot_path.clone());
        Self {
            snapshot_path,
            config,
            initial_selection,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(snapshot_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_snapshot(&snapshot_path).map_err(|error| {
                tracing::error!(path = %snapshot_path.display(), "{error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(snapshot_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(snapshot_path),
        }
    }

    fn ready(&mut self, snapshot: Snapshot) -> AppState {
        let selected = self.initial_selection.take();
        AppState::Ready(Box::new(ViewModel::new(snapshot, self.config, selected)))
    }
}

impl eframe::App for ConstellationApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(snapshot)) => transition = Some(Ok(snapshot)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading constellation...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load snapshot");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        retry = true;
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.snapshot_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.snapshot_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(snapshot)) => model.replace_snapshot(snapshot),
                        Ok(Err(error)) => model.reload_error = Some(error),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.reload_error =
                                Some("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        match transition {
            Some(Ok(snapshot)) => {
                self.reload_rx = None;
                self.state = self.ready(snapshot);
            }
            Some(Err(error)) => {
                self.reload_rx = None;
                self.state = AppState::Error(error);
            }
            None if retry => {
                self.state = Self::start_load(self.snapshot_path.clone());
            }
            None => {}
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let AppState::Ready(model) = &mut self.state {
            model.graph.unmount();
        }
    }
}

impl ViewModel {
    fn new(snapshot: Snapshot, config: SimulationConfig, selected: Option<String>) -> Self {
        let mut graph = GraphView::new(config);
        graph.apply_snapshot(&snapshot);

        let selected = selected.filter(|id| {
            let known = snapshot.entity(id).is_some();
            if !known {
                tracing::warn!(entity = %id, "initial selection is not in the snapshot");
            }
            known
        });
        graph.set_selected(selected);

        Self {
            snapshot,
            graph,
            search: String::new(),
            connecting_from: None,
            pending_connection: None,
            reload_error: None,
        }
    }

    /// Applies a freshly loaded snapshot without discarding the current layout.
    fn replace_snapshot(&mut self, snapshot: Snapshot) {
        let summary = self.graph.apply_snapshot(&snapshot);
        tracing::info!(
            nodes = summary.nodes,
            edges = summary.edges,
            topology_changed = summary.topology_changed,
            "snapshot reloaded"
        );

        if let Some(selected) = self.graph.selected()
            && snapshot.entity(selected).is_none()
        {
            self.graph.set_selected(None);
        }
        if self
            .connecting_from
            .as_deref()
            .is_some_and(|id| snapshot.entity(id).is_none())
        {
            self.connecting_from = None;
        }

        self.snapshot = snapshot;
        self.reload_error = None;
    }

    fn select(&mut self, selected: Option<String>) {
        self.graph.set_selected(selected);
    }

    fn start_connecting(&mut self) {
        if let Some(from) = self.graph.selected() {
            self.connecting_from = Some(from.to_owned());
            self.pending_connection = None;
        }
    }

    fn cancel_connecting(&mut self) {
        self.connecting_from = None;
    }

    fn handle_graph_event(&mut self, event: GraphEvent) {
        match event {
            GraphEvent::NodeClicked(node_id) => match self.connecting_from.take() {
                Some(from) if from != node_id => {
                    tracing::info!(from = %from, to = %node_id, "connection requested");
                    self.pending_connection = Some((from, node_id));
                }
                Some(from) => {
                    self.connecting_from = Some(from);
                }
                None => self.select(Some(node_id)),
            },
        }
    }

    fn entity_title<'a>(&'a self, id: &str) -> &'a str {
        self.snapshot
            .entity(id)
            .map(|entity| entity.title.as_str())
            .unwrap_or("Unknown")
    }
}
