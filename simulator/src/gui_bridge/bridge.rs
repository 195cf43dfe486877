use crate::generator::scene::SceneConfig;
use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::runner::Runner;
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

/// Runs one sweep for `scene` and makes its pattern the served one.
fn sweep_and_store(
    runner: &Runner,
    state: &RwLock<VisualizationModel>,
    scene: &SceneConfig,
) -> anyhow::Result<(usize, VisualizationModel)> {
    let outcome = runner.execute(scene)?;
    let model = VisualizationModel::from_pattern(&outcome.pattern, scene);
    if let Ok(mut guard) = state.write() {
        *guard = model.clone();
    }
    info!(
        "[GUI] sweep for source at {:.1} deg -> peak {:?} deg",
        scene.source_angle_deg, model.peak_angle_deg
    );
    Ok((outcome.pattern.len(), model))
}

/// Holds the latest pattern and serves it to the visualizer over HTTP.
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
}

impl GuiBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(VisualizationModel::default())),
        }
    }

    /// Starts `GET /pattern` and `POST /sweep` on a background thread.
    pub fn serve(&self, runner: Arc<Runner>) {
        let state_for_filter = self.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("pattern")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<VisualizationModel>>| {
                let model = state.read().map(|guard| guard.clone()).unwrap_or_default();
                warp::reply::json(&model)
            });

        let sweep_route = warp::path("sweep")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |scene: SceneConfig,
                 state: Arc<RwLock<VisualizationModel>>,
                 runner: Arc<Runner>| async move {
                    let sweep = tokio::task::spawn_blocking(move || {
                        sweep_and_store(&runner, &state, &scene)
                    })
                    .await;
                    match sweep {
                        Ok(Ok((samples, model))) => {
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "samples": samples,
                                    "peak_angle_deg": model.peak_angle_deg,
                                })),
                                StatusCode::OK,
                            ))
                        }
                        Ok(Err(err)) => {
                            error!("sweep request failed: {:#}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                        Err(err) => {
                            error!("sweep task aborted: {}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = get_route.or(sweep_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(gui_bind_address()).await;
            });
        });
    }

    pub fn publish(&self, model: &VisualizationModel) {
        if let Ok(mut guard) = self.state.write() {
            *guard = model.clone();
            println!(
                "[GUI] pattern points: {}, peak at {:?} deg",
                guard.angles_deg.len(),
                guard.peak_angle_deg
            );
        }
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        self.state.read().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl Default for GuiBridge {
    fn default() -> Self {
        Self::new()
    }
}
