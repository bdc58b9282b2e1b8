use crate::gui_bridge::model::{ViewSnapshot, VisualizationModel};
use echocore::interface::{PresentationSink, TickFrame};
use echocore::AnalysisResult;
use log::{error, info};
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

/// Presentation sink that keeps the latest state and serves it over HTTP.
#[derive(Clone, Default)]
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
}

impl GuiBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `GET /snapshot` and `GET /result` on a background thread.
    pub fn serve(&self, address: SocketAddr) {
        let state_for_filter = self.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());

        let snapshot_route = warp::path("snapshot")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<VisualizationModel>>| {
                let model = state.read().map(|guard| guard.clone()).unwrap_or_default();
                warp::reply::json(&model)
            });

        let result_route = warp::path("result")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<VisualizationModel>>| {
                let result = state.read().ok().and_then(|guard| guard.result.clone());
                match result {
                    Some(result) => {
                        warp::reply::with_status(warp::reply::json(&result), StatusCode::OK)
                    }
                    None => warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({"status": "pending"})),
                        StatusCode::NOT_FOUND,
                    ),
                }
            });

        thread::spawn(move || {
            let routes = snapshot_route.or(result_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
        info!("[GUI] bridge listening on http://{}", address);
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }

    pub fn snapshot(&self) -> VisualizationModel {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl PresentationSink for GuiBridge {
    fn on_tick(&mut self, frame: &TickFrame<'_>) {
        if let Ok(mut guard) = self.state.write() {
            guard.update_view(ViewSnapshot::from_frame(frame));
        }
    }

    fn on_result(&mut self, result: &AnalysisResult) {
        if let Ok(mut guard) = self.state.write() {
            guard.result = Some(result.clone());
        }
        info!(
            "[GUI] result published: EF {:.1}% across {} views",
            result.ejection_fraction,
            result.per_view.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;
    use echocore::session::CancelSignal;
    use echocore::View;

    #[tokio::test]
    async fn gui_bridge_tracks_both_views_and_result() {
        let runner = Runner::new(WorkflowConfig::from_args(10.0, 0.3, 72.0, 0));
        let mut gui = GuiBridge::new();
        let result = runner
            .run_biplane(&mut gui, &CancelSignal::never())
            .await
            .unwrap();

        let model = gui.snapshot();
        let views: Vec<View> = model.views.iter().map(|v| v.view).collect();
        assert_eq!(views, vec![View::A4c, View::A2c]);
        assert_eq!(model.result, Some(result));
    }
}
