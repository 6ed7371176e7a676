//! HTTP front end for the [`Controller`].

use std::{
	io,
	path::Path,
	sync::{Arc, Mutex, PoisonError},
};

use axum::{
	extract::{Path as UrlParam, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
	Json,
	Router,
};
use rgb::RGB8;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, task::JoinError};
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::{config::Http, controller::Controller, Error};

const TITLE: &str = "LED Lights";

#[derive(Clone)]
struct ApiState {
	controller: Arc<Mutex<Controller>>,
}

#[derive(Debug)]
pub enum ApiError {
	Lights(Error),
	Task(JoinError),
}

impl ApiError {
	fn status(&self) -> StatusCode {
		match self {
			ApiError::Lights(
				Error::IndexOutOfRange { .. }
				| Error::UnknownPattern(_)
				| Error::InvalidTiming(_)
				| Error::InvalidSlide(_),
			) => StatusCode::BAD_REQUEST,
			ApiError::Lights(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		ApiError::Lights(e)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let message = match &self {
			ApiError::Lights(e) => e.to_string(),
			ApiError::Task(e) => e.to_string(),
		};
		if status.is_server_error() {
			error!("request failed: {message}");
		}
		(status, message).into_response()
	}
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct PatternEntry {
	name: &'static str,
	display: String,
}

#[derive(Serialize)]
struct Index {
	title: &'static str,
	color: String,
	running: bool,
	patterns: Vec<PatternEntry>,
}

#[derive(Deserialize)]
struct ColorBody {
	r: u8,
	g: u8,
	b: u8,
}

#[derive(Deserialize)]
struct PatternQuery {
	name: Option<String>,
	#[serde(default = "default_delay")]
	delay: f64,
	#[serde(default = "default_pause")]
	pause: f64,
	#[serde(default)]
	rounds: u32,
}

fn default_delay() -> f64 {
	0.1
}

fn default_pause() -> f64 {
	0.5
}

pub fn routes(controller: Arc<Mutex<Controller>>, static_dir: Option<&Path>) -> Router {
	let state = ApiState { controller };

	let router = Router::new()
		.route("/", get(index))
		.route("/lights/on", get(all_on).post(all_on))
		.route("/lights/on/", get(all_on).post(all_on))
		.route("/lights/on/{id}", get(one_on).post(one_on))
		.route("/lights/off", get(all_off).post(all_off))
		.route("/lights/off/", get(all_off).post(all_off))
		.route("/lights/off/{id}", get(one_off).post(one_off))
		.route("/lights/color", get(color).post(color))
		.route("/lights/color/", get(color).post(color))
		.route("/lights/random_color", get(random_color).post(random_color))
		.route("/lights/random_color/", get(random_color).post(random_color))
		.route("/lights/slide/bottom/{value}", get(slide_bottom).post(slide_bottom))
		.route("/lights/slide/top/{value}", get(slide_top).post(slide_top))
		.route("/lights/pattern", get(pattern).post(pattern))
		.route("/lights/stop", get(stop).post(stop))
		.with_state(state);

	match static_dir {
		Some(dir) => router.nest_service("/static", ServeDir::new(dir)),
		None => router,
	}
}

/// Serves the API until Ctrl-C.
pub async fn serve(controller: Arc<Mutex<Controller>>, config: &Http) -> io::Result<()> {
	let listener = TcpListener::bind(&config.bind).await?;
	info!(bind = %config.bind, "listening");

	axum::serve(listener, routes(controller, config.static_dir.as_deref()))
		.with_graceful_shutdown(shutdown_signal())
		.await
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		error!("failed to listen for ctrl-c: {e}");
	}
	info!("shutdown requested");
}

/// Runs `f` on the blocking pool, stopping a pattern can block until its thread exits.
async fn with_controller<T, F>(state: &ApiState, f: F) -> ApiResult<T>
where
	T: Send + 'static,
	F: FnOnce(&mut Controller) -> crate::Result<T> + Send + 'static,
{
	let controller = state.controller.clone();
	tokio::task::spawn_blocking(move || {
		let mut controller = controller.lock().unwrap_or_else(PoisonError::into_inner);
		f(&mut controller)
	})
	.await
	.map_err(ApiError::Task)?
	.map_err(ApiError::from)
}

async fn index(State(state): State<ApiState>) -> ApiResult<Json<Index>> {
	let (color, running) = with_controller(&state, |c| Ok((c.color_hex(), c.pattern_running()))).await?;
	let patterns = Controller::patterns()
		.into_iter()
		.map(|(name, display)| PatternEntry { name, display })
		.collect();

	Ok(Json(Index {
		title: TITLE,
		color,
		running,
		patterns,
	}))
}

async fn all_on(State(state): State<ApiState>) -> ApiResult<()> {
	with_controller(&state, |c| c.lights_on(None)).await
}

async fn one_on(State(state): State<ApiState>, UrlParam(id): UrlParam<usize>) -> ApiResult<()> {
	with_controller(&state, move |c| c.lights_on(Some(&[id][..]))).await
}

async fn all_off(State(state): State<ApiState>) -> ApiResult<()> {
	with_controller(&state, |c| c.lights_off(None)).await
}

async fn one_off(State(state): State<ApiState>, UrlParam(id): UrlParam<usize>) -> ApiResult<()> {
	with_controller(&state, move |c| c.lights_off(Some(&[id][..]))).await
}

async fn color(State(state): State<ApiState>, Json(body): Json<ColorBody>) -> ApiResult<()> {
	let color = RGB8::new(body.r, body.g, body.b);
	with_controller(&state, move |c| c.set_color(color)).await
}

async fn random_color(State(state): State<ApiState>) -> ApiResult<String> {
	with_controller(&state, |c| c.random_color()).await
}

async fn slide_bottom(State(state): State<ApiState>, UrlParam(value): UrlParam<i64>) -> ApiResult<()> {
	with_controller(&state, move |c| c.slide_from_bottom(value)).await
}

async fn slide_top(State(state): State<ApiState>, UrlParam(value): UrlParam<i64>) -> ApiResult<()> {
	with_controller(&state, move |c| c.slide_from_top(value)).await
}

async fn pattern(State(state): State<ApiState>, Query(query): Query<PatternQuery>) -> ApiResult<()> {
	let Some(name) = query.name else {
		return Ok(());
	};
	with_controller(&state, move |c| {
		c.start_pattern(&name, query.delay, query.pause, query.rounds).map(|_| ())
	})
	.await
}

async fn stop(State(state): State<ApiState>) -> ApiResult<()> {
	with_controller(&state, |c| {
		c.stop_pattern();
		Ok(())
	})
	.await
}
