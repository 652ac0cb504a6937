use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use markov_core::model::graph::{SENTENCE_ORDER, TransitionGraph};
use serde::Deserialize;

/// Struct representing query parameters for the `/v1/train` endpoint
#[derive(Deserialize)]
struct TrainParams {
	text: String,
}

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	max_len: Option<usize>,
	prompt: Option<String>,
	weighted: Option<bool>,
}

/// Struct representing query parameters for the `/v1/order` endpoint
#[derive(Deserialize)]
struct OrderParams {
	k: i32,
}

struct SharedData {
	graph: TransitionGraph,
}

/// HTTP PUT endpoint `/v1/train`
///
/// Trains the shared graph on the submitted text, using the sentence or
/// n-gram strategy matching the graph's order.
/// Returns the number of nodes the text added.
#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<SharedData>>, query: web::Query<TrainParams>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let before = shared_data.graph.size();
	shared_data.graph.train(&query.text);
	let added = shared_data.graph.size() - before;

	HttpResponse::Ok().body(format!("Added {added} nodes"))
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a sequence from the shared graph based on query parameters.
/// The prompt only seeds n-gram generation; `weighted` only affects
/// sentence-mode generation.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let max_len = query.max_len.unwrap_or(25);
	let weighted = query.weighted.unwrap_or(true);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let generated = shared_data.graph.generate(max_len, query.prompt.as_deref(), weighted);
	HttpResponse::Ok().body(generated)
}

/// HTTP PUT endpoint `/v1/order`
///
/// Replaces the whole model with a freshly configured one. Previous
/// training is erased; the swap happens atomically under the lock.
/// Invalid orders (anything below 1 other than -1) are rejected here,
/// the core never validates them.
#[put("/v1/order")]
async fn put_order(data: web::Data<Mutex<SharedData>>, query: web::Query<OrderParams>) -> impl Responder {
	if query.k < 1 && query.k != SENTENCE_ORDER {
		return HttpResponse::BadRequest().body("Order must be greater than zero or -1");
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	shared_data.graph = TransitionGraph::new(query.k);
	HttpResponse::Ok().body(format!("Model remade with order k={}", query.k))
}

/// HTTP GET endpoint `/v1/graph`
///
/// Returns the full weighted graph as JSON, for external renderers.
#[get("/v1/graph")]
async fn get_graph(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(shared_data.graph.snapshot())
}

/// HTTP GET endpoint `/v1/size`
///
/// Returns the number of distinct tokens known to the graph.
#[get("/v1/size")]
async fn get_size(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.graph.size().to_string())
}

/// Main entry point for the server.
///
/// Wraps a single transition graph in a `Mutex` for thread safety
/// (the graph itself is single-threaded by contract) and starts an
/// Actix-web HTTP server exposing the session-level commands.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - The initial order is hardcoded to 2 and should be made configurable.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData {
		graph: TransitionGraph::new(2),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(put_train)
			.service(get_generated)
			.service(put_order)
			.service(get_graph)
			.service(get_size)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
