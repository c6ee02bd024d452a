use std::path::{Path, PathBuf};
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, middleware, post, put, web, App, HttpResponse, HttpServer, Responder};

use log::{error, info};
use markov_gen_core::io::{list_files, read_folder};
use markov_gen_core::similarity::rank_pairs;
use markov_gen_core::{ChainError, Generator, SentenceOptions};
use serde::Deserialize;

mod config;

use config::ServerConfig;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	maxlen: Option<usize>,
	min_words: Option<usize>,
	complete: Option<bool>,
	nb_try: Option<usize>,
}

#[derive(Deserialize)]
struct ModelQuery {
	names: Option<String>,
	order: Option<usize>,
}

#[derive(Deserialize)]
struct SnapshotQuery {
	name: Option<String>,
}

#[derive(Deserialize)]
struct SimilarityQuery {
	names: Option<String>,
	top: Option<usize>,
}

struct SharedData {
	generator: Generator,
	data_dir: PathBuf,
}

impl SharedData {
	fn new(data_dir: PathBuf, order: usize) -> Result<Self, ChainError> {
		Ok(Self { generator: Generator::new(order)?, data_dir })
	}
}

impl GenerateParams {
	/// Builds the sentence policy, rejecting a zero `maxlen`.
	fn options(&self) -> Result<SentenceOptions, String> {
		let mut options = SentenceOptions::default();
		if let Some(maxlen) = self.maxlen {
			options.set_maxlen(maxlen)?;
		}
		options.min_words = self.min_words.unwrap_or(0);
		options.require_terminal = self.complete.unwrap_or(false);
		options.nb_try = self.nb_try.unwrap_or(if options.require_terminal { 5 } else { 0 });
		Ok(options)
	}
}

/// Splits a comma separated list of corpus names.
///
/// Names may only hold ASCII letters, digits, `-` and `_`, so they can never
/// escape the data folder.
fn parse_names(raw: Option<&String>) -> Result<Vec<&str>, String> {
	let names: Vec<&str> = match raw {
		Some(s) => s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
		None => Vec::new(),
	};
	if names.is_empty() {
		return Err("Missing or empty model name".to_owned());
	}
	if let Some(bad) = names.iter().find(|n| !n.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')) {
		return Err(format!("Invalid model name: {bad}"));
	}
	Ok(names)
}

fn corpus_path(data_dir: &Path, name: &str) -> PathBuf {
	data_dir.join(format!("{name}.txt"))
}

fn snapshot_path(data_dir: &Path, name: &str) -> PathBuf {
	data_dir.join(format!("{name}.chain"))
}

/// Maps a core error to an HTTP response.
fn error_response(e: ChainError) -> HttpResponse {
	match &e {
		ChainError::EmptyOpeners => HttpResponse::Conflict().body(e.to_string()),
		ChainError::InvalidOrder(_) | ChainError::InvalidMaxLen | ChainError::InvalidPunctuation(_) => {
			HttpResponse::BadRequest().body(e.to_string())
		}
		ChainError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => HttpResponse::NotFound().body(e.to_string()),
		_ => {
			error!("{e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates one sentence from the current chain.
/// `complete=true` retries (default 5 times) until the sentence ends with
/// terminal punctuation and has at least `min_words` words.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let options = match query.options() {
		Ok(o) => o,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.generator.sentence(&options) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => error_response(e),
	}
}

/// HTTP GET endpoint `/v1/word`
///
/// Returns the next word of the ongoing walk.
#[get("/v1/word")]
async fn get_word(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.generator.next_word() {
		Ok(word) => HttpResponse::Ok().body(word),
		Err(e) => error_response(e),
	}
}

/// HTTP POST endpoint `/v1/train`
///
/// Trains the current chain with the request body.
#[post("/v1/train")]
async fn post_train(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let added = shared_data.generator.train(&body);
	info!("Trained {} transitions from request body", added);
	HttpResponse::Ok().body(format!("Trained {added} transitions"))
}

#[get("/v1/models")]
async fn get_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_files(&data_dir, "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

#[get("/v1/loaded_models")]
async fn get_loaded_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.generator.source_names().join("\n"))
}

/// HTTP PUT endpoint `/v1/load_models`
///
/// Replaces the chain by one trained on the named corpora. The current chain
/// is kept if any corpus fails to load.
#[put("/v1/load_models")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let model_names = match parse_names(query.names.as_ref()) {
		Ok(n) => n,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let order = query.order.unwrap_or(shared_data.generator.order());
	let mut generator = match Generator::new(order) {
		Ok(g) => g,
		Err(e) => return error_response(e),
	};
	for name in model_names {
		if let Err(e) = generator.train_file(corpus_path(&shared_data.data_dir, name)) {
			return error_response(e);
		}
	}

	shared_data.generator = generator;
	HttpResponse::Ok().body("Models loaded successfully")
}

/// HTTP PUT endpoint `/v1/save`
///
/// Writes the current chain to `<data>/<name>.chain`.
#[put("/v1/save")]
async fn put_save(data: web::Data<Mutex<SharedData>>, query: web::Query<SnapshotQuery>) -> impl Responder {
	let name = match parse_names(query.name.as_ref()) {
		Ok(n) if n.len() == 1 => n[0],
		Ok(_) => return HttpResponse::BadRequest().body("Exactly one name expected"),
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.generator.save(snapshot_path(&shared_data.data_dir, name)) {
		Ok(()) => HttpResponse::Ok().body("Chain saved"),
		Err(e) => error_response(e),
	}
}

/// HTTP PUT endpoint `/v1/load`
///
/// Replaces the current chain with `<data>/<name>.chain`.
#[put("/v1/load")]
async fn put_load(data: web::Data<Mutex<SharedData>>, query: web::Query<SnapshotQuery>) -> impl Responder {
	let name = match parse_names(query.name.as_ref()) {
		Ok(n) if n.len() == 1 => n[0],
		Ok(_) => return HttpResponse::BadRequest().body("Exactly one name expected"),
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let path = snapshot_path(&shared_data.data_dir, name);
	match shared_data.generator.load(path) {
		Ok(()) => HttpResponse::Ok().body("Chain loaded"),
		Err(e) => error_response(e),
	}
}

/// HTTP GET endpoint `/v1/similarity`
///
/// Ranks pairs of the named corpora (all corpora when `names` is absent)
/// by shared vocabulary.
#[get("/v1/similarity")]
async fn get_similarity(data: web::Data<Mutex<SharedData>>, query: web::Query<SimilarityQuery>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let mut documents = match read_folder(&data_dir, "txt") {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Failed to read models"),
	};
	if query.names.is_some() {
		let names = match parse_names(query.names.as_ref()) {
			Ok(n) => n,
			Err(e) => return HttpResponse::BadRequest().body(e),
		};
		documents.retain(|(name, _)| names.contains(&name.as_str()));
	}

	let ranking = rank_pairs(&documents);
	let lines: Vec<String> = ranking
		.top_by_similarity(query.top.unwrap_or(5))
		.into_iter()
		.map(|p| {
			format!(
				"{} and {} have {} words in common and are {:.2}% similar.",
				p.first,
				p.second,
				p.similarity.shared_words,
				p.similarity.ratio * 100.0
			)
		})
		.collect();
	HttpResponse::Ok().body(lines.join("\n"))
}

/// Main entry point for the server.
///
/// Starts with an untrained chain of the configured order, wraps it in a
/// `Mutex` and serves the `/v1` endpoints.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = ServerConfig::from_env();
	let shared_data = SharedData::new(config.data_dir.clone(), config.order)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("Serving {} on {}:{}", config.data_dir.display(), config.host, config.port);
	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_word)
			.service(post_train)
			.service(get_models)
			.service(put_model)
			.service(get_loaded_models)
			.service(put_save)
			.service(put_load)
			.service(get_similarity)
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;

	fn shared(dir: &Path) -> web::Data<Mutex<SharedData>> {
		web::Data::new(Mutex::new(SharedData::new(dir.to_path_buf(), 1).unwrap()))
	}

	#[actix_web::test]
	async fn untrained_chain_is_a_conflict() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(dir.path())).service(get_generated)).await;

		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::CONFLICT);
	}

	#[actix_web::test]
	async fn train_then_generate() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(
			App::new().app_data(shared(dir.path())).service(post_train).service(get_generated),
		)
		.await;

		let req = test::TestRequest::post().uri("/v1/train").set_payload("the cat sat.").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "Trained 3 transitions");

		let req = test::TestRequest::get().uri("/v1/generate?complete=true").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "the cat sat.");
	}

	#[actix_web::test]
	async fn zero_maxlen_is_a_bad_request() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(dir.path())).service(get_generated)).await;

		let req = test::TestRequest::get().uri("/v1/generate?maxlen=0").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn corpora_load_and_snapshot_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("short.txt"), "Hello there.").unwrap();
		let data = shared(dir.path());
		let app = test::init_service(
			App::new()
				.app_data(data.clone())
				.service(put_model)
				.service(put_save)
				.service(put_load)
				.service(get_loaded_models),
		)
		.await;

		let req = test::TestRequest::put().uri("/v1/load_models?names=short&order=1").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/loaded_models").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "short");

		let req = test::TestRequest::put().uri("/v1/save?name=snap").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
		assert!(dir.path().join("snap.chain").exists());

		let req = test::TestRequest::put().uri("/v1/load?name=snap").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/loaded_models").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "");
		assert_eq!(data.lock().unwrap().generator.next_sentence(30).unwrap(), "Hello there.");
	}

	#[actix_web::test]
	async fn unknown_corpus_keeps_current_chain() {
		let dir = tempfile::tempdir().unwrap();
		let data = shared(dir.path());
		data.lock().unwrap().generator.train("kept as is.");
		let app = test::init_service(App::new().app_data(data.clone()).service(put_model)).await;

		let req = test::TestRequest::put().uri("/v1/load_models?names=missing").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::put().uri("/v1/load_models?names=../etc").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		assert_eq!(data.lock().unwrap().generator.next_sentence(30).unwrap(), "kept as is.");
	}

	#[actix_web::test]
	async fn names_are_validated() {
		assert!(parse_names(None).is_err());
		assert!(parse_names(Some(&" , ".to_owned())).is_err());
		assert!(parse_names(Some(&"a/b".to_owned())).is_err());
		assert_eq!(parse_names(Some(&"alice, rocks".to_owned())).unwrap(), vec!["alice", "rocks"]);
	}
}
