use actix_cors::Cors;
use actix_web::{
    error::InternalError, http::header, middleware::Logger, web, App, HttpResponse, HttpServer,
    Responder,
};
use types::{DrawCardRequest, StartGameRequest};

use crate::{appstate::AppState, database::Database, deck::DeckGenerator, game::GameError};

mod types;

const STORE_FAILURE_MESSAGE: &str = "Failed to reach the session store";

pub struct Server;

impl Server {
    pub async fn run<D, G>(app_state: AppState<D, G>, port: u16) -> Result<(), std::io::Error>
    where
        D: Database + Send + 'static,
        G: DeckGenerator + Send + Sync + 'static,
    {
        let state = web::Data::new(app_state);
        log::info!("Server is running on http://localhost:{}", port);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(cors())
                .app_data(state.clone())
                .configure(routes::<D, G>)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Any origin may call with credentials, limited to the methods the API uses.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .supports_credentials()
}

pub fn routes<D, G>(cfg: &mut web::ServiceConfig)
where
    D: Database + Send + 'static,
    G: DeckGenerator + Send + Sync + 'static,
{
    cfg.app_data(
        web::JsonConfig::default()
            .content_type_required(false)
            .error_handler(|err, _req| {
                log::debug!("Rejecting request body, {}", err);
                InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().body("Invalid request body"),
                )
                .into()
            }),
    )
    .route("/api/startGame", web::post().to(start_game::<D, G>))
    .route("/api/drawCard", web::post().to(draw_card::<D, G>))
    .route("/api/getLeaderboard", web::get().to(get_leaderboard::<D, G>));
}

fn error_response(e: GameError) -> HttpResponse {
    match e {
        GameError::InvalidInput(_) | GameError::EmptyDeck => {
            HttpResponse::BadRequest().body(e.to_string())
        }
        GameError::UserNotFound(_) => HttpResponse::NotFound().body(e.to_string()),
        GameError::StoreUnavailable(_) => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().body(STORE_FAILURE_MESSAGE)
        }
    }
}

async fn start_game<D, G>(
    app_state: web::Data<AppState<D, G>>,
    request: web::Json<StartGameRequest>,
) -> impl Responder
where
    D: Database + Send + 'static,
    G: DeckGenerator + Send + Sync + 'static,
{
    let request = request.into_inner();
    match app_state
        .engine()
        .start_game(&request.username, request.points)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(e),
    }
}

async fn draw_card<D, G>(
    app_state: web::Data<AppState<D, G>>,
    request: web::Json<DrawCardRequest>,
) -> impl Responder
where
    D: Database + Send + 'static,
    G: DeckGenerator + Send + Sync + 'static,
{
    let request = request.into_inner();
    match app_state
        .engine()
        .draw_card(&request.username, request.deck)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(e),
    }
}

async fn get_leaderboard<D, G>(app_state: web::Data<AppState<D, G>>) -> impl Responder
where
    D: Database + Send + 'static,
    G: DeckGenerator + Send + Sync + 'static,
{
    match app_state.leaderboard().list().await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};

    use super::{cors, routes, STORE_FAILURE_MESSAGE};
    use crate::{
        appstate::{new_testing_appstate, AppState},
        config::SeedPolicy,
        database::{DatabaseConnection, MockDatabase},
        deck::MockDeckGenerator,
    };

    fn testing_data() -> web::Data<AppState<DatabaseConnection, MockDeckGenerator>> {
        web::Data::new(new_testing_appstate().expect("can create test appstate"))
    }

    #[actix_web::test]
    async fn test_game_flow_over_http() {
        let app = test::init_service(
            App::new()
                .app_data(testing_data())
                .configure(routes::<DatabaseConnection, MockDeckGenerator>),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/startGame")
            .set_json(json!({ "username": "alice", "points": 0 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            body,
            json!({
                "deck": ["cat", "bomb", "defuse", "shuffle"],
                "points": 0,
                "message": "Game Started!",
                "gameOver": false,
            })
        );

        let request = test::TestRequest::post()
            .uri("/api/drawCard")
            .set_json(json!({ "username": "alice", "deck": ["bomb", "cat"] }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            body,
            json!({
                "deck": ["bomb"],
                "points": 1,
                "message": "You drew a cat card!",
                "gameOver": false,
            })
        );

        let request = test::TestRequest::post()
            .uri("/api/drawCard")
            .set_json(json!({ "username": "alice", "deck": ["bomb"] }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["points"], json!(0));
        assert_eq!(body["gameOver"], json!(true));
        assert_eq!(body["message"], json!("Game Over! You lost!"));

        let request = test::TestRequest::get()
            .uri("/api/getLeaderboard")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!([{ "username": "alice", "points": 0 }]));
    }

    #[actix_web::test]
    async fn test_bad_requests() {
        let app = test::init_service(
            App::new()
                .app_data(testing_data())
                .configure(routes::<DatabaseConnection, MockDeckGenerator>),
        )
        .await;

        let cases = [
            ("/api/startGame", json!({ "username": "" })),
            ("/api/startGame", json!({ "points": 3 })),
            ("/api/drawCard", json!({ "username": "alice", "deck": [] })),
            ("/api/drawCard", json!({ "username": "alice" })),
            ("/api/drawCard", json!({ "username": "alice", "deck": ["dog"] })),
        ];
        for (uri, payload) in cases {
            let request = test::TestRequest::post()
                .uri(uri)
                .set_json(payload.clone())
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(
                response.status(),
                StatusCode::BAD_REQUEST,
                "{} with {}",
                uri,
                payload
            );
        }

        let request = test::TestRequest::post()
            .uri("/api/startGame")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_store_failure_hides_store_details() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(
                    MockDatabase::default(),
                    MockDeckGenerator::default(),
                    SeedPolicy::Additive,
                )))
                .configure(routes::<MockDatabase, MockDeckGenerator>),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/startGame")
            .set_json(json!({ "username": "alice" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = test::read_body(response).await;
        assert_eq!(&body[..], STORE_FAILURE_MESSAGE.as_bytes());
    }

    #[actix_web::test]
    async fn test_points_overflow_is_a_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(testing_data())
                .configure(routes::<DatabaseConnection, MockDeckGenerator>),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/startGame")
            .set_json(json!({ "username": "alice", "points": i64::MAX }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let request = test::TestRequest::post()
            .uri("/api/startGame")
            .set_json(json!({ "username": "alice", "points": 1 }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_draw_without_game_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(testing_data())
                .configure(routes::<DatabaseConnection, MockDeckGenerator>),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/drawCard")
            .set_json(json!({ "username": "bob", "deck": ["cat"] }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_cors_preflight_allows_credentials() {
        let app = test::init_service(
            App::new()
                .wrap(cors())
                .app_data(testing_data())
                .configure(routes::<DatabaseConnection, MockDeckGenerator>),
        )
        .await;

        let request = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/api/startGame")
            .insert_header(("origin", "http://example.com"))
            .insert_header(("access-control-request-method", "POST"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(
            headers
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some("http://example.com")
        );
        assert_eq!(
            headers
                .get("access-control-allow-credentials")
                .and_then(|value| value.to_str().ok()),
            Some("true")
        );
    }
}
