//! HTTP server for the RAG system

pub mod routes;
pub mod state;

use axum::Router;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::Result;
use state::AppState;

/// RAG HTTP Server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a new RAG server, building the retrieval index
    pub async fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Create from prepared state
    pub fn with_state(config: RagConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let router = routes::api_routes()
            .with_state(self.state.clone())
            // Middleware layers (order matters - applied bottom to top)
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if !self.config.server.enable_cors {
            return router;
        }

        // CORS layer - outermost
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors)
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting RAG server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceMetric;
    use crate::generation::ModelChain;
    use crate::ingestion::{load_snapshot, DocumentFormatter};
    use crate::orchestrator::AnswerOrchestrator;
    use crate::rate_limit::SlidingWindowLimiter;
    use crate::retrieval::{ContextRetriever, RetrievalIndex};
    use crate::test_support::{HashingEmbedder, MemoryRecordSource, Reply, ScriptedLlm};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const MODEL: &str = "gemini-1.5-flash";

    fn widget_source() -> MemoryRecordSource {
        MemoryRecordSource::default().with_table(
            "products",
            vec![json!({"sku_id": "A1", "product_name": "Widget", "unit_price": 100})],
        )
    }

    async fn server_with(
        source: MemoryRecordSource,
        llm: Arc<ScriptedLlm>,
        max_requests: usize,
    ) -> RagServer {
        let records = load_snapshot(&source).await.unwrap();
        let index = RetrievalIndex::build(
            DocumentFormatter::format(&records),
            Arc::new(HashingEmbedder::new(64)),
            DistanceMetric::Cosine,
        )
        .await
        .unwrap();

        let orchestrator = AnswerOrchestrator::new(
            ContextRetriever::new(Arc::new(index)),
            llm,
            ModelChain::new(vec![MODEL.to_string()], Duration::from_millis(200)),
            SlidingWindowLimiter::new(Duration::from_secs(60), max_requests),
            3,
        );

        let state = AppState::from_parts(Arc::new(source), orchestrator);
        RagServer::with_state(RagConfig::default(), state)
    }

    fn answering_llm() -> Arc<ScriptedLlm> {
        Arc::new(ScriptedLlm::new().reply(MODEL, Reply::Text("Widget costs ₹100.".into())))
    }

    fn ask_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let llm = answering_llm();
        let router = server_with(widget_source(), llm.clone(), 30).await.build_router();

        let response = router
            .oneshot(ask_request(
                r#"{"question": "What is the price of Widget?", "chat_history": []}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"answer": "Widget costs ₹100."}));
        assert!(llm.prompts()[0].contains("Unit Price: ₹100"));
    }

    #[tokio::test]
    async fn test_ask_missing_question() {
        let router = server_with(widget_source(), answering_llm(), 30).await.build_router();

        let response = router.oneshot(ask_request(r#"{"chat_history": []}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No question provided."}));
    }

    #[tokio::test]
    async fn test_ask_malformed_body() {
        let router = server_with(widget_source(), answering_llm(), 30).await.build_router();

        let response = router.oneshot(ask_request("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_ask_rate_limited() {
        let router = server_with(widget_source(), answering_llm(), 1).await.build_router();
        let body = r#"{"question": "price?"}"#;

        let first = router.clone().oneshot(ask_request(body)).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router.oneshot(ask_request(body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            json_body(second).await,
            json!({"error": "Rate limit exceeded. Please try again in a minute."})
        );
    }

    #[tokio::test]
    async fn test_ask_generation_exhausted() {
        let llm = Arc::new(ScriptedLlm::new().reply(MODEL, Reply::Fail("quota".into())));
        let router = server_with(widget_source(), llm, 30).await.build_router();

        let response = router.oneshot(ask_request(r#"{"question": "price?"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Unable to generate response. Please try again later."})
        );
    }

    #[tokio::test]
    async fn test_health_reports_index() {
        let router = server_with(widget_source(), answering_llm(), 30).await.build_router();

        let response = router.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["data_source"], "connected");
        assert_eq!(body["vector_store"], "initialized");
        assert_eq!(body["blocks"], 1);
        assert_eq!(body["models"], json!([MODEL]));
    }

    /// Router with no index over a shared source, so tests can inspect it
    fn router_without_index(source: Arc<MemoryRecordSource>) -> Router {
        let orchestrator = AnswerOrchestrator::new(
            ContextRetriever::absent(),
            answering_llm(),
            ModelChain::new(vec![MODEL.to_string()], Duration::from_millis(200)),
            SlidingWindowLimiter::new(Duration::from_secs(60), 30),
            3,
        );
        let state = AppState::from_parts(source, orchestrator);
        RagServer::with_state(RagConfig::default(), state).build_router()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_unreachable_source() {
        let router = router_without_index(Arc::new(widget_source().failing_on("products")));

        let response = router.oneshot(get("/health")).await.unwrap();

        let body = json_body(response).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["vector_store"], "not initialized");
        assert_eq!(body["blocks"], 0);
    }

    #[tokio::test]
    async fn test_health_checks_without_reading_table() {
        let source = Arc::new(widget_source());
        let router = router_without_index(Arc::clone(&source));

        let response = router.oneshot(get("/health")).await.unwrap();

        assert_eq!(json_body(response).await["data_source"], "connected");
        assert_eq!(source.reachability_checks(), vec!["products"]);
        assert!(source.fetches().is_empty());
    }

    #[tokio::test]
    async fn test_connection_check_success() {
        let router = router_without_index(Arc::new(widget_source()));

        let response = router.oneshot(get("/test-supabase")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"status": "success", "message": "Successfully connected to memory"})
        );
    }

    #[tokio::test]
    async fn test_connection_check_missing_table() {
        let router = router_without_index(Arc::new(widget_source().failing_on("products")));

        let response = router.oneshot(get("/test-supabase")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"status": "error", "message": "Products table does not exist"})
        );
    }

    #[tokio::test]
    async fn test_connection_check_unreachable() {
        let router = router_without_index(Arc::new(widget_source().offline()));

        let response = router.oneshot(get("/test-supabase")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_root_banner() {
        let router = server_with(widget_source(), answering_llm(), 30).await.build_router();

        let response = router.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "Dealer RAG API is running.");
    }
}
