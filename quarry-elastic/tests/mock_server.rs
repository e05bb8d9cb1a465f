use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use quarry_core::{Direction, SearchConfig, SearchError, Searcher};
use quarry_elastic::{ElasticClient, ElasticSearch, IndexQuery};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    id: u64,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Pet {
    name: String,
}

#[derive(Default)]
struct Engine {
    indices: HashMap<String, (u64, Vec<Value>)>,
    calls: Mutex<Vec<(String, String, Value)>>,
}

impl Engine {
    fn calls(&self) -> Vec<(String, String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn operations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|(index, operation, _)| format!("{index}/{operation}"))
            .collect()
    }
}

async fn handle(
    State(engine): State<Arc<Engine>>,
    Path((index, operation)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    engine
        .calls
        .lock()
        .unwrap()
        .push((index.clone(), operation.clone(), body));

    if index == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let Some((count, docs)) = engine.indices.get(&index) else {
        let doc = json!({ "error": { "type": "index_not_found_exception" }, "status": 404 });
        return (StatusCode::OK, Json(doc)).into_response();
    };

    match operation.as_str() {
        "_count" => Json(json!({ "count": count })).into_response(),
        "_search" => {
            let hits: Vec<Value> = docs
                .iter()
                .map(|doc| json!({ "_index": index, "_source": doc }))
                .collect();
            Json(json!({ "took": 1, "hits": { "total": count, "hits": hits } })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn start(engine: Engine) -> (ElasticClient, Arc<Engine>) {
    let engine = Arc::new(engine);
    let app = Router::new()
        .route("/{index}/{operation}", post(handle))
        .with_state(engine.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let client = ElasticClient::new(&format!("http://{addr}")).unwrap();
    (client, engine)
}

fn people_engine(count: u64) -> Engine {
    let mut engine = Engine::default();
    engine.indices.insert(
        "people".into(),
        (
            count,
            vec![json!({ "id": 3, "name": "joana" }), json!({ "id": 4, "name": "pedro" })],
        ),
    );
    engine
        .indices
        .insert("pets".into(), (1, vec![json!({ "name": "rex" })]));
    engine
}

fn searcher() -> Searcher {
    Searcher::new(SearchConfig::default())
}

#[tokio::test]
async fn test_body_dsl_window_and_links() {
    let (client, engine) = start(people_engine(5)).await;
    let result = searcher()
        .elastic::<Person>(client, IndexQuery::new("people"))
        .filters(["last_name"])
        .search_filters(["first_name", "last_name"])
        .query([("last_name", "silva"), ("role", "admin"), ("search", "jo"), ("page", "2"), ("size", "2")])
        .order_by("age", Direction::Asc)
        .order_by("last_name", Direction::Desc)
        .path("/people")
        .exec()
        .await
        .unwrap();

    assert_eq!(result.result.len(), 2);
    assert_eq!(result.result[0].name, "joana");
    let pagination = result.pagination.unwrap();
    assert_eq!(pagination.previous.as_deref(), Some("/people?page=1&size=2"));
    assert_eq!(pagination.last.as_deref(), Some("/people?page=3&size=2"));

    let calls = engine.calls();
    assert_eq!(engine.operations(), vec!["people/_count", "people/_search"]);

    let must = json!([
        { "term": { "last_name": "silva" } },
        { "query_string": { "query": "jo", "fields": ["first_name", "last_name"] } }
    ]);
    assert_eq!(calls[0].2, json!({ "query": { "bool": { "must": must.clone() } } }));
    assert_eq!(
        calls[1].2,
        json!({
            "query": { "bool": { "must": must } },
            "from": 2,
            "size": 2,
            "sort": [{ "age": { "order": "asc" } }, { "last_name": { "order": "desc" } }]
        })
    );
}

#[tokio::test]
async fn test_zero_count_short_circuits() {
    let (client, engine) = start(people_engine(0)).await;
    let seed = Person {
        id: 0,
        name: "seed".into(),
    };
    let result = searcher()
        .elastic::<Person>(client, IndexQuery::new("people"))
        .bind(vec![seed.clone()])
        .metadata("pets", IndexQuery::new("pets"), Vec::<Pet>::new())
        .exec()
        .await
        .unwrap();

    assert_eq!(result.result, vec![seed]);
    assert!(result.pagination.unwrap().is_empty());
    assert_eq!(engine.operations(), vec!["people/_count"]);
}

#[tokio::test]
async fn test_metadata_statement_runs_against_its_index() {
    let (client, engine) = start(people_engine(2)).await;
    let base = IndexQuery::new("people").query(json!({ "range": { "id": { "gte": 1 } } }));
    let result = searcher()
        .elastic::<Person>(client, base)
        .metadata(
            "pets",
            IndexQuery::new("pets").sort("name", Direction::Asc),
            Vec::<Pet>::new(),
        )
        .exec()
        .await
        .unwrap();

    let pets: Vec<Pet> = result.metadata_as("pets").unwrap().unwrap();
    assert_eq!(pets, vec![Pet { name: "rex".into() }]);
    assert_eq!(
        engine.operations(),
        vec!["people/_count", "people/_search", "pets/_search"]
    );

    let calls = engine.calls();
    assert_eq!(calls[0].2["query"]["bool"]["must"][0]["range"]["id"]["gte"], 1);
    assert_eq!(calls[2].2["sort"][0]["name"]["order"], "asc");
}

#[tokio::test]
async fn test_without_pagination_skips_count() {
    let (client, engine) = start(people_engine(2)).await;
    let result = searcher()
        .elastic::<Person>(client, IndexQuery::new("people"))
        .without_pagination()
        .exec()
        .await
        .unwrap();

    assert_eq!(result.result.len(), 2);
    assert!(result.pagination.is_none());
    assert_eq!(engine.operations(), vec!["people/_search"]);
}

#[tokio::test]
async fn test_failure_status_is_returned() {
    let (client, _engine) = start(people_engine(2)).await;
    let err = searcher()
        .elastic::<Person>(client, IndexQuery::new("broken"))
        .exec()
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Status { status: 500, ref body } if body == "boom"));
}

#[tokio::test]
async fn test_error_document_is_returned() {
    let (client, _engine) = start(people_engine(2)).await;
    let err = searcher()
        .elastic::<Person>(client, IndexQuery::new("missing"))
        .without_pagination()
        .exec()
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_metadata_failure_aborts() {
    let (client, engine) = start(people_engine(2)).await;
    let err = searcher()
        .elastic::<Person>(client, IndexQuery::new("people"))
        .metadata("first", IndexQuery::new("pets"), Vec::<Pet>::new())
        .metadata("second", IndexQuery::new("broken"), Vec::<Pet>::new())
        .metadata("third", IndexQuery::new("pets"), Vec::<Pet>::new())
        .exec()
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Status { status: 500, .. }));
    assert_eq!(
        engine.operations(),
        vec!["people/_count", "people/_search", "pets/_search", "broken/_search"]
    );
}

#[tokio::test]
async fn test_decode_failure() {
    let mut engine = Engine::default();
    engine
        .indices
        .insert("people".into(), (1, vec![json!({ "id": "not-a-number" })]));
    let (client, _engine) = start(engine).await;
    let err = searcher()
        .elastic::<Person>(client, IndexQuery::new("people"))
        .exec()
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Decode(_)));
}

fn crowded_engine(count: u64) -> Engine {
    let mut engine = Engine::default();
    let docs = (1..=count)
        .map(|id| json!({ "id": id, "name": format!("person-{id}") }))
        .collect();
    engine.indices.insert("people".into(), (count, docs));
    engine
}

#[tokio::test]
async fn test_unset_size_requests_every_match() {
    let (client, engine) = start(crowded_engine(25)).await;
    let result = searcher()
        .elastic::<Person>(client, IndexQuery::new("people"))
        .path("/people")
        .exec()
        .await
        .unwrap();

    assert_eq!(result.result.len(), 25);
    assert!(result.pagination.unwrap().is_empty());
    assert_eq!(engine.calls()[1].2["size"], 25);
}

#[tokio::test]
async fn test_unset_size_without_count_uses_client_window() {
    let (client, engine) = start(crowded_engine(25)).await;
    let result = searcher()
        .elastic::<Person>(client.with_max_window(40), IndexQuery::new("people"))
        .without_pagination()
        .metadata("again", IndexQuery::new("people"), Vec::<Person>::new())
        .exec()
        .await
        .unwrap();

    assert_eq!(result.result.len(), 25);
    let calls = engine.calls();
    assert_eq!(engine.operations(), vec!["people/_search", "people/_search"]);
    assert_eq!(calls[0].2["size"], 40);
    assert_eq!(calls[1].2["size"], 40);
}
