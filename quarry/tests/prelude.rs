use quarry::prelude::*;
use quarry_test::{Call, MemoryAdapter};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Item {
    id: u64,
}

#[tokio::test]
async fn test_searcher_from_config_through_facade() {
    let config = QuarryConfig::from_yaml_str("search:\n  maxsize: 2\n", "test").unwrap();
    let searcher = Searcher::from_config(&config).unwrap();
    let adapter = MemoryAdapter::new("items").with_documents(
        "items",
        [json!({ "id": 1 }), json!({ "id": 2 }), json!({ "id": 3 })],
    );

    let result = searcher
        .handler::<_, Item>(adapter.clone())
        .query([("size", "100")])
        .order_by("id", Direction::Desc)
        .path("/items")
        .exec()
        .await
        .unwrap();

    let ids: Vec<_> = result.result.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(
        result.pagination.unwrap().next.as_deref(),
        Some("/items?page=2&size=2")
    );
    assert!(matches!(
        adapter.calls().last(),
        Some(Call::Load { limit: Some(2), .. })
    ));
}
