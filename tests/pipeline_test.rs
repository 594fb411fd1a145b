//! End-to-end pipeline tests: snapshot build, ranked recommendation flow,
//! determinism, and the serving-boundary JSON shape.

use affinity_engine::{
    DatasetSnapshot, EmbeddingModel, EngineConfig, EngineError, ModelParameters, RatingRecord,
    RecommendationPipeline, ScoringModel, SnapshotStore,
};

/// Sparse rating table over 10 users and 10 items: user `u` rates item `i`
/// when `(u + i) % 10 < 6`, so every user has 6 ratings, every item has 6
/// ratings, and every user has 4 unseen candidate items.
fn ratings() -> Vec<RatingRecord> {
    let mut records = Vec::new();
    for u in 0..10 {
        for i in 0..10 {
            if (u + i) % 10 < 6 {
                records.push(
                    RatingRecord::new(
                        format!("user-{u}"),
                        format!("item-{i}"),
                        ((u + 2 * i) % 5 + 1) as f32,
                        format!("Title {i}"),
                    )
                    .with_image_url(format!("http://img.example/{i}")),
                );
            }
        }
    }
    records
}

/// Same table restricted to the first 8 users: a stale dataset version with
/// a smaller user population.
fn stale_ratings() -> Vec<RatingRecord> {
    ratings()
        .into_iter()
        .filter(|r| r.user_id.as_str() < "user-8")
        .collect()
}

fn config() -> EngineConfig {
    EngineConfig::default()
        .with_min_user_support(4)
        .with_min_item_support(4)
        .with_top_n(3)
        .with_top_history_count(2)
}

/// Deterministic embedding model sized to the snapshot's encoding.
fn model_for(snapshot: &DatasetSnapshot) -> EmbeddingModel {
    let num_users = snapshot.encoding().num_users();
    let num_items = snapshot.encoding().num_items();
    let k = 4;

    let weight = |row: usize, col: usize, salt: usize| {
        (((row * 31 + col * 17 + salt) % 13) as f32 / 13.0) - 0.5
    };

    let params = ModelParameters {
        num_users,
        num_items,
        embedding_size: k,
        user_factors: (0..num_users * k).map(|v| weight(v / k, v % k, 1)).collect(),
        item_factors: (0..num_items * k).map(|v| weight(v / k, v % k, 2)).collect(),
        user_bias: (0..num_users).map(|u| weight(u, 0, 3)).collect(),
        item_bias: (0..num_items).map(|i| weight(i, 0, 4)).collect(),
    };

    EmbeddingModel::from_parameters(params).expect("consistent parameters")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_end_to_end_recommendation() {
    init_tracing();
    let snapshot = DatasetSnapshot::build(ratings(), &config());
    let model = model_for(&snapshot);
    let pipeline = RecommendationPipeline::new(config());

    let result = pipeline.recommend(&snapshot, &model, "user-3").unwrap();

    // user-3 rated items 0, 1, 2, 7, 8, 9; candidates are 3, 4, 5, 6.
    assert_eq!(result.bought_items.len(), 2);
    assert_eq!(result.recommended_items.len(), 3);

    let rated = ["item-0", "item-1", "item-2", "item-7", "item-8", "item-9"];
    for item in &result.recommended_items {
        assert!(!rated.contains(&item.item_id.as_str()));
        assert!(item.image_url.is_some());
        assert!(item.title.starts_with("Title"));
    }
    for item in &result.bought_items {
        assert!(rated.contains(&item.item_id.as_str()));
    }
}

#[test]
fn test_recommendations_exclude_rated_items() {
    // An extra user rating only three items still clears a lowered support
    // threshold and must never get those three back.
    let mut records = ratings();
    for i in 0..3 {
        records.push(RatingRecord::new(
            "user-extra",
            format!("item-{i}"),
            5.0,
            format!("Title {i}"),
        ));
    }
    let cfg = config().with_min_user_support(3);
    let snapshot = DatasetSnapshot::build(records, &cfg);
    let model = model_for(&snapshot);
    let pipeline = RecommendationPipeline::new(cfg);

    let result = pipeline.recommend(&snapshot, &model, "user-extra").unwrap();

    let recommended: Vec<&str> = result
        .recommended_items
        .iter()
        .map(|i| i.item_id.as_str())
        .collect();
    assert_eq!(recommended.len(), 3);
    for rated in ["item-0", "item-1", "item-2"] {
        assert!(!recommended.contains(&rated));
    }
}

#[test]
fn test_identical_runs_produce_identical_results() {
    let records = ratings();

    let run = |records: Vec<RatingRecord>| {
        let snapshot = DatasetSnapshot::build(records, &config());
        let model = model_for(&snapshot);
        let pipeline = RecommendationPipeline::new(config());
        pipeline.recommend(&snapshot, &model, "user-1").unwrap()
    };

    let first = run(records.clone());
    let second = run(records);

    assert_eq!(first.bought_items, second.bought_items);
    assert_eq!(first.recommended_items, second.recommended_items);
}

#[test]
fn test_unknown_user_surfaces() {
    let snapshot = DatasetSnapshot::build(ratings(), &config());
    let model = model_for(&snapshot);
    let pipeline = RecommendationPipeline::new(config());

    let result = pipeline.recommend(&snapshot, &model, "nobody");
    assert!(matches!(result, Err(EngineError::UnknownUser(_))));
}

#[test]
fn test_stale_model_rejected_before_scoring() {
    let snapshot = DatasetSnapshot::build(ratings(), &config());
    let stale_snapshot = DatasetSnapshot::build(stale_ratings(), &config());
    let stale_model = model_for(&stale_snapshot);
    let pipeline = RecommendationPipeline::new(config());

    assert_ne!(
        stale_snapshot.encoding().num_users(),
        snapshot.encoding().num_users()
    );

    let result = pipeline.recommend(&snapshot, &stale_model, "user-1");
    assert!(matches!(
        result,
        Err(EngineError::ModelDimensionMismatch { .. })
    ));
}

#[test]
fn test_snapshot_store_swap() {
    let store = SnapshotStore::new(DatasetSnapshot::build(ratings(), &config()));
    let pipeline = RecommendationPipeline::new(config());

    let before = store.current();
    let model = model_for(&before);
    assert!(pipeline.recommend(&before, &model, "user-0").is_ok());

    // Refreshed data swaps in atomically; the Arc held by the in-flight
    // request stays valid and unchanged.
    store.replace(DatasetSnapshot::build(stale_ratings(), &config()));
    assert_eq!(before.encoding().num_users(), 10);
    assert_eq!(store.current().encoding().num_users(), 8);
}

#[test]
fn test_result_serializes_to_json() {
    let snapshot = DatasetSnapshot::build(ratings(), &config());
    let model = model_for(&snapshot);
    let pipeline = RecommendationPipeline::new(config());

    let result = pipeline.recommend(&snapshot, &model, "user-2").unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["bought_items"].is_array());
    assert!(json["recommended_items"].is_array());
    assert!(json["generated_at"].is_string());
    assert_eq!(
        json["recommended_items"][0]["item_id"],
        result.recommended_items[0].item_id
    );
}

#[test]
fn test_training_samples_follow_split() {
    let snapshot = DatasetSnapshot::build(ratings(), &config());
    let pipeline = RecommendationPipeline::new(config().with_train_fraction(0.5));

    let (train, validation, bounds) = pipeline.training_samples(&snapshot);
    assert_eq!(train.len(), 30);
    assert_eq!(validation.len(), 30);
    assert!(bounds.min < bounds.max);
    for sample in train.iter().chain(&validation) {
        assert!((0.0..=1.0).contains(&sample.rating));
        assert!(sample.user_index < snapshot.encoding().num_users());
        assert!(sample.item_index < snapshot.encoding().num_items());
    }
}

#[test]
fn test_empty_dataset_pipeline_does_not_crash() {
    let snapshot = DatasetSnapshot::build(Vec::new(), &config());
    let model = EmbeddingModel::from_parameters(ModelParameters {
        num_users: 0,
        num_items: 0,
        embedding_size: 4,
        user_factors: Vec::new(),
        item_factors: Vec::new(),
        user_bias: Vec::new(),
        item_bias: Vec::new(),
    })
    .unwrap();
    let pipeline = RecommendationPipeline::new(config());

    assert_eq!(model.num_users(), 0);
    let result = pipeline.recommend(&snapshot, &model, "anyone");
    assert!(matches!(result, Err(EngineError::UnknownUser(_))));

    let (train, validation, _) = pipeline.training_samples(&snapshot);
    assert!(train.is_empty());
    assert!(validation.is_empty());
}
