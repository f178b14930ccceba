use shoplens_embed::{default_embedder, Embedder, HashEmbedder, EMBEDDING_DIM};

#[test]
fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::default();
    let texts = vec![
        "waterproof trail shoes".to_string(),
        "waterproof trail shoes".to_string(),
    ];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), EMBEDDING_DIM);

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn hash_embedder_is_case_insensitive_but_content_sensitive() {
    let embedder = HashEmbedder::default();
    let embs = embedder
        .embed_batch(&[
            "Trail Shoes".to_string(),
            "trail shoes".to_string(),
            "road shoes".to_string(),
        ])
        .expect("embed_batch");

    assert_eq!(embs[0], embs[1], "case differences do not change the vector");
    assert_ne!(embs[0], embs[2], "different tokens change the vector");
}

#[test]
fn default_embedder_honors_hash_override() {
    std::env::set_var("APP_USE_HASH_EMBEDDINGS", "1");
    let embedder = default_embedder().expect("embedder");
    assert_eq!(embedder.dim(), EMBEDDING_DIM);
}
