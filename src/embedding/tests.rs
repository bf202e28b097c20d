use super::*;
use std::path::PathBuf;

fn norm_of(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

mod config_tests {
    use super::*;

    #[test]
    fn test_embedder_config_default() {
        let config = EmbedderConfig::default();
        assert_eq!(config.embedding_dim, crate::constants::DEFAULT_EMBEDDING_DIM);
        assert!(!config.testing_stub);
        assert!(config.weights_path.as_os_str().is_empty());
    }

    #[test]
    fn test_embedder_config_stub() {
        let config = EmbedderConfig::stub();
        assert!(config.testing_stub);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_embedder_config_validation_empty_path_no_stub() {
        let config = EmbedderConfig::default();
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_embedder_config_validation_nonexistent_path() {
        let config = EmbedderConfig::new("/nonexistent/encoder.safetensors");
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::WeightsNotFound { .. })
        ));
    }

    #[test]
    fn test_embedder_config_zero_dim_rejected() {
        let config = EmbedderConfig {
            embedding_dim: 0,
            ..EmbedderConfig::stub()
        };
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_weights_available_false_for_missing_file() {
        assert!(!EmbedderConfig::default().weights_available());
        assert!(!EmbedderConfig::new("/nonexistent/encoder.safetensors").weights_available());
    }
}

mod stub_tests {
    use super::*;

    fn stub_embedder() -> QueryEmbedder {
        QueryEmbedder::load(EmbedderConfig::stub()).expect("load stub embedder")
    }

    #[test]
    fn test_stub_reports_mode() {
        let embedder = stub_embedder();
        assert!(embedder.is_stub());
        assert!(!embedder.has_model());
    }

    #[test]
    fn test_stub_determinism() {
        let embedder = stub_embedder();
        let ids = vec![2u32, 3, 4, 0, 0];
        assert_eq!(embedder.embed(&ids).unwrap(), embedder.embed(&ids).unwrap());
    }

    #[test]
    fn test_stub_distinct_sequences_distinct_embeddings() {
        let embedder = stub_embedder();
        let a = embedder.embed(&[2, 3, 0, 0]).unwrap();
        let b = embedder.embed(&[4, 5, 0, 0]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stub_is_order_sensitive() {
        let embedder = stub_embedder();
        let a = embedder.embed(&[2, 3]).unwrap();
        let b = embedder.embed(&[3, 2]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stub_output_is_unit_norm() {
        let embedder = stub_embedder();
        let embedding = embedder.embed(&[7, 8, 9]).unwrap();
        assert_eq!(embedding.len(), embedder.embedding_dim());
        assert!((norm_of(&embedding) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_sequence_embeds_to_zero_vector() {
        let embedder = stub_embedder();
        let embedding = embedder.embed(&[]).unwrap();
        assert_eq!(embedding, vec![0.0; embedder.embedding_dim()]);
    }

    #[test]
    fn test_stub_custom_dimension() {
        let config = EmbedderConfig {
            embedding_dim: 16,
            ..EmbedderConfig::stub()
        };
        let embedder = QueryEmbedder::load(config).unwrap();
        assert_eq!(embedder.embed(&[1, 2, 3]).unwrap().len(), 16);
    }

    #[test]
    fn test_embed_batch_matches_individual_calls() {
        let embedder = stub_embedder();
        let sequences = vec![vec![2u32, 3], vec![4, 5, 6], vec![]];
        let batch = embedder.embed_batch(&sequences).unwrap();
        assert_eq!(batch.len(), 3);
        for (ids, embedding) in sequences.iter().zip(&batch) {
            assert_eq!(embedder.embed(ids).unwrap(), *embedding);
        }
    }
}

mod load_tests {
    use super::*;

    #[test]
    fn test_load_missing_weights_errors() {
        let config = EmbedderConfig::new("/definitely/nonexistent/encoder.safetensors");
        assert!(matches!(
            QueryEmbedder::load(config),
            Err(EmbeddingError::WeightsNotFound { .. })
        ));
    }

    #[test]
    fn test_load_empty_path_errors() {
        let config = EmbedderConfig {
            weights_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(QueryEmbedder::load(config).is_err());
    }

    #[test]
    fn test_load_garbage_weights_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("encoder.safetensors");
        std::fs::write(&path, b"not a safetensors file").unwrap();

        let result = QueryEmbedder::load(EmbedderConfig::new(&path));
        assert!(matches!(
            result,
            Err(EmbeddingError::WeightsLoadFailed { .. })
        ));
    }

    #[test]
    fn test_load_real_weights_round_trip() {
        let device = candle_core::Device::Cpu;
        let tensors = net::test_support::tiny_weights(12, 6, 4, &device);

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("encoder.safetensors");
        candle_core::safetensors::save(&tensors, &path).unwrap();

        let embedder = QueryEmbedder::load(EmbedderConfig::new(&path)).unwrap();
        assert!(embedder.has_model());
        assert_eq!(embedder.embedding_dim(), 4);

        let embedding = embedder.embed(&[2, 3, 1, 0]).unwrap();
        assert_eq!(embedding.len(), 4);
        let norm = norm_of(&embedding);
        // ReLU can zero the whole vector in principle, but not with these
        // weights; the output must be unit length.
        assert!((norm - 1.0).abs() < 1e-4, "norm was {norm}");
    }
}

mod net_tests {
    use super::net::test_support::tiny_encoder;
    use super::*;
    use candle_core::Tensor;

    fn forward_vec(encoder: &net::SiameseEncoder, ids: &[u32]) -> Vec<f32> {
        let device = candle_core::Device::Cpu;
        let input = Tensor::new(ids, &device).unwrap().unsqueeze(0).unwrap();
        encoder
            .forward(&input)
            .unwrap()
            .squeeze(0)
            .unwrap()
            .to_vec1::<f32>()
            .unwrap()
    }

    #[test]
    fn test_forward_output_shape_and_finiteness() {
        let encoder = tiny_encoder(12, 6, 4);
        let out = forward_vec(&encoder, &[2, 3, 4, 0, 0]);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|v| v.is_finite()));
        // ReLU output is non-negative.
        assert!(out.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_forward_is_deterministic() {
        let encoder = tiny_encoder(12, 6, 4);
        assert_eq!(forward_vec(&encoder, &[2, 3, 4]), forward_vec(&encoder, &[2, 3, 4]));
    }

    #[test]
    fn test_forward_is_order_sensitive() {
        let encoder = tiny_encoder(12, 6, 4);
        let ab = forward_vec(&encoder, &[2, 3, 0, 0]);
        let ba = forward_vec(&encoder, &[3, 2, 0, 0]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_forward_depends_on_token_identity() {
        let encoder = tiny_encoder(12, 6, 4);
        let a = forward_vec(&encoder, &[2, 3]);
        let b = forward_vec(&encoder, &[2, 4]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_config_dims_inferred_from_tensors() {
        let encoder = tiny_encoder(20, 8, 5);
        assert_eq!(encoder.config().vocab_size, 20);
        assert_eq!(encoder.config().token_embed_dim, 8);
        assert_eq!(encoder.config().hidden_dim, 5);
    }
}
