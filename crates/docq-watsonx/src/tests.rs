//! Snapshot tests for the watsonx client

#[cfg(test)]
mod snapshot_tests {
    use crate::{TextEmbedder, TextGenerator, WatsonxClient, WatsonxConfig};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_config_snapshot() {
        let config = WatsonxConfig {
            api_key: "test_api_key_redacted".to_string(),
            project_id: "test_project_id".to_string(),
            iam_url: "iam.cloud.ibm.com".to_string(),
            api_url: "https://us-south.ml.cloud.ibm.com".to_string(),
        };

        assert_yaml_snapshot!(config, @r###"
        ---
        api_key: test_api_key_redacted
        project_id: test_project_id
        iam_url: iam.cloud.ibm.com
        api_url: "https://us-south.ml.cloud.ibm.com"
        "###);
    }

    #[test]
    fn default_models_match_the_constants() {
        let config = WatsonxConfig::new("test_key".to_string(), "test_project".to_string());
        let client = WatsonxClient::new(config).unwrap();

        assert_eq!(
            TextEmbedder::model_id(&client),
            WatsonxClient::SLATE_30M_ENGLISH_RTRVR
        );
        assert_eq!(
            TextGenerator::model_id(&client),
            WatsonxClient::GRANITE_4_H_SMALL
        );
    }

    #[test]
    fn model_overrides_apply_per_role() {
        let config = WatsonxConfig::new("test_key".to_string(), "test_project".to_string());
        let client = WatsonxClient::new(config)
            .unwrap()
            .with_embedding_model(WatsonxClient::SLATE_125M_ENGLISH_RTRVR)
            .with_generation_model(WatsonxClient::GRANITE_3_3_8B_INSTRUCT);

        assert_eq!(
            TextEmbedder::model_id(&client),
            WatsonxClient::SLATE_125M_ENGLISH_RTRVR
        );
        assert_eq!(
            TextGenerator::model_id(&client),
            WatsonxClient::GRANITE_3_3_8B_INSTRUCT
        );
    }
}
