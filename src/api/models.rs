use crate::api::{ModelInfo, ModelsResponse};
use crate::core::completion::{with_app_headers, CompletionError};
use crate::utils::url::construct_api_url;

/// Fetch the model list and keep only entries usable for chat completion.
pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
) -> Result<Vec<ModelInfo>, CompletionError> {
    let models_url = construct_api_url(base_url, "models");
    let request = with_app_headers(client.get(models_url), api_key);

    let response = request.send().await.map_err(CompletionError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(CompletionError::Status { status, body });
    }

    let models_response = response
        .json::<ModelsResponse>()
        .await
        .map_err(CompletionError::Decode)?;
    Ok(filter_completion_models(models_response.data))
}

pub fn filter_completion_models(models: Vec<ModelInfo>) -> Vec<ModelInfo> {
    models
        .into_iter()
        .filter(ModelInfo::supports_completion)
        .collect()
}

/// Sort by id so listings are stable between runs.
pub fn sort_models(models: &mut [ModelInfo]) {
    models.sort_by(|a, b| a.id.cmp(&b.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{APP_REFERER, APP_TITLE};
    use crate::utils::test_utils::{header, one_shot_server};
    use reqwest::StatusCode;

    #[tokio::test]
    async fn fetch_models_sends_auth_and_filters_data() {
        let (base_url, captured) = one_shot_server(
            "200 OK",
            r#"{"data":[
                {"id":"b/chat","name":"Chat","context_length":32768},
                {"id":"a/embed","context_length":0},
                {"id":"c/flagged","capabilities":{"completion":true}}
            ]}"#,
        )
        .await;

        let models = fetch_models(&reqwest::Client::new(), &base_url, "sk-test")
            .await
            .expect("models should load");
        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b/chat", "c/flagged"]);

        let (request_line, headers, _body) = captured.lock().await.take().expect("captured");
        assert_eq!(request_line, "GET /api/v1/models HTTP/1.1");
        assert_eq!(header(&headers, "authorization"), Some("Bearer sk-test"));
        assert_eq!(header(&headers, "http-referer"), Some(APP_REFERER));
        assert_eq!(header(&headers, "x-title"), Some(APP_TITLE));
    }

    #[tokio::test]
    async fn fetch_models_maps_non_success_to_status_error() {
        let (base_url, _captured) = one_shot_server(
            "401 Unauthorized",
            r#"{"error":{"message":"No auth credentials found"}}"#,
        )
        .await;

        let err = fetch_models(&reqwest::Client::new(), &base_url, "")
            .await
            .expect_err("401 should fail");
        match err {
            CompletionError::Status { status, .. } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED)
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn sort_models_orders_by_id() {
        let mut models: Vec<ModelInfo> = serde_json::from_str(
            r#"[{"id":"z/last"},{"id":"a/first"},{"id":"m/mid"}]"#,
        )
        .expect("parse");
        sort_models(&mut models);
        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a/first", "m/mid", "z/last"]);
    }
}
