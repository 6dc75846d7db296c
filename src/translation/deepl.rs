use super::{api_error, TranslateError, TranslationRequest, DEEPL};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// Translate through the DeepL v2 API.
///
/// The source language is left out of the form when it should be detected.
pub(super) async fn translate(
    http: &reqwest::Client,
    url: &str,
    auth_key: &str,
    request: &TranslationRequest<'_>,
) -> Result<String, TranslateError> {
    let mut params = vec![
        ("auth_key", auth_key),
        ("text", request.text),
        ("target_lang", request.target_lang),
    ];
    if let Some(source) = request.source_lang {
        params.push(("source_lang", source));
    }

    let response = http
        .post(url)
        .form(&params)
        .send()
        .await
        .map_err(|source| TranslateError::Transport {
            provider: DEEPL,
            source,
        })?;

    if !response.status().is_success() {
        return Err(api_error(DEEPL, response).await);
    }

    let body: DeepLResponse = response.json().await.map_err(|e| TranslateError::Parse {
        provider: DEEPL,
        detail: e.to_string(),
    })?;

    body.translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or_else(|| TranslateError::Parse {
            provider: DEEPL,
            detail: "response contained no translations".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_string_contains, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn deepl_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "translations": [
                { "detected_source_language": "EN", "text": text }
            ]
        })
    }

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/translate"))
            .and(body_string_contains("auth_key=deepl-key"))
            .and(body_string_contains("target_lang=FR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(deepl_response("Bonjour")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/v2/translate", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "FR");
        let result = translate(&reqwest::Client::new(), &url, "deepl-key", &request)
            .await
            .expect("Should succeed");

        assert_eq!(result, "Bonjour");
    }

    #[tokio::test]
    async fn test_auto_detect_omits_source_lang() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(deepl_response("Hallo")))
            .mount(&mock_server)
            .await;

        let url = format!("{}/v2/translate", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "DE");
        translate(&reqwest::Client::new(), &url, "deepl-key", &request)
            .await
            .expect("Should succeed");

        let received = mock_server.received_requests().await.expect("recorded");
        let body = String::from_utf8_lossy(&received[0].body).to_string();
        assert!(!body.contains("source_lang"));
    }

    #[tokio::test]
    async fn test_explicit_source_lang_is_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/translate"))
            .and(body_string_contains("source_lang=EN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(deepl_response("Hallo")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/v2/translate", mock_server.uri());
        let request = TranslationRequest {
            text: "Hello",
            target_lang: "DE",
            source_lang: Some("EN"),
        };
        let result = translate(&reqwest::Client::new(), &url, "deepl-key", &request).await;
        assert_eq!(result.expect("Should succeed"), "Hallo");
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/translate"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/v2/translate", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "FR");
        let err = translate(&reqwest::Client::new(), &url, "bad-key", &request)
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::Api { .. }));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_empty_translations_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/translate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "translations": [] })),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/v2/translate", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "FR");
        let err = translate(&reqwest::Client::new(), &url, "deepl-key", &request)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no translations"));
    }
}
