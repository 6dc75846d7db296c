use super::{api_error, TranslateError, TranslationRequest, GOOGLE_TRANSLATE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Debug, Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
}

/// Translate through the Google Cloud Translation v2 API.
pub(super) async fn translate(
    http: &reqwest::Client,
    url: &str,
    api_key: &str,
    request: &TranslationRequest<'_>,
) -> Result<String, TranslateError> {
    let body = GoogleRequest {
        q: request.text,
        target: request.target_lang,
        source: request.source_lang,
    };

    let response = http
        .post(url)
        .query(&[("key", api_key)])
        .json(&body)
        .send()
        .await
        .map_err(|source| TranslateError::Transport {
            provider: GOOGLE_TRANSLATE,
            source,
        })?;

    if !response.status().is_success() {
        return Err(api_error(GOOGLE_TRANSLATE, response).await);
    }

    let parsed: GoogleResponse = response.json().await.map_err(|e| TranslateError::Parse {
        provider: GOOGLE_TRANSLATE,
        detail: e.to_string(),
    })?;

    parsed
        .data
        .translations
        .into_iter()
        .next()
        .map(|t| t.translated_text)
        .ok_or_else(|| TranslateError::Parse {
            provider: GOOGLE_TRANSLATE,
            detail: "response contained no translations".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn google_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "translations": [
                    { "translatedText": text, "detectedSourceLanguage": "en" }
                ]
            }
        })
    }

    #[test]
    fn test_request_serialization_without_source() {
        let request = GoogleRequest {
            q: "Hello",
            target: "FR",
            source: None,
        };

        let json = serde_json::to_string(&request).expect("Should serialize");
        assert!(json.contains("\"q\":\"Hello\""));
        assert!(json.contains("\"target\":\"FR\""));
        assert!(!json.contains("source"));
    }

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .and(query_param("key", "google-key"))
            .and(body_json(serde_json::json!({ "q": "Hello", "target": "ES" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(google_response("Hola")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/language/translate/v2", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "ES");
        let result = translate(&reqwest::Client::new(), &url, "google-key", &request)
            .await
            .expect("Should succeed");

        assert_eq!(result, "Hola");
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/language/translate/v2", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "ES");
        let err = translate(&reqwest::Client::new(), &url, "google-key", &request)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": "Hola" })),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/language/translate/v2", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "ES");
        let err = translate(&reqwest::Client::new(), &url, "google-key", &request)
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::Parse { .. }));
    }
}
