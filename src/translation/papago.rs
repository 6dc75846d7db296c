use super::{api_error, TranslateError, TranslationRequest, PAPAGO};
use serde::Deserialize;

/// Papago's token for "detect the source language".
const AUTO_DETECT: &str = "auto";

#[derive(Debug, Deserialize)]
struct PapagoResponse {
    message: PapagoMessage,
}

#[derive(Debug, Deserialize)]
struct PapagoMessage {
    result: PapagoResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PapagoResult {
    translated_text: String,
}

/// Translate through the Naver Papago NMT API.
///
/// Papago expects lowercase language codes and the literal `auto` when the
/// source language should be detected.
pub(super) async fn translate(
    http: &reqwest::Client,
    url: &str,
    client_id: &str,
    client_secret: &str,
    request: &TranslationRequest<'_>,
) -> Result<String, TranslateError> {
    let source = request
        .source_lang
        .map(str::to_lowercase)
        .unwrap_or_else(|| AUTO_DETECT.to_string());
    let target = request.target_lang.to_lowercase();

    let response = http
        .post(url)
        .header("X-Naver-Client-Id", client_id)
        .header("X-Naver-Client-Secret", client_secret)
        .form(&[
            ("source", source.as_str()),
            ("target", target.as_str()),
            ("text", request.text),
        ])
        .send()
        .await
        .map_err(|e| TranslateError::Transport {
            provider: PAPAGO,
            source: e,
        })?;

    if !response.status().is_success() {
        return Err(api_error(PAPAGO, response).await);
    }

    let parsed: PapagoResponse = response.json().await.map_err(|e| TranslateError::Parse {
        provider: PAPAGO,
        detail: e.to_string(),
    })?;

    Ok(parsed.message.result.translated_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn papago_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "message": {
                "@type": "response",
                "result": { "srcLangType": "en", "tarLangType": "ko", "translatedText": text }
            }
        })
    }

    #[tokio::test]
    async fn test_translate_sends_auto_and_lowercase_codes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/papago/n2mt"))
            .and(header("X-Naver-Client-Id", "papago-id"))
            .and(header("X-Naver-Client-Secret", "papago-secret"))
            .and(body_string_contains("source=auto"))
            .and(body_string_contains("target=ko"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(papago_response("안녕하세요")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/v1/papago/n2mt", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "KO");
        let result = translate(
            &reqwest::Client::new(),
            &url,
            "papago-id",
            "papago-secret",
            &request,
        )
        .await
        .expect("Should succeed");

        assert_eq!(result, "안녕하세요");
    }

    #[tokio::test]
    async fn test_explicit_source_is_lowercased() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/papago/n2mt"))
            .and(body_string_contains("source=en"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(papago_response("こんにちは")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/v1/papago/n2mt", mock_server.uri());
        let request = TranslationRequest {
            text: "Hello",
            target_lang: "JA",
            source_lang: Some("EN"),
        };
        let result = translate(&reqwest::Client::new(), &url, "id", "secret", &request).await;
        assert_eq!(result.expect("Should succeed"), "こんにちは");
    }

    #[tokio::test]
    async fn test_unauthorized_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/papago/n2mt"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/v1/papago/n2mt", mock_server.uri());
        let request = TranslationRequest::auto_detect("Hello", "KO");
        let err = translate(&reqwest::Client::new(), &url, "id", "bad", &request)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TranslateError::Api {
                provider: "papago",
                ..
            }
        ));
    }
}
