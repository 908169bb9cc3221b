use base64::{engine::general_purpose, Engine as _};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub enum HeaderKey {
    Authorization,
    ContentType,
    Custom(String),
}

impl HeaderKey {
    fn as_str(&self) -> &str {
        match self {
            HeaderKey::Authorization => "Authorization",
            HeaderKey::ContentType => "Content-Type",
            HeaderKey::Custom(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn into_body(self) -> Result<String> {
        if (200..300).contains(&self.status) {
            Ok(self.body)
        } else {
            Err(Error::HttpError(format!("status: {}", self.status)))
        }
    }

    pub fn into_json(self) -> Result<serde_json::Value> {
        let body = self.into_body()?;
        let json: serde_json::Value = serde_json::from_str(&body)?;
        Ok(json)
    }
}

#[derive(Debug, Clone)]
pub struct Header {
    key: HeaderKey,
    value: String,
}

impl Header {
    pub fn new(key: HeaderKey, value: String) -> Self {
        Self { key, value }
    }

    /// Authorization header for the admin endpoint's HTTP basic scheme.
    pub fn basic_auth(username: &str, password: &str) -> Self {
        let token = general_purpose::STANDARD.encode(format!("{}:{}", username, password));
        Self::new(HeaderKey::Authorization, format!("Basic {}", token))
    }
}

pub struct Client {
    cli: reqwest::Client,
    dft_headers: Vec<Header>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self {
            cli: reqwest::Client::new(),
            dft_headers: vec![],
        }
    }

    pub fn set_default_headers(&mut self, headers: Vec<Header>) {
        self.dft_headers = headers;
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        let builder = self.add_headers(self.cli.get(url));
        Self::dispatch(builder).await
    }

    pub async fn put(&self, url: &str, body: String) -> Result<Response> {
        let builder = self.add_headers(self.cli.put(url)).body(body);
        Self::dispatch(builder).await
    }

    pub async fn post(&self, url: &str, body: String) -> Result<Response> {
        let builder = self.add_headers(self.cli.post(url)).body(body);
        Self::dispatch(builder).await
    }

    async fn dispatch(builder: reqwest::RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        Ok(Response {
            status: response.status().into(),
            body: response.text().await?,
        })
    }

    fn add_headers(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for header in &self.dft_headers {
            builder = builder.header(header.key.as_str(), header.value.as_str());
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_into_body_rejects_error_status() {
        let response = Response {
            status: 401,
            body: "denied".to_string(),
        };

        assert!(response.into_body().is_err());
    }

    #[test]
    fn test_response_into_json() {
        let response = Response {
            status: 200,
            body: r#"{"a":"b"}"#.to_string(),
        };

        let json = response.into_json().unwrap();
        assert_eq!(json["a"], "b");
    }

    #[test]
    fn test_basic_auth_header() {
        let header = Header::basic_auth("admin", "secret");
        assert_eq!(header.key.as_str(), "Authorization");
        assert_eq!(header.value, "Basic YWRtaW46c2VjcmV0");
    }
}
