//! HTTP `PlaceSearch` backed by the Google Places web service.
//!
//! The [`PlaceSearch`] trait is synchronous so the selection pipeline can run
//! in plain synchronous code. [`HttpPlaceSearch`] owns a current-thread Tokio
//! runtime and blocks on the async `reqwest` calls internally.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use platewise_core::{PlaceId, PlaceSearch, PlaceSearchError, Restaurant, SearchQuery};

use super::paging::{Fetched, PageLimits, PlacesTransport, collect_candidates};
use super::wire::{DetailsResponse, NearbyResponse};

/// Default user agent for place-service requests.
pub const DEFAULT_USER_AGENT: &str = "platewise-places/0.1";

/// Default endpoint root of the place service.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LANGUAGE: &str = "de";
const DEFAULT_MAX_PAGES: usize = 5;
const DEFAULT_PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);
const DETAIL_FIELDS: &str = "website,url,international_phone_number,formatted_address";
const REDACTED: &str = "REDACTED";

/// Error type for [`HttpPlaceSearch`] construction failures.
#[derive(Debug)]
pub enum PlaceSearchBuildError {
    /// No API key was configured.
    MissingApiKey,
    /// The base URL could not be parsed.
    BaseUrl(url::ParseError),
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for PlaceSearchBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "place search requires an API key"),
            Self::BaseUrl(err) => write!(f, "invalid place service URL: {err}"),
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for PlaceSearchBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingApiKey => None,
            Self::BaseUrl(err) => Some(err),
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Configuration for [`HttpPlaceSearch`].
#[derive(Clone)]
pub struct HttpPlaceSearchConfig {
    /// Endpoint root, for example `"https://maps.googleapis.com/maps/api/place"`.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Result language.
    pub language: String,
    /// Maximum number of nearby-search pages.
    pub max_pages: usize,
    /// Wait before following a continuation token.
    pub page_token_delay: Duration,
}

impl std::fmt::Debug for HttpPlaceSearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlaceSearchConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &REDACTED)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("language", &self.language)
            .field("max_pages", &self.max_pages)
            .field("page_token_delay", &self.page_token_delay)
            .finish()
    }
}

impl Default for HttpPlaceSearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            language: DEFAULT_LANGUAGE.to_owned(),
            max_pages: DEFAULT_MAX_PAGES,
            page_token_delay: DEFAULT_PAGE_TOKEN_DELAY,
        }
    }
}

impl HttpPlaceSearchConfig {
    /// Create a configuration for the default endpoint using `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the endpoint root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the result language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the page bound.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the continuation-token delay.
    #[must_use]
    pub fn with_page_token_delay(mut self, delay: Duration) -> Self {
        self.page_token_delay = delay;
        self
    }

    fn limits(&self) -> PageLimits {
        PageLimits {
            max_pages: self.max_pages,
            token_delay: self.page_token_delay,
        }
    }
}

/// `reqwest` implementation of [`PlacesTransport`].
struct HttpTransport {
    client: Client,
    nearby_url: Url,
    details_url: Url,
    api_key: String,
    language: String,
    timeout: Duration,
}

impl HttpTransport {
    fn new(config: &HttpPlaceSearchConfig) -> Result<Self, PlaceSearchBuildError> {
        if config.api_key.trim().is_empty() {
            return Err(PlaceSearchBuildError::MissingApiKey);
        }
        let root = format!("{}/", config.base_url.trim_end_matches('/'));
        let base = Url::parse(&root).map_err(PlaceSearchBuildError::BaseUrl)?;
        let nearby_url = base
            .join("nearbysearch/json")
            .map_err(PlaceSearchBuildError::BaseUrl)?;
        let details_url = base
            .join("details/json")
            .map_err(PlaceSearchBuildError::BaseUrl)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(PlaceSearchBuildError::HttpClient)?;
        Ok(Self {
            client,
            nearby_url,
            details_url,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            timeout: config.timeout,
        })
    }

    /// Return the request URL and its redacted form for logs and errors.
    fn with_params(&self, endpoint: &Url, params: &[(&str, &str)]) -> (Url, String) {
        let mut url = endpoint.clone();
        url.query_pairs_mut().extend_pairs(params);
        let mut shown = url.clone();
        shown.query_pairs_mut().append_pair("key", REDACTED);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        (url, shown.into())
    }

    fn nearby_request(&self, query: &SearchQuery, page_token: Option<&str>) -> (Url, String) {
        let location = format!("{},{}", query.origin.y, query.origin.x);
        let radius = query.radius_m.to_string();
        let mut params = vec![
            ("keyword", query.cuisine.as_str()),
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("type", "restaurant"),
            ("opennow", "true"),
            ("language", self.language.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pagetoken", token));
        }
        self.with_params(&self.nearby_url, &params)
    }

    fn details_request(&self, place_id: &PlaceId) -> (Url, String) {
        let params = [
            ("place_id", place_id.as_str()),
            ("fields", DETAIL_FIELDS),
            ("language", self.language.as_str()),
        ];
        self.with_params(&self.details_url, &params)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        shown: String,
    ) -> Result<Fetched<T>, PlaceSearchError> {
        log::debug!("GET {shown}");
        let raw = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &shown))?;
        log::debug!("{shown} answered {}", raw.status());
        let response = raw
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &shown))?;
        let body = response
            .json::<T>()
            .await
            .map_err(|err| PlaceSearchError::Parse {
                url: shown.clone(),
                message: err.without_url().to_string(),
            })?;
        Ok(Fetched { url: shown, body })
    }

    /// Convert a reqwest error to a `PlaceSearchError`.
    ///
    /// The URL is stripped from the message so the API key never leaks.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> PlaceSearchError {
        if error.is_timeout() {
            return PlaceSearchError::Timeout {
                url: url.to_owned(),
                timeout: self.timeout,
            };
        }
        let status = error.status();
        let message = error.without_url().to_string();
        if let Some(code) = status {
            return PlaceSearchError::Http {
                url: url.to_owned(),
                status: code.as_u16(),
                message,
            };
        }
        PlaceSearchError::Network {
            url: url.to_owned(),
            message,
        }
    }
}

#[async_trait(?Send)]
impl PlacesTransport for HttpTransport {
    async fn nearby(
        &self,
        query: &SearchQuery,
        page_token: Option<&str>,
    ) -> Result<Fetched<NearbyResponse>, PlaceSearchError> {
        let (url, shown) = self.nearby_request(query, page_token);
        self.get_json(url, shown).await
    }

    async fn details(
        &self,
        place_id: &PlaceId,
    ) -> Result<Fetched<DetailsResponse>, PlaceSearchError> {
        let (url, shown) = self.details_request(place_id);
        self.get_json(url, shown).await
    }
}

/// Place search over the Google Places nearby-search and details APIs.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the client drives requests on its own runtime.
/// Inside a multi-threaded runtime it uses that runtime's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it
/// falls back to its own runtime, which blocks the caller's runtime for the
/// duration of the search.
///
/// # Example
///
/// ```no_run
/// use platewise_core::{PlaceSearch, SearchQuery};
/// use platewise_data::places::{HttpPlaceSearch, HttpPlaceSearchConfig};
/// use geo::Coord;
///
/// let config = HttpPlaceSearchConfig::new("my-api-key").with_language("en");
/// let search = HttpPlaceSearch::with_config(config)?;
/// let query = SearchQuery {
///     cuisine: "ramen".parse()?,
///     origin: Coord { x: 13.4, y: 52.5 },
///     radius_m: 1_500,
/// };
/// for restaurant in search.search(&query)? {
///     println!("{} {:?}", restaurant.name, restaurant.external_rating);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HttpPlaceSearch {
    transport: HttpTransport,
    limits: PageLimits,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpPlaceSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlaceSearch")
            .field("nearby_url", &self.transport.nearby_url.as_str())
            .field("limits", &self.limits)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpPlaceSearch {
    /// Create a client for the default endpoint.
    ///
    /// # Errors
    /// Returns an error if the key is empty or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, PlaceSearchBuildError> {
        Self::with_config(HttpPlaceSearchConfig::new(api_key))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the key is empty, the base URL is invalid, or the
    /// HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpPlaceSearchConfig) -> Result<Self, PlaceSearchBuildError> {
        let transport = HttpTransport::new(&config)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(PlaceSearchBuildError::Runtime)?;
        Ok(Self {
            transport,
            limits: config.limits(),
            runtime,
        })
    }
}

impl PlaceSearch for HttpPlaceSearch {
    fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, PlaceSearchError> {
        let future = collect_candidates(&self.transport, query, self.limits);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
