use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{MediaClient, Movie},
};

/// How many cast members are kept per movie
const MAX_ACTORS: usize = 5;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Media-server collaborator contract
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// Lists playback clients currently connected to the server; may be
    /// empty
    async fn list_clients(&self) -> AppResult<Vec<MediaClient>>;

    /// Starts playback of the item with `movie_key` on the named client.
    ///
    /// Playback failures are reported inside the returned status message
    /// rather than as an error.
    async fn play(&self, movie_key: &str, client_name: &str) -> AppResult<String>;
}

/// HTTP client for a Plex media server
pub struct PlexServer {
    http_client: HttpClient,
    base_url: String,
    token: String,
    machine_identifier: String,
}

// ============================================================================
// Plex API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    #[serde(rename = "MediaContainer")]
    container: IdentityContainer,
}

#[derive(Debug, Deserialize)]
struct IdentityContainer {
    #[serde(rename = "machineIdentifier")]
    machine_identifier: String,
}

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    #[serde(rename = "MediaContainer")]
    container: SectionsContainer,
}

#[derive(Debug, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<SectionDirectory>,
}

#[derive(Debug, Deserialize)]
struct SectionDirectory {
    key: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct LibraryResponse {
    #[serde(rename = "MediaContainer")]
    container: LibraryContainer,
}

#[derive(Debug, Deserialize)]
struct LibraryContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlexMovie>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    tag: String,
}

#[derive(Debug, Deserialize)]
struct PlexMovie {
    key: String,
    title: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    duration: Option<i64>,
    #[serde(rename = "Genre", default)]
    genres: Vec<Tag>,
    #[serde(rename = "Director", default)]
    directors: Vec<Tag>,
    #[serde(rename = "Role", default)]
    roles: Vec<Tag>,
}

impl From<PlexMovie> for Movie {
    fn from(item: PlexMovie) -> Self {
        let tags = |list: Vec<Tag>| list.into_iter().map(|t| t.tag).collect::<Vec<_>>();
        let mut actors = tags(item.roles);
        actors.truncate(MAX_ACTORS);

        Movie {
            title: item.title,
            year: item.year,
            summary: item.summary.unwrap_or_default(),
            genres: tags(item.genres),
            directors: tags(item.directors),
            actors,
            key: item.key,
            rating: item.rating,
            duration_ms: item.duration,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClientsResponse {
    #[serde(rename = "MediaContainer")]
    container: ClientsContainer,
}

#[derive(Debug, Deserialize)]
struct ClientsContainer {
    #[serde(rename = "Server", default)]
    servers: Vec<PlexClientEntry>,
}

#[derive(Debug, Deserialize)]
struct PlexClientEntry {
    name: String,
    #[serde(default)]
    product: String,
    #[serde(rename = "machineIdentifier")]
    machine_identifier: String,
}

impl From<&PlexClientEntry> for MediaClient {
    fn from(entry: &PlexClientEntry) -> Self {
        MediaClient {
            name: entry.name.clone(),
            product: entry.product.clone(),
        }
    }
}

impl PlexServer {
    /// Connects to the server, verifying the URL and token against its
    /// identity endpoint
    pub async fn connect(base_url: String, token: String) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let response = http_client
            .get(format!("{}/identity", base_url))
            .header("X-Plex-Token", &token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Plex server returned status {} during connect",
                response.status()
            )));
        }

        let identity: IdentityResponse = response.json().await?;

        tracing::info!(
            machine_identifier = %identity.container.machine_identifier,
            "Connected to Plex server"
        );

        Ok(Self {
            http_client,
            base_url,
            token,
            machine_identifier: identity.container.machine_identifier,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .header("X-Plex-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Plex API returned status {} for {}: {}",
                status, path, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Extracts the movie catalog from the named library section
    pub async fn fetch_movies(&self, library_name: &str) -> AppResult<Vec<Movie>> {
        let sections: SectionsResponse = self.get_json("/library/sections").await?;

        let section = sections
            .container
            .directories
            .into_iter()
            .find(|dir| dir.title == library_name)
            .ok_or_else(|| {
                AppError::NotFound(format!("Plex library section '{}'", library_name))
            })?;

        let library: LibraryResponse = self
            .get_json(&format!("/library/sections/{}/all", section.key))
            .await?;

        let movies: Vec<Movie> = library.container.metadata.into_iter().map(Movie::from).collect();

        tracing::info!(
            library = %library_name,
            movies = movies.len(),
            "Extracted movie catalog"
        );

        Ok(movies)
    }

    async fn client_by_name(&self, client_name: &str) -> AppResult<PlexClientEntry> {
        let clients: ClientsResponse = self.get_json("/clients").await?;
        clients
            .container
            .servers
            .into_iter()
            .find(|entry| entry.name == client_name)
            .ok_or_else(|| AppError::NotFound(format!("Plex client '{}'", client_name)))
    }

    async fn try_play(&self, movie_key: &str, client_name: &str) -> AppResult<String> {
        let client = self.client_by_name(client_name).await?;

        let response = self
            .http_client
            .get(format!("{}/player/playback/playMedia", self.base_url))
            .header("X-Plex-Token", &self.token)
            .header("X-Plex-Target-Client-Identifier", &client.machine_identifier)
            .query(&[
                ("key", movie_key),
                ("offset", "0"),
                ("machineIdentifier", self.machine_identifier.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Plex playback returned status {}",
                response.status()
            )));
        }

        Ok(format!("Now playing {} on {}", movie_key, client_name))
    }
}

#[async_trait]
impl MediaServer for PlexServer {
    async fn list_clients(&self) -> AppResult<Vec<MediaClient>> {
        let clients: ClientsResponse = self.get_json("/clients").await?;
        let found: Vec<MediaClient> = clients.container.servers.iter().map(MediaClient::from).collect();
        tracing::info!(clients = found.len(), "Listed Plex clients");
        Ok(found)
    }

    async fn play(&self, movie_key: &str, client_name: &str) -> AppResult<String> {
        match self.try_play(movie_key, client_name).await {
            Ok(status) => Ok(status),
            Err(e) => Ok(format!("Error playing movie: {}", e)),
        }
    }
}
