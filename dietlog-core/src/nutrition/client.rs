//! HTTP client for the nutrition lookup service.

use std::fmt;

use serde::de::DeserializeOwned;

use super::error::NutritionError;
use super::types::{
    Ingredient, IngredientInformationResponse, NutritionInfo, NutritionWidgetResponse, Recipe,
    RecipeInformation, RecipeInformationResponse, SearchResponse,
};
use super::units::convert_to_servings;

pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Parameters for ingredient and recipe searches.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub limit: u32,
    pub sort: String,
    pub sort_direction: SortDirection,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 3,
            sort: "calories".to_string(),
            sort_direction: SortDirection::Desc,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = sort.into();
        self.sort_direction = direction;
        self
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", self.query.clone()),
            ("number", self.limit.to_string()),
            ("sort", self.sort.clone()),
            ("sortDirection", self.sort_direction.to_string()),
        ]
    }
}

/// Client for the nutrition lookup service.
///
/// Every request carries the API key in the `x-api-key` header. Failed
/// requests are logged and returned as [`NutritionError`].
#[derive(Debug, Clone)]
pub struct NutritionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NutritionClient {
    /// Creates a client. An empty API key is rejected.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, NutritionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(NutritionError::NotConfigured);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn search_ingredients(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<Ingredient>, NutritionError> {
        let response: SearchResponse<Ingredient> = self
            .get_json("/food/ingredients/search", &params.to_query())
            .await?;
        Ok(response.results)
    }

    pub async fn search_recipes(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<Recipe>, NutritionError> {
        let response: SearchResponse<Recipe> = self
            .get_json("/recipes/complexSearch", &params.to_query())
            .await?;
        Ok(response.results)
    }

    /// Nutrition of `amount` `unit` of an ingredient.
    pub async fn get_nutrition(
        &self,
        ingredient_id: u64,
        amount: f64,
        unit: &str,
    ) -> Result<NutritionInfo, NutritionError> {
        let path = format!("/food/ingredients/{}/information", ingredient_id);
        let query = [("amount", amount.to_string()), ("unit", unit.to_string())];
        let response: IngredientInformationResponse = self.get_json(&path, &query).await?;
        Ok(response.into_nutrition(amount, unit))
    }

    pub async fn get_recipe_information(
        &self,
        recipe_id: u64,
    ) -> Result<RecipeInformation, NutritionError> {
        let path = format!("/recipes/{}/information", recipe_id);
        let response: RecipeInformationResponse = self.get_json(&path, &[]).await?;
        Ok(response.into_information())
    }

    /// Nutrition of one serving of a recipe.
    pub async fn get_recipe_nutrition(
        &self,
        recipe_id: u64,
    ) -> Result<NutritionInfo, NutritionError> {
        let path = format!("/recipes/{}/nutritionWidget.json", recipe_id);
        let response: NutritionWidgetResponse = self.get_json(&path, &[]).await?;
        Ok(response.into_nutrition())
    }

    /// Nutrition of `amount` `unit` of a recipe, converted through the
    /// recipe's serving size.
    pub async fn get_recipe_nutrition_for(
        &self,
        recipe_id: u64,
        amount: f64,
        unit: &str,
    ) -> Result<NutritionInfo, NutritionError> {
        let per_serving = self.get_recipe_nutrition(recipe_id).await?;
        let servings = if unit == "serving" {
            amount
        } else {
            let info = self.get_recipe_information(recipe_id).await?;
            convert_to_servings(amount, unit, info.serving_size_grams)
        };

        Ok(NutritionInfo {
            name: per_serving.name,
            facts: per_serving.facts.scaled(servings),
            amount,
            unit: unit.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NutritionError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Request to {} failed: {}", path, e);
                NutritionError::Http(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Request to {} returned status {}", path, status);
            return Err(NutritionError::Status(status.as_u16()));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!("Could not decode response from {}: {}", path, e);
            NutritionError::Decode(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves the given responses, one connection each, and hands back the
    /// raw text of every request it received.
    async fn serve(
        responses: Vec<(&'static str, &'static str)>,
    ) -> (String, oneshot::Receiver<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                requests.push(String::from_utf8_lossy(&request).into_owned());

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
            let _ = tx.send(requests);
        });

        (format!("http://{}", addr), rx)
    }

    #[tokio::test]
    async fn test_search_sends_api_key_and_query() {
        let body = r#"{"results":[{"id":9003,"name":"apple","image":"apple.jpg"}]}"#;
        let (url, requests) = serve(vec![("200 OK", body)]).await;
        let client = NutritionClient::new(url, "secret").unwrap();

        let results = client
            .search_ingredients(&SearchParams::new("apple"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 9003);

        let requests = requests.await.unwrap();
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("get /food/ingredients/search?"));
        assert!(request.contains("query=apple"));
        assert!(request.contains("number=3"));
        assert!(request.contains("sort=calories"));
        assert!(request.contains("sortdirection=desc"));
        assert!(request.contains("x-api-key: secret"));
    }

    #[tokio::test]
    async fn test_get_nutrition_requests_amount_and_unit() {
        let body = r#"{"id":9266,"name":"pineapples","nutrition":{"nutrients":[
            {"name":"Calories","amount":50.0,"unit":"kcal"},
            {"name":"Protein","amount":0.54,"unit":"g"}]}}"#;
        let (url, requests) = serve(vec![("200 OK", body)]).await;
        let client = NutritionClient::new(url, "secret").unwrap();

        let info = client.get_nutrition(9266, 100.0, "g").await.unwrap();
        assert_eq!(info.name.as_deref(), Some("pineapples"));
        assert_eq!(info.facts.calories, 50.0);
        assert_eq!(info.facts.carbs, 0.0);

        let requests = requests.await.unwrap();
        let expected = "GET /food/ingredients/9266/information?amount=100&unit=g ";
        assert!(requests[0].starts_with(expected));
    }

    #[tokio::test]
    async fn test_recipe_nutrition_converted_through_serving_size() {
        let widget = r#"{"calories":"400","carbs":"50g","fat":"10g","protein":"20g"}"#;
        let info = r#"{"servings":4,"nutrition":{"weightPerServing":{"amount":200,"unit":"g"}}}"#;
        let (url, requests) = serve(vec![("200 OK", widget), ("200 OK", info)]).await;
        let client = NutritionClient::new(url, "secret").unwrap();

        let nutrition = client.get_recipe_nutrition_for(715538, 300.0, "g").await.unwrap();
        assert_eq!(nutrition.facts.calories, 600.0);
        assert_eq!(nutrition.facts.protein, 30.0);
        assert_eq!(nutrition.amount, 300.0);
        assert_eq!(nutrition.unit, "g");

        let requests = requests.await.unwrap();
        assert!(requests[0].starts_with("GET /recipes/715538/nutritionWidget.json "));
        assert!(requests[1].starts_with("GET /recipes/715538/information "));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_status_error() {
        let body = r#"{"status":"failure","code":402}"#;
        let (url, _requests) = serve(vec![("402 Payment Required", body)]).await;
        let client = NutritionClient::new(url, "secret").unwrap();

        let err = client.get_recipe_information(1).await.unwrap_err();
        assert!(matches!(err, NutritionError::Status(402)));
    }

    #[tokio::test]
    async fn test_bad_body_maps_to_decode_error() {
        let (url, _requests) = serve(vec![("200 OK", "not json")]).await;
        let client = NutritionClient::new(url, "secret").unwrap();

        let err = client.get_recipe_nutrition(1).await.unwrap_err();
        assert!(matches!(err, NutritionError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = NutritionClient::new(format!("http://{}", addr), "secret").unwrap();

        let err = client
            .search_recipes(&SearchParams::new("soup"))
            .await
            .unwrap_err();
        assert!(matches!(err, NutritionError::Http(_)));
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = NutritionClient::new(DEFAULT_BASE_URL, "  ");
        assert!(matches!(result, Err(NutritionError::NotConfigured)));
    }

    #[test]
    fn test_url_building() {
        let client = NutritionClient::new("http://localhost:9000/", "key").unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
        assert_eq!(
            client.url("/recipes/42/information"),
            "http://localhost:9000/recipes/42/information"
        );
    }

    #[test]
    fn test_search_params_defaults() {
        let params = SearchParams::new("pasta");
        assert_eq!(
            params.to_query(),
            vec![
                ("query", "pasta".to_string()),
                ("number", "3".to_string()),
                ("sort", "calories".to_string()),
                ("sortDirection", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_params_overrides() {
        let params = SearchParams::new("rice")
            .with_limit(10)
            .with_sort("protein", SortDirection::Asc);
        let query = params.to_query();
        assert_eq!(query[1].1, "10");
        assert_eq!(query[2].1, "protein");
        assert_eq!(query[3].1, "asc");
    }
}
