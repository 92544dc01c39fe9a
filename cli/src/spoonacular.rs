use serde::de::DeserializeOwned;
use tracing::debug;

use recipehub_core::error::{ApiError, classify_status};
use recipehub_core::models::{DietaryFilters, Recipe};
use recipehub_core::pipeline::RecipeSource;
use recipehub_core::spoonacular::{ComplexSearchResponse, RecipeData, recipe_data_to_recipe};

pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";
const RESULT_COUNT: &str = "12";

pub struct SpoonacularClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    rt: tokio::runtime::Handle,
}

impl SpoonacularClient {
    pub fn new(base_url: &str, api_key: Option<String>, rt: tokio::runtime::Handle) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!("recipehub/{}", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            rt,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, ?params, "GET");
        let mut req = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            req = req.query(&[("apiKey", key.as_str())]);
        }

        let resp = req.send().await.map_err(ApiError::transport)?;
        classify_status(resp.status().as_u16())?;
        resp.json::<T>().await.map_err(ApiError::transport)
    }

    pub async fn complex_search_async(
        &self,
        query: &str,
        filters: &DietaryFilters,
    ) -> Result<Vec<Recipe>, ApiError> {
        let mut params = vec![
            ("query", query),
            ("number", RESULT_COUNT),
            ("addRecipeInformation", "true"),
        ];
        params.extend(filters.query_params());

        let data: ComplexSearchResponse =
            self.get_json("/recipes/complexSearch", &params).await?;
        Ok(data
            .results
            .into_iter()
            .filter_map(recipe_data_to_recipe)
            .collect())
    }

    pub async fn find_by_ingredients_async(
        &self,
        ingredients: &str,
    ) -> Result<Vec<Recipe>, ApiError> {
        let data: Vec<RecipeData> = self
            .get_json(
                "/recipes/findByIngredients",
                &[("ingredients", ingredients), ("number", RESULT_COUNT)],
            )
            .await?;
        Ok(data.into_iter().filter_map(recipe_data_to_recipe).collect())
    }

    pub async fn recipe_information_async(&self, id: i64) -> Result<Recipe, ApiError> {
        let data: RecipeData = self
            .get_json(
                &format!("/recipes/{id}/information"),
                &[("includeNutrition", "false")],
            )
            .await?;
        recipe_data_to_recipe(data)
            .ok_or_else(|| ApiError::transport(format!("recipe {id} came back without a title")))
    }
}

impl RecipeSource for SpoonacularClient {
    fn complex_search(
        &self,
        query: &str,
        filters: &DietaryFilters,
    ) -> Result<Vec<Recipe>, ApiError> {
        self.rt.block_on(self.complex_search_async(query, filters))
    }

    fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<Recipe>, ApiError> {
        self.rt.block_on(self.find_by_ingredients_async(ingredients))
    }

    fn recipe_information(&self, id: i64) -> Result<Recipe, ApiError> {
        self.rt.block_on(self.recipe_information_async(id))
    }
}
